//! Live session orchestration: one actor per game, a manager to route
//! requests, and the messages flowing between them.

pub mod actor;
pub mod manager;
pub mod messages;

pub use actor::{SessionActor, SessionHandle};
pub use manager::{ServiceError, ServiceResult, SessionManager};
pub use messages::SessionMessage;
