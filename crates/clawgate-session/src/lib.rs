//! clawgate-session: session handles with policy frozen at creation.

mod error;
mod manager;

pub use clawgate_workspace::SessionType;
pub use error::SessionError;
pub use manager::{Session, SessionManager};
