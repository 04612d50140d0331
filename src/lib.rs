pub mod config;
pub mod controls;
pub mod dispatch;
pub mod error;
pub mod poll;
pub mod session;
pub mod session_client;
pub mod sync;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::SessionError;
pub use session::{
    Action,
    GameSnapshot,
    SessionId,
};
pub use session_client::{
    SessionApi,
    SessionClient,
};
