//! AttendanceHub core types and utilities

pub mod error;
pub mod session;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use session::SessionTokens;
pub use types::{LocationType, User};
