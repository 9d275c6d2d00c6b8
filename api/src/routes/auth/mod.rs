//! Authentication route handlers
//!
//! This module contains the session endpoints:
//! - Current session lookup
//! - Token refresh
//! - Logout

pub mod logout;
pub mod refresh;
pub mod session;

pub use logout::logout;
pub use refresh::refresh;
pub use session::session;
