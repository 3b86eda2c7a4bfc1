//! Stateful navigation: cookies, redirects, referer and re-login.
//!
//! A [`Session`] owns everything one logged-in context needs. Each call to
//! [`Session::get`], [`Session::post`] or [`Session::request`] walks the
//! `Location` chain, folds `Set-Cookie` headers into the jar on every hop,
//! and posts the login form when the final page shows the logout indicator.

pub mod config;
pub mod navigator;
pub mod options;
pub mod state;

pub use config::{SessionBuilder, SessionConfig, DEFAULT_REDIRECT_LIMIT};
pub use navigator::Session;
pub use options::RequestOptions;
pub use state::NavState;
