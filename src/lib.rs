//! # sessionnet
//!
//! A stateful HTTP session client for sites that authenticate with cookies
//! and expire sessions silently.
//!
//! `sessionnet` keeps one cookie string per session, follows redirects by
//! hand so every hop can set cookies, sends the previous page as `Referer`,
//! and logs in again when a page contains a configured logout marker.
//!
//! ## Features
//!
//! - **Cookie Jar**: scope-aware replace/append with a `Domain`/`Path` registry
//! - **Manual Redirects**: `Location` chains resolved hop by hop
//! - **Automatic Re-login**: logout detection with optional refetch
//! - **Persistence**: cookies saved per host and account in a property store
//! - **Scraping Helpers**: attribute extraction for form tokens
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sessionnet::session::Session;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut session = Session::builder("https://intranet.example.com/app")
//!         .login_path("/login.do")
//!         .login_form(&[("user", "alice"), ("password", "secret")])
//!         .logout_indicator("Please log in")
//!         .refetch_on_login(true)
//!         .build()
//!         .unwrap();
//!
//!     let page = session.get("/reports").await.unwrap();
//!     println!("{} bytes, cookie: {}", page.len(), session.cookies());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions and I/O context helpers
//! - [`cookies`] - Cookie jar and persistence stores
//! - [`http`] - Ordered headers, request bodies and hop responses
//! - [`transport`] - Single-request transport over hyper and BoringSSL
//! - [`session`] - Navigation, redirects and re-login
//! - [`extract`] - Attribute scraping helpers

pub mod base;
pub mod cookies;
pub mod extract;
pub mod http;
pub mod session;
pub mod transport;

pub use base::neterror::NetError;
pub use session::{Session, SessionBuilder, SessionConfig};
