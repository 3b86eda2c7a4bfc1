//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): the crate-wide error type with stable numeric codes
//! - [`IoResultExt`](context::IoResultExt): context helpers for IO results

pub mod context;
pub mod neterror;
