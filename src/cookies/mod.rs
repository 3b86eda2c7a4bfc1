//! Cookie state for a single login context.
//!
//! - **Jar**: composite `Cookie` header with a per-name scope registry
//!   ([`CookieJar`](jar::CookieJar))
//! - **Persistence**: save/load jar state through a [`PropertyStore`](persistence::PropertyStore)
//!
//! # Scope handling
//!
//! The jar does not implement RFC 6265 matching. Each `Set-Cookie` is
//! reduced to a scope token made of its `Domain` and `Path` attributes
//! (`*` when absent). A cookie whose name and token were already seen
//! replaces its previous value; any other cookie is appended, so the same
//! name can be carried once per scope.
//!
//! ```rust
//! use sessionnet::cookies::jar::CookieJar;
//!
//! let mut jar = CookieJar::new();
//! jar.update(["sid=1; Path=/", "sid=2; Path=/admin"]);
//! assert_eq!(jar.header(), "sid=1; sid=2");
//!
//! jar.update(Some("sid=3; Path=/admin"));
//! assert_eq!(jar.header(), "sid=1; sid=3");
//! ```

pub mod jar;
pub mod persistence;
