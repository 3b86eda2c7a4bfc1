pub mod orderedheaders;
pub mod requestbody;
pub mod response;

// Re-exports for convenience
pub use orderedheaders::OrderedHeaderMap;
pub use requestbody::RequestBody;
pub use response::HopResponse;
