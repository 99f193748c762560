//! HTTP request types

mod body;
mod header;
mod method;
mod spec;

pub use body::RequestBody;
pub use header::{Header, Headers, is_valid_header_name};
pub use method::HttpMethod;
pub use spec::RequestSpec;
