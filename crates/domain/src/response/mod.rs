//! HTTP response types

mod path;
mod spec;

pub use path::{PathError, query_path};
pub use spec::{ResponseData, ResponseSpec};
