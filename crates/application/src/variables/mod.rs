//! Variable bindings and `${name}` substitution
//!
//! # Usage
//!
//! ```
//! use courier_application::variables::VariableStore;
//! use serde_json::json;
//!
//! let mut store = VariableStore::new();
//! store.set_variables([("host".to_string(), json!("localhost"))]);
//!
//! assert_eq!(store.replace_variables("http://${host}/api"), "http://localhost/api");
//! assert_eq!(store.replace_variables("${missing}"), "${missing}");
//! ```

pub mod parser;
mod store;

pub use parser::{VariableReference, parse_variables};
pub use store::{ExtractionMiss, ResolutionResult, VariableStore};
