//! Request script format.

mod parser;

pub use parser::{ParseError, ParseErrorKind, parse_script};
