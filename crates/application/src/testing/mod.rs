//! Assertion evaluation against responses.

mod runner;

pub use runner::TestRunner;
