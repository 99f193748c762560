//! Port implementations backed by external crates.

mod reqwest_client;

pub use reqwest_client::ReqwestHttpClient;
