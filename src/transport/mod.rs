//! Connection implementations.

pub mod http;

pub use http::HttpConnection;
