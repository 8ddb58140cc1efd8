//! Backend implementations

mod http;

pub use http::HttpBackend;
