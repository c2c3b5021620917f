//! HTTP adapters for the evaluation, conversation and candidate services.

pub mod dto;
pub mod http_backend;

pub use http_backend::HttpBackend;
