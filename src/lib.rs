pub mod api;
pub mod config;
pub mod extractor;
pub mod models;
pub mod openai;
pub mod server;
pub mod virustotal;
