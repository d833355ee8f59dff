pub mod client;

pub use client::ApiClient;
pub use sharespace_api;
