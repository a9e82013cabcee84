//! HTTP client wrapper shared by the release feed and the asset download.

mod client;

pub use client::HttpClient;
