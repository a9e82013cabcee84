pub mod archive;
pub mod bootstrap;
pub mod config;
pub mod dispatch;
pub mod download;
pub mod error;
pub mod github;
pub mod http;
pub mod platform;
pub mod release;
pub mod runtime;
