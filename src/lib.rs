pub mod app;
pub mod config;
pub mod http;
pub mod ingest;
pub mod modules;
pub mod router;
pub mod shared;
pub mod toolkit;
pub mod workflow;
