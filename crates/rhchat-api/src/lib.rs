// HTTP client for the HR assistant backend.

pub mod client;

pub use client::{ApiClient, ChatBackend};
