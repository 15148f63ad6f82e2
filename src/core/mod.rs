// Core business logic module

pub mod client;
pub mod config;
pub mod runtime;
pub mod sentiment;
pub mod stream;

// Re-export commonly used items
pub use client::{ApiClient, HealthStatus, PostRecord};
pub use config::{Config, ReconnectPolicy};
pub use runtime::{DashboardCommand, DashboardRuntime, DashboardSnapshot, DashboardUpdate};
pub use stream::{live_stream_task, ConnectionStatus, StreamMessage};
