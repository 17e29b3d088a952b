// Infrastructure layer (shared components)
pub mod infrastructure;

// Re-export infrastructure modules at the crate root
pub use infrastructure::config;
pub use infrastructure::error;
pub use infrastructure::metrics;
pub use infrastructure::postgres;
pub use infrastructure::redis;

// Domain layer
pub mod sheet;
pub mod store;
pub mod template;

// Application layer
pub mod api;
pub mod server;

// Supporting modules
pub mod telemetry;
