//! soldash-server: HTTP API server for the SolDash analytics dashboard
//!
//! This crate provides:
//! - Record import and browsing over an in-memory store
//! - Pattern, insight, and aggregation endpoints backed by soldash-analytics
//! - The refresh pipeline with change notifications
//! - Server-Sent Events (SSE) for real-time notifications
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//! - JSON error responses
//!
//! # Usage
//!
//! ```rust,ignore
//! use soldash_server::{AppState, ServerConfig, routes};
//!
//! let config = ServerConfig::from_env()?;
//! let app = routes::build_router(AppState::new(config));
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod middleware;
pub mod provider;
pub mod refresh;
pub mod routes;
pub mod state;
pub mod store;

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use events::EventBroadcaster;
pub use provider::{DataProvider, InMemoryProvider, ProviderError, ProviderSnapshot};
pub use state::AppState;
pub use store::RecordStore;

// Re-export dependent crates
pub use soldash_analytics;
pub use soldash_core;
