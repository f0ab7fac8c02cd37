//! locstat server - HTTP API for archive line counting
//!
//! This crate exposes the locstat pipeline over HTTP. A client uploads a zip
//! archive, asks which text file extensions it contains, then asks for a line
//! report over a chosen subset of them.
//!
//! # Features
//!
//! - **Uploads**: `multipart/form-data` with the zip in an `archive` field
//! - **Middleware**: Compression, CORS, request ID tracking, structured logging
//! - **Configuration**: `.env`, an optional `server` config file, and
//!   `LOCSTAT_SERVER__*` environment variables
//! - **Error Handling**: `{"error": {"code", "message"}}` bodies; internal
//!   faults are logged and answered with a generic message
//! - **Graceful Shutdown**: Proper signal handling for production deployments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe (workspace directory usable)
//! - `GET /metrics` - Pipeline counters
//! - `POST /api/v1/scan` - Extensions of the text files in an archive
//! - `POST /api/v1/count` - Line report for selected extensions

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::{MetricsSnapshot, RequestMetrics, ServerState};
