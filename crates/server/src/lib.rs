//! Songbook Server - HTTP REST API over a song-lyrics collection
//!
//! Exposes CRUD operations on songs stored in MongoDB (or an in-memory store
//! for local runs). The collection is seeded from a JSON file at startup.
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
//! - `GET /health` - Store liveness (`OK` / `UNAVAILABLE`)
//! - `GET /count` - Number of songs
//! - `GET /song` - All songs
//! - `POST /song` - Create a song (`302` if the id exists)
//! - `GET /song/{id}` - Song by id
//! - `PUT /song/{id}` - Replace title and lyrics
//! - `DELETE /song/{id}` - Delete a song
//! - `GET /metrics` - Prometheus metrics (when enabled)
//!
//! # Environment
//!
//! - `MONGODB_SERVICE` (required for the MongoDB backend), `MONGODB_USERNAME`,
//!   `MONGODB_PASSWORD`, `MONGODB_PORT`
//! - `SONGS_SERVER__*` for everything in [`ServerConfig`]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
