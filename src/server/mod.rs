//! HTTP server: shared state, middleware, route table and builder
//!
//! The `ServerBuilder` assembles an [`AppState`] from whichever stores the
//! caller provides and mounts every route on top of it:
//! - `/api/v1/...` behind bearer authentication and company scoping
//! - `/api/cron` behind the cron token
//! - `/health` and `/healthz`

pub mod builder;
pub mod middleware;
pub mod router;
pub mod state;

pub use builder::ServerBuilder;
pub use router::build_router;
pub use state::AppState;
