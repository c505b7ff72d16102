//! teachtask-core library.
//!
//! Per-user ordered task and teaching-goal lists over a pluggable record
//! store, plus dashboard aggregates and AI suggestion plumbing.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums at module seams (`StoreError`,
//!   `ListError`, `SessionError`, `ProviderError`), each mapping to a stable
//!   [`error::ErrorCode`]. Config loading returns `anyhow::Result`.
//! - **Logging**: `tracing` macros. `debug!` for reads, `info!` for
//!   mutations, `warn!` for provider fallback, `error!` for failed writes.

pub mod config;
pub mod error;
pub mod list;
pub mod markup;
pub mod model;
pub mod session;
pub mod stats;
pub mod store;
pub mod suggest;
pub mod view;

pub use list::{ListError, ListService, Lists};
pub use session::{Identity, SessionError, SessionProvider, require_identity};
