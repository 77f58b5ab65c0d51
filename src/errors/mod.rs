//! Centralized error handling for the EPG reconciliation engine
//!
//! The matching core itself never fails: every no-signal or ambiguous input
//! resolves to a result value. Errors only arise at the edges of the engine:
//!
//! # Error Categories
//!
//! - **Configuration Errors**: invalid vocabularies or prefix patterns
//! - **Snapshot Errors**: reading and validating the catalog snapshot
//! - **Workflow Errors**: operations issued in the wrong resolution state,
//!   decisions for channels or candidates the session never offered
//! - **Writer Errors**: the external assignment collaborator failed
//!
//! # Usage
//!
//! ```rust
//! use epg_reconcile::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("quality_tokens must not be empty"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for resolution workflow Results
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Convenience type alias for snapshot loading Results
pub type SnapshotResult<T> = Result<T, SnapshotError>;
