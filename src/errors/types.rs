//! Error type definitions for the EPG reconciliation engine
//!
//! This module defines the error hierarchy used outside the matching core,
//! which is infallible by construction.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{ChannelId, EpgDataId};

/// Top-level application error type
///
/// Uses `thiserror` to provide automatic error trait implementations and
/// proper error chaining from the lower layers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Invalid pattern in the matching configuration
    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// File system errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// External assignment writer errors
    #[error("Assignment writer error: {writer} - {message}")]
    Writer { writer: String, message: String },
}

/// Catalog snapshot specific errors
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Snapshot file could not be read
    #[error("Failed to read snapshot {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot document is not valid JSON for the catalog schema
    #[error("Failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// The same identifier appears twice in one collection
    #[error("Duplicate {collection} id {id}")]
    DuplicateId { collection: String, id: i64 },
}

/// Resolution workflow specific errors
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Operation issued in a state that does not accept it
    #[error("Cannot {operation} while workflow is {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// Channel is not part of the current session
    #[error("Channel {channel_id} is not part of the current session")]
    UnknownChannel { channel_id: ChannelId },

    /// Decision issued for a channel that does not need review
    #[error("Channel {channel_id} does not need review")]
    NotInReview { channel_id: ChannelId },

    /// A recorded decision must either assign or skip
    #[error("Decision for channel {channel_id} must assign an EPG entry or skip")]
    UndecidedChoice { channel_id: ChannelId },

    /// Chosen EPG entry was not one of the channel's candidates
    #[error("EPG entry {epg_data_id} is not a candidate for channel {channel_id}")]
    CandidateNotOffered {
        channel_id: ChannelId,
        epg_data_id: EpgDataId,
    },

    /// Analysis outcome belongs to a session that is no longer current
    #[error("Analysis for session {session_id} is stale and was discarded")]
    StaleAnalysis { session_id: Uuid },

    /// Commit attempted with nothing assignable
    #[error("Nothing to assign: no auto-matched or resolved channels")]
    NothingToAssign,

    /// The assignment writer rejected the commit
    #[error("Failed to write assignments: {0}")]
    Writer(#[source] AppError),
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a pattern compilation error
    pub fn pattern<S: Into<String>>(pattern: S, source: regex::Error) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create an assignment writer error
    pub fn writer<W: Into<String>, M: Into<String>>(writer: W, message: M) -> Self {
        Self::Writer {
            writer: writer.into(),
            message: message.into(),
        }
    }
}

impl WorkflowError {
    /// Create an invalid state error
    pub fn invalid_state<S: ToString>(operation: &'static str, state: S) -> Self {
        Self::InvalidState {
            operation,
            state: state.to_string(),
        }
    }
}
