//! EPG reconciliation engine
//!
//! Matches channels against EPG metadata by normalized name and country, then
//! drives a review session in which ambiguous matches are resolved before the
//! resulting assignments are handed to an external writer.

pub mod config;
pub mod errors;
pub mod matching;
pub mod models;
pub mod services;
pub mod snapshot;
