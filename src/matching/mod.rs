//! EPG matching core
//!
//! Pure, infallible functions: name normalization, country detection,
//! TVG-ID decomposition, per-channel classification and batch
//! reconciliation. Ambiguity is reported through [`crate::models::MatchStatus`],
//! never as an error.

pub mod classifier;
pub mod country;
pub mod normalizer;
pub mod reconciler;
pub mod tvg_id;

pub use classifier::{EpgIndex, MatchTier, classify, classify_indexed, match_tier};
pub use country::{CountryPrefix, detect_country};
pub use normalizer::{NameNormalizer, normalize};
pub use reconciler::{reconcile_all, reconcile_with_progress};
pub use tvg_id::{TvgIdParts, decompose};
