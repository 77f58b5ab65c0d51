//! Read-only catalog snapshot supplied by the host
//!
//! The engine never writes to these collections. A snapshot is usually loaded
//! once and shared between sessions behind an `Arc`.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;

use crate::errors::{SnapshotError, SnapshotResult};
use crate::models::{Channel, ChannelId, EpgData, EpgSource, Stream};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub streams: Vec<Stream>,
    #[serde(default)]
    pub epg_data: Vec<EpgData>,
    #[serde(default)]
    pub epg_sources: Vec<EpgSource>,
}

impl CatalogSnapshot {
    pub fn from_json(json: &str) -> SnapshotResult<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub async fn load(path: impl AsRef<Path>) -> SnapshotResult<Self> {
        let path = path.as_ref();
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| SnapshotError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
        let snapshot = Self::from_json(&contents)?;
        debug!(
            "Loaded snapshot {}: {} channels, {} streams, {} EPG entries, {} EPG sources",
            path.display(),
            snapshot.channels.len(),
            snapshot.streams.len(),
            snapshot.epg_data.len(),
            snapshot.epg_sources.len()
        );
        Ok(snapshot)
    }

    /// Reject duplicate ids within any collection
    pub fn validate(&self) -> SnapshotResult<()> {
        ensure_unique("channel", self.channels.iter().map(|c| c.id))?;
        ensure_unique("stream", self.streams.iter().map(|s| s.id))?;
        ensure_unique("epg_data", self.epg_data.iter().map(|e| e.id))?;
        ensure_unique("epg_source", self.epg_sources.iter().map(|s| s.id))
    }

    /// Selected channels in request order; unknown and repeated ids are dropped
    pub fn select(&self, channel_ids: &[ChannelId]) -> Vec<Channel> {
        let by_id: HashMap<_, _> = self.channels.iter().map(|c| (c.id, c)).collect();
        let mut seen = HashSet::new();

        channel_ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| {
                let channel = by_id.get(id).map(|c| (*c).clone());
                if channel.is_none() {
                    debug!("Selected channel {} is not in the snapshot", id);
                }
                channel
            })
            .collect()
    }

    pub fn channel_ids(&self) -> Vec<ChannelId> {
        self.channels.iter().map(|c| c.id).collect()
    }
}

fn ensure_unique(collection: &str, ids: impl Iterator<Item = i64>) -> SnapshotResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(SnapshotError::DuplicateId {
                collection: collection.to_string(),
                id,
            });
        }
    }
    Ok(())
}
