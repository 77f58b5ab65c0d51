use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub mod decision;
pub mod match_result;

pub use decision::Decision;

pub type ChannelId = i64;
pub type StreamId = i64;
pub type EpgDataId = i64;
pub type EpgSourceId = i64;

/// Broadcast channel as held by the external catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    /// Associated stream ids, in catalog order
    #[serde(default)]
    pub streams: Vec<StreamId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stream {
    pub id: StreamId,
    pub name: String,
    /// Region/group label from the stream provider (e.g. "US | Sports")
    #[serde(default)]
    pub group_label: Option<String>,
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
}

/// EPG catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpgData {
    pub id: EpgDataId,
    /// Dotted `name.country` identifier, e.g. `ESPN.us`
    pub tvg_id: String,
    pub name: String,
    #[serde(default)]
    pub epg_source: Option<EpgSourceId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpgSource {
    pub id: EpgSourceId,
    pub name: String,
}

/// Match quality of a single channel, derived from its candidate count
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MatchStatus {
    /// Exactly one candidate: unambiguous, not necessarily a textual exact match
    Exact,
    /// More than one candidate; needs a review decision
    Multiple,
    /// No candidates
    #[serde(rename = "none")]
    #[strum(serialize = "none")]
    NoMatch,
}

/// Classification outcome for one channel
///
/// Created fresh per reconciliation run and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpgMatchResult {
    pub channel: Channel,
    pub detected_country: Option<String>,
    pub normalized_name: String,
    /// Ranked candidates; only the highest non-empty priority tier
    pub matches: Vec<EpgData>,
    pub status: MatchStatus,
}

/// Terminal assignment handed to the external persistence layer
///
/// `epg_data_id: None` means the channel was explicitly left unassigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpgAssignment {
    pub channel_id: ChannelId,
    pub channel_name: String,
    pub tvg_id: Option<String>,
    pub epg_data_id: Option<EpgDataId>,
}

impl EpgAssignment {
    pub fn assign(channel: &Channel, epg: &EpgData) -> Self {
        Self {
            channel_id: channel.id,
            channel_name: channel.name.clone(),
            tvg_id: Some(epg.tvg_id.clone()),
            epg_data_id: Some(epg.id),
        }
    }

    pub fn unassigned(channel: &Channel) -> Self {
        Self {
            channel_id: channel.id,
            channel_name: channel.name.clone(),
            tvg_id: None,
            epg_data_id: None,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.epg_data_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_match_status_wire_format() {
        assert_eq!(MatchStatus::NoMatch.to_string(), "none");
        assert_eq!(MatchStatus::Multiple.as_ref(), "multiple");
        assert_eq!(MatchStatus::from_str("exact").unwrap(), MatchStatus::Exact);
        assert_eq!(
            serde_json::to_string(&MatchStatus::NoMatch).unwrap(),
            "\"none\""
        );
    }

    #[test]
    fn test_assignment_serializes_nulls() {
        let channel = Channel {
            id: 7,
            name: "BBC One".to_string(),
            streams: vec![],
        };
        let json = serde_json::to_value(EpgAssignment::unassigned(&channel)).unwrap();
        assert_eq!(json["channel_id"], 7);
        assert!(json["tvg_id"].is_null());
        assert!(json["epg_data_id"].is_null());
    }

    #[test]
    fn test_channel_streams_default_to_empty() {
        let channel: Channel = serde_json::from_str(r#"{"id": 1, "name": "CNN"}"#).unwrap();
        assert!(channel.streams.is_empty());
    }
}
