//! EPG match result constructors

use crate::models::{Channel, EpgData, EpgDataId, EpgMatchResult, MatchStatus};

impl MatchStatus {
    /// Status is a pure function of the candidate count
    pub fn from_match_count(count: usize) -> Self {
        match count {
            0 => MatchStatus::NoMatch,
            1 => MatchStatus::Exact,
            _ => MatchStatus::Multiple,
        }
    }
}

impl EpgMatchResult {
    pub fn new(
        channel: Channel,
        detected_country: Option<String>,
        normalized_name: String,
        matches: Vec<EpgData>,
    ) -> Self {
        let status = MatchStatus::from_match_count(matches.len());
        Self {
            channel,
            detected_country,
            normalized_name,
            matches,
            status,
        }
    }

    /// Result with no candidates
    pub fn unmatched(
        channel: Channel,
        detected_country: Option<String>,
        normalized_name: String,
    ) -> Self {
        Self::new(channel, detected_country, normalized_name, Vec::new())
    }

    /// Sole candidate of an auto-matched result
    pub fn sole_match(&self) -> Option<&EpgData> {
        match self.status {
            MatchStatus::Exact => self.matches.first(),
            MatchStatus::Multiple | MatchStatus::NoMatch => None,
        }
    }

    pub fn offers(&self, epg_data_id: EpgDataId) -> bool {
        self.matches.iter().any(|m| m.id == epg_data_id)
    }
}
