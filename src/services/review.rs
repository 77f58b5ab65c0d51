//! Presentation views over a review session
//!
//! EPG sources only label candidates here; they never influence matching.

use serde::Serialize;

use crate::models::{
    ChannelId, Decision, EpgDataId, EpgMatchResult, EpgSource, EpgSourceId, MatchStatus,
};

pub const UNKNOWN_SOURCE_LABEL: &str = "Unknown source";

/// One candidate EPG entry as shown to the reviewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateView {
    pub epg_data_id: EpgDataId,
    pub tvg_id: String,
    pub name: String,
    pub source_id: Option<EpgSourceId>,
    pub source_label: String,
}

/// A needs-review channel together with its current decision
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewItem {
    pub channel_id: ChannelId,
    pub channel_name: String,
    pub detected_country: Option<String>,
    pub normalized_name: String,
    pub decision: Decision,
    pub candidates: Vec<CandidateView>,
}

impl ReviewItem {
    pub fn from_result(result: &EpgMatchResult, decision: Decision, sources: &[EpgSource]) -> Self {
        let candidates = result
            .matches
            .iter()
            .map(|epg| CandidateView {
                epg_data_id: epg.id,
                tvg_id: epg.tvg_id.clone(),
                name: epg.name.clone(),
                source_id: epg.epg_source,
                source_label: source_label(epg.epg_source, sources),
            })
            .collect();

        Self {
            channel_id: result.channel.id,
            channel_name: result.channel.name.clone(),
            detected_country: result.detected_country.clone(),
            normalized_name: result.normalized_name.clone(),
            decision,
            candidates,
        }
    }
}

/// Display name of an EPG source
pub fn source_label(source_id: Option<EpgSourceId>, sources: &[EpgSource]) -> String {
    source_id
        .and_then(|id| sources.iter().find(|s| s.id == id))
        .map(|s| s.name.clone())
        .unwrap_or_else(|| UNKNOWN_SOURCE_LABEL.to_string())
}

/// Counts describing one review session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationSummary {
    pub total: usize,
    pub auto_matched: usize,
    pub needs_review: usize,
    pub unmatched: usize,
    pub resolved: usize,
    pub skipped: usize,
    pub undecided: usize,
    pub assignable: usize,
}

impl ReconciliationSummary {
    pub fn from_results<'a, F>(results: &'a [EpgMatchResult], decision_for: F) -> Self
    where
        F: Fn(&'a EpgMatchResult) -> Decision,
    {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };

        for result in results {
            match result.status {
                MatchStatus::Exact => summary.auto_matched += 1,
                MatchStatus::NoMatch => summary.unmatched += 1,
                MatchStatus::Multiple => {
                    summary.needs_review += 1;
                    match decision_for(result) {
                        Decision::Assign(_) => summary.resolved += 1,
                        Decision::Skip => summary.skipped += 1,
                        Decision::Undecided => summary.undecided += 1,
                    }
                }
            }
        }

        summary.assignable = summary.auto_matched + summary.resolved;
        summary
    }
}

impl std::fmt::Display for ReconciliationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} channels: {} auto-matched, {} need review ({} resolved, {} skipped, {} undecided), {} unmatched; {} assignable",
            self.total,
            self.auto_matched,
            self.needs_review,
            self.resolved,
            self.skipped,
            self.undecided,
            self.unmatched,
            self.assignable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Channel, EpgData};

    fn result(id: i64, tvg_ids: &[(i64, &str, Option<i64>)]) -> EpgMatchResult {
        let matches = tvg_ids
            .iter()
            .map(|(epg_id, tvg_id, source)| EpgData {
                id: *epg_id,
                tvg_id: tvg_id.to_string(),
                name: tvg_id.to_string(),
                epg_source: *source,
            })
            .collect();
        EpgMatchResult::new(
            Channel {
                id,
                name: format!("Channel {id}"),
                streams: vec![],
            },
            None,
            format!("channel{id}"),
            matches,
        )
    }

    #[test]
    fn test_review_item_labels_sources() {
        let sources = vec![EpgSource {
            id: 1,
            name: "XMLTV US".to_string(),
        }];
        let result = result(7, &[(10, "ESPN.us", Some(1)), (11, "ESPN.uk", Some(9))]);

        let item = ReviewItem::from_result(&result, Decision::Skip, &sources);

        assert_eq!(item.channel_id, 7);
        assert_eq!(item.decision, Decision::Skip);
        assert_eq!(item.candidates[0].source_label, "XMLTV US");
        assert_eq!(item.candidates[1].source_label, UNKNOWN_SOURCE_LABEL);
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![
            result(1, &[(10, "A.us", None)]),
            result(2, &[(10, "A.us", None), (11, "A.uk", None)]),
            result(3, &[(10, "A.us", None), (11, "A.uk", None)]),
            result(4, &[(10, "A.us", None), (11, "A.uk", None)]),
            result(5, &[]),
        ];

        let summary = ReconciliationSummary::from_results(&results, |r| match r.channel.id {
            2 => Decision::Assign(11),
            3 => Decision::Skip,
            _ => Decision::Undecided,
        });

        assert_eq!(
            summary,
            ReconciliationSummary {
                total: 5,
                auto_matched: 1,
                needs_review: 3,
                unmatched: 1,
                resolved: 1,
                skipped: 1,
                undecided: 1,
                assignable: 2,
            }
        );
        assert!(summary.to_string().contains("2 assignable"));
    }
}
