//! Batch reconciliation of a channel selection

use std::collections::HashMap;
use std::ops::ControlFlow;
use tracing::debug;

use crate::matching::classifier::{EpgIndex, classify_indexed};
use crate::matching::normalizer::NameNormalizer;
use crate::models::{Channel, EpgData, EpgMatchResult, Stream, StreamId};

/// Classify every channel, one result per channel in input order
pub fn reconcile_all(
    normalizer: &NameNormalizer,
    channels: &[Channel],
    all_streams: &[Stream],
    epg_catalog: &[EpgData],
) -> Vec<EpgMatchResult> {
    let outcome = reconcile_with_progress(normalizer, channels, all_streams, epg_catalog, |_, _| {
        ControlFlow::Continue(())
    });
    outcome.unwrap_or_default()
}

/// [`reconcile_all`] reporting `(processed, total)` after every channel
///
/// Returns `None` when the callback breaks, discarding partial results.
pub fn reconcile_with_progress<F>(
    normalizer: &NameNormalizer,
    channels: &[Channel],
    all_streams: &[Stream],
    epg_catalog: &[EpgData],
    mut on_progress: F,
) -> Option<Vec<EpgMatchResult>>
where
    F: FnMut(usize, usize) -> ControlFlow<()>,
{
    let streams_by_id: HashMap<StreamId, &Stream> =
        all_streams.iter().map(|s| (s.id, s)).collect();
    let index = EpgIndex::build(normalizer, epg_catalog);

    debug!(
        "Reconciling {} channels against {} EPG entries",
        channels.len(),
        index.len()
    );

    let total = channels.len();
    let mut results = Vec::with_capacity(total);
    for (position, channel) in channels.iter().enumerate() {
        let channel_streams = resolve_streams(channel, &streams_by_id);
        results.push(classify_indexed(
            normalizer,
            channel,
            channel_streams.iter().copied(),
            &index,
        ));

        if on_progress(position + 1, total).is_break() {
            debug!(
                "Reconciliation stopped after {} of {} channels",
                position + 1,
                total
            );
            return None;
        }
    }

    Some(results)
}

/// Streams of a channel in its own stream-id order; unknown ids are dropped
fn resolve_streams<'a>(
    channel: &Channel,
    streams_by_id: &HashMap<StreamId, &'a Stream>,
) -> Vec<&'a Stream> {
    channel
        .streams
        .iter()
        .filter_map(|id| {
            let stream = streams_by_id.get(id).copied();
            if stream.is_none() {
                debug!(
                    "Channel {} references missing stream {}, skipping it",
                    channel.id, id
                );
            }
            stream
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchStatus;

    fn channel(id: i64, name: &str, streams: Vec<i64>) -> Channel {
        Channel {
            id,
            name: name.to_string(),
            streams,
        }
    }

    fn stream(id: i64, name: &str, group: Option<&str>) -> Stream {
        Stream {
            id,
            name: name.to_string(),
            group_label: group.map(str::to_string),
            channel_id: None,
        }
    }

    fn epg(id: i64, tvg_id: &str) -> EpgData {
        EpgData {
            id,
            tvg_id: tvg_id.to_string(),
            name: tvg_id.to_string(),
            epg_source: None,
        }
    }

    fn catalog() -> Vec<EpgData> {
        vec![
            epg(1, "ESPN.us"),
            epg(2, "ESPN.uk"),
            epg(3, "BBC One.uk"),
            epg(4, "CNN.us"),
        ]
    }

    #[test]
    fn test_output_mirrors_input_order() {
        let channels = vec![
            channel(30, "CNN", vec![]),
            channel(10, "Unknown Channel", vec![]),
            channel(20, "BBC One", vec![]),
        ];

        let results = reconcile_all(NameNormalizer::global(), &channels, &[], &catalog());

        let order: Vec<i64> = results.iter().map(|r| r.channel.id).collect();
        assert_eq!(order, vec![30, 10, 20]);
        assert_eq!(results[0].status, MatchStatus::Exact);
        assert_eq!(results[1].status, MatchStatus::NoMatch);
        assert_eq!(results[2].status, MatchStatus::Exact);
    }

    #[test]
    fn test_missing_streams_are_dropped_without_aborting() {
        let channels = vec![
            channel(1, "ESPN", vec![404, 100]),
            channel(2, "ESPN", vec![405]),
        ];
        let streams = vec![stream(100, "US: ESPN", None)];

        let results = reconcile_all(NameNormalizer::global(), &channels, &streams, &catalog());

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].detected_country.as_deref(), Some("us"));
        assert_eq!(results[0].status, MatchStatus::Exact);
        assert_eq!(results[1].detected_country, None);
        assert_eq!(results[1].status, MatchStatus::Multiple);
    }

    #[test]
    fn test_stream_lookup_follows_channel_stream_order() {
        let channels = vec![channel(1, "ESPN", vec![200, 100])];
        let streams = vec![
            stream(100, "US: ESPN", None),
            stream(200, "UK: ESPN", None),
        ];

        let results = reconcile_all(NameNormalizer::global(), &channels, &streams, &catalog());

        assert_eq!(results[0].detected_country.as_deref(), Some("uk"));
        assert_eq!(results[0].matches[0].id, 2);
    }

    #[test]
    fn test_progress_reports_every_channel() {
        let channels = vec![
            channel(1, "ESPN", vec![]),
            channel(2, "CNN", vec![]),
            channel(3, "BBC One", vec![]),
        ];
        let mut seen = Vec::new();

        let results = reconcile_with_progress(
            NameNormalizer::global(),
            &channels,
            &[],
            &catalog(),
            |done, total| {
                seen.push((done, total));
                ControlFlow::Continue(())
            },
        );

        assert_eq!(results.map(|r| r.len()), Some(3));
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_break_discards_partial_results() {
        let channels = vec![channel(1, "ESPN", vec![]), channel(2, "CNN", vec![])];

        let results = reconcile_with_progress(
            NameNormalizer::global(),
            &channels,
            &[],
            &catalog(),
            |done, _| {
                if done == 1 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        );

        assert!(results.is_none());
    }

    #[test]
    fn test_empty_selection() {
        let results = reconcile_all(NameNormalizer::global(), &[], &[], &catalog());
        assert!(results.is_empty());
    }
}
