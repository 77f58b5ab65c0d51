//! Per-channel match classification
//!
//! Every catalog entry is placed in at most one tier:
//!
//! | tier                  | name                        | countries                   |
//! |-----------------------|-----------------------------|-----------------------------|
//! | `ExactCountry`        | equal                       | both known, equal           |
//! | `ExactUnknownCountry` | equal                       | at least one unknown        |
//! | `Partial`             | equal                       | both known, different       |
//! | `Partial`             | one contains the other      | at least one unknown, or equal |
//!
//! Only the highest non-empty tier becomes the candidate list; tiers are
//! never merged and `Partial` has no internal ranking beyond catalog order.

use tracing::trace;

use crate::matching::country::detect_country;
use crate::matching::normalizer::NameNormalizer;
use crate::matching::tvg_id::{TvgIdParts, decompose};
use crate::models::{Channel, EpgData, EpgMatchResult, Stream};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    ExactCountry,
    ExactUnknownCountry,
    Partial,
}

/// EPG catalog with every TVG-ID decomposed once, in catalog order
#[derive(Debug, Clone)]
pub struct EpgIndex<'a> {
    entries: Vec<(&'a EpgData, TvgIdParts)>,
}

impl<'a> EpgIndex<'a> {
    pub fn build(normalizer: &NameNormalizer, catalog: &'a [EpgData]) -> Self {
        let entries = catalog
            .iter()
            .map(|epg| (epg, decompose(normalizer, &epg.tvg_id)))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a EpgData, &TvgIdParts)> {
        self.entries.iter().map(|(epg, parts)| (*epg, parts))
    }
}

/// Tier of one channel/EPG pairing, or `None` when the entry is discarded
pub fn match_tier(
    channel_name: &str,
    channel_country: Option<&str>,
    epg: &TvgIdParts,
) -> Option<MatchTier> {
    // An empty side carries no signal and would contain-match everything.
    if channel_name.is_empty() || epg.name.is_empty() {
        return None;
    }

    let same_name = channel_name == epg.name;
    let countries = match (channel_country, epg.country.as_deref()) {
        (Some(a), Some(b)) if a == b => Countries::Equal,
        (Some(_), Some(_)) => Countries::Different,
        _ => Countries::Unknown,
    };

    match (same_name, countries) {
        (true, Countries::Equal) => Some(MatchTier::ExactCountry),
        (true, Countries::Unknown) => Some(MatchTier::ExactUnknownCountry),
        (true, Countries::Different) => Some(MatchTier::Partial),
        (false, Countries::Different) => None,
        (false, _) => {
            let contained =
                channel_name.contains(epg.name.as_str()) || epg.name.contains(channel_name);
            contained.then_some(MatchTier::Partial)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Countries {
    Equal,
    Different,
    Unknown,
}

#[derive(Debug, Default)]
struct TieredCandidates<'a> {
    exact_country: Vec<&'a EpgData>,
    exact_unknown_country: Vec<&'a EpgData>,
    partial: Vec<&'a EpgData>,
}

impl<'a> TieredCandidates<'a> {
    fn push(&mut self, tier: MatchTier, epg: &'a EpgData) {
        match tier {
            MatchTier::ExactCountry => self.exact_country.push(epg),
            MatchTier::ExactUnknownCountry => self.exact_unknown_country.push(epg),
            MatchTier::Partial => self.partial.push(epg),
        }
    }

    fn into_ranked(self) -> Vec<EpgData> {
        let winner = if !self.exact_country.is_empty() {
            self.exact_country
        } else if !self.exact_unknown_country.is_empty() {
            self.exact_unknown_country
        } else {
            self.partial
        };
        winner.into_iter().cloned().collect()
    }
}

/// Classify one channel against a pre-decomposed catalog
pub fn classify_indexed<'a, I>(
    normalizer: &NameNormalizer,
    channel: &Channel,
    channel_streams: I,
    index: &EpgIndex<'_>,
) -> EpgMatchResult
where
    I: IntoIterator<Item = &'a Stream>,
    I::IntoIter: Clone,
{
    let detected_country = detect_country(normalizer.country_prefix(), channel_streams);
    let normalized_name = normalizer.normalize(&channel.name);

    if normalized_name.is_empty() {
        trace!(
            "Channel {} '{}' has no comparable name",
            channel.id, channel.name
        );
        return EpgMatchResult::unmatched(channel.clone(), detected_country, normalized_name);
    }

    let mut candidates = TieredCandidates::default();
    for (epg, parts) in index.iter() {
        if let Some(tier) = match_tier(&normalized_name, detected_country.as_deref(), parts) {
            candidates.push(tier, epg);
        }
    }

    let result = EpgMatchResult::new(
        channel.clone(),
        detected_country,
        normalized_name,
        candidates.into_ranked(),
    );
    trace!(
        "Channel {} '{}' -> {} ({} candidates, country {:?})",
        channel.id,
        channel.name,
        result.status,
        result.matches.len(),
        result.detected_country
    );
    result
}

/// Classify one channel against a raw EPG catalog
pub fn classify<'a, I>(
    normalizer: &NameNormalizer,
    channel: &Channel,
    channel_streams: I,
    epg_catalog: &[EpgData],
) -> EpgMatchResult
where
    I: IntoIterator<Item = &'a Stream>,
    I::IntoIter: Clone,
{
    let index = EpgIndex::build(normalizer, epg_catalog);
    classify_indexed(normalizer, channel, channel_streams, &index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchStatus;
    use proptest::prelude::*;

    fn channel(name: &str) -> Channel {
        Channel {
            id: 1,
            name: name.to_string(),
            streams: vec![10],
        }
    }

    fn stream(name: &str) -> Stream {
        Stream {
            id: 10,
            name: name.to_string(),
            group_label: None,
            channel_id: Some(1),
        }
    }

    fn epg(id: i64, tvg_id: &str) -> EpgData {
        EpgData {
            id,
            tvg_id: tvg_id.to_string(),
            name: tvg_id.to_string(),
            epg_source: Some(1),
        }
    }

    fn ids(result: &EpgMatchResult) -> Vec<i64> {
        result.matches.iter().map(|m| m.id).collect()
    }

    fn tvg(name: &str, country: Option<&str>) -> TvgIdParts {
        TvgIdParts {
            name: name.to_string(),
            country: country.map(str::to_string),
        }
    }

    #[test]
    fn test_match_tier_table() {
        assert_eq!(
            match_tier("espn", Some("us"), &tvg("espn", Some("us"))),
            Some(MatchTier::ExactCountry)
        );
        assert_eq!(
            match_tier("espn", None, &tvg("espn", Some("us"))),
            Some(MatchTier::ExactUnknownCountry)
        );
        assert_eq!(
            match_tier("espn", Some("us"), &tvg("espn", None)),
            Some(MatchTier::ExactUnknownCountry)
        );
        assert_eq!(
            match_tier("espn", Some("us"), &tvg("espn", Some("uk"))),
            Some(MatchTier::Partial)
        );
        assert_eq!(
            match_tier("espn", Some("us"), &tvg("espnextra", Some("us"))),
            Some(MatchTier::Partial)
        );
        assert_eq!(
            match_tier("espnextra", None, &tvg("espn", Some("us"))),
            Some(MatchTier::Partial)
        );
        assert_eq!(
            match_tier("espn", Some("us"), &tvg("espnextra", Some("uk"))),
            None
        );
        assert_eq!(match_tier("espn", None, &tvg("cnn", None)), None);
        assert_eq!(match_tier("espn", None, &tvg("", Some("us"))), None);
    }

    #[test]
    fn test_country_breaks_exact_tie() {
        let catalog = vec![epg(1, "ESPN.us"), epg(2, "ESPN.uk")];
        let streams = vec![stream("US: ESPN")];

        let result = classify(
            NameNormalizer::global(),
            &channel("US: ESPN HD"),
            &streams,
            &catalog,
        );

        assert_eq!(result.detected_country.as_deref(), Some("us"));
        assert_eq!(result.normalized_name, "espn");
        assert_eq!(ids(&result), vec![1]);
        assert_eq!(result.status, MatchStatus::Exact);
    }

    #[test]
    fn test_exact_country_excludes_partial_candidates() {
        let catalog = vec![epg(1, "ESPN.us"), epg(2, "ESPN Extra.us")];
        let streams = vec![stream("US: ESPN")];

        let result = classify(
            NameNormalizer::global(),
            &channel("US: ESPN HD"),
            &streams,
            &catalog,
        );

        assert_eq!(ids(&result), vec![1]);
        assert_eq!(result.status, MatchStatus::Exact);
    }

    #[test]
    fn test_unknown_country_exact_matches_are_ambiguous() {
        let catalog = vec![epg(1, "ESPN.us"), epg(2, "ESPN.uk"), epg(3, "ESPN Extra.us")];

        let result = classify(
            NameNormalizer::global(),
            &channel("ESPN"),
            std::iter::empty::<&Stream>(),
            &catalog,
        );

        assert_eq!(result.detected_country, None);
        assert_eq!(ids(&result), vec![1, 2]);
        assert_eq!(result.status, MatchStatus::Multiple);
    }

    #[test]
    fn test_partial_tier_used_when_no_exact_match() {
        let catalog = vec![
            epg(1, "ESPN Extra.us"),
            epg(2, "ESPN News.uk"),
            epg(3, "ESPN Deportes.us"),
            epg(4, "CNN.us"),
        ];
        let streams = vec![stream("US: ESPN")];

        let result = classify(NameNormalizer::global(), &channel("ESPN"), &streams, &catalog);

        // uk entry is incompatible for a substring match
        assert_eq!(ids(&result), vec![1, 3]);
        assert_eq!(result.status, MatchStatus::Multiple);
    }

    #[test]
    fn test_exact_name_different_country_is_partial() {
        let catalog = vec![epg(1, "ESPN.uk")];
        let streams = vec![stream("US: ESPN")];

        let result = classify(NameNormalizer::global(), &channel("ESPN"), &streams, &catalog);

        // a single partial candidate still reports as exact
        assert_eq!(ids(&result), vec![1]);
        assert_eq!(result.status, MatchStatus::Exact);
    }

    #[test]
    fn test_empty_normalized_name_never_matches() {
        let catalog = vec![epg(1, "ESPN.us"), epg(2, ".us"), epg(3, "HD")];

        let result = classify(
            NameNormalizer::global(),
            &channel("*** ---"),
            std::iter::empty::<&Stream>(),
            &catalog,
        );

        assert!(result.normalized_name.is_empty());
        assert!(result.matches.is_empty());
        assert_eq!(result.status, MatchStatus::NoMatch);
    }

    #[test]
    fn test_no_candidates() {
        let catalog = vec![epg(1, "CNN.us")];
        let result = classify(
            NameNormalizer::global(),
            &channel("BBC One"),
            std::iter::empty::<&Stream>(),
            &catalog,
        );
        assert_eq!(result.status, MatchStatus::NoMatch);
    }

    #[test]
    fn test_index_preserves_catalog_order() {
        let catalog = vec![epg(3, "C.us"), epg(1, "A.uk"), epg(2, "B")];
        let index = EpgIndex::build(NameNormalizer::global(), &catalog);
        let order: Vec<i64> = index.iter().map(|(e, _)| e.id).collect();
        assert_eq!(order, vec![3, 1, 2]);
        assert_eq!(index.len(), 3);
    }

    proptest! {
        #[test]
        fn punctuation_only_names_never_match(
            name in "[-_|:!*.#&@ ]{0,20}",
            tvg_ids in prop::collection::vec("[A-Za-z0-9 .|:-]{0,16}", 0..20),
        ) {
            let catalog: Vec<EpgData> = tvg_ids
                .iter()
                .enumerate()
                .map(|(i, tvg_id)| epg(i as i64, tvg_id))
                .collect();

            let result = classify(
                NameNormalizer::global(),
                &channel(&name),
                std::iter::empty::<&Stream>(),
                &catalog,
            );

            prop_assert!(result.normalized_name.is_empty());
            prop_assert!(result.matches.is_empty());
            prop_assert_eq!(result.status, MatchStatus::NoMatch);
        }
    }
}
