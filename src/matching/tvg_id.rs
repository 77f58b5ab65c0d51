//! TVG-ID decomposition (`name.country`)

use crate::matching::normalizer::NameNormalizer;

/// Normalized name part and optional lowercase country of a TVG-ID
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TvgIdParts {
    pub name: String,
    pub country: Option<String>,
}

/// Split a TVG-ID at its last dot
///
/// The suffix counts as a country only when it is 2-3 ASCII letters;
/// otherwise the dot is part of the name and the whole identifier is
/// normalized. Never fails.
pub fn decompose(normalizer: &NameNormalizer, tvg_id: &str) -> TvgIdParts {
    if let Some((name, suffix)) = tvg_id.rsplit_once('.') {
        if is_country_suffix(suffix) {
            return TvgIdParts {
                name: normalizer.normalize(name),
                country: Some(suffix.to_ascii_lowercase()),
            };
        }
    }

    TvgIdParts {
        name: normalizer.normalize(tvg_id),
        country: None,
    }
}

fn is_country_suffix(suffix: &str) -> bool {
    (2..=3).contains(&suffix.len()) && suffix.chars().all(|c| c.is_ascii_alphabetic())
}
