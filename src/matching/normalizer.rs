//! Channel name normalization
//!
//! Reduces a display name to a lowercase alphanumeric comparison key:
//!
//! 1. trim surrounding whitespace
//! 2. strip a leading country prefix (`US: `, `UK - `, ...)
//! 3. strip one trailing quality marker (`HD`, `FHD`, `1080P`, ...)
//! 4. strip one trailing region/timezone marker (`EAST`, `PT`, ...)
//! 5. lowercase and drop everything outside `[a-z0-9]`
//!
//! Steps 3 and 4 each run exactly once, so `"ESPN HD HD"` keeps its outer
//! `HD` and normalizes to `"espnhd"`. A trailing marker is only recognised
//! after at least one separator character: `"ESPNHD"` stays `"espnhd"`, and
//! `normalize(normalize(x)) == normalize(x)`.

use regex::Regex;
use std::sync::OnceLock;

use crate::config::MatchingConfig;
use crate::errors::{AppError, AppResult};
use crate::matching::country::CountryPrefix;

#[derive(Debug, Clone)]
pub struct NameNormalizer {
    country_prefix: CountryPrefix,
    quality_suffix: Regex,
    region_suffix: Regex,
}

impl NameNormalizer {
    pub fn new(config: &MatchingConfig) -> AppResult<Self> {
        let country_prefix = CountryPrefix::new(&config.country_prefix_pattern)?;
        let quality_suffix =
            compile_suffix_pattern(&config.quality_tokens, &config.separator_chars)?;
        let region_suffix = compile_suffix_pattern(&config.region_tokens, &config.separator_chars)?;

        Ok(Self {
            country_prefix,
            quality_suffix,
            region_suffix,
        })
    }

    /// Normalizer built from the default vocabularies
    pub fn global() -> &'static NameNormalizer {
        static NORMALIZER: OnceLock<NameNormalizer> = OnceLock::new();
        NORMALIZER.get_or_init(|| {
            NameNormalizer::new(&MatchingConfig::default())
                .expect("default matching vocabulary compiles")
        })
    }

    pub fn country_prefix(&self) -> &CountryPrefix {
        &self.country_prefix
    }

    /// Comparison key for a display name. Total: empty input gives empty output.
    pub fn normalize(&self, name: &str) -> String {
        let name = name.trim();
        let name = self.country_prefix.strip(name);
        let name = strip_suffix_once(&self.quality_suffix, name);
        let name = strip_suffix_once(&self.region_suffix, name);

        name.to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            .collect()
    }
}

/// Normalize with the default vocabularies
pub fn normalize(name: &str) -> String {
    NameNormalizer::global().normalize(name)
}

fn strip_suffix_once<'a>(pattern: &Regex, text: &'a str) -> &'a str {
    match pattern.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
}

/// `(?i)[<separators>]+(?:TOKEN|...)$`, longest tokens first
fn compile_suffix_pattern(tokens: &[String], separators: &str) -> AppResult<Regex> {
    let mut tokens: Vec<String> = tokens
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(regex::escape)
        .collect();
    if tokens.is_empty() {
        return Err(AppError::configuration("suffix vocabulary is empty"));
    }
    tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    tokens.dedup();

    let separator_class: String = separators
        .chars()
        .map(|c| regex::escape(&c.to_string()))
        .collect();
    let pattern = format!(r"(?i)[{}]+(?:{})$", separator_class, tokens.join("|"));

    Regex::new(&pattern).map_err(|e| AppError::pattern(pattern, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("US: ESPN HD", "espn")]
    #[case("  BBC One  ", "bbcone")]
    #[case("UK - Sky Sports Main Event FHD", "skysportsmainevent")]
    #[case("HBO East", "hbo")]
    #[case("HBO HD East", "hbohd")]
    #[case("HBO East HD", "hbo")]
    #[case("Fox News Channel | 1080p", "foxnewschannel")]
    #[case("Discovery_UHD", "discovery")]
    #[case("CNN International:h265", "cnninternational")]
    #[case("ESPN HD HD", "espnhd")]
    #[case("ESPNHD", "espnhd")]
    #[case("A&E", "ae")]
    #[case("us: espn", "usespn")]
    #[case("HD", "hd")]
    #[case("", "")]
    #[case("!!! ---", "")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn test_custom_vocabulary() {
        let config = MatchingConfig {
            quality_tokens: vec!["RAW".to_string()],
            region_tokens: vec!["+1".to_string()],
            ..MatchingConfig::default()
        };
        let normalizer = NameNormalizer::new(&config).unwrap();
        assert_eq!(normalizer.normalize("ITV +1"), "itv");
        assert_eq!(normalizer.normalize("ITV HD"), "itvhd");
        assert_eq!(normalizer.normalize("ITV - raw"), "itv");
    }

    #[test]
    fn test_empty_vocabulary_rejected() {
        let config = MatchingConfig {
            region_tokens: vec![],
            ..MatchingConfig::default()
        };
        assert!(NameNormalizer::new(&config).is_err());
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(name in "\\PC{0,40}") {
            let once = normalize(&name);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn normalize_output_is_lowercase_alphanumeric(name in "\\PC{0,40}") {
            let out = normalize(&name);
            prop_assert!(out.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }

        #[test]
        fn normalize_idempotent_on_channel_like_names(
            prefix in "(US|UK|CA)(: | - |\\| )",
            body in "[A-Za-z0-9 ]{1,20}",
            suffix in "( HD| FHD| East| -PT| _4K|)",
        ) {
            let name = format!("{prefix}{body}{suffix}");
            let once = normalize(&name);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
