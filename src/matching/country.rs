//! Country prefix recognition and stream-based country detection

use regex::Regex;

use crate::errors::{AppError, AppResult};
use crate::models::Stream;

/// Recognises a leading country-code token such as `US: ` or `UK | `
///
/// Capture group 1 of the pattern is the code. Codes are reported lowercase.
#[derive(Debug, Clone)]
pub struct CountryPrefix {
    pattern: Regex,
}

impl CountryPrefix {
    pub fn new(pattern: &str) -> AppResult<Self> {
        let pattern = Regex::new(pattern).map_err(|e| AppError::pattern(pattern, e))?;
        if pattern.captures_len() < 2 {
            return Err(AppError::configuration(format!(
                "country prefix pattern '{}' has no capture group",
                pattern.as_str()
            )));
        }
        Ok(Self { pattern })
    }

    /// Lowercase country code of a leading prefix, if present
    pub fn extract(&self, text: &str) -> Option<String> {
        self.pattern
            .captures(text.trim())
            .and_then(|caps| caps.get(1))
            .map(|code| code.as_str().to_lowercase())
            .filter(|code| !code.is_empty())
    }

    /// Text with a leading prefix removed; unchanged when there is none
    pub fn strip<'a>(&self, text: &'a str) -> &'a str {
        match self.pattern.find(text) {
            Some(m) if m.start() == 0 => &text[m.end()..],
            _ => text,
        }
    }
}

/// Infer a channel's country from its streams
///
/// Every stream name is tried first, in order. Group labels are consulted only
/// when no name carries a prefix. The first hit of the succeeding pass wins.
pub fn detect_country<'a, I>(prefix: &CountryPrefix, streams: I) -> Option<String>
where
    I: IntoIterator<Item = &'a Stream>,
    I::IntoIter: Clone,
{
    let streams = streams.into_iter();

    streams
        .clone()
        .find_map(|stream| prefix.extract(&stream.name))
        .or_else(|| {
            streams
                .filter_map(|stream| stream.group_label.as_deref())
                .find_map(|label| prefix.extract(label))
        })
}
