/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Config file defaults
pub const DEFAULT_CONFIG_FILE: &str = "epg-reconcile.toml";

// Name normalization defaults
pub const DEFAULT_QUALITY_TOKENS: &[&str] = &[
    "FHD", "UHD", "4K", "HD", "SD", "1080P", "1080I", "720P", "480P", "2160P", "HEVC", "H264",
    "H265",
];
pub const DEFAULT_REGION_TOKENS: &[&str] = &["EAST", "WEST", "ET", "PT", "CT", "MT"];
pub const DEFAULT_SEPARATOR_CHARS: &str = " -_|:";

// Leading country prefix: "US: ", "US | ", "US - ", "|US| "
pub const DEFAULT_COUNTRY_PREFIX_PATTERN: &str = r"^\|?([A-Z]{2,3})(?:\s*[:|]\s*|\s+-\s+)";

// Workflow defaults
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;
pub const DEFAULT_EMIT_SKIPPED_ASSIGNMENTS: bool = false;
