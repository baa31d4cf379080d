//! Engine configuration.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{DiffError, Result};
use crate::normalize::{TemporalFormat, ValueNormalizer};

/// Settings for a [`DiffEngine`](crate::DiffEngine).
///
/// Missing keys take their default when deserialized:
///
/// ```rust
/// use oxide_audit_core::{DiffConfig, TemporalFormat};
///
/// let config = DiffConfig::from_json(r#"{"temporal_format": "w3c"}"#).unwrap();
/// assert_eq!(config.temporal_format, TemporalFormat::W3c);
/// assert_eq!(config.utc_offset, "+00:00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// How temporal field values are rendered.
    pub temporal_format: TemporalFormat,
    /// Offset temporal values are rendered in: `+HH:MM`, `-HH:MM` or `Z`.
    pub utc_offset: String,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            temporal_format: TemporalFormat::Display,
            utc_offset: String::from("+00:00"),
        }
    }
}

impl DiffConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::Config`] if the input is not a valid
    /// configuration object.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DiffError::Config(e.to_string()))
    }

    /// Sets the temporal format.
    #[must_use]
    pub fn temporal_format(mut self, format: TemporalFormat) -> Self {
        self.temporal_format = format;
        self
    }

    /// Sets the offset temporal values are rendered in.
    #[must_use]
    pub fn utc_offset(mut self, offset: impl Into<String>) -> Self {
        self.utc_offset = offset.into();
        self
    }

    /// Parses the configured offset.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::Config`] if the offset is not `Z`, `+HH:MM` or
    /// `-HH:MM` with hours below 24 and minutes below 60.
    pub fn offset(&self) -> Result<FixedOffset> {
        parse_offset(&self.utc_offset)
            .ok_or_else(|| DiffError::Config(format!("invalid utc_offset `{}`", self.utc_offset)))
    }

    /// Builds the value normalizer described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::Config`] if the offset is invalid.
    pub fn normalizer(&self) -> Result<ValueNormalizer> {
        Ok(ValueNormalizer::new(self.temporal_format, self.offset()?))
    }
}

fn parse_offset(text: &str) -> Option<FixedOffset> {
    if text.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }

    let mut chars = text.chars();
    let sign = match chars.next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let (hours, minutes) = chars.as_str().split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiffConfig::default();
        assert_eq!(config.temporal_format, TemporalFormat::Display);
        assert_eq!(config.offset().unwrap(), FixedOffset::east_opt(0).unwrap());
    }

    #[test]
    fn test_offset_parsing() {
        let offset = |s: &str| DiffConfig::new().utc_offset(s).offset().ok();
        assert_eq!(offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(offset("+08:00"), FixedOffset::east_opt(8 * 3600));
        assert_eq!(offset("-05:30"), FixedOffset::west_opt(5 * 3600 + 30 * 60));
        assert_eq!(offset("08:00"), None);
        assert_eq!(offset("+8:00"), None);
        assert_eq!(offset("+24:00"), None);
        assert_eq!(offset("+01:60"), None);
        assert_eq!(offset(""), None);
    }

    #[test]
    fn test_invalid_offset_error() {
        let err = DiffConfig::new().utc_offset("tomorrow").normalizer().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: invalid utc_offset `tomorrow`"
        );
    }

    #[test]
    fn test_from_json_full() {
        let config =
            DiffConfig::from_json(r#"{"temporal_format": "display", "utc_offset": "+02:00"}"#)
                .unwrap();
        let normalizer = config.normalizer().unwrap();
        assert_eq!(normalizer.format(), TemporalFormat::Display);
        assert_eq!(normalizer.offset(), FixedOffset::east_opt(7200).unwrap());
    }

    #[test]
    fn test_from_json_rejects_unknown_format() {
        assert!(matches!(
            DiffConfig::from_json(r#"{"temporal_format": "rfc2822"}"#),
            Err(DiffError::Config(_))
        ));
    }
}
