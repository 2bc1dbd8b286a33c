//! Flag parsing helpers for values clap cannot express directly.

use linkskim_core::TranscriptMode;

/// `--length short`
pub const SHORT_MAX_CHARACTERS: usize = 4_000;
/// `--length medium` (also the default budget)
pub const MEDIUM_MAX_CHARACTERS: usize = 12_000;
/// `--length long`
pub const LONG_MAX_CHARACTERS: usize = 30_000;

/// Named content-budget presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPreset {
    Short,
    Medium,
    Long,
}

impl LengthPreset {
    pub fn max_characters(self) -> usize {
        match self {
            Self::Short => SHORT_MAX_CHARACTERS,
            Self::Medium => MEDIUM_MAX_CHARACTERS,
            Self::Long => LONG_MAX_CHARACTERS,
        }
    }
}

/// Parsed `--length` value: a preset name or an explicit character count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthArg {
    Preset(LengthPreset),
    Chars(usize),
}

impl LengthArg {
    pub fn max_characters(self) -> usize {
        match self {
            Self::Preset(preset) => preset.max_characters(),
            Self::Chars(count) => count,
        }
    }
}

/// Parse `--youtube`. Only the exact literals are accepted.
pub fn parse_youtube_mode(raw: &str) -> Result<TranscriptMode, String> {
    match raw {
        "auto" => Ok(TranscriptMode::Auto),
        "web" => Ok(TranscriptMode::Web),
        "apify" => Ok(TranscriptMode::Apify),
        _ => Err(format!(
            "Unsupported --youtube value: {}. Valid options: auto, web, apify",
            raw
        )),
    }
}

/// Parse `--timeout` into milliseconds.
///
/// A bare number is seconds; `s`, `m`, and `ms` suffixes are accepted. Zero
/// is rejected.
pub fn parse_duration_ms(raw: &str) -> Result<u64, String> {
    let trimmed = raw.trim();
    let split = trimmed.find(|c: char| !c.is_ascii_digit()).unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);

    let err = || format!("Unsupported --timeout value: {}. Examples: 30, 30s, 2m, 500ms", raw);
    let value: u64 = digits.parse().map_err(|_| err())?;
    let ms = match unit {
        "" | "s" => value.checked_mul(1_000).ok_or_else(err)?,
        "m" => value.checked_mul(60_000).ok_or_else(err)?,
        "ms" => value,
        _ => return Err(err()),
    };

    if ms == 0 {
        return Err(err());
    }
    Ok(ms)
}

/// Parse `--length`: a preset name, a character count, or a count with a
/// `k` suffix (`20k` = 20000).
pub fn parse_length_arg(raw: &str) -> Result<LengthArg, String> {
    let err = || {
        format!(
            "Unsupported --length value: {}. Valid options: short, medium, long, a character count, or e.g. 20k",
            raw
        )
    };

    let parsed = match raw {
        "short" => LengthArg::Preset(LengthPreset::Short),
        "medium" => LengthArg::Preset(LengthPreset::Medium),
        "long" => LengthArg::Preset(LengthPreset::Long),
        _ => {
            let (digits, multiplier) = match raw.strip_suffix('k') {
                Some(prefix) => (prefix, 1_000usize),
                None => (raw, 1),
            };
            let count: usize = digits.parse().map_err(|_| err())?;
            LengthArg::Chars(count.checked_mul(multiplier).ok_or_else(err)?)
        }
    };

    if parsed.max_characters() == 0 {
        return Err(err());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("auto", TranscriptMode::Auto)]
    #[case("web", TranscriptMode::Web)]
    #[case("apify", TranscriptMode::Apify)]
    fn test_parse_youtube_mode(#[case] raw: &str, #[case] expected: TranscriptMode) {
        assert_eq!(parse_youtube_mode(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("autp")]
    #[case("AUTO")]
    #[case("nope")]
    #[case("")]
    fn test_parse_youtube_mode_rejects_inexact_literals(#[case] raw: &str) {
        let err = parse_youtube_mode(raw).unwrap_err();
        assert!(err.contains("Unsupported --youtube"));
    }

    #[rstest]
    #[case("30", 30_000)]
    #[case("30s", 30_000)]
    #[case("2m", 120_000)]
    #[case("500ms", 500)]
    #[case("1", 1_000)]
    fn test_parse_duration_ms(#[case] raw: &str, #[case] expected: u64) {
        assert_eq!(parse_duration_ms(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("0s")]
    #[case("ten")]
    #[case("5h")]
    #[case("")]
    fn test_parse_duration_ms_rejects(#[case] raw: &str) {
        let err = parse_duration_ms(raw).unwrap_err();
        assert!(err.contains("Unsupported --timeout"));
    }

    #[rstest]
    #[case("short", 4_000)]
    #[case("medium", 12_000)]
    #[case("long", 30_000)]
    #[case("1500", 1_500)]
    #[case("20k", 20_000)]
    fn test_parse_length_arg(#[case] raw: &str, #[case] expected: usize) {
        assert_eq!(parse_length_arg(raw).unwrap().max_characters(), expected);
    }

    #[rstest]
    #[case("nope")]
    #[case("0")]
    #[case("0k")]
    #[case("k")]
    #[case("")]
    fn test_parse_length_arg_rejects(#[case] raw: &str) {
        let err = parse_length_arg(raw).unwrap_err();
        assert!(err.contains("Unsupported --length"));
    }

    #[test]
    fn test_preset_lookup() {
        assert_eq!(LengthPreset::Short.max_characters(), SHORT_MAX_CHARACTERS);
        assert_eq!(LengthArg::Preset(LengthPreset::Long).max_characters(), LONG_MAX_CHARACTERS);
    }
}
