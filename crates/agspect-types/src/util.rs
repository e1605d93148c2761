use serde_json::Value;

/// Default character budget for one-line previews.
pub const DEFAULT_PREVIEW_LEN: usize = 140;

/// Compact a text into a one-line preview: whitespace runs collapse to single
/// spaces, the result is trimmed, and anything beyond `max_len` characters is
/// cut with a single trailing ellipsis. Empty input previews as "No data".
pub fn preview_text(text: &str, max_len: usize) -> String {
    let compact = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if compact.is_empty() {
        return "No data".to_string();
    }

    if compact.chars().count() > max_len {
        let mut cut: String = compact.chars().take(max_len).collect();
        cut.push('…');
        cut
    } else {
        compact
    }
}

/// Preview an optional JSON value. Strings preview as their text; other
/// values preview as compact JSON; null/absent previews as "No data".
pub fn preview_value(value: Option<&Value>, max_len: usize) -> String {
    match value {
        None | Some(Value::Null) => "No data".to_string(),
        Some(Value::String(text)) => preview_text(text, max_len),
        Some(other) => preview_text(&other.to_string(), max_len),
    }
}

/// Truncate a string to a maximum character count.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect::<String>() + "...(truncated)"
    }
}

/// Human-readable byte count (1.5 KB, 2.0 MB).
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Human-readable duration from milliseconds; None renders as an em dash.
pub fn format_duration(ms: Option<u64>) -> String {
    let Some(ms) = ms else {
        return "—".to_string();
    };

    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{:.1}m", ms as f64 / 60_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_collapses_whitespace_and_trims() {
        assert_eq!(preview_text("  a\n\n  b\t c  ", 140), "a b c");
    }

    #[test]
    fn test_preview_truncates_with_single_ellipsis() {
        let long = "x".repeat(200);
        let preview = preview_text(&long, 140);
        assert_eq!(preview.chars().count(), 141);
        assert!(preview.ends_with('…'));
    }

    #[test]
    fn test_preview_empty_is_no_data() {
        assert_eq!(preview_text("", 140), "No data");
        assert_eq!(preview_text("   \n ", 140), "No data");
        assert_eq!(preview_value(None, 140), "No data");
        assert_eq!(preview_value(Some(&Value::Null), 140), "No data");
    }

    #[test]
    fn test_preview_value_renders_compact_json() {
        let value = serde_json::json!({ "a": 1 });
        assert_eq!(preview_value(Some(&value), 140), "{\"a\":1}");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(2 * 1024 * 1024), "2.0 MB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(None), "—");
        assert_eq!(format_duration(Some(12)), "12ms");
        assert_eq!(format_duration(Some(1500)), "1.5s");
        assert_eq!(format_duration(Some(90_000)), "1.5m");
    }
}
