//! Small text helpers shared by the tool renderers.

use crate::config::SITE_URL;

/// Appended to every successful tool document
pub fn footer() -> String {
    format!("---\n*Powered by [ArchitectGBT]({SITE_URL})*")
}

/// `200000` -> `200,000`
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render a price with up to two decimals, dropping trailing zeros
/// (`3` -> `3`, `0.15` -> `0.15`, `2.5` -> `2.5`).
pub fn price(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Convert a per-1K-token price to a per-1M display string; missing or zero is `?`.
pub fn per_million(per_thousand: Option<f64>) -> String {
    match per_thousand {
        Some(p) if p != 0.0 && p.is_finite() => format!("{:.2}", p * 1000.0),
        _ => "?".to_string(),
    }
}

/// Truncate to `max_chars` characters, appending `...` when shortened.
pub fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(128_000), "128,000");
        assert_eq!(thousands(2_000_000), "2,000,000");
    }

    #[test]
    fn test_price() {
        assert_eq!(price(3.0), "3");
        assert_eq!(price(0.15), "0.15");
        assert_eq!(price(2.5), "2.5");
        assert_eq!(price(0.0), "0");
    }

    #[test]
    fn test_per_million() {
        assert_eq!(per_million(Some(0.003)), "3.00");
        assert_eq!(per_million(Some(0.00015)), "0.15");
        assert_eq!(per_million(Some(0.0)), "?");
        assert_eq!(per_million(None), "?");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 4), "abcd...");
        assert_eq!(truncate("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn test_footer_links_site() {
        assert!(footer().contains("https://architectgbt.com"));
    }
}
