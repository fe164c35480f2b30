//! Normalization of heterogeneous follower-count representations.
//!
//! Sources hand back anything from `"12,345"` to `"1.5M"`. Parsing accepts
//! both shapes; formatting is deliberately asymmetric (exact digits below
//! 10K, abbreviated above) because exact counts matter for small accounts.

/// Parse a raw follower-count string into an integer.
///
/// Accepts plain digits with optional thousands separators (`"12,345"`) and
/// `<decimal><K|M>` suffix forms (`"1.5M"`, `"15K"`). Anything else yields
/// `None`; the caller must not guess.
pub fn parse_followers(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(mantissa) = raw.strip_suffix(['K', 'k']) {
        return parse_mantissa(mantissa, 1_000.0);
    }
    if let Some(mantissa) = raw.strip_suffix(['M', 'm']) {
        return parse_mantissa(mantissa, 1_000_000.0);
    }

    if !raw.chars().all(|c| c.is_ascii_digit() || c == ',') {
        return None;
    }
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn parse_mantissa(mantissa: &str, scale: f64) -> Option<u64> {
    let mantissa = mantissa.trim();
    // Digits and at most one decimal point; rejects signs, exponents, spaces.
    if mantissa.is_empty()
        || !mantissa.chars().all(|c| c.is_ascii_digit() || c == '.')
        || mantissa.matches('.').count() > 1
    {
        return None;
    }
    let value: f64 = mantissa.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * scale).round() as u64)
}

/// Format a follower count for display.
///
/// Below 10,000 the exact count renders with thousands separators; at or
/// above 1,000,000 as `X.YM`; in between as `X.YK`. Trailing `.0` is
/// stripped. Display policy only; never feed the abbreviated forms back
/// into storage.
pub fn format_followers(n: u64) -> String {
    if n >= 1_000_000 {
        format_scaled(n as f64 / 1_000_000.0, "M")
    } else if n >= 10_000 {
        format_scaled(n as f64 / 1_000.0, "K")
    } else {
        format_with_separators(n)
    }
}

fn format_scaled(value: f64, suffix: &str) -> String {
    let mut s = format!("{value:.1}");
    if let Some(stripped) = s.strip_suffix(".0") {
        s = stripped.to_string();
    }
    s.push_str(suffix);
    s
}

/// Exact digits with `,` thousands separators, e.g. `9094 -> "9,094"`.
pub fn format_with_separators(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_digits_with_separators() {
        assert_eq!(parse_followers("12,345"), Some(12_345));
        assert_eq!(parse_followers("98000000"), Some(98_000_000));
        assert_eq!(parse_followers("0"), Some(0));
    }

    #[test]
    fn parses_suffix_forms() {
        assert_eq!(parse_followers("1.5M"), Some(1_500_000));
        assert_eq!(parse_followers("15K"), Some(15_000));
        assert_eq!(parse_followers("12.3k"), Some(12_300));
        assert_eq!(parse_followers("2m"), Some(2_000_000));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_followers(""), None);
        assert_eq!(parse_followers("abc"), None);
        assert_eq!(parse_followers("12.5"), None); // bare decimal, no suffix
        assert_eq!(parse_followers("-3K"), None);
        assert_eq!(parse_followers("1.2.3K"), None);
        assert_eq!(parse_followers(","), None);
    }

    #[test]
    fn formats_exact_below_ten_thousand() {
        assert_eq!(format_followers(9_094), "9,094");
        assert_eq!(format_followers(999), "999");
        assert_eq!(format_followers(0), "0");
    }

    #[test]
    fn formats_abbreviated_above_ten_thousand() {
        assert_eq!(format_followers(15_000), "15K");
        assert_eq!(format_followers(12_300), "12.3K");
        assert_eq!(format_followers(1_500_000), "1.5M");
        assert_eq!(format_followers(2_000_000), "2M");
    }

    #[test]
    fn separator_format_round_trips_through_parser() {
        for n in [0u64, 1, 999, 9_094, 10_000, 123_456, 9_999_999] {
            let formatted = format_with_separators(n);
            assert_eq!(parse_followers(&formatted), Some(n), "round trip {n}");
        }
    }
}
