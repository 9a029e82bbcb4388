pub const DEFAULT_CURRENCY_SYMBOL: &str = "R";

/// `R 1,234,567.89`. Non-finite values render as zero.
pub fn format_currency(symbol: &str, value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let negative = value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));

    let mut out = String::with_capacity(symbol.len() + fixed.len() + fixed.len() / 3 + 2);
    out.push_str(symbol);
    out.push(' ');
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(whole));
    out.push('.');
    out.push_str(cents);
    out
}

pub fn format_percent(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{value:.2}%")
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_and_rounds_to_cents() {
        assert_eq!(format_currency("R", 0.0), "R 0.00");
        assert_eq!(format_currency("R", 999.999), "R 1,000.00");
        assert_eq!(format_currency("R", 1_000_000.0), "R 1,000,000.00");
        assert_eq!(format_currency("R", 52_173.913_043), "R 52,173.91");
        assert_eq!(format_currency("R", 29_934.456_522), "R 29,934.46");
        assert_eq!(format_currency("R", 123.4), "R 123.40");
    }

    #[test]
    fn negative_values_keep_sign_after_symbol() {
        assert_eq!(format_currency("R", -1_234.5), "R -1,234.50");
        assert_eq!(format_currency("R", -0.001), "R 0.00");
    }

    #[test]
    fn non_finite_values_render_as_zero() {
        assert_eq!(format_currency("R", f64::NAN), "R 0.00");
        assert_eq!(format_currency("R", f64::INFINITY), "R 0.00");
        assert_eq!(format_percent(f64::NAN), "0.00%");
    }

    #[test]
    fn uses_configured_symbol() {
        assert_eq!(format_currency("ZAR", 12.0), "ZAR 12.00");
    }

    #[test]
    fn percent_has_two_decimals() {
        assert_eq!(format_percent(20.0), "20.00%");
        assert_eq!(format_percent(33.333), "33.33%");
    }
}
