/// Format a money amount with two decimal places, thousands separators and
/// a currency prefix: `$1,234.50`, `-$12.00`.
pub fn format_money(value: f64, prefix: &str) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let rounded = format!("{:.2}", value.abs());
    let (whole, frac) = rounded.split_once('.').unwrap_or((&rounded, "00"));
    let grouped = group_digits(whole);

    // "-0.00" is not a thing on paper
    if value < 0.0 && rounded != "0.00" {
        format!("-{prefix}{grouped}.{frac}")
    } else {
        format!("{prefix}{grouped}.{frac}")
    }
}

pub fn format_grouped_int(value: i64) -> String {
    let grouped = group_digits(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Inserts a comma every three digits from the right of a digit string.
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Quantities print without decimals when whole: `2`, `2.5`, `0.75`.
pub fn format_quantity(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        let text = format!("{:.3}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Rounds to cents, the precision every printed amount uses.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_has_two_decimals_and_groups() {
        assert_eq!(format_money(41.0, "$"), "$41.00");
        assert_eq!(format_money(1234567.891, "$"), "$1,234,567.89");
        assert_eq!(format_money(0.0, "$"), "$0.00");
        assert_eq!(format_money(-12.5, "$"), "-$12.50");
        assert_eq!(format_money(-0.001, "$"), "$0.00");
        assert_eq!(format_money(f64::NAN, "MXN "), "MXN 0.00");
    }

    #[test]
    fn money_beyond_integer_range_keeps_its_digits() {
        assert_eq!(format_money(1e20, "$"), "$100,000,000,000,000,000,000.00");
        assert_eq!(format_money(-1e19, "$"), "-$10,000,000,000,000,000,000.00");
    }

    #[test]
    fn grouped_ints() {
        assert_eq!(format_grouped_int(0), "0");
        assert_eq!(format_grouped_int(999), "999");
        assert_eq!(format_grouped_int(1000), "1,000");
        assert_eq!(format_grouped_int(-1234567), "-1,234,567");
    }

    #[test]
    fn quantities() {
        assert_eq!(format_quantity(2.0), "2");
        assert_eq!(format_quantity(2.5), "2.5");
        assert_eq!(format_quantity(0.125), "0.125");
    }

    #[test]
    fn cents() {
        assert_eq!(round_cents(41.004), 41.0);
        assert_eq!(round_cents(10.556), 10.56);
    }
}
