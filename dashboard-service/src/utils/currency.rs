/// Render an amount in cents as en-US dollars, e.g. `123456` as `$1,234.56`.
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let dollars = (abs / 100).to_string();
    let fraction = abs % 100;

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{:02}", sign, grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_small_amounts() {
        assert_eq!(format_currency(0), "$0.00");
        assert_eq!(format_currency(5), "$0.05");
        assert_eq!(format_currency(1500), "$15.00");
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(format_currency(123456), "$1,234.56");
        assert_eq!(format_currency(100000000), "$1,000,000.00");
        assert_eq!(format_currency(99999), "$999.99");
    }

    #[test]
    fn negative_sign_precedes_symbol() {
        assert_eq!(format_currency(-123450), "-$1,234.50");
    }

    #[test]
    fn handles_extremes() {
        assert_eq!(format_currency(i64::MIN), "-$92,233,720,368,547,758.08");
    }
}
