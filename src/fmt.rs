/// Format a float as an amount with thousands separators: R$ 1,234.56
pub fn money(currency: &str, val: f64) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));

    let grouped = group_thousands(int_part);
    let sign = if negative { "-" } else { "" };
    if currency.is_empty() {
        format!("{sign}{grouped}.{dec_part}")
    } else {
        format!("{sign}{currency} {grouped}.{dec_part}")
    }
}

/// Whole-unit quantity, truncated like the part counters on the cards.
pub fn quantity(val: f64) -> String {
    group_thousands(&format!("{}", val.trunc() as i64))
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut with_commas = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();
    format!("{sign}{with_commas}")
}

/// Cut a label to at most `max` characters (not bytes).
pub fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money("R$", 1234.56), "R$ 1,234.56");
        assert_eq!(money("R$", -500.00), "-R$ 500.00");
        assert_eq!(money("R$", 0.0), "R$ 0.00");
        assert_eq!(money("$", 1000000.99), "$ 1,000,000.99");
        assert_eq!(money("", 42.10), "42.10");
    }

    #[test]
    fn test_quantity_formatting() {
        assert_eq!(quantity(3.0), "3");
        assert_eq!(quantity(2.9), "2");
        assert_eq!(quantity(12500.0), "12,500");
        assert_eq!(quantity(-4.0), "-4");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("Relé térmico", 4), "Relé");
        assert_eq!(truncate("abc", 25), "abc");
    }
}
