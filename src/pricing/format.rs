use crate::error::{AppError, Result};

/// Formats whole-unit currency amounts the way an `en-IN` locale does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormatter {
    code: String,
    prefix: String,
}

impl CurrencyFormatter {
    /// Fails for anything that is not a three-letter code, mirroring how a
    /// locale formatter rejects an invalid currency.
    pub fn new(currency: &str) -> Result<Self> {
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AppError::Currency(currency.to_string()));
        }
        let code = currency.to_ascii_uppercase();
        let prefix = match code.as_str() {
            "INR" => "₹".to_string(),
            "USD" => "$".to_string(),
            "EUR" => "€".to_string(),
            "GBP" => "£".to_string(),
            "JPY" => "JP¥".to_string(),
            other => format!("{other}\u{a0}"),
        };
        Ok(Self { code, prefix })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// `500.0` → `₹500`, `150000.4` → `₹1,50,000`.
    pub fn format(&self, amount: f64) -> String {
        if !amount.is_finite() {
            return format!("{}{amount}", self.prefix);
        }
        let rounded = amount.round();
        let sign = if rounded < 0.0 { "-" } else { "" };
        format!("{sign}{}{}", self.prefix, group_indian(rounded.abs() as u64))
    }

    /// Formatted amount followed by ` <unit>` when a unit is given.
    pub fn format_with_unit(&self, amount: f64, unit: Option<&str>) -> String {
        match unit {
            Some(u) if !u.is_empty() => format!("{} {u}", self.format(amount)),
            _ => self.format(amount),
        }
    }
}

/// Indian digit grouping: the last three digits, then pairs.
fn group_indian(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_rupees_without_fraction() {
        let f = CurrencyFormatter::new("INR").unwrap();
        assert_eq!(f.format(500.0), "₹500");
        assert_eq!(f.format(499.5), "₹500");
        assert_eq!(f.format(1234.0), "₹1,234");
        assert_eq!(f.format(150000.0), "₹1,50,000");
        assert_eq!(f.format(12345678.0), "₹1,23,45,678");
        assert_eq!(f.format(-750.0), "-₹750");
    }

    #[test]
    fn unit_suffix() {
        let f = CurrencyFormatter::new("INR").unwrap();
        assert_eq!(f.format_with_unit(500.0, Some("/kg")), "₹500 /kg");
        assert_eq!(f.format_with_unit(500.0, Some("")), "₹500");
        assert_eq!(f.format_with_unit(500.0, None), "₹500");
    }

    #[test]
    fn other_currencies() {
        assert_eq!(CurrencyFormatter::new("usd").unwrap().format(1000.0), "$1,000");
        assert_eq!(CurrencyFormatter::new("BDT").unwrap().format(80.0), "BDT\u{a0}80");
    }

    #[test]
    fn rejects_invalid_codes() {
        assert!(CurrencyFormatter::new("RUPEES").is_err());
        assert!(CurrencyFormatter::new("₹").is_err());
        assert!(CurrencyFormatter::new("").is_err());
    }
}
