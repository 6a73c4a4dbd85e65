//! Price formatting bound to a tenant's currency and language

use crate::config::BusinessInfo;

/// Currencies without minor units
const ZERO_DECIMAL_CURRENCIES: &[&str] = &["CLP", "JPY", "KRW", "COP", "PYG", "VND", "ISK"];

/// Languages that group with `.` and use `,` for decimals
const COMMA_DECIMAL_LANGUAGES: &[&str] = &["es", "de", "pt", "it", "nl", "id", "tr", "da"];

/// Languages that place the symbol after the amount
const SUFFIX_SYMBOL_LANGUAGES: &[&str] = &["de", "fr", "it", "nl", "da"];

const NARROW_NBSP: char = '\u{202f}';

fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency {
        "CLP" | "ARS" | "MXN" | "COP" | "USD" | "CAD" | "AUD" | "NZD" | "UYU" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "BRL" => Some("R$"),
        "PEN" => Some("S/"),
        "INR" => Some("₹"),
        _ => None,
    }
}

/// Formats amounts as currency strings, e.g. `$150.000` for CLP in Spanish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFormatter {
    currency: String,
    language: String,
}

impl PriceFormatter {
    pub fn new(currency: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            currency: currency.into().to_ascii_uppercase(),
            language: language.into().to_ascii_lowercase(),
        }
    }

    pub fn for_business(business: &BusinessInfo) -> Self {
        Self::new(&business.currency, &business.language)
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Number of minor-unit digits shown for this currency
    pub fn decimals(&self) -> u32 {
        if ZERO_DECIMAL_CURRENCIES.contains(&self.currency.as_str()) {
            0
        } else {
            2
        }
    }

    fn separators(&self) -> (char, char) {
        let lang = self.language.as_str();
        if lang == "fr" {
            (NARROW_NBSP, ',')
        } else if COMMA_DECIMAL_LANGUAGES.contains(&lang) {
            ('.', ',')
        } else {
            (',', '.')
        }
    }

    /// Format the bare number with grouping and the currency's precision
    pub fn format_number(&self, amount: f64) -> String {
        let decimals = self.decimals();
        let scale = 10u64.pow(decimals);
        let minor = (amount.abs() * scale as f64).round() as u64;
        let whole = minor / scale;
        let fraction = minor % scale;
        let (group_sep, decimal_sep) = self.separators();

        let digits = whole.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(group_sep);
            }
            grouped.push(c);
        }

        let mut out = String::new();
        if amount < 0.0 && minor > 0 {
            out.push('-');
        }
        out.push_str(&grouped);
        if decimals > 0 {
            out.push(decimal_sep);
            out.push_str(&format!("{:0width$}", fraction, width = decimals as usize));
        }
        out
    }

    /// Format an amount with the currency symbol, or the ISO code when no
    /// symbol is known
    pub fn format(&self, amount: f64) -> String {
        let number = self.format_number(amount);
        let suffix = SUFFIX_SYMBOL_LANGUAGES.contains(&self.language.as_str());
        match (currency_symbol(&self.currency), suffix) {
            (Some(symbol), false) => match number.strip_prefix('-') {
                Some(positive) => format!("-{}{}", symbol, positive),
                None => format!("{}{}", symbol, number),
            },
            (Some(symbol), true) => format!("{}\u{a0}{}", number, symbol),
            (None, _) => format!("{}\u{a0}{}", number, self.currency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clp_in_spanish_has_no_decimals() {
        let fmt = PriceFormatter::new("CLP", "es");
        assert_eq!(fmt.format(150000.0), "$150.000");
        assert_eq!(fmt.format(1234567.4), "$1.234.567");
        assert_eq!(fmt.format(999.5), "$1.000");
    }

    #[test]
    fn test_usd_in_english() {
        let fmt = PriceFormatter::new("USD", "en");
        assert_eq!(fmt.format(1234.5), "$1,234.50");
        assert_eq!(fmt.format(0.0), "$0.00");
        assert_eq!(fmt.format(-12.5), "-$12.50");
    }

    #[test]
    fn test_euro_suffix_languages() {
        let fmt = PriceFormatter::new("EUR", "de");
        assert_eq!(fmt.format(1234.5), "1.234,50\u{a0}€");

        let fmt = PriceFormatter::new("EUR", "fr");
        assert_eq!(fmt.format_number(1234.5), "1\u{202f}234,50");
    }

    #[test]
    fn test_unknown_currency_uses_code() {
        let fmt = PriceFormatter::new("chf", "en");
        assert_eq!(fmt.currency(), "CHF");
        assert_eq!(fmt.format(10.0), "10.00\u{a0}CHF");
    }

    #[test]
    fn test_small_numbers_are_not_grouped() {
        let fmt = PriceFormatter::new("JPY", "ja");
        assert_eq!(fmt.format(999.0), "¥999");
        assert_eq!(fmt.format(1000.0), "¥1,000");
    }
}
