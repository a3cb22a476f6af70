//! Supported currencies.

use serde::Serialize;
use std::fmt;

/// A supported currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Currency {
    /// ISO 4217 code, unique within the catalog.
    pub code: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Flag emoji.
    pub flag: &'static str,
}

impl Currency {
    const fn new(code: &'static str, name: &'static str, flag: &'static str) -> Self {
        Self { code, name, flag }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} - {}", self.flag, self.code, self.name)
    }
}

/// Default source currency for a new session.
pub const DEFAULT_FROM_CURRENCY: &str = "USD";

/// Default target currency for a new session.
pub const DEFAULT_TO_CURRENCY: &str = "EUR";

/// The fixed, ordered currency catalog.
pub static CURRENCIES: &[Currency] = &[
    Currency::new("USD", "US Dollar", "🇺🇸"),
    Currency::new("EUR", "Euro", "🇪🇺"),
    Currency::new("GBP", "British Pound", "🇬🇧"),
    Currency::new("JPY", "Japanese Yen", "🇯🇵"),
    Currency::new("AUD", "Australian Dollar", "🇦🇺"),
    Currency::new("CAD", "Canadian Dollar", "🇨🇦"),
    Currency::new("CHF", "Swiss Franc", "🇨🇭"),
    Currency::new("CNY", "Chinese Yuan", "🇨🇳"),
    Currency::new("INR", "Indian Rupee", "🇮🇳"),
    Currency::new("MXN", "Mexican Peso", "🇲🇽"),
    Currency::new("BRL", "Brazilian Real", "🇧🇷"),
    Currency::new("ZAR", "South African Rand", "🇿🇦"),
    Currency::new("RUB", "Russian Ruble", "🇷🇺"),
    Currency::new("KRW", "South Korean Won", "🇰🇷"),
    Currency::new("SGD", "Singapore Dollar", "🇸🇬"),
    Currency::new("HKD", "Hong Kong Dollar", "🇭🇰"),
    Currency::new("NOK", "Norwegian Krone", "🇳🇴"),
    Currency::new("SEK", "Swedish Krona", "🇸🇪"),
    Currency::new("DKK", "Danish Krone", "🇩🇰"),
    Currency::new("NZD", "New Zealand Dollar", "🇳🇿"),
    Currency::new("TRY", "Turkish Lira", "🇹🇷"),
    Currency::new("AED", "UAE Dirham", "🇦🇪"),
    Currency::new("SAR", "Saudi Riyal", "🇸🇦"),
    Currency::new("THB", "Thai Baht", "🇹🇭"),
    Currency::new("MYR", "Malaysian Ringgit", "🇲🇾"),
    Currency::new("IDR", "Indonesian Rupiah", "🇮🇩"),
    Currency::new("PHP", "Philippine Peso", "🇵🇭"),
    Currency::new("PLN", "Polish Zloty", "🇵🇱"),
    Currency::new("CZK", "Czech Koruna", "🇨🇿"),
    Currency::new("HUF", "Hungarian Forint", "🇭🇺"),
    Currency::new("ILS", "Israeli Shekel", "🇮🇱"),
    Currency::new("CLP", "Chilean Peso", "🇨🇱"),
    Currency::new("ARS", "Argentine Peso", "🇦🇷"),
    Currency::new("EGP", "Egyptian Pound", "🇪🇬"),
];

/// Find a currency by its exact (case-sensitive) code.
pub fn lookup(code: &str) -> Option<&'static Currency> {
    CURRENCIES.iter().find(|currency| currency.code == code)
}

/// Search the catalog by code or name.
///
/// An empty query returns the whole catalog. Otherwise the query is matched
/// case-insensitively as a substring of either the code or the name, and
/// matches keep their catalog order.
pub fn filter(query: &str) -> Vec<&'static Currency> {
    if query.is_empty() {
        return CURRENCIES.iter().collect();
    }

    let query = query.to_lowercase();
    CURRENCIES
        .iter()
        .filter(|currency| {
            currency.code.to_lowercase().contains(&query)
                || currency.name.to_lowercase().contains(&query)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_catalog_codes_unique() {
        let mut codes: Vec<&str> = CURRENCIES.iter().map(|c| c.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), CURRENCIES.len());
    }

    #[test]
    fn test_lookup() {
        let euro = lookup("EUR").unwrap();
        assert_eq!(euro.name, "Euro");
        assert!(lookup("eur").is_none());
        assert!(lookup("XYZ").is_none());
    }

    #[test]
    fn test_defaults_are_in_catalog() {
        assert!(lookup(DEFAULT_FROM_CURRENCY).is_some());
        assert!(lookup(DEFAULT_TO_CURRENCY).is_some());
    }

    #[test]
    fn test_filter_empty_returns_catalog() {
        let all = filter("");
        assert_eq!(all.len(), CURRENCIES.len());
        assert!(all.iter().zip(CURRENCIES.iter()).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_filter_eur() {
        let matches = filter("eur");
        assert!(matches.iter().any(|c| c.code == "EUR"));
        assert!(!matches.iter().any(|c| c.code == "USD"));
    }

    #[test]
    fn test_filter_by_name() {
        let matches: Vec<&str> = filter("PESO").iter().map(|c| c.code).collect();
        assert_eq!(matches, vec!["MXN", "PHP", "CLP", "ARS"]);
    }

    #[test]
    fn test_filter_no_match() {
        assert!(filter("zzz").is_empty());
    }

    proptest! {
        #[test]
        fn filter_results_match_and_keep_order(query in "[a-zA-Z ]{1,4}") {
            let lower = query.to_lowercase();
            let results = filter(&query);

            for currency in &results {
                prop_assert!(
                    currency.code.to_lowercase().contains(&lower)
                        || currency.name.to_lowercase().contains(&lower)
                );
            }

            let positions: Vec<usize> = results
                .iter()
                .map(|c| CURRENCIES.iter().position(|x| x.code == c.code).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
