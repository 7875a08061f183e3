use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_TICKER_LEN: usize = 20;

/// Listing venue used to map exchange-qualified input onto provider symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    #[default]
    Lse,
    Aim,
    Tsx,
    Asx,
    Xetra,
    Epa,
    Ams,
    Hkex,
    Nyse,
    Nasdaq,
    Amex,
}

impl Exchange {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lse => "LSE",
            Self::Aim => "AIM",
            Self::Tsx => "TSX",
            Self::Asx => "ASX",
            Self::Xetra => "XETRA",
            Self::Epa => "EPA",
            Self::Ams => "AMS",
            Self::Hkex => "HKEX",
            Self::Nyse => "NYSE",
            Self::Nasdaq => "NASDAQ",
            Self::Amex => "AMEX",
        }
    }

    /// Provider-side suffix appended to the bare symbol (`POS` -> `POS.L`).
    pub const fn suffix(self) -> Option<&'static str> {
        match self {
            Self::Lse | Self::Aim => Some("L"),
            Self::Tsx => Some("TO"),
            Self::Asx => Some("AX"),
            Self::Xetra => Some("DE"),
            Self::Epa => Some("PA"),
            Self::Ams => Some("AS"),
            Self::Hkex => Some("HK"),
            Self::Nyse | Self::Nasdaq | Self::Amex => None,
        }
    }
}

impl Display for Exchange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LSE" | "LON" => Ok(Self::Lse),
            "AIM" => Ok(Self::Aim),
            "TSX" => Ok(Self::Tsx),
            "ASX" => Ok(Self::Asx),
            "XETRA" | "ETR" => Ok(Self::Xetra),
            "EPA" => Ok(Self::Epa),
            "AMS" => Ok(Self::Ams),
            "HKEX" | "HKG" => Ok(Self::Hkex),
            "NYSE" => Ok(Self::Nyse),
            "NASDAQ" => Ok(Self::Nasdaq),
            "AMEX" => Ok(Self::Amex),
            other => Err(ValidationError::UnknownExchange {
                exchange: other.to_owned(),
                value: value.to_owned(),
            }),
        }
    }
}

/// Ticker in provider form, e.g. `POS.L`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Parse a symbol that is already in provider form.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTicker);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_TICKER_LEN {
            return Err(ValidationError::TickerTooLong {
                value: normalized,
                len,
                max: MAX_TICKER_LEN,
            });
        }

        if !normalized
            .chars()
            .next()
            .is_some_and(|first| first.is_ascii_alphanumeric())
        {
            return Err(ValidationError::TickerInvalidStart { value: normalized });
        }

        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || ch == '.' || ch == '-';
            if !valid {
                return Err(ValidationError::TickerInvalidChar {
                    value: normalized.clone(),
                    ch,
                    index,
                });
            }
        }

        Ok(Self(normalized))
    }

    /// Parse an exchange-qualified listing (`LSE:POS`) or a bare symbol.
    ///
    /// Bare symbols without a dot take the suffix of `default_exchange`;
    /// symbols that already carry a dot are kept as given. A qualified body
    /// that already ends in the exchange suffix is not suffixed twice.
    pub fn from_listing(input: &str, default_exchange: Exchange) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let (exchange, body) = match trimmed.split_once(':') {
            Some((prefix, body)) => (prefix.parse::<Exchange>()?, body.trim()),
            None if trimmed.contains('.') => return Self::parse(trimmed),
            None => (default_exchange, trimmed),
        };

        match exchange.suffix() {
            Some(suffix) if body.contains('.') => {
                let has_suffix = body
                    .rsplit_once('.')
                    .is_some_and(|(_, tail)| tail.eq_ignore_ascii_case(suffix));
                if has_suffix {
                    Self::parse(body)
                } else {
                    Err(ValidationError::ExchangeSuffixMismatch {
                        exchange: exchange.as_str().to_owned(),
                        expected: suffix,
                        value: trimmed.to_owned(),
                    })
                }
            }
            Some(suffix) if !body.is_empty() => Self::parse(&format!("{body}.{suffix}")),
            _ => Self::parse(body),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Ticker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Ticker {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Ticker {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}

/// De-duplicated, normalised list of tickers for one run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TickerList {
    tickers: Vec<Ticker>,
    duplicates: Vec<Ticker>,
}

impl TickerList {
    /// Parse comma and/or newline separated listings.
    pub fn parse(text: &str, default_exchange: Exchange) -> Result<Self, ValidationError> {
        let entries = text
            .split([',', '\n', '\r'])
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| Ticker::from_listing(entry, default_exchange))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_tickers(entries)
    }

    /// Build a list from already-normalised tickers, keeping first occurrences.
    pub fn from_tickers(entries: Vec<Ticker>) -> Result<Self, ValidationError> {
        let mut seen = HashSet::with_capacity(entries.len());
        let mut tickers = Vec::with_capacity(entries.len());
        let mut duplicates = Vec::new();
        for ticker in entries {
            if seen.insert(ticker.clone()) {
                tickers.push(ticker);
            } else {
                duplicates.push(ticker);
            }
        }

        if tickers.is_empty() {
            return Err(ValidationError::EmptyTickerList);
        }

        Ok(Self {
            tickers,
            duplicates,
        })
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    /// Entries dropped because an earlier listing normalised to the same ticker.
    pub fn duplicates(&self) -> &[Ticker] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}
