use serde::{Deserialize, Serialize};

use crate::Ticker;

/// Financial statement fields fetched for one ticker.
///
/// Every field is optional because providers routinely omit lines; the
/// derived accessors decide which gaps are fatal for screening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFundamentals {
    pub ticker: Ticker,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default)]
    pub ebit: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub shares_outstanding: Option<f64>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub total_debt: Option<f64>,
    #[serde(default)]
    pub cash: Option<f64>,
    #[serde(default)]
    pub total_current_assets: Option<f64>,
    #[serde(default)]
    pub total_current_liabilities: Option<f64>,
    #[serde(default)]
    pub short_term_debt: Option<f64>,
    #[serde(default)]
    pub net_ppe: Option<f64>,
    /// Enterprise value as reported by the provider, used only when market cap is unknown.
    #[serde(default)]
    pub reported_enterprise_value: Option<f64>,
}

impl RawFundamentals {
    pub fn new(ticker: Ticker) -> Self {
        Self {
            ticker,
            name: None,
            currency: None,
            ebit: None,
            market_cap: None,
            shares_outstanding: None,
            current_price: None,
            total_debt: None,
            cash: None,
            total_current_assets: None,
            total_current_liabilities: None,
            short_term_debt: None,
            net_ppe: None,
            reported_enterprise_value: None,
        }
    }

    /// Reported market cap, else shares outstanding times current price.
    pub fn market_cap(&self) -> Option<f64> {
        self.market_cap.or_else(|| {
            let shares = self.shares_outstanding?;
            let price = self.current_price?;
            Some(shares * price)
        })
    }

    /// Market cap + total debt - cash, falling back to the reported EV.
    pub fn enterprise_value(&self) -> Option<f64> {
        match self.market_cap() {
            Some(market_cap) => {
                Some(market_cap + self.total_debt.unwrap_or(0.0) - self.cash.unwrap_or(0.0))
            }
            None => self.reported_enterprise_value,
        }
    }

    /// Net PP&E plus operating net working capital.
    ///
    /// Operating NWC = current assets - cash - current liabilities + short-term debt.
    /// Absent when neither PP&E nor current assets were reported.
    pub fn tangible_capital(&self) -> Option<f64> {
        if self.net_ppe.is_none() && self.total_current_assets.is_none() {
            return None;
        }

        let operating_nwc = self.total_current_assets.unwrap_or(0.0) - self.cash.unwrap_or(0.0)
            - self.total_current_liabilities.unwrap_or(0.0)
            + self.short_term_debt.unwrap_or(0.0);
        Some(self.net_ppe.unwrap_or(0.0) + operating_nwc)
    }

    pub fn with_ebit(mut self, ebit: f64) -> Self {
        self.ebit = Some(ebit);
        self
    }

    pub fn with_market_cap(mut self, market_cap: f64) -> Self {
        self.market_cap = Some(market_cap);
        self
    }

    pub fn with_debt_and_cash(mut self, total_debt: f64, cash: f64) -> Self {
        self.total_debt = Some(total_debt);
        self.cash = Some(cash);
        self
    }

    pub fn with_net_ppe(mut self, net_ppe: f64) -> Self {
        self.net_ppe = Some(net_ppe);
        self
    }

    pub fn with_working_capital(
        mut self,
        total_current_assets: f64,
        total_current_liabilities: f64,
        short_term_debt: f64,
    ) -> Self {
        self.total_current_assets = Some(total_current_assets);
        self.total_current_liabilities = Some(total_current_liabilities);
        self.short_term_debt = Some(short_term_debt);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker() -> Ticker {
        Ticker::parse("POS.L").expect("valid ticker")
    }

    #[test]
    fn enterprise_value_reconstructs_from_market_cap_debt_and_cash() {
        let raw = RawFundamentals::new(ticker())
            .with_market_cap(1_000.0)
            .with_debt_and_cash(200.0, 50.0);

        assert_eq!(raw.enterprise_value(), Some(1_150.0));
    }

    #[test]
    fn market_cap_falls_back_to_shares_times_price() {
        let mut raw = RawFundamentals::new(ticker());
        raw.shares_outstanding = Some(100.0);
        raw.current_price = Some(2.5);

        assert_eq!(raw.market_cap(), Some(250.0));
        assert_eq!(raw.enterprise_value(), Some(250.0));
    }

    #[test]
    fn enterprise_value_uses_reported_value_without_market_cap() {
        let mut raw = RawFundamentals::new(ticker());
        raw.reported_enterprise_value = Some(900.0);
        raw.total_debt = Some(10_000.0);

        assert_eq!(raw.enterprise_value(), Some(900.0));
    }

    #[test]
    fn tangible_capital_combines_ppe_and_operating_working_capital() {
        let raw = RawFundamentals::new(ticker())
            .with_net_ppe(500.0)
            .with_working_capital(300.0, 200.0, 40.0)
            .with_debt_and_cash(0.0, 60.0);

        // 500 + (300 - 60 - 200 + 40)
        assert_eq!(raw.tangible_capital(), Some(580.0));
    }

    #[test]
    fn tangible_capital_is_absent_without_balance_sheet_lines() {
        let raw = RawFundamentals::new(ticker()).with_debt_and_cash(10.0, 5.0);
        assert_eq!(raw.tangible_capital(), None);
    }
}
