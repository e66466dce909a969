//! Portfolio domain models.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dividends::{DividendPoint, DividendTtm};
use crate::errors::{Result, ValidationError};
use crate::utils::{round_dps, round_money};

/// A stored holding.
///
/// Rows written by older versions may lack an id; it is assigned the next
/// time the portfolio is listed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub isin: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub shares: Decimal,
    #[serde(default)]
    pub avg_price: Decimal,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub div_paid_total: Decimal,
}

impl Position {
    /// Enforce the position invariant: positive shares and average price,
    /// and at least one of ticker, ISIN or name.
    pub fn validate(&self) -> Result<()> {
        if self.shares <= Decimal::ZERO {
            return Err(ValidationError::InvalidInput("shares must be greater than 0".to_string()).into());
        }
        if self.avg_price <= Decimal::ZERO {
            return Err(
                ValidationError::InvalidInput("avgPrice must be greater than 0".to_string()).into(),
            );
        }
        if self.ticker.is_empty() && self.isin.is_empty() && self.name.is_empty() {
            return Err(ValidationError::MissingField("ticker|isin|name".to_string()).into());
        }
        Ok(())
    }
}

fn clean(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn clean_ticker(value: Option<String>) -> String {
    clean(value).to_uppercase()
}

/// Input model for adding a position
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPosition {
    pub name: Option<String>,
    pub isin: Option<String>,
    pub ticker: Option<String>,
    pub shares: Option<Decimal>,
    pub avg_price: Option<Decimal>,
    pub note: Option<String>,
    pub div_paid_total: Option<Decimal>,
}

impl NewPosition {
    /// Normalise, validate and assign a fresh id.
    pub fn into_position(self) -> Result<Position> {
        let position = Position {
            id: Uuid::new_v4().to_string(),
            name: clean(self.name),
            isin: clean(self.isin),
            ticker: clean_ticker(self.ticker),
            shares: self.shares.unwrap_or_default(),
            avg_price: self.avg_price.unwrap_or_default(),
            note: clean(self.note),
            div_paid_total: self.div_paid_total.unwrap_or_default(),
        };
        position.validate()?;
        Ok(position)
    }
}

/// Partial update; absent fields keep their stored value and unknown
/// fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionPatch {
    pub name: Option<String>,
    pub isin: Option<String>,
    pub ticker: Option<String>,
    pub shares: Option<Decimal>,
    pub avg_price: Option<Decimal>,
    pub note: Option<String>,
    pub div_paid_total: Option<Decimal>,
}

impl PositionPatch {
    /// Merge onto `current` and validate the result.
    pub fn apply(self, current: &Position) -> Result<Position> {
        let mut merged = current.clone();
        if self.name.is_some() {
            merged.name = clean(self.name);
        }
        if self.isin.is_some() {
            merged.isin = clean(self.isin);
        }
        if self.ticker.is_some() {
            merged.ticker = clean_ticker(self.ticker);
        }
        if let Some(shares) = self.shares {
            merged.shares = shares;
        }
        if let Some(avg_price) = self.avg_price {
            merged.avg_price = avg_price;
        }
        if self.note.is_some() {
            merged.note = clean(self.note);
        }
        if let Some(div_paid_total) = self.div_paid_total {
            merged.div_paid_total = div_paid_total;
        }
        merged.validate()?;
        Ok(merged)
    }
}

/// Position plus market value, gains and dividend income.
///
/// Fields that depend on an unknown price are `None`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedPosition {
    #[serde(flatten)]
    pub position: Position,
    pub current_price: Option<Decimal>,
    pub cost_basis: Option<Decimal>,
    pub position_value: Option<Decimal>,
    pub gain_abs: Option<Decimal>,
    pub gain_pct: Option<Decimal>,
    #[serde(rename = "dividendPerShareTTM")]
    pub dividend_per_share_ttm: Option<Decimal>,
    pub dividend_income_annual: Option<Decimal>,
    pub yoc_pct: Option<Decimal>,
    pub current_yield_pct: Option<Decimal>,
    pub dividend_samples: usize,
    pub dividend_history: Vec<DividendPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn pct(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator > Decimal::ZERO {
        Some(round_money(numerator / denominator * Decimal::ONE_HUNDRED))
    } else {
        None
    }
}

impl EnrichedPosition {
    /// A row whose ticker could not be determined.
    pub fn unresolved(position: Position) -> Self {
        Self {
            position,
            current_price: None,
            cost_basis: None,
            position_value: None,
            gain_abs: None,
            gain_pct: None,
            dividend_per_share_ttm: None,
            dividend_income_annual: None,
            yoc_pct: None,
            current_yield_pct: None,
            dividend_samples: 0,
            dividend_history: Vec::new(),
            error: Some("Ticker could not be resolved".to_string()),
        }
    }

    pub fn compute(
        mut position: Position,
        ticker: String,
        price: Option<Decimal>,
        dividends: DividendTtm,
    ) -> Self {
        position.ticker = ticker.to_uppercase();
        let shares = position.shares;
        let avg_price = position.avg_price;

        let cost_basis = round_money(avg_price * shares);
        let position_value = price.map(|p| round_money(p * shares));
        let gain_abs = position_value.map(|v| round_money(v - cost_basis));
        let gain_pct = position_value.and_then(|v| pct(v - cost_basis, cost_basis));

        let dps = round_dps(dividends.dps_ttm);
        let has_dps = dps > Decimal::ZERO;

        Self {
            current_price: price,
            cost_basis: Some(cost_basis),
            position_value,
            gain_abs,
            gain_pct,
            dividend_per_share_ttm: Some(dps),
            dividend_income_annual: Some(round_money(dps * shares)),
            yoc_pct: if has_dps { pct(dps, avg_price) } else { None },
            current_yield_pct: if has_dps {
                price.and_then(|p| pct(dps, p))
            } else {
                None
            },
            dividend_samples: dividends.samples,
            dividend_history: dividends.history,
            error: None,
            position,
        }
    }
}

/// Portfolio-wide sums over the enriched rows.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub portfolio_value: Decimal,
    pub cost_basis: Decimal,
    pub income_annual: Decimal,
    pub gain_abs: Decimal,
    /// `None` when the cost basis is zero.
    pub gain_pct: Option<Decimal>,
}

impl PortfolioTotals {
    pub fn from_positions(rows: &[EnrichedPosition]) -> Self {
        let sum = |f: fn(&EnrichedPosition) -> Option<Decimal>| -> Decimal {
            round_money(rows.iter().filter_map(f).sum())
        };
        let portfolio_value = sum(|r| r.position_value);
        let cost_basis = sum(|r| r.cost_basis);
        let income_annual = sum(|r| r.dividend_income_annual);

        Self {
            portfolio_value,
            cost_basis,
            income_annual,
            gain_abs: round_money(portfolio_value - cost_basis),
            gain_pct: pct(portfolio_value - cost_basis, cost_basis),
        }
    }
}

/// Response shape of the portfolio listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioView {
    pub portfolio: Vec<EnrichedPosition>,
    pub totals: PortfolioTotals,
}

/// Non-empty stored tickers, upper-cased, in portfolio order.
pub fn portfolio_tickers(positions: &[Position]) -> Vec<String> {
    positions
        .iter()
        .map(|p| p.ticker.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}
