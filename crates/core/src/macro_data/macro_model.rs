//! Macro domain models and derivations.

use std::fmt::Write;

use chrono::NaiveDate;
use finmate_market_data::{DataPoint, FearGreed, FredObservation};
use serde::{Deserialize, Serialize};

use crate::utils::{pct_change, round_f64};

/// Observations needed for a year-over-year comparison of a monthly series.
const YOY_MIN_POINTS: usize = 13;

/// Latest 2-year and 10-year yields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Treasury {
    /// The later of the two observation dates.
    pub date: NaiveDate,
    pub y2: f64,
    pub y10: f64,
    /// `y10 - y2`, negative when the curve is inverted.
    pub spread: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cpi {
    /// e.g. "2024-April"
    pub period: String,
    pub cpi_index: f64,
    pub yoy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneySupply {
    pub date: NaiveDate,
    pub m2: f64,
    pub yoy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VixSource {
    PolygonIndex,
    PolygonStocks,
    Yahoo,
    None,
}

impl VixSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            VixSource::PolygonIndex => "polygon_index",
            VixSource::PolygonStocks => "polygon_stocks",
            VixSource::Yahoo => "yahoo",
            VixSource::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vix {
    pub value: Option<f64>,
    /// Unix milliseconds.
    pub ts: Option<i64>,
    pub source: VixSource,
}

impl Vix {
    pub fn unavailable() -> Self {
        Self {
            value: None,
            ts: None,
            source: VixSource::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroSnapshot {
    pub summary: String,
    pub treasury: Option<Treasury>,
    pub cpi: Option<Cpi>,
    pub m2: Option<MoneySupply>,
    pub vix: Vix,
    pub fear_greed: Option<FearGreed>,
}

pub fn treasury_from(y2: FredObservation, y10: FredObservation) -> Treasury {
    Treasury {
        date: y2.date.max(y10.date),
        y2: y2.value,
        y10: y10.value,
        spread: round_f64(y10.value - y2.value, 2),
    }
}

/// CPI year-over-year from BLS data ordered newest first.
pub fn cpi_yoy(points: &[DataPoint]) -> Option<Cpi> {
    if points.len() < YOY_MIN_POINTS {
        return None;
    }
    let latest = &points[0];
    let year_ago = &points[12];
    let yoy = pct_change(latest.value, year_ago.value)?;
    Some(Cpi {
        period: format!("{}-{}", latest.year, latest.period_name),
        cpi_index: latest.value,
        yoy,
    })
}

/// M2 year-over-year from FRED observations ordered oldest first.
pub fn m2_yoy(observations: &[FredObservation]) -> Option<MoneySupply> {
    if observations.len() < YOY_MIN_POINTS {
        return None;
    }
    let latest = observations[observations.len() - 1];
    let year_ago = observations[observations.len() - YOY_MIN_POINTS];
    let yoy = pct_change(latest.value, year_ago.value)?;
    Some(MoneySupply {
        date: latest.date,
        m2: latest.value,
        yoy,
    })
}

/// One line per available fact, under a heading.
pub fn summary_text(
    treasury: Option<&Treasury>,
    cpi: Option<&Cpi>,
    m2: Option<&MoneySupply>,
    vix: &Vix,
    fear_greed: Option<&FearGreed>,
) -> String {
    let mut text = String::from("Macro overview:");

    if let Some(t) = treasury {
        let curve = if t.spread < 0.0 {
            "Inverted yield curve"
        } else {
            "Normal curve"
        };
        let _ = write!(
            text,
            "\n- 10Y: {}%, 2Y: {}%, Spread: {}% -> {}",
            t.y10, t.y2, t.spread, curve
        );
    }
    if let Some(c) = cpi {
        let _ = write!(text, "\n- CPI YoY: {}% ({})", c.yoy, c.period);
    }
    if let Some(m) = m2 {
        let _ = write!(text, "\n- M2 YoY: {}% (through {})", m.yoy, m.date);
    }
    if let Some(value) = vix.value {
        let _ = write!(text, "\n- VIX: {} ({})", value, vix.source.as_str());
    }
    if let Some(fg) = fear_greed {
        match &fg.label {
            Some(label) => {
                let _ = write!(text, "\n- Fear & Greed: {} ({})", fg.value, label);
            }
            None => {
                let _ = write!(text, "\n- Fear & Greed: {}", fg.value);
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(y: i32, m: u32, d: u32, value: f64) -> FredObservation {
        FredObservation {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            value,
        }
    }

    fn cpi_point(month: &str, value: f64) -> DataPoint {
        DataPoint {
            year: "2024".to_string(),
            period: "M00".to_string(),
            period_name: month.to_string(),
            value,
        }
    }

    #[test]
    fn test_treasury_uses_later_date_and_spread() {
        let t = treasury_from(obs(2024, 5, 30, 4.87), obs(2024, 5, 31, 4.51));
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
        assert_eq!(t.spread, -0.36);
    }

    #[test]
    fn test_cpi_yoy_compares_with_thirteenth_point() {
        let mut points = vec![cpi_point("April", 313.5)];
        points.extend((0..11).map(|_| cpi_point("x", 310.0)));
        points.push(cpi_point("April", 303.4));

        let cpi = cpi_yoy(&points).unwrap();
        assert_eq!(cpi.period, "2024-April");
        assert_eq!(cpi.yoy, 3.33);
    }

    #[test]
    fn test_cpi_needs_thirteen_points() {
        let points: Vec<_> = (0..12).map(|_| cpi_point("x", 300.0)).collect();
        assert!(cpi_yoy(&points).is_none());
    }

    #[test]
    fn test_m2_yoy_uses_ascending_order() {
        let mut series: Vec<_> = (1..=12).map(|m| obs(2023, m, 1, 20000.0)).collect();
        series.extend((1..=4).map(|m| obs(2024, m, 1, 21000.0)));

        let m2 = m2_yoy(&series).unwrap();
        assert_eq!(m2.date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        // 2024-04 against 2023-04
        assert_eq!(m2.yoy, 5.0);
    }

    #[test]
    fn test_summary_lists_only_present_parts() {
        let cpi = Cpi {
            period: "2024-April".to_string(),
            cpi_index: 313.5,
            yoy: 3.36,
        };
        let text = summary_text(None, Some(&cpi), None, &Vix::unavailable(), None);
        assert_eq!(text, "Macro overview:\n- CPI YoY: 3.36% (2024-April)");
    }

    #[test]
    fn test_summary_flags_inverted_curve() {
        let t = treasury_from(obs(2024, 5, 31, 4.87), obs(2024, 5, 31, 4.51));
        let vix = Vix {
            value: Some(13.2),
            ts: None,
            source: VixSource::Yahoo,
        };
        let fg = FearGreed {
            value: 62.0,
            label: Some("Greed".to_string()),
        };
        let text = summary_text(Some(&t), None, None, &vix, Some(&fg));
        assert!(text.contains("Spread: -0.36% -> Inverted yield curve"));
        assert!(text.contains("- VIX: 13.2 (yahoo)"));
        assert!(text.contains("- Fear & Greed: 62 (Greed)"));
    }
}
