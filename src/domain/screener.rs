//! Daily security screen.
//!
//! From each security's trailing daily bars computes the screening columns
//! (average volume, average close, average high-low range) together with
//! the trend streaks, keeps the securities that pass the liquidity and
//! price filters, and splits them into long and short candidates.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::domain::error::LevelsError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::price_window::Frequency;
use crate::domain::security::Security;
use crate::domain::trend::{TrendState, TrendStrength};
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenerSettings {
    /// Bars averaged for volume, close and range.
    pub average_window: usize,
    pub trend_window: usize,
    /// Minimum streak for a side to qualify.
    pub daily_trend_strength: u32,
    pub minimum_daily_volume: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub minimum_atr: f64,
}

impl Default for ScreenerSettings {
    fn default() -> Self {
        ScreenerSettings {
            average_window: 10,
            trend_window: 15,
            daily_trend_strength: 2,
            minimum_daily_volume: 1_000_000.0,
            min_price: 5.0,
            max_price: 50.0,
            minimum_atr: 0.5,
        }
    }
}

impl ScreenerSettings {
    pub fn required_bars(&self) -> usize {
        self.average_window.max(self.trend_window)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenerRow {
    pub security: Security,
    pub average_volume: f64,
    pub sma_close: f64,
    /// mean(high) - mean(low) over the average window.
    pub average_range: f64,
    pub trend: TrendState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    InsufficientBars { bars: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSecurity {
    pub security: Security,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenerOutput {
    /// Rows that passed the screen.
    pub rows: Vec<ScreenerRow>,
    /// Securities with enough data that failed a filter.
    pub rejected: Vec<Security>,
    pub skipped: Vec<SkippedSecurity>,
}

impl ScreenerOutput {
    pub fn long_candidates(&self, min_strength: u32) -> BTreeSet<Security> {
        self.rows
            .iter()
            .filter(|r| r.trend.is_long_candidate(min_strength))
            .map(|r| r.security.clone())
            .collect()
    }

    pub fn short_candidates(&self, min_strength: u32) -> BTreeSet<Security> {
        self.rows
            .iter()
            .filter(|r| r.trend.is_short_candidate(min_strength))
            .map(|r| r.security.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Screener {
    pub settings: ScreenerSettings,
}

impl Screener {
    pub fn new(settings: ScreenerSettings) -> Self {
        Screener { settings }
    }

    /// Screening columns for one security; `None` if there are too few bars.
    pub fn compute_row(&self, security: &Security, bars: &[OhlcvBar]) -> Option<ScreenerRow> {
        let s = &self.settings;
        if bars.len() < s.required_bars() || s.average_window == 0 {
            return None;
        }

        let recent = &bars[bars.len() - s.average_window..];
        let n = recent.len() as f64;
        let average_volume = recent.iter().map(|b| b.volume).sum::<f64>() / n;
        let sma_close = recent.iter().map(|b| b.close).sum::<f64>() / n;
        let average_range = recent.iter().map(OhlcvBar::range).sum::<f64>() / n;

        let trend = TrendStrength::new(s.trend_window).compute_bars(bars);

        Some(ScreenerRow {
            security: security.clone(),
            average_volume,
            sma_close,
            average_range,
            trend,
        })
    }

    pub fn passes(&self, row: &ScreenerRow) -> bool {
        let s = &self.settings;
        row.average_volume > s.minimum_daily_volume
            && row.sma_close >= s.min_price
            && row.sma_close <= s.max_price
            && row.average_range >= s.minimum_atr
    }

    /// Screen every security using daily bars from the data port.
    ///
    /// Securities the port cannot serve are skipped with a warning; only a
    /// completely empty result is an error.
    pub fn run(
        &self,
        data_port: &dyn DataPort,
        securities: &[Security],
    ) -> Result<ScreenerOutput, LevelsError> {
        let required = self.settings.required_bars();
        let mut output = ScreenerOutput::default();

        for security in securities {
            let bars = match data_port.bars(security, required, Frequency::Daily) {
                Ok(bars) if !bars.is_empty() => bars,
                Ok(_) => {
                    warn!(symbol = %security, "skipping: no daily data");
                    output.skipped.push(SkippedSecurity {
                        security: security.clone(),
                        reason: SkipReason::NoData,
                    });
                    continue;
                }
                Err(e) => {
                    warn!(symbol = %security, error = %e, "skipping: daily history unavailable");
                    output.skipped.push(SkippedSecurity {
                        security: security.clone(),
                        reason: SkipReason::NoData,
                    });
                    continue;
                }
            };

            let Some(row) = self.compute_row(security, &bars) else {
                warn!(
                    symbol = %security,
                    bars = bars.len(),
                    required,
                    "skipping: insufficient daily bars"
                );
                output.skipped.push(SkippedSecurity {
                    security: security.clone(),
                    reason: SkipReason::InsufficientBars { bars: bars.len() },
                });
                continue;
            };

            if self.passes(&row) {
                debug!(
                    symbol = %security,
                    long = row.trend.long_streak,
                    short = row.trend.short_streak,
                    "passed screen"
                );
                output.rows.push(row);
            } else {
                output.rejected.push(security.clone());
            }
        }

        if output.rows.is_empty() && output.rejected.is_empty() {
            return Err(LevelsError::InsufficientData {
                code: "all".to_string(),
                bars: 0,
                minimum: required,
            });
        }

        info!(
            passed = output.rows.len(),
            rejected = output.rejected.len(),
            skipped = output.skipped.len(),
            "screen complete"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars(count: usize, close: f64, range: f64, volume: f64, step: f64) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..count)
            .map(|i| {
                let mid = close + i as f64 * step;
                OhlcvBar {
                    code: "TEST".into(),
                    timestamp: start + chrono::Duration::days(i as i64),
                    open: mid,
                    high: mid + range / 2.0,
                    low: mid - range / 2.0,
                    close: mid,
                    volume,
                }
            })
            .collect()
    }

    fn sec() -> Security {
        Security::new(1, "TEST")
    }

    #[test]
    fn compute_row_columns() {
        let screener = Screener::default();
        let row = screener
            .compute_row(&sec(), &bars(15, 20.0, 1.0, 2_000_000.0, 0.0))
            .unwrap();
        assert!((row.average_volume - 2_000_000.0).abs() < 1e-6);
        assert!((row.sma_close - 20.0).abs() < 1e-9);
        assert!((row.average_range - 1.0).abs() < 1e-9);
        // flat bars extend both streaks
        assert_eq!(row.trend.long_streak, 14);
        assert_eq!(row.trend.short_streak, 14);
    }

    #[test]
    fn compute_row_needs_trend_window() {
        let screener = Screener::default();
        assert!(screener.compute_row(&sec(), &bars(14, 20.0, 1.0, 2_000_000.0, 0.0)).is_none());
    }

    #[test]
    fn rising_security_is_long_candidate_only() {
        let screener = Screener::default();
        let row = screener
            .compute_row(&sec(), &bars(15, 20.0, 1.0, 2_000_000.0, 0.1))
            .unwrap();
        assert_eq!(row.trend.long_streak, 14);
        assert_eq!(row.trend.short_streak, 0);
        let output = ScreenerOutput {
            rows: vec![row],
            ..Default::default()
        };
        assert_eq!(output.long_candidates(2).len(), 1);
        assert!(output.short_candidates(2).is_empty());
    }

    #[test]
    fn low_volume_fails() {
        let screener = Screener::default();
        let row = screener
            .compute_row(&sec(), &bars(15, 20.0, 1.0, 1_000_000.0, 0.0))
            .unwrap();
        // must be strictly above the minimum
        assert!(!screener.passes(&row));
    }

    #[test]
    fn price_band_is_inclusive() {
        let screener = Screener::default();
        let at_min = screener.compute_row(&sec(), &bars(15, 5.0, 1.0, 2_000_000.0, 0.0)).unwrap();
        let at_max = screener.compute_row(&sec(), &bars(15, 50.0, 1.0, 2_000_000.0, 0.0)).unwrap();
        let above = screener.compute_row(&sec(), &bars(15, 50.5, 1.0, 2_000_000.0, 0.0)).unwrap();
        assert!(screener.passes(&at_min));
        assert!(screener.passes(&at_max));
        assert!(!screener.passes(&above));
    }

    #[test]
    fn narrow_range_fails() {
        let screener = Screener::default();
        let row = screener.compute_row(&sec(), &bars(15, 20.0, 0.4, 2_000_000.0, 0.0)).unwrap();
        assert!(!screener.passes(&row));
    }

    #[test]
    fn required_bars_is_longest_window() {
        let settings = ScreenerSettings {
            average_window: 20,
            ..Default::default()
        };
        assert_eq!(settings.required_bars(), 20);
        assert_eq!(ScreenerSettings::default().required_bars(), 15);
    }
}
