//! Daily trend-strength factor.
//!
//! Counts consecutive higher-lows (long streak) and consecutive lower-highs
//! (short streak) across a fixed window of daily bars. The state is
//! recomputed from scratch every day and never carried over.

use super::ohlcv::OhlcvBar;

pub const DEFAULT_TREND_WINDOW: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrendState {
    pub long_streak: u32,
    pub short_streak: u32,
}

impl TrendState {
    pub fn is_long_candidate(&self, min_strength: u32) -> bool {
        self.long_streak >= min_strength
    }

    pub fn is_short_candidate(&self, min_strength: u32) -> bool {
        self.short_streak >= min_strength
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendStrength {
    pub window_length: usize,
}

impl Default for TrendStrength {
    fn default() -> Self {
        TrendStrength {
            window_length: DEFAULT_TREND_WINDOW,
        }
    }
}

impl TrendStrength {
    pub fn new(window_length: usize) -> Self {
        TrendStrength { window_length }
    }

    /// Compute both streaks over the trailing `window_length` values of each
    /// series, oldest to newest. NaN inputs are read as 0.
    pub fn compute(&self, lows: &[f64], highs: &[f64]) -> TrendState {
        TrendState {
            long_streak: streak(trailing(lows, self.window_length), |cur, prev| cur >= prev),
            short_streak: streak(trailing(highs, self.window_length), |cur, prev| cur <= prev),
        }
    }

    pub fn compute_bars(&self, bars: &[OhlcvBar]) -> TrendState {
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        self.compute(&lows, &highs)
    }
}

fn trailing(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

fn streak(values: &[f64], holds: impl Fn(f64, f64) -> bool) -> u32 {
    let coerce = |v: f64| if v.is_nan() { 0.0 } else { v };
    values.windows(2).fold(0, |count, pair| {
        if holds(coerce(pair[1]), coerce(pair[0])) {
            count + 1
        } else {
            0
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn increasing(n: usize) -> Vec<f64> {
        (0..n).map(|i| 10.0 + i as f64 * 0.1).collect()
    }

    #[test]
    fn strictly_increasing_lows_full_streak() {
        let lows = increasing(15);
        let highs = increasing(15);
        let state = TrendStrength::default().compute(&lows, &highs);
        assert_eq!(state.long_streak, 14);
        assert_eq!(state.short_streak, 0);
    }

    #[test]
    fn strictly_decreasing_highs_full_streak() {
        let mut highs = increasing(15);
        highs.reverse();
        let mut lows = increasing(15);
        lows.reverse();
        let state = TrendStrength::default().compute(&lows, &highs);
        assert_eq!(state.short_streak, 14);
        assert_eq!(state.long_streak, 0);
    }

    #[test]
    fn equal_values_extend_both_streaks() {
        let flat = vec![10.0; 5];
        let state = TrendStrength::new(5).compute(&flat, &flat);
        assert_eq!(state.long_streak, 4);
        assert_eq!(state.short_streak, 4);
    }

    #[test]
    fn single_decrease_resets_long_streak() {
        // rises 4 times, drops, rises twice
        let lows = vec![1.0, 2.0, 3.0, 4.0, 5.0, 4.5, 4.6, 4.7];
        let state = TrendStrength::new(8).compute(&lows, &lows);
        assert_eq!(state.long_streak, 2);
    }

    #[test]
    fn decrease_on_last_bar_leaves_zero() {
        let lows = vec![1.0, 2.0, 3.0, 2.5];
        let state = TrendStrength::new(4).compute(&lows, &lows);
        assert_eq!(state.long_streak, 0);
        assert_eq!(state.short_streak, 1);
    }

    #[test]
    fn only_trailing_window_counts() {
        // An old drop outside the window does not matter.
        let mut lows = vec![5.0, 1.0];
        lows.extend(increasing(15));
        let state = TrendStrength::default().compute(&lows, &lows);
        assert_eq!(state.long_streak, 14);
    }

    #[test]
    fn nan_breaks_streak_without_propagating() {
        let lows = vec![10.0, 10.1, f64::NAN, 10.2, 10.3];
        let state = TrendStrength::new(5).compute(&lows, &lows);
        // NaN reads as 0: 10.1 -> 0 breaks, 0 -> 10.2 extends, 10.2 -> 10.3 extends
        assert_eq!(state.long_streak, 2);
    }

    #[test]
    fn short_inputs_yield_zero() {
        let state = TrendStrength::default().compute(&[10.0], &[]);
        assert_eq!(state, TrendState::default());
    }

    #[test]
    fn candidate_threshold() {
        let state = TrendState {
            long_streak: 2,
            short_streak: 1,
        };
        assert!(state.is_long_candidate(2));
        assert!(!state.is_short_candidate(2));
    }

    proptest! {
        #[test]
        fn increasing_sequence_streak_is_len_minus_one(n in 2usize..40, start in 1.0..100.0_f64) {
            let lows: Vec<f64> = (0..n).map(|i| start + i as f64).collect();
            let state = TrendStrength::new(n).compute(&lows, &lows);
            prop_assert_eq!(state.long_streak as usize, n - 1);
            prop_assert_eq!(state.short_streak, 0);
        }

        #[test]
        fn streak_never_exceeds_window(values in proptest::collection::vec(1.0..50.0_f64, 0..40)) {
            let state = TrendStrength::default().compute(&values, &values);
            prop_assert!((state.long_streak as usize) < DEFAULT_TREND_WINDOW);
            prop_assert!((state.short_streak as usize) < DEFAULT_TREND_WINDOW);
        }
    }
}
