//! In-memory history with a movable clock.
//!
//! Serves loaded bars as if the current time were the cursor: minute bars
//! at or before the cursor are visible, daily bars only for dates strictly
//! before the cursor's date (today's daily bar is not complete yet).

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveDateTime;

use crate::domain::error::LevelsError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::price_window::Frequency;
use crate::domain::security::Security;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, Default)]
pub struct ReplayHistory {
    series: HashMap<(Security, Frequency), Vec<OhlcvBar>>,
    cursor: Option<NaiveDateTime>,
    halted: HashSet<Security>,
}

impl ReplayHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, security: Security, frequency: Frequency, mut bars: Vec<OhlcvBar>) {
        bars.sort_by_key(|b| b.timestamp);
        self.series.insert((security, frequency), bars);
    }

    pub fn with_bars(mut self, security: Security, frequency: Frequency, bars: Vec<OhlcvBar>) -> Self {
        self.insert(security, frequency, bars);
        self
    }

    /// Move the clock; `None` exposes every bar.
    pub fn set_cursor(&mut self, cursor: Option<NaiveDateTime>) {
        self.cursor = cursor;
    }

    /// Mark a security as not tradable.
    pub fn halt(&mut self, security: Security) {
        self.halted.insert(security);
    }

    /// Every distinct timestamp at `frequency` across all securities, sorted.
    pub fn timeline(&self, frequency: Frequency) -> Vec<NaiveDateTime> {
        let unique: BTreeSet<NaiveDateTime> = self
            .series
            .iter()
            .filter(|((_, f), _)| *f == frequency)
            .flat_map(|(_, bars)| bars.iter().map(|b| b.timestamp))
            .collect();
        unique.into_iter().collect()
    }

    fn visible<'a>(&self, bars: &'a [OhlcvBar], frequency: Frequency) -> &'a [OhlcvBar] {
        let Some(cursor) = self.cursor else {
            return bars;
        };
        let end = match frequency {
            Frequency::Minute => bars.partition_point(|b| b.timestamp <= cursor),
            Frequency::Daily => bars.partition_point(|b| b.date() < cursor.date()),
        };
        &bars[..end]
    }
}

impl DataPort for ReplayHistory {
    fn bars(
        &self,
        security: &Security,
        count: usize,
        frequency: Frequency,
    ) -> Result<Vec<OhlcvBar>, LevelsError> {
        let bars = self
            .series
            .get(&(security.clone(), frequency))
            .ok_or_else(|| LevelsError::NoData {
                code: security.symbol.clone(),
            })?;
        let visible = self.visible(bars, frequency);
        let start = visible.len().saturating_sub(count);
        Ok(visible[start..].to_vec())
    }

    fn can_trade(&self, security: &Security) -> bool {
        if self.halted.contains(security) {
            return false;
        }
        self.series
            .get(&(security.clone(), Frequency::Minute))
            .is_some_and(|bars| !self.visible(bars, Frequency::Minute).is_empty())
    }
}
