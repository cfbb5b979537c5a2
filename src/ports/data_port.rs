//! Market data access port.

use crate::domain::error::LevelsError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::price_window::{Frequency, PriceField, PriceWindow};
use crate::domain::security::Security;

pub trait DataPort {
    /// The trailing `count` bars at `frequency`, oldest first. May return
    /// fewer bars when history is short.
    fn bars(
        &self,
        security: &Security,
        count: usize,
        frequency: Frequency,
    ) -> Result<Vec<OhlcvBar>, LevelsError>;

    /// Rolling history of one price field, most recent last.
    fn history(
        &self,
        security: &Security,
        field: PriceField,
        count: usize,
        frequency: Frequency,
    ) -> Result<PriceWindow, LevelsError> {
        let bars = self.bars(security, count, frequency)?;
        Ok(PriceWindow::from_bars(&bars, field, frequency, count))
    }

    /// Whether the security can be traded at the current time.
    fn can_trade(&self, _security: &Security) -> bool {
        true
    }
}
