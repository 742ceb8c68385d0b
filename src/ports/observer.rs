//! Observer port for network training
//!
//! Lets progress display and error logging follow the trainer without the
//! trainer knowing about terminals or files.

use crate::{Result, nn::TrainingReport};

/// Observer trait for monitoring epoch-based training.
///
/// # Event Sequence
///
/// 1. `on_training_start(max_epochs)` - once
/// 2. `on_epoch_end(epoch, error)` - after every epoch, 1-based
/// 3. `on_training_end(report)` - once
pub trait EpochObserver {
    fn on_training_start(&mut self, _max_epochs: usize) -> Result<()> {
        Ok(())
    }

    fn on_epoch_end(&mut self, _epoch: usize, _error: f64) -> Result<()> {
        Ok(())
    }

    fn on_training_end(&mut self, _report: &TrainingReport) -> Result<()> {
        Ok(())
    }
}
