//! Training observers: terminal progress and per-epoch error logs

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::{Result, nn::TrainingReport, ports::EpochObserver};

/// Progress bar observer - shows epochs and the current error
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self { progress_bar: None }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl EpochObserver for ProgressObserver {
    fn on_training_start(&mut self, max_epochs: usize) -> Result<()> {
        let pb = ProgressBar::new(max_epochs as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} epochs (error {msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_epoch_end(&mut self, epoch: usize, error: f64) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(epoch as u64);
            if epoch % 50 == 0 {
                pb.set_message(format!("{error:.5}"));
            }
        }
        Ok(())
    }

    fn on_training_end(&mut self, report: &TrainingReport) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(format!("{:.5}", report.final_error));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct ErrorRow {
    epoch: usize,
    error: f64,
}

/// Writes one `epoch,error` CSV row per epoch.
pub struct ErrorLogObserver<W: Write> {
    writer: csv::Writer<W>,
}

impl ErrorLogObserver<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref()).map_err(|source| crate::Error::Io {
            operation: format!("create error log {}", path.as_ref().display()),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ErrorLogObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::Error::from(e.into_error()))
    }
}

impl<W: Write> EpochObserver for ErrorLogObserver<W> {
    fn on_epoch_end(&mut self, epoch: usize, error: f64) -> Result<()> {
        self.writer.serialize(ErrorRow { epoch, error })?;
        Ok(())
    }

    fn on_training_end(&mut self, _report: &TrainingReport) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
