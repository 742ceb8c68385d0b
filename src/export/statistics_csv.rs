//! CSV export of windowed agent statistics
//!
//! One row per completed [`StatisticsWindow`], with a header row naming the
//! columns. Rows can be appended as windows complete during a run.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{Result, agent::StatisticsWindow};

/// Streams [`StatisticsWindow`] rows to a CSV sink.
pub struct StatisticsCsvWriter<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl StatisticsCsvWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| crate::Error::Io {
            operation: format!("create statistics file {}", path.display()),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> StatisticsCsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
            rows: 0,
        }
    }

    pub fn write(&mut self, window: &StatisticsWindow) -> Result<()> {
        self.writer.serialize(window)?;
        self.rows += 1;
        Ok(())
    }

    pub fn write_all<'a, I>(&mut self, windows: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a StatisticsWindow>,
    {
        for window in windows {
            self.write(window)?;
        }
        Ok(())
    }

    /// Rows written so far, excluding the header.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::Error::from(e.into_error()))
    }
}
