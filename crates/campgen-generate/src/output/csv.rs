use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use campgen_core::{Dataset, Row};

use crate::model::TableReport;

/// CSV file name of an entity table inside a run directory.
pub fn table_file_name(table: &str) -> String {
    format!("{table}.csv")
}

pub fn table_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(table_file_name(table))
}

/// Write rows as CSV with a header row and `R::COLUMNS` ordering.
pub fn write_table_csv<R: Row>(path: &Path, rows: &[R]) -> Result<u64, csv::Error> {
    let writer = BufWriter::new(File::create(path).map_err(csv::Error::from)?);
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    writer.write_record(R::COLUMNS)?;
    for row in rows {
        writer.write_record(row.values())?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

/// Write every entity table of `dataset` into `dir`, in foreign-key order.
pub fn write_dataset_csv(dir: &Path, dataset: &Dataset) -> Result<Vec<TableReport>, csv::Error> {
    fn write<R: Row>(dir: &Path, rows: &[R]) -> Result<TableReport, csv::Error> {
        let bytes = write_table_csv(&table_path(dir, R::TABLE), rows)?;
        Ok(TableReport {
            table: R::TABLE.to_string(),
            rows: rows.len() as u64,
            bytes,
        })
    }

    Ok(vec![
        write(dir, &dataset.metrics)?,
        write(dir, &dataset.wt_attributes)?,
        write(dir, &dataset.constants)?,
        write(dir, &dataset.predicates)?,
        write(dir, &dataset.campaigns)?,
        write(dir, &dataset.conjuncts)?,
        write(dir, &dataset.conjunct_predicates)?,
    ])
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
