use anyhow::{Context, Result};
use chrono::DateTime;
use csv::{Reader, Writer};
use std::fs::File;
use std::path::Path;
use tick_filter_core::{Bar, OhlcvSeries, ScoredSeries};

const OHLCV_HEADER: [&str; 7] = ["timestamp", "symbol", "open", "high", "low", "close", "volume"];

pub struct CsvStorage;

/// Missing values are written as empty cells.
fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

fn parse_value(raw: &str, column: &str, line: usize) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>()
        .with_context(|| format!("Invalid {column} value '{raw}' on line {line}"))
}

fn bar_fields(symbol: &str, bar: &Bar) -> Vec<String> {
    vec![
        bar.timestamp.to_rfc3339(),
        symbol.to_string(),
        format_value(bar.open),
        format_value(bar.high),
        format_value(bar.low),
        format_value(bar.close),
        format_value(bar.volume),
    ]
}

impl CsvStorage {
    /// Writes a series to CSV.
    ///
    /// Format: timestamp,symbol,open,high,low,close,volume with RFC 3339
    /// timestamps that keep the native UTC offset.
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_ohlcv(path: impl AsRef<Path>, series: &OhlcvSeries) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        let mut writer = Writer::from_writer(file);

        writer.write_record(OHLCV_HEADER)?;
        for bar in series.bars() {
            writer.write_record(bar_fields(series.symbol(), bar))?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Writes a scored series with its detector annotations.
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_scored(path: impl AsRef<Path>, series: &ScoredSeries) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        let mut writer = Writer::from_writer(file);

        let mut header: Vec<&str> = OHLCV_HEADER.to_vec();
        header.extend(["price_change", "z_score", "error_flag"]);
        writer.write_record(&header)?;

        for row in series.rows() {
            let mut fields = bar_fields(series.symbol(), &row.bar);
            fields.push(format_value(row.price_change));
            fields.push(format_value(row.z_score));
            fields.push(u8::from(row.error_flag).to_string());
            writer.write_record(&fields)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Reads a series written by `write_ohlcv`. Rows are sorted by timestamp;
    /// empty cells read back as missing values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The CSV file cannot be opened
    /// - A row has too few columns
    /// - Timestamp or number parsing fails
    /// - The file holds no rows or repeats a timestamp
    pub fn read_ohlcv(path: impl AsRef<Path>) -> Result<OhlcvSeries> {
        let path = path.as_ref();
        let mut reader = Reader::from_path(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        let mut symbol: Option<String> = None;
        let mut bars = Vec::new();

        for (i, result) in reader.records().enumerate() {
            let line = i + 2;
            let record = result.with_context(|| format!("Failed to read CSV line {line}"))?;
            if record.len() < OHLCV_HEADER.len() {
                anyhow::bail!(
                    "Line {line} has {} columns, expected {}",
                    record.len(),
                    OHLCV_HEADER.len()
                );
            }

            let timestamp = DateTime::parse_from_rfc3339(record[0].trim())
                .with_context(|| format!("Invalid timestamp '{}' on line {line}", &record[0]))?;
            if symbol.is_none() {
                symbol = Some(record[1].to_string());
            }

            bars.push(Bar::new(
                timestamp,
                parse_value(&record[2], "open", line)?,
                parse_value(&record[3], "high", line)?,
                parse_value(&record[4], "low", line)?,
                parse_value(&record[5], "close", line)?,
                parse_value(&record[6], "volume", line)?,
            ));
        }

        let Some(symbol) = symbol else {
            anyhow::bail!("CSV file is empty: {}", path.display());
        };

        bars.sort_by_key(|b| b.timestamp);
        let series = OhlcvSeries::new(symbol, bars)
            .with_context(|| format!("CSV file {} repeats a timestamp", path.display()))?;

        tracing::debug!("Read {} bars from {}", series.len(), path.display());
        Ok(series)
    }
}
