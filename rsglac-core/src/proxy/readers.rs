//! Readers for proxy temperature tables
//!
//! Three layouts are in common use for the records that drive the glacial index:
//!
//! - CSV exports with a `time,delta_T` header, where `time` counts years from the
//!   present anchor (negative in the past).
//! - PANGAEA tab-delimited files. These open with a `/* ... */` metadata block followed by a
//!   header row containing columns such as `Age [ka BP]` and `TTT [°C]`.
//! - The EPICA Dome C deuterium/temperature text file: a fixed-length free-text
//!   preamble followed by whitespace-separated columns of age (years BP) and
//!   temperature anomaly.
//!
//! [`ProxyTableFormat`] describes such a layout and [`parse_proxy_table`] turns a table
//! into a [`PaleoTemperatureSeries`]. Rows that cannot be parsed are skipped; a table that
//! yields no samples at all is reported as [`GlacError::ProxyUnavailable`].

use super::series::PaleoTemperatureSeries;
use crate::errors::{GlacError, GlacResult};
use crate::timeseries::{FloatValue, Time};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Field separator of a proxy table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    Comma,
    Tab,
    Whitespace,
}

impl Delimiter {
    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Delimiter::Comma => line.split(',').map(clean_field).collect(),
            Delimiter::Tab => line.split('\t').map(clean_field).collect(),
            Delimiter::Whitespace => line.split_whitespace().collect(),
        }
    }
}

fn clean_field(field: &str) -> &str {
    field.trim().trim_matches('"')
}

/// Reference to a column either by position or by header name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Column {
    Index(usize),
    Name(String),
}

impl Column {
    pub fn named(name: &str) -> Self {
        Column::Name(name.to_string())
    }
}

/// How the time column is expressed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgeConvention {
    /// Years relative to the present anchor, negative in the past
    YearsFromPresent,
    /// Age before present, positive in the past, in units of `years_per_unit` years
    /// (1 for years BP, 1000 for ka BP)
    AgeBeforePresent { years_per_unit: FloatValue },
}

impl AgeConvention {
    /// Convert a raw time value to an offset from the present
    pub fn to_offset(&self, raw: FloatValue) -> Time {
        match self {
            AgeConvention::YearsFromPresent => raw,
            AgeConvention::AgeBeforePresent { years_per_unit } => -raw * years_per_unit,
        }
    }
}

/// Layout of a proxy temperature table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyTableFormat {
    pub delimiter: Delimiter,
    /// Number of leading lines to ignore before looking for a header or data
    #[serde(default)]
    pub skip_lines: usize,
    pub time_column: Column,
    pub value_column: Column,
    pub age_convention: AgeConvention,
    /// Optional regular spacing (years) to resample the record to after reading
    #[serde(default)]
    pub resample_step: Option<Time>,
}

impl ProxyTableFormat {
    /// `time,delta_T` CSV with years from present
    pub fn csv() -> Self {
        Self {
            delimiter: Delimiter::Comma,
            skip_lines: 0,
            time_column: Column::named("time"),
            value_column: Column::named("delta_T"),
            age_convention: AgeConvention::YearsFromPresent,
            resample_step: None,
        }
    }

    /// PANGAEA temperature composite (`Age [ka BP]`, `TTT [°C]`)
    pub fn pangaea() -> Self {
        Self {
            delimiter: Delimiter::Tab,
            skip_lines: 0,
            time_column: Column::named("Age [ka BP]"),
            value_column: Column::named("TTT [°C]"),
            age_convention: AgeConvention::AgeBeforePresent {
                years_per_unit: 1000.0,
            },
            resample_step: Some(1.0),
        }
    }

    /// EPICA Dome C `edc3deuttemp2007.txt`
    pub fn epica_dome_c() -> Self {
        Self {
            delimiter: Delimiter::Whitespace,
            skip_lines: 92,
            time_column: Column::Index(2),
            value_column: Column::Index(4),
            age_convention: AgeConvention::AgeBeforePresent {
                years_per_unit: 1.0,
            },
            resample_step: None,
        }
    }

    pub fn with_resample_step(mut self, step: Option<Time>) -> Self {
        self.resample_step = step;
        self
    }
}

fn is_metadata(line: &str, in_block: &mut bool) -> bool {
    let trimmed = line.trim();
    if *in_block {
        if trimmed.contains("*/") {
            *in_block = false;
        }
        return true;
    }
    if trimmed.starts_with("/*") {
        *in_block = !trimmed.contains("*/");
        return true;
    }
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn resolve(column: &Column, header: &[&str]) -> Option<usize> {
    match column {
        Column::Index(i) => Some(*i),
        Column::Name(name) => header.iter().position(|field| field == name),
    }
}

/// Parse a proxy temperature table
pub fn parse_proxy_table(
    text: &str,
    format: &ProxyTableFormat,
) -> GlacResult<PaleoTemperatureSeries> {
    let mut in_block = false;
    let mut lines = text
        .lines()
        .skip(format.skip_lines)
        .filter(|line| !is_metadata(line, &mut in_block));

    let (time_index, value_index) = match (&format.time_column, &format.value_column) {
        (Column::Index(t), Column::Index(v)) => (*t, *v),
        _ => {
            let mut found = None;
            for line in lines.by_ref() {
                let header = format.delimiter.split(line);
                if let (Some(t), Some(v)) = (
                    resolve(&format.time_column, &header),
                    resolve(&format.value_column, &header),
                ) {
                    found = Some((t, v));
                    break;
                }
            }
            found.ok_or_else(|| {
                GlacError::ProxyUnavailable(format!(
                    "no header row with columns {:?} and {:?}",
                    format.time_column, format.value_column
                ))
            })?
        }
    };

    let mut skipped = 0usize;
    let mut samples = Vec::new();
    for line in lines {
        let fields = format.delimiter.split(line);
        let parsed = match (fields.get(time_index), fields.get(value_index)) {
            (Some(t), Some(v)) => t.parse::<FloatValue>().ok().zip(v.parse::<FloatValue>().ok()),
            _ => None,
        };
        match parsed {
            Some((t, v)) if t.is_finite() && v.is_finite() => {
                samples.push((format.age_convention.to_offset(t), v))
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!("Skipped {skipped} unparseable rows in proxy table");
    }

    let series = PaleoTemperatureSeries::from_samples(samples)?;
    match format.resample_step {
        Some(step) => series.resample(step),
        None => Ok(series),
    }
}

/// Read and parse a proxy temperature table from disk
pub fn read_proxy_file(
    path: impl AsRef<Path>,
    format: &ProxyTableFormat,
) -> GlacResult<PaleoTemperatureSeries> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| GlacError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_proxy_table(&text, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn csv_with_header() {
        let text = "time,delta_T\n-3,-1.5\n-2,-1.0\n-1,-0.5\n0,0.0\n";
        let series = parse_proxy_table(text, &ProxyTableFormat::csv()).unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.oldest_offset(), -3.0);
        assert_eq!(series.delta_t_at_offset(-2.0), -1.0);
    }

    #[test]
    fn csv_with_quoted_header_and_reordered_columns() {
        let text = "\"delta_T\",\"time\"\n-2.0,-100\n0.0,0\n";
        let series = parse_proxy_table(text, &ProxyTableFormat::csv()).unwrap();
        assert_eq!(series.oldest_offset(), -100.0);
        assert_eq!(series.delta_t_at_offset(-100.0), -2.0);
    }

    #[test]
    fn pangaea_metadata_is_skipped_and_ages_converted() {
        let text = "/* DATA DESCRIPTION:\n\
                    Citation:\tSomeone et al.\n\
                    License:\tCC-BY-4.0\n\
                    */\n\
                    Depth [m]\tAge [ka BP]\tTTT [°C]\n\
                    1.0\t0.000\t0.0\n\
                    2.0\t0.002\t-1.0\n\
                    3.0\t0.004\t-3.0\n";
        let series = parse_proxy_table(text, &ProxyTableFormat::pangaea()).unwrap();
        // 4 years at yearly resolution
        assert_eq!(series.len(), 5);
        assert_eq!(series.oldest_offset(), -4.0);
        assert_eq!(
            series.timeseries().values(),
            array![-3.0, -2.0, -1.0, -0.5, 0.0]
        );
    }

    #[test]
    fn whitespace_table_by_index_skips_bad_rows() {
        let mut text = String::new();
        for i in 0..92 {
            text.push_str(&format!("preamble line {i}\n"));
        }
        text.push_str("1 3.85 38.37 -390.90 0.88\n");
        text.push_str("2 4.40 46.00 NaN -\n");
        text.push_str("3 4.95 53.00 -385.10 1.84\n");
        text.push_str("4 5.50 60.00 -388.40 1.05\n");

        let series = parse_proxy_table(&text, &ProxyTableFormat::epica_dome_c()).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.oldest_offset(), -60.0);
        assert_eq!(series.newest_offset(), -38.37);
        assert_eq!(series.delta_t_at_offset(-53.0), 1.84);
    }

    #[test]
    fn missing_header_is_unavailable() {
        let text = "a,b\n1,2\n";
        let err = parse_proxy_table(text, &ProxyTableFormat::csv()).unwrap_err();
        assert!(matches!(err, GlacError::ProxyUnavailable(_)));
    }

    #[test]
    fn table_without_data_is_unavailable() {
        let text = "time,delta_T\nfoo,bar\n";
        let err = parse_proxy_table(text, &ProxyTableFormat::csv()).unwrap_err();
        assert!(matches!(err, GlacError::ProxyUnavailable(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_proxy_file("/definitely/not/here.csv", &ProxyTableFormat::csv())
            .unwrap_err();
        assert!(matches!(err, GlacError::Io { .. }));
    }

    #[test]
    fn format_from_toml_like_json() {
        let format: ProxyTableFormat = serde_json::from_str(
            r#"{
                "delimiter": "tab",
                "time_column": "Age [ka BP]",
                "value_column": 3,
                "age_convention": {"kind": "age_before_present", "years_per_unit": 1000.0}
            }"#,
        )
        .unwrap();
        assert_eq!(format.time_column, Column::named("Age [ka BP]"));
        assert_eq!(format.value_column, Column::Index(3));
        assert_eq!(format.skip_lines, 0);
        assert_eq!(format.resample_step, None);
    }
}
