use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::DataError;

// ---------------------------------------------------------------------------
// Site – one of the two monitoring stations
// ---------------------------------------------------------------------------

/// A monitoring location. Per-site columns share one schema and differ only
/// by the `_{suffix}` on their name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Site {
    Shunyi,
    Guanyan,
}

impl Site {
    pub const ALL: [Site; 2] = [Site::Shunyi, Site::Guanyan];

    pub fn label(self) -> &'static str {
        match self {
            Site::Shunyi => "Shunyi",
            Site::Guanyan => "Guanyan",
        }
    }

    /// Lower-case suffix used in column names, e.g. `PM10_guanyan`.
    pub fn column_suffix(self) -> &'static str {
        match self {
            Site::Shunyi => "shunyi",
            Site::Guanyan => "guanyan",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Site {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Site::ALL
            .into_iter()
            .find(|site| site.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DataError::UnknownSite(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Metric – one measured quantity
// ---------------------------------------------------------------------------

/// A pollutant or meteorological quantity recorded for every site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "PM2.5")]
    Pm25,
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "TEMP")]
    Temp,
    #[serde(rename = "DEWP")]
    Dewp,
    #[serde(rename = "WSPM")]
    Wspm,
}

impl Metric {
    /// Canonical order, also the default heatmap order.
    pub const ALL: [Metric; 5] = [
        Metric::Pm25,
        Metric::Pm10,
        Metric::Temp,
        Metric::Dewp,
        Metric::Wspm,
    ];

    /// Label as it appears in column names.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Pm25 => "PM2.5",
            Metric::Pm10 => "PM10",
            Metric::Temp => "TEMP",
            Metric::Dewp => "DEWP",
            Metric::Wspm => "WSPM",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Pm25 | Metric::Pm10 => "µg/m³",
            Metric::Temp | Metric::Dewp => "°C",
            Metric::Wspm => "m/s",
        }
    }

    /// Exact column name for this metric at `site`, e.g. `PM2.5_shunyi`.
    pub fn column_name(self, site: Site) -> String {
        format!("{}_{}", self.label(), site.column_suffix())
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Metric {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DataError::UnknownMetric(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Raw rows and schema
// ---------------------------------------------------------------------------

/// One untyped input row: exact column name → numeric cell (NaN = missing).
pub type RawRow = BTreeMap<String, f64>;

pub const TIME_COLUMNS: [&str; 4] = ["year", "month", "day", "hour"];

/// Every column a row must carry, in header order.
pub fn required_columns() -> Vec<String> {
    let mut columns: Vec<String> = TIME_COLUMNS.iter().map(|c| c.to_string()).collect();
    for site in Site::ALL {
        for metric in Metric::ALL {
            columns.push(metric.column_name(site));
        }
    }
    columns
}

// ---------------------------------------------------------------------------
// Record – one hourly observation
// ---------------------------------------------------------------------------

/// The five metric values of one site at one hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteMeasurements {
    values: [f64; 5],
}

impl SiteMeasurements {
    pub fn new(values: [f64; 5]) -> Self {
        SiteMeasurements { values }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        self.values[metric.index()]
    }
}

/// One row of the dataset. `datetime` is derived once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    datetime: NaiveDateTime,
    measurements: [SiteMeasurements; 2],
}

impl Record {
    /// Build a record from an untyped row; `row` is only used for error messages.
    pub fn from_raw(row: usize, raw: &RawRow) -> Result<Self, DataError> {
        let field = |column: &str| {
            raw.get(column).copied().ok_or_else(|| DataError::MissingField {
                row,
                column: column.to_string(),
            })
        };

        let year = field("year")?;
        let month = field("month")?;
        let day = field("day")?;
        let hour = field("hour")?;

        let mut measurements = [SiteMeasurements::new([f64::NAN; 5]); 2];
        for site in Site::ALL {
            let mut values = [f64::NAN; 5];
            for metric in Metric::ALL {
                values[metric.index()] = field(metric.column_name(site).as_str())?;
            }
            measurements[site.index()] = SiteMeasurements::new(values);
        }

        let invalid = || DataError::InvalidDate {
            row,
            year,
            month,
            day,
            hour,
        };
        let y = as_integer(year, i32::MIN as f64, i32::MAX as f64).ok_or_else(invalid)? as i32;
        let m = as_integer(month, 0.0, u32::MAX as f64).ok_or_else(invalid)? as u32;
        let d = as_integer(day, 0.0, u32::MAX as f64).ok_or_else(invalid)? as u32;
        let h = as_integer(hour, 0.0, u32::MAX as f64).ok_or_else(invalid)? as u32;
        let datetime = derive_datetime(y, m, d, h).ok_or_else(invalid)?;

        Ok(Record {
            year: y,
            month: m,
            day: d,
            hour: h,
            datetime,
            measurements,
        })
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.datetime
    }

    pub fn value(&self, site: Site, metric: Metric) -> f64 {
        self.measurements[site.index()].get(metric)
    }
}

/// Combine calendar fields into a timestamp at minute zero.
///
/// Returns `None` for anything the calendar rejects (month 13, Feb 30, hour 24).
pub fn derive_datetime(year: i32, month: u32, day: u32, hour: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, 0, 0)
}

/// A finite, integral value inside `[lo, hi]`.
fn as_integer(v: f64, lo: f64, hi: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v >= lo && v <= hi {
        Some(v as i64)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// All records in input order. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Validate and convert raw rows. The first bad row aborts the load.
    pub fn load<I>(rows: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, raw)| Record::from_raw(i, &raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Dataset { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest timestamps. Scans every row; order is not assumed.
    pub fn bounds(&self) -> Result<(NaiveDateTime, NaiveDateTime), DataError> {
        let mut iter = self.records.iter().map(Record::datetime);
        let first = iter.next().ok_or(DataError::EmptyDataset)?;
        Ok(iter.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Row with every required column; `pm25` feeds both sites.
    pub(crate) fn raw_row(year: f64, month: f64, day: f64, hour: f64, pm25: f64) -> RawRow {
        let mut row = RawRow::new();
        row.insert("year".into(), year);
        row.insert("month".into(), month);
        row.insert("day".into(), day);
        row.insert("hour".into(), hour);
        for site in Site::ALL {
            for metric in Metric::ALL {
                let v = match metric {
                    Metric::Pm25 => pm25,
                    Metric::Pm10 => pm25 * 1.5,
                    Metric::Temp => hour,
                    Metric::Dewp => -hour,
                    Metric::Wspm => 1.0,
                };
                row.insert(metric.column_name(site), v);
            }
        }
        row
    }

    pub(crate) fn hourly_dataset(pm25: &[f64]) -> Dataset {
        Dataset::load(
            pm25.iter()
                .enumerate()
                .map(|(h, &v)| raw_row(2013.0, 3.0, 1.0, h as f64, v)),
        )
        .unwrap()
    }

    #[test]
    fn test_column_names() {
        assert_eq!(Metric::Pm25.column_name(Site::Shunyi), "PM2.5_shunyi");
        assert_eq!(Metric::Wspm.column_name(Site::Guanyan), "WSPM_guanyan");
        assert_eq!(required_columns().len(), 4 + 2 * 5);
    }

    #[test]
    fn test_parse_selectors() {
        assert_eq!("pm2.5".parse::<Metric>().unwrap(), Metric::Pm25);
        assert_eq!("TEMP".parse::<Metric>().unwrap(), Metric::Temp);
        assert_eq!("guanyan".parse::<Site>().unwrap(), Site::Guanyan);
        assert_eq!(
            "SO2".parse::<Metric>(),
            Err(DataError::UnknownMetric("SO2".into()))
        );
        assert!("Dongsi".parse::<Site>().is_err());
    }

    #[test]
    fn test_derive_datetime() {
        let t = derive_datetime(2013, 3, 1, 5).unwrap();
        assert_eq!(t.to_string(), "2013-03-01 05:00:00");
        assert!(derive_datetime(2013, 13, 1, 0).is_none());
        assert!(derive_datetime(2013, 2, 30, 0).is_none());
        assert!(derive_datetime(2013, 3, 1, 24).is_none());
    }

    #[test]
    fn test_load_preserves_order_and_values() {
        let ds = hourly_dataset(&[10.0, f64::NAN, 30.0]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records()[0].value(Site::Shunyi, Metric::Pm25), 10.0);
        assert!(ds.records()[1].value(Site::Guanyan, Metric::Pm25).is_nan());
        assert_eq!(ds.records()[2].hour, 2);
        assert_eq!(ds.records()[2].value(Site::Shunyi, Metric::Pm10), 45.0);
    }

    #[test]
    fn test_load_missing_field() {
        let mut row = raw_row(2013.0, 3.0, 1.0, 0.0, 1.0);
        row.remove("DEWP_guanyan");
        let err = Dataset::load(vec![raw_row(2013.0, 3.0, 1.0, 0.0, 1.0), row]).unwrap_err();
        assert_eq!(
            err,
            DataError::MissingField {
                row: 1,
                column: "DEWP_guanyan".into()
            }
        );
    }

    #[test]
    fn test_load_rejects_bad_calendar() {
        let err = Dataset::load(vec![raw_row(2013.0, 13.0, 1.0, 0.0, 1.0)]).unwrap_err();
        assert!(matches!(err, DataError::InvalidDate { row: 0, .. }));

        let err = Dataset::load(vec![raw_row(2013.0, 3.0, 1.0, 24.0, 1.0)]).unwrap_err();
        assert!(matches!(err, DataError::InvalidDate { .. }));

        let err = Dataset::load(vec![raw_row(2013.0, 3.0, 1.5, 0.0, 1.0)]).unwrap_err();
        assert!(matches!(err, DataError::InvalidDate { .. }));

        let err = Dataset::load(vec![raw_row(f64::NAN, 3.0, 1.0, 0.0, 1.0)]).unwrap_err();
        assert!(matches!(err, DataError::InvalidDate { .. }));
    }

    #[test]
    fn test_bounds() {
        assert_eq!(Dataset::default().bounds(), Err(DataError::EmptyDataset));

        // out of order on purpose
        let ds = Dataset::load(vec![
            raw_row(2013.0, 3.0, 1.0, 5.0, 1.0),
            raw_row(2013.0, 3.0, 1.0, 2.0, 1.0),
            raw_row(2013.0, 3.0, 2.0, 0.0, 1.0),
        ])
        .unwrap();
        let (lo, hi) = ds.bounds().unwrap();
        assert_eq!(lo, derive_datetime(2013, 3, 1, 2).unwrap());
        assert_eq!(hi, derive_datetime(2013, 3, 2, 0).unwrap());
    }
}
