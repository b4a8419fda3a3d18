//! Pairwise Pearson correlation between the metrics of one site.

use serde::Serialize;

use crate::data::filter::FilteredView;
use crate::data::model::{Metric, Site};

/// Square, symmetric coefficient matrix in the caller's field order.
///
/// The diagonal is always exactly 1. An off-diagonal `NaN` means the pair
/// had fewer than two complete rows or a constant column.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    site: Site,
    fields: Vec<Metric>,
    /// Row-major, `fields.len()²` entries.
    values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn site(&self) -> Site {
        self.site
    }

    pub fn fields(&self) -> &[Metric] {
        &self.fields
    }

    /// Matrix dimension.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.fields.len() + col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.fields.len().max(1))
    }
}

/// Correlate `{field}_{site}` columns over the view.
pub fn correlate(view: &FilteredView<'_>, site: Site, fields: &[Metric]) -> CorrelationMatrix {
    let columns: Vec<Vec<f64>> = fields.iter().map(|&m| view.values(site, m)).collect();
    let n = fields.len();
    let mut values = vec![f64::NAN; n * n];

    for i in 0..n {
        values[i * n + i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(&columns[i], &columns[j]);
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }

    CorrelationMatrix {
        site,
        fields: fields.to_vec(),
        values,
    }
}

/// Pearson's r over the rows where both values are finite.
///
/// `NaN` with fewer than two such rows or zero variance on either side.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| (x, y))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();

    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (sxy / denom).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::filter;
    use crate::data::model::tests::hourly_dataset;

    #[test]
    fn test_pearson_basic() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&x, &[2.0, 4.0, 6.0, 8.0]) - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &[8.0, 6.0, 4.0, 2.0]) + 1.0).abs() < 1e-12);
        assert!(pearson(&x, &[5.0, 5.0, 5.0, 5.0]).is_nan());
    }

    #[test]
    fn test_pearson_skips_incomplete_pairs() {
        let x = [1.0, 2.0, f64::NAN, 4.0];
        let y = [1.0, 2.0, 100.0, 4.0];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
        assert!(pearson(&[1.0, f64::NAN], &[1.0, 2.0]).is_nan());
    }

    #[test]
    fn test_matrix_symmetric_unit_diagonal() {
        let ds = hourly_dataset(&[12.0, 3.0, 40.0, 7.5, 22.0, 18.0]);
        let (lo, hi) = ds.bounds().unwrap();
        let view = filter(&ds, lo, hi).unwrap();
        let m = correlate(&view, Site::Guanyan, &Metric::ALL);

        assert_eq!(m.len(), 5);
        for i in 0..5 {
            assert_eq!(m.get(i, i), 1.0);
            for j in 0..5 {
                let (a, b) = (m.get(i, j), m.get(j, i));
                assert!(a == b || (a.is_nan() && b.is_nan()));
            }
        }
        // fields follow Metric::ALL: PM2.5, PM10, TEMP, DEWP, WSPM
        // PM10 is 1.5 × PM2.5 in the fixture
        assert!((m.get(0, 1) - 1.0).abs() < 1e-12);
        // TEMP = hour, DEWP = -hour
        assert!((m.get(2, 3) + 1.0).abs() < 1e-12);
        // constant wind speed
        assert!(m.get(4, 0).is_nan());
    }

    #[test]
    fn test_single_row_is_degenerate() {
        let ds = hourly_dataset(&[12.0, 3.0]);
        let t = ds.records()[0].datetime();
        let view = filter(&ds, t, t).unwrap();
        let m = correlate(&view, Site::Shunyi, &Metric::ALL);
        for i in 0..5 {
            for j in 0..5 {
                if i == j {
                    assert_eq!(m.get(i, j), 1.0);
                } else {
                    assert!(m.get(i, j).is_nan());
                }
            }
        }
    }

    #[test]
    fn test_caller_field_order() {
        let ds = hourly_dataset(&[1.0, 2.0, 4.0]);
        let (lo, hi) = ds.bounds().unwrap();
        let view = filter(&ds, lo, hi).unwrap();
        let fields = [Metric::Wspm, Metric::Temp, Metric::Pm25];
        let m = correlate(&view, Site::Shunyi, &fields);
        assert_eq!(m.fields(), &fields);
        assert_eq!(m.rows().count(), 3);
    }
}
