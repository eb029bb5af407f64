use rayon::prelude::*;
use tracing::trace;

use crate::domain::Result;
use crate::table::{EchoColumn, SalesTable, stringify_frame};

/// Shape, preview and summary statistics of a loaded table.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub nrows: usize,
    pub ncols: usize,
    pub columns: Vec<String>,
    pub preview: Vec<EchoColumn>,
    pub stats: Vec<ColumnStats>,
}

pub const STAT_LABELS: [&str; 8] = [
    "count", "mean", "std", "min", "25%", "50%", "75%", "max",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStats {
    /// Summarises the non-missing, non-NaN values of a column.
    pub fn describe(name: impl Into<String>, values: &[Option<f64>]) -> Self {
        let mut sorted: Vec<f64> = values
            .iter()
            .flatten()
            .copied()
            .filter(|v| !v.is_nan())
            .collect();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = (count > 0).then(|| sorted.iter().sum::<f64>() / count as f64);
        let std = mean.filter(|_| count > 1).map(|m| {
            let ss: f64 = sorted.iter().map(|v| (v - m).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });

        Self {
            name: name.into(),
            count,
            mean,
            std,
            min: sorted.first().copied(),
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }

    /// Values in the order of [`STAT_LABELS`].
    pub fn values(&self) -> [Option<f64>; 8] {
        [
            Some(self.count as f64),
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }
}

/// Quantile of an ascending slice, interpolating linearly between the two
/// closest order statistics.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

impl Overview {
    pub fn from_table(table: &SalesTable, preview_rows: usize) -> Result<Self> {
        let frame = table.frame();
        let preview = stringify_frame(&frame.head(Some(preview_rows)))?;

        let numeric: Vec<String> = frame
            .get_columns()
            .iter()
            .filter(|c| SalesTable::is_numeric_type(c.dtype()))
            .map(|c| c.name().to_string())
            .collect();

        let stats = numeric
            .par_iter()
            .map(|name| -> Result<ColumnStats> {
                let values = table.numeric_column(name)?;
                Ok(ColumnStats::describe(name.as_str(), &values))
            })
            .collect::<Result<Vec<_>>>()?;
        trace!("Described {} numeric columns", stats.len());

        Ok(Self {
            nrows: table.height(),
            ncols: table.width(),
            columns: table.column_names(),
            preview,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn table(rows: usize) -> SalesTable {
        let names: Vec<String> = (0..rows).map(|i| format!("Game {i}")).collect();
        let years: Vec<i64> = (0..rows).map(|i| 2000 + i as i64).collect();
        let sales: Vec<f64> = (0..rows).map(|i| i as f64 + 1.0).collect();
        let frame = df!(
            "Name" => names,
            "Platform" => vec!["PC"; rows],
            "Year" => years,
            "Genre" => vec!["Action"; rows],
            "NA_Sales" => sales.clone(),
            "Global_Sales" => sales,
        )
        .unwrap();
        SalesTable::from_frame(frame, "t").unwrap()
    }

    #[test]
    fn quantile_interpolates_between_order_statistics() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&values, 0.25), Some(1.75));
        assert_eq!(quantile(&values, 0.5), Some(2.5));
        assert_eq!(quantile(&values, 0.75), Some(3.25));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn describe_uses_sample_standard_deviation() {
        let values = [
            Some(2.0),
            Some(4.0),
            None,
            Some(4.0),
            Some(4.0),
            Some(5.0),
            Some(5.0),
            Some(7.0),
            Some(9.0),
        ];
        let stats = ColumnStats::describe("x", &values);
        assert_eq!(stats.count, 8);
        assert_eq!(stats.mean, Some(5.0));
        let std = stats.std.unwrap();
        assert!((std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(stats.min, Some(2.0));
        assert_eq!(stats.max, Some(9.0));
    }

    #[test]
    fn describe_degenerate_columns() {
        let empty = ColumnStats::describe("x", &[None, None]);
        assert_eq!(empty.count, 0);
        assert_eq!(empty.mean, None);
        assert_eq!(empty.max, None);

        let single = ColumnStats::describe("x", &[Some(3.0)]);
        assert_eq!(single.mean, Some(3.0));
        assert_eq!(single.std, None);
        assert_eq!(single.median, Some(3.0));
    }

    #[test]
    fn overview_shape_and_preview() {
        let overview = Overview::from_table(&table(15), 10).unwrap();
        assert_eq!(overview.nrows, 15);
        assert_eq!(overview.ncols, 6);
        assert_eq!(overview.columns[0], "Name");
        assert!(overview.preview.iter().all(|c| c.data.len() == 10));
        assert_eq!(overview.preview[0].data[0], "Game 0");
        assert_eq!(overview.preview[0].data[9], "Game 9");
    }

    #[test]
    fn overview_preview_shorter_than_limit() {
        let overview = Overview::from_table(&table(3), 10).unwrap();
        assert_eq!(overview.preview[0].data.len(), 3);
    }

    #[test]
    fn stats_only_cover_numeric_columns() {
        let overview = Overview::from_table(&table(4), 10).unwrap();
        let names: Vec<&str> = overview.stats.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Year", "NA_Sales", "Global_Sales"]);
    }
}
