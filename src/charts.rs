use tracing::debug;

use crate::aggregate::{group_sum, sum, top_k, year_keys};
use crate::domain::{DashError, Result};
use crate::table::{MISSING_CELL, SalesTable};

/// The three aggregate series shown in the charts view.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    /// Global sales per genre, largest first.
    pub sales_by_genre: Vec<(String, f64)>,
    /// Titles with the largest North American sales, largest first.
    pub top_na_sales: Vec<(String, f64)>,
    /// Global sales per year, ascending year.
    pub sales_by_year: Vec<(i64, f64)>,
}

impl ChartSet {
    pub fn from_table(table: &SalesTable, top_n: usize) -> Result<Self> {
        let global = table.numeric_column("Global_Sales")?;
        if sum(&global).is_none() {
            return Err(DashError::NoData("Global_Sales".into()));
        }

        let charts = Self {
            sales_by_genre: Self::sales_by_genre(table, &global)?,
            top_na_sales: Self::top_na_sales(table, top_n)?,
            sales_by_year: Self::sales_by_year(table, &global)?,
        };
        debug!(
            "Charts: {} genres, {} top titles, {} years",
            charts.sales_by_genre.len(),
            charts.top_na_sales.len(),
            charts.sales_by_year.len()
        );
        Ok(charts)
    }

    fn sales_by_genre(table: &SalesTable, global: &[Option<f64>]) -> Result<Vec<(String, f64)>> {
        let genres = table.text_column("Genre")?;
        let mut series: Vec<(String, f64)> = group_sum(&genres, global).into_iter().collect();
        // Stable sort keeps equal sums in genre order.
        series.sort_by(|(_, a), (_, b)| b.total_cmp(a));
        Ok(series)
    }

    fn top_na_sales(table: &SalesTable, top_n: usize) -> Result<Vec<(String, f64)>> {
        let names = table.text_column("Name")?;
        let na_sales = table.numeric_column("NA_Sales")?;
        Ok(top_k(&na_sales, top_n)
            .into_iter()
            .map(|idx| {
                let name = names[idx]
                    .clone()
                    .unwrap_or_else(|| MISSING_CELL.to_string());
                (name, na_sales[idx].unwrap_or_default())
            })
            .collect())
    }

    fn sales_by_year(table: &SalesTable, global: &[Option<f64>]) -> Result<Vec<(i64, f64)>> {
        let years = year_keys(&table.numeric_column("Year")?);
        Ok(group_sum(&years, global).into_iter().collect())
    }
}
