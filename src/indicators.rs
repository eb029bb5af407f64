use tracing::debug;

use crate::aggregate::{distinct_count, first_max, group_sum, max_group, sum, year_keys};
use crate::domain::{DashError, Result};
use crate::table::{MISSING_CELL, SalesTable};

/// The five key indicators of a sales table.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicators {
    pub unique_titles: usize,
    pub platforms: usize,
    pub top_title: String,
    pub top_title_sales: f64,
    pub total_sales: f64,
    pub best_year: Option<(i64, f64)>,
}

impl Indicators {
    pub fn from_table(table: &SalesTable) -> Result<Self> {
        let names = table.text_column("Name")?;
        let platforms = table.text_column("Platform")?;
        let global = table.numeric_column("Global_Sales")?;
        let years = table.numeric_column("Year")?;

        let total_sales = sum(&global).ok_or_else(|| DashError::NoData("Global_Sales".into()))?;
        let (top_idx, top_title_sales) =
            first_max(&global).ok_or_else(|| DashError::NoData("Global_Sales".into()))?;
        let top_title = names[top_idx]
            .clone()
            .unwrap_or_else(|| MISSING_CELL.to_string());

        let keys = year_keys(&years);
        // No best year unless at least one row has both a year and a sale.
        let dated: Vec<Option<f64>> = global
            .iter()
            .zip(keys.iter())
            .map(|(v, k)| k.and(*v))
            .collect();
        let best_year = if sum(&dated).is_some() {
            max_group(&group_sum(&keys, &global))
        } else {
            None
        };

        let indicators = Self {
            unique_titles: distinct_count(&names),
            platforms: distinct_count(&platforms),
            top_title,
            top_title_sales,
            total_sales,
            best_year,
        };
        debug!("Indicators: {indicators:?}");
        Ok(indicators)
    }

    /// Label, value and caption of each metric block, in display order.
    pub fn metrics(&self) -> Vec<(&'static str, String, String)> {
        let best_year = match self.best_year {
            Some((year, sales)) => (year.to_string(), format!("{sales:.2} millones")),
            None => (MISSING_CELL.to_string(), String::new()),
        };
        vec![
            (
                "Videojuegos únicos",
                self.unique_titles.to_string(),
                "Cantidad de títulos distintos en el dataset.".to_string(),
            ),
            (
                "Plataformas",
                self.platforms.to_string(),
                "Cantidad de plataformas en las que se publicaron juegos.".to_string(),
            ),
            (
                "Juego más vendido (Global)",
                self.top_title.clone(),
                format!("{} millones", self.top_title_sales),
            ),
            (
                "Ventas globales totales",
                format!("{:.2} millones", self.total_sales),
                String::new(),
            ),
            ("Año con más ventas", best_year.0, best_year.1),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;
    use polars::prelude::DataFrame;

    fn table(frame: DataFrame) -> SalesTable {
        SalesTable::from_frame(frame, "t").unwrap()
    }

    #[test]
    fn two_classic_games() {
        let t = table(
            df!(
                "Name" => ["Wii Sports", "Tetris"],
                "Platform" => ["Wii", "GB"],
                "Year" => [2006i64, 1989],
                "Genre" => ["Sports", "Puzzle"],
                "NA_Sales" => [41.49, 23.20],
                "Global_Sales" => [82.74, 30.26],
            )
            .unwrap(),
        );
        let ind = Indicators::from_table(&t).unwrap();
        assert_eq!(ind.unique_titles, 2);
        assert_eq!(ind.platforms, 2);
        assert_eq!(ind.top_title, "Wii Sports");
        assert_eq!(ind.top_title_sales, 82.74);
        assert_eq!(format!("{:.2}", ind.total_sales), "113.00");
        assert_eq!(ind.best_year, Some((2006, 82.74)));

        let metrics = ind.metrics();
        assert_eq!(metrics.len(), 5);
        assert_eq!(metrics[3].1, "113.00 millones");
        assert_eq!(metrics[4].1, "2006");
        assert_eq!(metrics[4].2, "82.74 millones");
    }

    #[test]
    fn top_title_ties_go_to_first_row() {
        let t = table(
            df!(
                "Name" => ["A", "B", "A"],
                "Platform" => ["PC", "PC", "PS2"],
                "Year" => [2001i64, 2002, 2003],
                "Genre" => ["X", "X", "X"],
                "NA_Sales" => [1.0, 1.0, 1.0],
                "Global_Sales" => [2.0, 5.0, 5.0],
            )
            .unwrap(),
        );
        let ind = Indicators::from_table(&t).unwrap();
        assert_eq!(ind.unique_titles, 2);
        assert_eq!(ind.top_title, "B");
        // 2002 and 2003 tie at 5.0
        assert_eq!(ind.best_year, Some((2002, 5.0)));
    }

    #[test]
    fn best_year_sums_groups() {
        let t = table(
            df!(
                "Name" => ["A", "B", "C"],
                "Platform" => ["PC", "PC", "PC"],
                "Year" => [Some(2001.0), None, Some(2001.0)],
                "Genre" => ["X", "X", "X"],
                "NA_Sales" => [1.0, 1.0, 1.0],
                "Global_Sales" => [2.0, 3.5, 2.0],
            )
            .unwrap(),
        );
        let ind = Indicators::from_table(&t).unwrap();
        assert_eq!(ind.best_year, Some((2001, 4.0)));
        assert_eq!(ind.total_sales, 7.5);
    }

    #[test]
    fn no_valid_sales_is_no_data() {
        let t = table(
            df!(
                "Name" => ["A"],
                "Platform" => ["PC"],
                "Year" => [2001i64],
                "Genre" => ["X"],
                "NA_Sales" => [1.0],
                "Global_Sales" => ["n/a"],
            )
            .unwrap(),
        );
        assert!(matches!(
            Indicators::from_table(&t),
            Err(DashError::NoData(column)) if column == "Global_Sales"
        ));
    }

    #[test]
    fn best_year_absent_without_dated_sales() {
        let t = table(
            df!(
                "Name" => ["A"],
                "Platform" => ["PC"],
                "Year" => ["N/A"],
                "Genre" => ["X"],
                "NA_Sales" => [1.0],
                "Global_Sales" => [1.0],
            )
            .unwrap(),
        );
        let ind = Indicators::from_table(&t).unwrap();
        assert_eq!(ind.best_year, None);
        assert_eq!(ind.metrics()[4].1, MISSING_CELL);
    }
}
