use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;
use thiserror::Error;

/// Columns every sales file has to provide. Order is used when reporting
/// missing columns.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "Name",
    "Platform",
    "Year",
    "Genre",
    "NA_Sales",
    "Global_Sales",
];

/// Columns that are coerced to f64 on load.
pub const NUMERIC_COLUMNS: [&str; 3] = ["Year", "NA_Sales", "Global_Sales"];

pub const MISSING_TABLE_WARNING: &str =
    "ERROR: No puedes explorar un archivo si no lo has subido a 'Cargar archivo'.";

pub const HELP_TEXT: &str = "vgdash - video game sales dashboard

  1..4          Select view
  Tab / S-Tab   Next / previous view
  o             Open a CSV/TSV file
  j / k         Scroll down / up
  PgDn / PgUp   Scroll a page
  g / G         Jump to beginning / end
  ?             Show this help
  Esc           Close popup / cancel input
  q             Quit";

#[derive(Error, Debug)]
pub enum DashError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),

    #[error("File not found")]
    FileNotFound,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Not a file")]
    NotAFile,

    #[error("Unknown file type, expected .csv or .tsv")]
    UnknownFileType,

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("{}", MISSING_TABLE_WARNING)]
    MissingTable,

    #[error("Sin datos: la columna {0} no contiene valores válidos")]
    NoData(String),

    #[error("Could not expand path: {0}")]
    PathExpansion(String),
}

pub type Result<T> = std::result::Result<T, DashError>;

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct DashConfig {
    pub event_poll_time: u64,
    pub max_column_width: usize,
    pub preview_rows: usize,
    pub top_n: usize,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            max_column_width: 40,
            preview_rows: 10,
            top_n: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Quit,
    SelectMode(usize),
    NextMode,
    PreviousMode,
    MoveUp,
    MoveDown,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    OpenFile,
    RawKey(KeyEvent),
    Help,
    Exit,
    Resize(usize, usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_lists_all_names() {
        let err = DashError::MissingColumns(vec!["Year".into(), "Genre".into()]);
        assert_eq!(err.to_string(), "Missing required columns: Year, Genre");
    }

    #[test]
    fn missing_table_shows_warning() {
        assert_eq!(DashError::MissingTable.to_string(), MISSING_TABLE_WARNING);
    }

    #[test]
    fn config_setters_chain() {
        let cfg = DashConfig::default().with_top_n(5).with_preview_rows(3);
        assert_eq!(cfg.top_n, 5);
        assert_eq!(cfg.preview_rows, 3);
        assert_eq!(cfg.event_poll_time, 100);
    }
}
