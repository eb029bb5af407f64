use polars::prelude::*;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::domain::{DashError, NUMERIC_COLUMNS, REQUIRED_COLUMNS, Result};

pub const MISSING_CELL: &str = "∅";

/// Cell contents read as missing in every column.
pub const NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum FileType {
    CSV,
    TSV,
}

impl FileType {
    fn separator(&self) -> u8 {
        match self {
            FileType::CSV => b',',
            FileType::TSV => b'\t',
        }
    }
}

#[derive(Debug)]
struct FileInfo {
    path: PathBuf,
    file_size: u64,
    file_type: FileType,
}

/// A sales table that passed schema validation.
///
/// `Year`, `NA_Sales` and `Global_Sales` are guaranteed to exist and to be
/// Float64 columns. Unparseable cells in those columns are nulls.
#[derive(Debug, Clone)]
pub struct SalesTable {
    name: String,
    frame: DataFrame,
}

impl SalesTable {
    pub fn load(path: PathBuf) -> Result<Self> {
        let file_info = Self::get_file_info(path)?;
        let start_time = Instant::now();

        let frame = Self::load_delimited(&file_info.path, file_info.file_type.separator())?
            .collect()?;

        let name = file_info
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string();
        let table = Self::from_frame(frame, name)?;

        info!(
            "Loaded {} ({} bytes, {:?}) with {} rows x {} cols in {}ms",
            file_info.path.display(),
            file_info.file_size,
            file_info.file_type,
            table.height(),
            table.width(),
            start_time.elapsed().as_millis()
        );
        Ok(table)
    }

    /// Validates `frame` against the sales schema and coerces the numeric
    /// columns to Float64.
    pub fn from_frame(mut frame: DataFrame, name: impl Into<String>) -> Result<Self> {
        let present: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !present.iter().any(|p| p == *required))
            .map(|s| s.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DashError::MissingColumns(missing));
        }

        for column in NUMERIC_COLUMNS {
            let original = frame.column(column)?.dtype().clone();
            if original != DataType::Float64 {
                let cast = frame.column(column)?.cast(&DataType::Float64)?;
                frame.with_column(cast)?;
                debug!("Coerced column {column} from {original:?} to Float64");
            }
        }

        Ok(Self {
            name: name.into(),
            frame,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect()
    }

    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self.frame.column(name)?.cast(&DataType::Float64)?;
        let values = column.f64()?.into_iter().collect();
        Ok(values)
    }

    pub fn text_column(&self, name: &str) -> Result<Vec<Option<String>>> {
        let column = self.frame.column(name)?.cast(&DataType::String)?;
        let values = column
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(values)
    }

    pub fn is_numeric_type(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
                | DataType::Float32
                | DataType::Float64
        )
    }

    fn detect_file_type(path: &Path) -> Result<FileType> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
            .as_deref()
        {
            Some("CSV") => Ok(FileType::CSV),
            Some("TSV") | Some("TAB") => Ok(FileType::TSV),
            _ => Err(DashError::UnknownFileType),
        }
    }

    fn get_file_info(path: PathBuf) -> Result<FileInfo> {
        let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DashError::FileNotFound,
            ErrorKind::PermissionDenied => DashError::PermissionDenied,
            _ => DashError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(DashError::NotAFile);
        }

        let file_type = Self::detect_file_type(&path)?;

        Ok(FileInfo {
            path,
            file_size: metadata.len(),
            file_type,
        })
    }

    fn load_delimited(path: &Path, separator: u8) -> std::result::Result<LazyFrame, PolarsError> {
        LazyCsvReader::new(PlPath::Local(path.into()))
            .with_has_header(true)
            .with_separator(separator)
            .with_null_values(Some(NullValues::AllColumns(
                NULL_TOKENS.iter().map(|t| PlSmallStr::from(*t)).collect(),
            )))
            // Mixed cells may first show up deep into the file.
            .with_infer_schema_length(None)
            .finish()
    }
}

/// A column converted to display strings.
#[derive(Debug, Clone, PartialEq)]
pub struct EchoColumn {
    pub name: String,
    pub max_width: usize,
    pub data: Vec<String>,
}

impl EchoColumn {
    pub fn from_column(column: &Column) -> Result<Self> {
        let name = column.name().to_string();
        let strings = column.cast(&DataType::String)?;
        let series = strings.str()?;

        let mut data = Vec::with_capacity(series.len());
        let mut max_width = name.chars().count();
        for value in series.into_iter() {
            let cell = match value {
                Some(s) => s.replace("\r\n", " ↵ ").replace('\n', " ↵ "),
                None => String::from(MISSING_CELL),
            };
            max_width = max_width.max(cell.chars().count());
            data.push(cell);
        }

        Ok(Self {
            name,
            max_width,
            data,
        })
    }
}

/// Display copy of a whole table, shown back to the user after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEcho {
    pub name: String,
    pub nrows: usize,
    pub columns: Vec<EchoColumn>,
}

impl TableEcho {
    pub fn from_table(table: &SalesTable) -> Result<Self> {
        Ok(Self {
            name: table.name().to_string(),
            nrows: table.height(),
            columns: stringify_frame(table.frame())?,
        })
    }
}

/// Stringifies every column of `frame`, one rayon task per column.
pub fn stringify_frame(frame: &DataFrame) -> Result<Vec<EchoColumn>> {
    let start_time = Instant::now();
    let columns = frame
        .get_columns()
        .par_iter()
        .map(EchoColumn::from_column)
        .collect::<Result<Vec<_>>>()?;
    debug!(
        "Stringified {} columns in {}ms",
        columns.len(),
        start_time.elapsed().as_millis()
    );
    Ok(columns)
}
