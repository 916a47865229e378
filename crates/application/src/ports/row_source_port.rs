//! Row source port
//!
//! Defines how the loaders read tabular rows from the upstream spreadsheet.

use std::fmt;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::SourceError;

/// One row of cells; trailing empty cells may be missing
pub type Row = Vec<String>;

/// A sheet name plus a column range, rendered as `Sheet!A:C`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeSpec {
    /// Sheet (tab) name
    pub sheet: String,
    /// First column letter
    pub first_column: char,
    /// Last column letter
    pub last_column: char,
}

impl RangeSpec {
    /// Create a range over whole columns of a sheet
    pub fn new(sheet: impl Into<String>, first_column: char, last_column: char) -> Self {
        Self {
            sheet: sheet.into(),
            first_column,
            last_column,
        }
    }

    /// Number of columns covered by the range
    pub fn width(&self) -> usize {
        (u32::from(self.last_column) + 1).saturating_sub(u32::from(self.first_column)) as usize
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}:{}", self.sheet, self.first_column, self.last_column)
    }
}

/// Port for reading rows from the upstream spreadsheet
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RowSourcePort: Send + Sync {
    /// Fetch every row of a range, header row included
    async fn fetch_range(&self, range: &RangeSpec) -> Result<Vec<Row>, SourceError>;
}
