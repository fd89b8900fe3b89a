//! Worksheet handles
//!
//! A worksheet is a named tab inside a spreadsheet document. Handles are
//! resolved fresh on every run and dropped when the run ends.

use std::fmt;

/// The tab names a run opens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetNames {
    /// Intake queue, the only tab this program writes
    pub process: String,
    /// Archive, reserved for a separate consumer
    pub done: String,
}

/// A resolved reference to one tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetHandle {
    pub spreadsheet_id: String,
    pub sheet_id: i64,
    pub title: String,
}

impl WorksheetHandle {
    /// A1 range that anchors appends to this tab
    pub fn append_range(&self) -> String {
        format!("'{}'!A1", self.title.replace('\'', "''"))
    }
}

impl fmt::Display for WorksheetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.title, self.sheet_id)
    }
}

/// Both tabs of one spreadsheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetPair {
    pub process: WorksheetHandle,
    pub done: WorksheetHandle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_range_quotes_title() {
        let handle = WorksheetHandle {
            spreadsheet_id: "abc".to_string(),
            sheet_id: 0,
            title: "Process".to_string(),
        };
        assert_eq!(handle.append_range(), "'Process'!A1");

        let handle = WorksheetHandle {
            title: "Bob's Queue".to_string(),
            ..handle
        };
        assert_eq!(handle.append_range(), "'Bob''s Queue'!A1");
    }
}
