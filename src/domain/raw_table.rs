/// Untyped tabular input: a header row and string records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Physical line in the source; the header is line 1.
    pub line: u64,
    pub fields: Vec<String>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            records: Vec::new(),
        }
    }

    /// Appends a record, numbering it after the header and previous records.
    pub fn push(&mut self, fields: Vec<String>) {
        let line = self.records.last().map(|r| r.line + 1).unwrap_or(2);
        self.records.push(RawRecord { line, fields });
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_numbers_lines_after_header() {
        let mut table = RawTable::new(vec!["date".into(), "close".into()]);
        table.push(vec!["2020-01-01 09:00:00".into(), "1.0".into()]);
        table.push(vec!["2020-01-01 10:00:00".into(), "2.0".into()]);

        assert_eq!(table.records[0].line, 2);
        assert_eq!(table.records[1].line, 3);
        assert_eq!(table.column_index("close"), Some(1));
    }
}
