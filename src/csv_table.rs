/// Rows of a comma-delimited report; the first row is the header.
///
/// Lines split on `\n` and cells on `,`. Quoted fields are not understood, so a
/// cell containing a comma spills into the next column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn parse(text: &str) -> Self {
        let rows = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.split(',').map(str::to_string).collect())
            .collect();
        Self { rows }
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
