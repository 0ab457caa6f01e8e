//! Plain-text reader (§4.E): one address per line, optional trailing
//! metadata separated by `,`, `;`, or a tab.

use std::io::BufRead;

use mailqual_model::Record;

use crate::error::Result;

const SEPARATORS: [char; 3] = [',', ';', '\t'];

pub struct PlainTextReader<R: BufRead> {
    lines: std::io::Lines<R>,
    source_file: String,
    row: u64,
}

impl<R: BufRead> PlainTextReader<R> {
    pub fn new(reader: R, source_file: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            source_file: source_file.into(),
            row: 0,
        }
    }
}

impl<R: BufRead> Iterator for PlainTextReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.row += 1;
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    return Some(Err(crate::error::IngestError::ReadError {
                        path: self.source_file.clone().into(),
                        row: self.row,
                        cause: e.to_string(),
                    }));
                }
            };

            let line = strip_bom(&line);
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let (address, extra) = match trimmed.split_once(SEPARATORS.as_slice()) {
                Some((addr, rest)) => (addr.trim().to_string(), Some(rest.trim().to_string())),
                None => (trimmed.to_string(), None),
            };

            let mut record = Record::new(address, self.source_file.clone(), self.row);
            if let Some(extra) = extra {
                let mut metadata = mailqual_model::Metadata::default();
                metadata.extras.insert("extra_columns".to_string(), extra);
                record = record.with_metadata(metadata);
            }
            return Some(Ok(record));
        }
    }
}

fn strip_bom(line: &str) -> &str {
    line.strip_prefix('\u{feff}').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(input: &str) -> Vec<Record> {
        PlainTextReader::new(Cursor::new(input), "f.txt")
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let records = read_all("alice@example.com\n\n# a comment\nbob@example.com\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].raw_address, "alice@example.com");
        assert_eq!(records[1].raw_address, "bob@example.com");
    }

    #[test]
    fn captures_trailing_metadata_as_extras() {
        let records = read_all("alice@example.com,some note\n");
        let metadata = records[0].metadata.as_ref().unwrap();
        assert_eq!(
            metadata.extras.get("extra_columns"),
            Some(&"some note".to_string())
        );
    }

    #[test]
    fn rows_are_counted_from_one() {
        let records = read_all("a@example.com\nb@example.com\n");
        assert_eq!(records[0].source_row, 1);
        assert_eq!(records[1].source_row, 2);
    }

    #[test]
    fn strips_leading_bom() {
        let records = read_all("\u{feff}alice@example.com\n");
        assert_eq!(records[0].raw_address, "alice@example.com");
    }

    #[test]
    fn accepts_semicolon_and_tab_separators() {
        let records = read_all("a@example.com;x\nb@example.com\tother\n");
        assert_eq!(records[0].raw_address, "a@example.com");
        assert_eq!(records[1].raw_address, "b@example.com");
    }
}
