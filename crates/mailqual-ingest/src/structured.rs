//! Structured-record reader (§4.E): an XML-like document containing a
//! sequence of records, each carrying an address plus scraped metadata.
//!
//! Tolerant of alternate namespaces (element names are matched on their
//! local part, ignoring any `prefix:` or `{uri}` qualification) and of
//! low-order control characters, which are stripped from the raw bytes
//! before the XML parser ever sees them.

use quick_xml::Reader;
use quick_xml::events::Event;

use mailqual_model::{Metadata, Record};

use crate::error::{IngestError, Result};

/// Element names recognized as carrying a record's address, per §4.E's
/// "known set of element names".
const ADDRESS_ELEMENTS: [&str; 2] = ["address", "email"];

pub struct StructuredReader {
    reader: Reader<std::io::Cursor<Vec<u8>>>,
    source_file: String,
    row: u64,
    buf: Vec<u8>,
}

impl StructuredReader {
    pub fn new(raw: &[u8], source_file: impl Into<String>) -> Self {
        let cleaned = strip_control_chars(raw);
        let mut reader = Reader::from_reader(std::io::Cursor::new(cleaned));
        reader.config_mut().trim_text(true);
        Self {
            reader,
            source_file: source_file.into(),
            row: 0,
            buf: Vec::new(),
        }
    }

    /// Advance to the next `<record>`-shaped element and collect its
    /// children into a flat field map, local-name keyed (namespace
    /// prefixes stripped).
    fn next_fields(&mut self) -> Result<Option<Vec<(String, String)>>> {
        loop {
            self.buf.clear();
            let event = self.reader.read_event_into(&mut self.buf).map_err(|e| {
                IngestError::ReadError {
                    path: self.source_file.clone().into(),
                    row: self.row,
                    cause: e.to_string(),
                }
            })?;
            match event {
                Event::Eof => return Ok(None),
                Event::Start(tag) if local_name(&tag.name().as_ref().to_vec()) == "record" => {
                    self.row += 1;
                    return Ok(Some(self.read_record_fields()?));
                }
                _ => continue,
            }
        }
    }

    fn read_record_fields(&mut self) -> Result<Vec<(String, String)>> {
        let mut fields = Vec::new();
        let mut current_field: Option<String> = None;
        let mut depth = 0usize;

        loop {
            self.buf.clear();
            let event = self.reader.read_event_into(&mut self.buf).map_err(|e| {
                IngestError::ReadError {
                    path: self.source_file.clone().into(),
                    row: self.row,
                    cause: e.to_string(),
                }
            })?;
            match event {
                Event::Eof => break,
                Event::Start(tag) => {
                    let name = local_name(&tag.name().as_ref().to_vec());
                    if depth == 0 {
                        current_field = Some(name);
                    }
                    depth += 1;
                }
                Event::Text(text) => {
                    if let Some(field) = &current_field {
                        let value = text
                            .unescape()
                            .map(|cow| cow.into_owned())
                            .unwrap_or_default();
                        if !value.trim().is_empty() {
                            fields.push((field.clone(), value.trim().to_string()));
                        }
                    }
                }
                Event::End(tag) => {
                    let name = local_name(&tag.name().as_ref().to_vec());
                    if name == "record" && depth == 0 {
                        break;
                    }
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        current_field = None;
                    }
                }
                _ => {}
            }
        }
        Ok(fields)
    }
}

impl Iterator for StructuredReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let fields = match self.next_fields() {
            Ok(None) => return None,
            Ok(Some(fields)) => fields,
            Err(e) => return Some(Err(e)),
        };

        let address = fields
            .iter()
            .find(|(name, _)| ADDRESS_ELEMENTS.contains(&name.as_str()))
            .map(|(_, value)| value.clone())
            .unwrap_or_default();

        let mut metadata = Metadata::default();
        for (name, value) in &fields {
            match name.as_str() {
                "source_url" => metadata.source_url = Some(value.clone()),
                "page_title" => metadata.page_title = Some(value.clone()),
                "company_name" => metadata.company_name = Some(value.clone()),
                "phone" => metadata.phone = Some(value.clone()),
                "country" => metadata.country = Some(value.clone()),
                "city" => metadata.city = Some(value.clone()),
                "address_line" => metadata.address_line = Some(value.clone()),
                "meta_description" => metadata.meta_description = Some(value.clone()),
                "meta_keywords" => metadata.meta_keywords = Some(value.clone()),
                "category" => metadata.category = Some(value.clone()),
                "validation_status" => metadata.validation_status = Some(value.clone()),
                "validation_log" => metadata.validation_log = Some(value.clone()),
                "validation_date" => metadata.validation_date = Some(value.clone()),
                "address" | "email" => {}
                other => {
                    metadata.extras.insert(other.to_string(), value.clone());
                }
            }
        }

        let record = Record::new(address, self.source_file.clone(), self.row).with_metadata(metadata);
        Some(Ok(record))
    }
}

/// Strip namespace prefix or `{uri}` qualification, leaving the bare
/// element name, so alternate namespaces don't break field recognition.
fn local_name(qualified: &[u8]) -> String {
    let s = String::from_utf8_lossy(qualified);
    s.rsplit(':').next().unwrap_or(&s).to_lowercase()
}

/// Strip 0x00-0x1F except tab/LF/CR (0x09, 0x0A, 0x0D), per §4.E.
fn strip_control_chars(raw: &[u8]) -> Vec<u8> {
    raw.iter()
        .copied()
        .filter(|&b| b >= 0x20 || b == 0x09 || b == 0x0A || b == 0x0D)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_address_and_metadata() {
        let xml = br#"<records>
            <record>
                <address>lee@acme.io</address>
                <company_name>ACME Ltd</company_name>
                <country>Italy</country>
            </record>
        </records>"#;
        let mut reader = StructuredReader::new(xml, "f.xml");
        let record = reader.next().unwrap().unwrap();
        assert_eq!(record.raw_address, "lee@acme.io");
        let metadata = record.metadata.unwrap();
        assert_eq!(metadata.company_name.as_deref(), Some("ACME Ltd"));
        assert_eq!(metadata.country.as_deref(), Some("Italy"));
        assert!(reader.next().is_none());
    }

    #[test]
    fn tolerates_namespace_prefixes() {
        let xml = br#"<ns:records xmlns:ns="urn:x">
            <ns:record><ns:email>a@b.com</ns:email></ns:record>
        </ns:records>"#;
        let mut reader = StructuredReader::new(xml, "f.xml");
        let record = reader.next().unwrap().unwrap();
        assert_eq!(record.raw_address, "a@b.com");
    }

    #[test]
    fn record_without_address_is_emitted_not_dropped() {
        let xml = br#"<records><record><company_name>NoAddress Inc</company_name></record></records>"#;
        let mut reader = StructuredReader::new(xml, "f.xml");
        let record = reader.next().unwrap().unwrap();
        assert_eq!(record.raw_address, "");
    }

    #[test]
    fn strips_control_characters_before_parsing() {
        let mut xml = b"<records><record><address>a@b.com</address></record></records>".to_vec();
        xml.insert(10, 0x02);
        let mut reader = StructuredReader::new(&xml, "f.xml");
        let record = reader.next().unwrap().unwrap();
        assert_eq!(record.raw_address, "a@b.com");
    }

    #[test]
    fn unknown_elements_land_in_extras() {
        let xml = br#"<records><record><address>a@b.com</address><vendor_tag>xyz</vendor_tag></record></records>"#;
        let mut reader = StructuredReader::new(xml, "f.xml");
        let record = reader.next().unwrap().unwrap();
        let metadata = record.metadata.unwrap();
        assert_eq!(metadata.extras.get("vendor_tag"), Some(&"xyz".to_string()));
    }
}
