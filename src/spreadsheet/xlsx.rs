//! Office Open XML workbook reader (`.xlsx`, `.xlsm`).
//!
//! Only cell text matters to the table definition parser, so number formats
//! and styles are ignored: numbers keep their stored literal, booleans become
//! `TRUE`/`FALSE`, and shared strings are resolved eagerly.
use crate::error::TableDefError;
use crate::helpers::xml::attribute_text;
use crate::helpers::xml::ElementExt;
use crate::helpers::xml::TextExt;
use crate::helpers::xml::XmlReader;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::SpreadsheetError;
use crate::spreadsheet::Workbook;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

const TAG_RELATIONSHIP: &[u8] = b"Relationship";
const TAG_SHARED_STRING_ITEM: QName = QName(b"si"); // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");     // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                // Text content within strings
const TAG_SHEET: QName = QName(b"sheet");           // Worksheet definition
const TAG_ROW: QName = QName(b"row");               // Row in worksheet
const TAG_CELL: QName = QName(b"c");                // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");      // Inline string value
const TAG_VALUE: QName = QName(b"v");               // Cell value content

/// How the text of a `<c>` element is to be interpreted
#[derive(Copy, Clone, Debug, PartialEq)]
enum CellKind {
    Literal,
    SharedString,
    Boolean,
}

/// An Office Open XML workbook opened for reading
pub struct XlsxWorkbook<RS: Read + Seek = BufReader<File>> {
    name: String,
    zip: ZipArchive<RS>,
    /// Worksheets as (name, zip path) pairs
    sheets: Vec<(String, String)>,
    shared_strings: Option<Vec<String>>,
}

impl XlsxWorkbook {
    /// Opens a workbook file and loads its worksheet list.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TableDefError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        XlsxWorkbook::from_reader(&path.display().to_string(), BufReader::new(file))
    }
}

impl<RS: Read + Seek> XlsxWorkbook<RS> {
    /// Reads a workbook from any seekable source.
    pub fn from_reader(name: &str, reader: RS) -> Result<Self, TableDefError> {
        let mut zip = ZipArchive::new(reader)?;
        let sheets = load_workbook(&mut zip)?;
        if sheets.is_empty() {
            Err(SpreadsheetError::EmptyWorkbook(name.to_owned()))?
        }
        Ok(XlsxWorkbook {
            name: name.to_owned(),
            zip,
            sheets,
            shared_strings: None,
        })
    }

    fn load_shared_strings(&mut self) -> Result<Vec<String>, TableDefError> {
        let mut shared_strings = Vec::<String>::new();
        let mut reader = match self.zip.xml_reader("xl/sharedStrings.xml")? {
            Some(reader) => reader,
            None => return Ok(shared_strings),
        };
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
                shared_strings.push(read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?);
            }
        });
        Ok(shared_strings)
    }

    fn read_worksheet(&mut self, sheet_name: &str, zip_path: &str) -> Result<Sheet, TableDefError> {
        if self.shared_strings.is_none() {
            self.shared_strings = Some(self.load_shared_strings()?);
        }
        let shared_strings = self.shared_strings.as_deref().unwrap_or_default();

        let mut sheet = Sheet::new(sheet_name);
        let mut reader = self
            .zip
            .xml_reader(zip_path)?
            .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind = CellKind::Literal;
        let mut value = String::new();
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                if let Some(number) = event.parse_attribute::<usize>("r")? {
                    row_count = number.saturating_sub(1);
                }
                col_count = 0;
            }
            Event::End(event) if event.name() == TAG_ROW => {
                row_count += 1;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = event
                    .attribute("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((row_count, col_count));
                col_count = col + 1;
                kind = match event.attribute("t")?.as_deref() {
                    Some("s") => CellKind::SharedString,
                    Some("b") => CellKind::Boolean,
                    _ => CellKind::Literal,
                };
                value.clear();
            }
            Event::Start(event) if event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if event.name() == TAG_CELL => {
                let text = match kind {
                    CellKind::SharedString => {
                        let index = value.trim().parse::<usize>()?;
                        shared_strings.get(index).map(String::as_str).unwrap_or_default()
                    }
                    CellKind::Boolean if value.trim() == "1" => "TRUE",
                    CellKind::Boolean => "FALSE",
                    CellKind::Literal => value.as_str(),
                };
                sheet.set(row, col, text);
            }
        });
        debug!(sheet = sheet_name, rows = sheet.rows.len(), "read xlsx worksheet");
        Ok(sheet)
    }
}

impl<RS: Read + Seek> Workbook for XlsxWorkbook<RS> {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.to_owned()).collect()
    }

    fn read_sheets(&mut self, criteria: &Criteria) -> Result<Vec<Sheet>, TableDefError> {
        let mut sheets = Vec::<Sheet>::new();
        for (sheet_name, zip_path) in self.sheets.clone() {
            if criteria.is_full(sheets.len()) {
                break;
            }
            if criteria.accept(&sheet_name) {
                sheets.push(self.read_worksheet(&sheet_name, &zip_path)?);
            }
        }
        Ok(sheets)
    }
}

/// Loads the worksheet names and their archive paths from `xl/workbook.xml`.
fn load_workbook<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<(String, String)>, TableDefError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip
        .xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::FileError("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute_text(&attribute)?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute_text(&attribute)?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(id.as_ref()) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
    });
    Ok(sheets)
}

/// Maps relationship ids to worksheet paths inside the archive.
fn load_relationships<RS: Read + Seek>(zip: &mut ZipArchive<RS>, path: &str) -> Result<HashMap<String, String>, TableDefError> {
    let mut reader = zip
        .xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.attribute("Id")?;
            let kind = event.attribute("Type")?;
            let target = event.attribute("Target")?;
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(&target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Normalizes a relationship target to an archive path under `xl/`.
fn to_zip_path(path: &str) -> String {
    if let Some(stripped) = path.strip_prefix('/') {
        stripped.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

/// Reads the text of a string element up to `end_tag`, skipping phonetic runs.
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, TableDefError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_reference(&event)?,
    });
    Ok(text)
}
