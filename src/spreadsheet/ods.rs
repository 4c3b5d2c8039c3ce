//! OpenDocument spreadsheet reader (`.ods`).
use crate::error::TableDefError;
use crate::helpers::xml::ElementExt;
use crate::helpers::xml::TextExt;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::SpreadsheetError;
use crate::spreadsheet::Workbook;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// ODS file MIME type identifier
const MIME_TYPE: &[u8] = b"application/vnd.oasis.opendocument.spreadsheet";
const CONTENT: &str = "content.xml";
/// XML element name for table (sheet)
const TABLE: QName = QName(b"table:table");
/// XML element name for table row
const TABLE_ROW: QName = QName(b"table:table-row");
/// XML element name for table cell
const TABLE_CELL: QName = QName(b"table:table-cell");
/// XML element name for covered table cell (merged cells)
const TABLE_COVERED_CELL: QName = QName(b"table:covered-table-cell");
/// XML element name for annotations (comments)
const ANNOTATION: QName = QName(b"office:annotation");
/// XML element name for paragraph text
const PARAGRAPH: QName = QName(b"text:p");
/// XML element name for string (space) text
const STRING: QName = QName(b"text:s");

/// Repeat counts above this are treated as 1; spreadsheet applications pad
/// sheets with huge runs of empty repeated rows and columns.
const MAX_REPEAT: usize = 1024;

/// An OpenDocument workbook opened for reading
pub struct OdsWorkbook<RS: Read + Seek = BufReader<File>> {
    name: String,
    zip: ZipArchive<RS>,
    sheet_names: Vec<String>,
}

impl OdsWorkbook {
    /// Opens an ODS file and validates its format.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TableDefError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        OdsWorkbook::from_reader(&path.display().to_string(), BufReader::new(file))
    }
}

impl<RS: Read + Seek> OdsWorkbook<RS> {
    /// Reads a workbook from any seekable source.
    pub fn from_reader(name: &str, reader: RS) -> Result<Self, TableDefError> {
        let mut zip = ZipArchive::new(reader)?;
        check_mime(&mut zip)?;
        let sheet_names = load_sheet_names(&mut zip)?;
        if sheet_names.is_empty() {
            Err(SpreadsheetError::EmptyWorkbook(name.to_owned()))?
        }
        Ok(OdsWorkbook {
            name: name.to_owned(),
            zip,
            sheet_names,
        })
    }
}

impl<RS: Read + Seek> Workbook for OdsWorkbook<RS> {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheet_names.clone()
    }

    fn read_sheets(&mut self, criteria: &Criteria) -> Result<Vec<Sheet>, TableDefError> {
        let mut sheets = Vec::<Sheet>::new();
        let mut reader = self
            .zip
            .xml_reader(CONTENT)?
            .ok_or_else(|| SpreadsheetError::FileError(CONTENT.to_owned()))?;

        let mut sheet: Option<Sheet> = None;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut row_count = 1usize;
        let mut col_count = 1usize;
        let mut value = String::new();
        let mut text_context = false; // inside a cell holding text
        let mut comment_context = false; // inside an annotation
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TABLE => {
                if criteria.is_full(sheets.len()) {
                    break;
                }
                let name = event.attribute("table:name")?.unwrap_or_default();
                sheet = criteria.accept(&name).then(|| Sheet::new(&name));
                row = 0;
            }
            Event::End(event) if event.name() == TABLE => {
                if let Some(sheet) = sheet.take() {
                    debug!(sheet = sheet.name.as_str(), rows = sheet.rows.len(), "read ods worksheet");
                    sheets.push(sheet);
                }
            }
            Event::Start(event) if sheet.is_some() && event.name() == TABLE_ROW => {
                row_count = repeat(event.parse_attribute("table:number-rows-repeated")?);
                col = 0;
            }
            Event::End(event) if sheet.is_some() && event.name() == TABLE_ROW => {
                row += row_count;
            }
            Event::Start(event) if sheet.is_some() && (event.name() == TABLE_CELL || event.name() == TABLE_COVERED_CELL) => {
                value.clear();
                col_count = repeat(event.parse_attribute("table:number-columns-repeated")?);
                let value_type = event.attribute("office:value-type")?;
                match value_type.as_deref() {
                    Some("string") | None => text_context = true,
                    Some("boolean") => {
                        let flag = event.attribute("office:boolean-value")?;
                        value.push_str(if flag.map(|it| it != "false" && it != "0").unwrap_or(false) { "TRUE" } else { "FALSE" });
                    }
                    Some("date") => value.push_str(&event.attribute("office:date-value")?.unwrap_or_default()),
                    Some("time") => value.push_str(&event.attribute("office:time-value")?.unwrap_or_default()),
                    Some(_) => value.push_str(&event.attribute("office:value")?.unwrap_or_default()),
                }
            }
            Event::End(event) if event.name() == TABLE_CELL || event.name() == TABLE_COVERED_CELL => {
                if let Some(sheet) = sheet.as_mut() {
                    if !value.is_empty() {
                        for row_offset in 0..row_count {
                            for col_offset in 0..col_count {
                                sheet.set(row + row_offset, col + col_offset, &value);
                            }
                        }
                    }
                }
                col += col_count;
                text_context = false;
                comment_context = false;
            }
            Event::Start(event) if text_context && event.name() == ANNOTATION => comment_context = true,
            Event::End(event) if text_context && event.name() == ANNOTATION => comment_context = false,
            Event::Start(event) if text_context && !comment_context && event.name() == PARAGRAPH => {
                if !value.is_empty() {
                    value.push('\n');
                }
            }
            Event::Start(event) if text_context && !comment_context && event.name() == STRING => {
                let count = event.parse_attribute("text:c")?.unwrap_or(1usize);
                for _ in 0..count {
                    value.push(' ');
                }
            }
            Event::Text(event) if text_context && !comment_context => value.push_str(&event.xml_content()?),
            Event::GeneralRef(event) if text_context && !comment_context => value.push_reference(&event)?,
        });
        Ok(sheets)
    }
}

fn repeat(count: Option<usize>) -> usize {
    match count {
        Some(count) if count > 0 && count <= MAX_REPEAT => count,
        _ => 1,
    }
}

/// Validates that the archive declares the spreadsheet MIME type.
fn check_mime<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<(), TableDefError> {
    if let Some(mut file) = zip.file("mimetype")? {
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        if buffer.as_slice() != MIME_TYPE {
            Err(SpreadsheetError::MimeTypeError)?;
        }
    }
    Ok(())
}

/// Collects the table names from `content.xml` without reading any cell.
fn load_sheet_names<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<String>, TableDefError> {
    let mut reader = zip
        .xml_reader(CONTENT)?
        .ok_or_else(|| SpreadsheetError::FileError(CONTENT.to_owned()))?;
    let mut names = Vec::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TABLE => {
            if let Some(name) = event.attribute("table:name")? {
                names.push(name.to_string());
            }
        }
    });
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::Grid;
    use std::io::Cursor;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const CONTENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0">
<office:body><office:spreadsheet>
<table:table table:name="users">
<table:table-row table:number-rows-repeated="2"><table:table-cell/></table:table-row>
<table:table-row>
<table:table-cell table:number-columns-repeated="2"/>
<table:table-cell office:value-type="string"><text:p>created<text:s text:c="2"/>at</text:p><office:annotation><text:p>note</text:p></office:annotation></table:table-cell>
<table:table-cell office:value-type="float" office:value="32"><text:p>32</text:p></table:table-cell>
<table:table-cell office:value-type="boolean" office:boolean-value="true"><text:p>TRUE</text:p></table:table-cell>
</table:table-row>
<table:table-row table:number-rows-repeated="1048570"><table:table-cell table:number-columns-repeated="16384"/></table:table-row>
</table:table>
<table:table table:name="common"><table:table-row><table:table-cell><text:p>a &amp; b</text:p></table:table-cell></table:table-row></table:table>
</office:spreadsheet></office:body></office:document-content>"#;

    fn archive(mime: &str) -> Cursor<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("mimetype", SimpleFileOptions::default()).unwrap();
        writer.write_all(mime.as_bytes()).unwrap();
        writer.start_file("content.xml", SimpleFileOptions::default()).unwrap();
        writer.write_all(CONTENT_XML.as_bytes()).unwrap();
        Cursor::new(writer.finish().unwrap().into_inner())
    }

    #[test]
    fn reads_sheet_names() {
        let workbook = OdsWorkbook::from_reader("t.ods", archive("application/vnd.oasis.opendocument.spreadsheet")).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["users", "common"]);
    }

    #[test]
    fn reads_cells_with_repeats() {
        let mut workbook = OdsWorkbook::from_reader("t.ods", archive("application/vnd.oasis.opendocument.spreadsheet")).unwrap();
        let sheet = workbook.read_sheet("users").unwrap();
        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.value(2, 2), "created  at");
        assert_eq!(sheet.value(2, 3), "32");
        assert_eq!(sheet.value(2, 4), "TRUE");
        assert_eq!(sheet.value(0, 0), "");

        let common = workbook.read_sheet("common").unwrap();
        assert_eq!(common.value(0, 0), "a & b");
    }

    #[test]
    fn rejects_other_mime_type() {
        let result = OdsWorkbook::from_reader("t.odt", archive("application/vnd.oasis.opendocument.text"));
        assert!(matches!(
            result,
            Err(TableDefError::SpreadsheetError(SpreadsheetError::MimeTypeError))
        ));
    }
}
