//! quick-xml plumbing shared by the `.xlsx` and `.ods` readers.
//!
//! Workbook parts are read as a flat event stream; the readers only ever need
//! attribute text, numeric attributes and entity references inside text runs.

use crate::error::TableDefError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Unknown XML entity '&{0};'")]
    UnknownEntity(String),

    #[error("Attribute value '{0}' has an unexpected format")]
    AttributeFormat(String),
}

/// Event reader with one reusable buffer. Empty elements are reported as a
/// start/end pair and text is never trimmed, so `<c/>` and `<c></c>` read alike.
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub(crate) fn new(source: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(source);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        XmlReader {
            reader,
            buffer: Vec::with_capacity(1024),
        }
    }

    /// `None` once the document is exhausted.
    pub(crate) fn read_event(&'_ mut self) -> Result<Option<Event<'_>>, TableDefError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer)? {
            Event::Eof => Ok(None),
            event => Ok(Some(event)),
        }
    }
}

/// Unescaped text of an attribute.
pub(crate) fn attribute_text<'a>(attribute: &Attribute<'a>) -> Result<Cow<'a, str>, TableDefError> {
    Ok(attribute.unescape_value()?)
}

/// Attribute lookup on start tags, by qualified name (`table:name`).
pub(crate) trait ElementExt<'a> {
    fn attribute(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, TableDefError>;

    fn parse_attribute<T: FromStr>(&'a self, name: &str) -> Result<Option<T>, TableDefError>;
}

impl<'a> ElementExt<'a> for BytesStart<'a> {
    fn attribute(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, TableDefError> {
        match self.try_get_attribute(name)? {
            Some(attribute) => Ok(Some(attribute_text(&attribute)?)),
            None => Ok(None),
        }
    }

    fn parse_attribute<T: FromStr>(&'a self, name: &str) -> Result<Option<T>, TableDefError> {
        let Some(text) = self.attribute(name)? else {
            return Ok(None);
        };
        match text.parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => Err(XmlError::AttributeFormat(text.into_owned()).into()),
        }
    }
}

pub(crate) trait TextExt {
    /// Appends the character an entity (`&amp;`) or character reference (`&#x41;`) stands for.
    fn push_reference(&mut self, reference: &BytesRef) -> Result<(), TableDefError>;
}

impl TextExt for String {
    fn push_reference(&mut self, reference: &BytesRef) -> Result<(), TableDefError> {
        let raw = reference.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = match number.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16)?,
                None => number.parse::<u32>()?,
            };
            self.extend(char::from_u32(code));
            return Ok(());
        }
        match resolve_xml_entity(&raw) {
            Some(text) => self.push_str(text),
            None => Err(XmlError::UnknownEntity(raw.to_string()))?,
        }
        Ok(())
    }
}

/// Drives an [`XmlReader`] to the end of the document, feeding each event to
/// the given arms; anything unmatched is skipped.
#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(event) = $reader.read_event()? {
            match event {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}
