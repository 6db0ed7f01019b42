//! In-place editing of the enclave heap size in `Enclave.config.xml`.
//!
//! Only the text of the target element changes; every other byte of the file
//! (declaration, comments, indentation, attribute quoting) is kept as is.

use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs;
use std::path::Path;

/// Error type for heap configuration edits.
#[derive(Debug)]
pub enum HeapConfigError {
    Io(String),
    Xml(String),
    MissingElement(String),
    InvalidValue(String),
}

impl std::fmt::Display for HeapConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeapConfigError::Io(msg) => write!(f, "I/O error: {}", msg),
            HeapConfigError::Xml(msg) => write!(f, "Malformed XML: {}", msg),
            HeapConfigError::MissingElement(name) => write!(f, "Element <{}> not found", name),
            HeapConfigError::InvalidValue(value) => write!(f, "Invalid value '{}'", value),
        }
    }
}

impl std::error::Error for HeapConfigError {}

/// Parse an integer with automatic base detection.
///
/// Accepts decimal (`16777216`), hex (`0x1000000`), octal (`0o100`) and
/// binary (`0b101`), with `_` between digits and an optional `+`. Decimal
/// values other than zero may not have leading zeros. The value must fit in
/// 64 bits, the width of the enclave heap size field.
pub fn parse_heap_size(arg: &str) -> Result<u64, HeapConfigError> {
    let invalid = || HeapConfigError::InvalidValue(arg.to_string());

    let trimmed = arg.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let lower = unsigned.to_ascii_lowercase();
    let (radix, digits) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest.strip_prefix('_').unwrap_or(rest))
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest.strip_prefix('_').unwrap_or(rest))
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest.strip_prefix('_').unwrap_or(rest))
    } else {
        (10, lower.as_str())
    };

    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return Err(invalid());
    }
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    if !cleaned.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid());
    }
    if radix == 10 && cleaned.len() > 1 && cleaned.starts_with('0') && cleaned.chars().any(|c| c != '0') {
        return Err(invalid());
    }
    u64::from_str_radix(&cleaned, radix).map_err(|_| invalid())
}

/// Replace the text of the first `element` directly under the root.
///
/// # Returns
///
/// The edited document, or `MissingElement` if the root has no such child.
pub fn set_element_text(xml: &str, element: &str, value: &str) -> Result<String, HeapConfigError> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;

    loop {
        match reader.read_event().map_err(|e| HeapConfigError::Xml(e.to_string()))? {
            Event::Start(start) => {
                if depth == 1 && start.name().as_ref() == element.as_bytes() {
                    let content_start = reader.buffer_position() as usize;
                    let content_end = matching_end_offset(&mut reader, xml, element)?;
                    return Ok(format!("{}{}{}", &xml[..content_start], value, &xml[content_end..]));
                }
                depth += 1;
            }
            Event::Empty(empty) => {
                if depth == 1 && empty.name().as_ref() == element.as_bytes() {
                    let tag_end = reader.buffer_position() as usize;
                    let tag_start = xml[..tag_end]
                        .rfind('<')
                        .ok_or_else(|| HeapConfigError::Xml(format!("malformed <{}/>", element)))?;
                    let open_tag = xml[tag_start..tag_end].trim_end_matches('>').trim_end_matches('/').trim_end();
                    return Ok(format!(
                        "{}{}>{}</{}>{}",
                        &xml[..tag_start],
                        open_tag,
                        value,
                        element,
                        &xml[tag_end..]
                    ));
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => return Err(HeapConfigError::MissingElement(element.to_string())),
            _ => {}
        }
    }
}

/// Byte offset of the `</element>` closing the element just opened.
///
/// Comments, CDATA and nested children in between are skipped over, so the
/// whole content is replaced.
fn matching_end_offset(reader: &mut Reader<&[u8]>, xml: &str, element: &str) -> Result<usize, HeapConfigError> {
    let mut nested = 0usize;
    loop {
        match reader.read_event().map_err(|e| HeapConfigError::Xml(e.to_string()))? {
            Event::Start(_) => nested += 1,
            Event::End(_) if nested == 0 => {
                let tag_end = reader.buffer_position() as usize;
                return xml[..tag_end]
                    .rfind("</")
                    .ok_or_else(|| HeapConfigError::Xml(format!("malformed </{}>", element)));
            }
            Event::End(_) => nested -= 1,
            Event::Eof => return Err(HeapConfigError::Xml(format!("unterminated <{}>", element))),
            _ => {}
        }
    }
}

/// Rewrite `element` in the configuration file at `path`.
pub fn set_heap(path: &Path, element: &str, value: &str) -> Result<(), HeapConfigError> {
    let xml = fs::read_to_string(path).map_err(|e| HeapConfigError::Io(format!("{}: {}", path.display(), e)))?;
    let updated = set_element_text(&xml, element, value)?;
    fs::write(path, updated).map_err(|e| HeapConfigError::Io(format!("{}: {}", path.display(), e)))?;
    log::info!("Set <{}> to {} in {}", element, value, path.display());
    Ok(())
}
