//! Best-effort DOCX text recovery.
//!
//! A DOCX is a zip archive whose body lives in `word/document.xml`. When the
//! archive opens, that part is read and its markup stripped, with paragraph
//! ends kept as newlines. When the bytes are not a zip, or the zip has no
//! document part, they are decoded lossily and stripped of tags directly.

use std::io::{Cursor, Read};

use once_cell::sync::Lazy;
use regex::Regex;

use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static PARAGRAPH_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</w:p>|<w:br\s*/>|<w:cr\s*/>").unwrap());
static TAB_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<w:tab\s*/>").unwrap());
static CHAR_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(?:[xX]([0-9A-Fa-f]{1,6})|([0-9]{1,7}));").unwrap());

pub(super) fn recover_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = match zip::ZipArchive::new(Cursor::new(bytes)) {
        Ok(archive) => archive,
        Err(_) => return Ok(strip_tags(&String::from_utf8_lossy(bytes))),
    };
    let mut part = match archive.by_name(DOCUMENT_PART) {
        Ok(part) => part,
        Err(_) => return Ok(strip_tags(&String::from_utf8_lossy(bytes))),
    };

    let mut raw = Vec::new();
    part.read_to_end(&mut raw)
        .map_err(|e| ExtractionError::ExtractionFailed(Box::new(e)))?;
    let xml = String::from_utf8_lossy(&raw);

    let xml = PARAGRAPH_END_RE.replace_all(&xml, "\n");
    let xml = TAB_RE.replace_all(&xml, "\t");
    Ok(decode_entities(&strip_tags(&xml)))
}

fn strip_tags(markup: &str) -> String {
    TAG_RE.replace_all(markup, "").into_owned()
}

/// Numeric references first, so `&amp;#38;` stays a literal `&#38;`.
fn decode_entities(text: &str) -> String {
    let text = CHAR_REF_RE.replace_all(text, |caps: &regex::Captures| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse::<u32>().ok(),
            _ => None,
        };
        match code.and_then(char::from_u32) {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    });
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;

    fn build_docx(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            for (name, body) in parts {
                writer
                    .start_file(*name, SimpleFileOptions::default())
                    .unwrap();
                writer.write_all(body.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        buf.into_inner()
    }

    #[test]
    fn test_reads_document_part_from_archive() {
        let xml = r#"<?xml version="1.0"?><w:document><w:body><w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p><w:p><w:r><w:t>R&amp;D Engineer</w:t><w:tab/><w:t>Remote</w:t></w:r></w:p></w:body></w:document>"#;
        let bytes = build_docx(&[("[Content_Types].xml", "<Types/>"), (DOCUMENT_PART, xml)]);

        let text = recover_text(&bytes).unwrap();

        assert_eq!(text, "Jane Doe\nR&D Engineer\tRemote\n");
    }

    #[test]
    fn test_archive_without_document_part_is_stripped_as_text() {
        let bytes = build_docx(&[("word/styles.xml", "<w:styles/>")]);
        let text = recover_text(&bytes).unwrap();
        assert!(!text.contains("<w:styles/>"));
    }

    #[test]
    fn test_document_part_with_invalid_utf8_is_decoded_lossily() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            writer
                .start_file(DOCUMENT_PART, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"<w:p><w:t>Jos\xe9</w:t></w:p>").unwrap();
            writer.finish().unwrap();
        }

        let text = recover_text(&buf.into_inner()).unwrap();

        assert_eq!(text, "Jos\u{FFFD}\n");
    }

    #[test]
    fn test_corrupt_document_part_fails() {
        let xml = "<w:p><w:t>Jane Doe</w:t></w:p>";
        let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            writer.start_file(DOCUMENT_PART, stored).unwrap();
            writer.write_all(xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        let mut bytes = buf.into_inner();
        let at = bytes.windows(4).position(|w| w == b"Jane").unwrap();
        bytes[at + 1] = b'o';

        assert!(matches!(
            recover_text(&bytes),
            Err(ExtractionError::ExtractionFailed(_))
        ));
    }

    #[test]
    fn test_numeric_character_references() {
        assert_eq!(
            decode_entities("Jane&#8217;s work, 2019&#x2013;2021 &amp;#38; more"),
            "Jane\u{2019}s work, 2019\u{2013}2021 &#38; more"
        );
        assert_eq!(decode_entities("&#xD800; &#99999999;"), "&#xD800; &#99999999;");
    }

    #[test]
    fn test_non_archive_bytes_are_stripped_as_text() {
        let text = recover_text(b"<p>Jane <b>Doe</b></p>\njane@example.com").unwrap();
        assert_eq!(text, "Jane Doe\njane@example.com");
    }
}
