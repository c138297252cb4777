//! Word documents (`.docx`): plain paragraph text in and out.
//!
//! A `.docx` is a zip package whose main part (normally `word/document.xml`)
//! holds the body as WordprocessingML. Only body-level `<w:p>` paragraphs are
//! read, and only their run text: styles, images, tables and text boxes are
//! dropped. Writing produces the smallest package Word opens: content types,
//! the package relationship, and a document part with one `<w:p>` per input
//! string.

use crate::error::ConvertError;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::io::{Cursor, Read, Write};
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const DEFAULT_MAIN_PART: &str = "word/document.xml";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

// US Letter, 1" margins, in twentieths of a point.
const DOCUMENT_TAIL: &str = r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#;

// ── Reading ──────────────────────────────────────────────────────────────────

/// Extract the text of every body paragraph, in document order.
///
/// Within a paragraph, `<w:tab/>` becomes `\t`, `<w:br/>` and `<w:cr/>`
/// become `\n`, and `<w:noBreakHyphen/>` becomes `-`. Empty paragraphs are
/// kept as empty strings.
pub fn read_paragraphs(bytes: &[u8], filename: &str) -> Result<Vec<String>, ConvertError> {
    let invalid = |detail: String| ConvertError::InvalidDocx {
        filename: filename.to_string(),
        detail,
    };

    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| invalid(format!("not a zip package: {e}")))?;

    let main_part = match read_part(&mut archive, "_rels/.rels") {
        Some(rels) => main_part_from_rels(&rels).unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()),
        None => DEFAULT_MAIN_PART.to_string(),
    };
    debug!("Main document part: {}", main_part);

    let xml = read_part(&mut archive, &main_part)
        .ok_or_else(|| invalid(format!("missing part '{main_part}'")))?;

    let paragraphs = parse_body_paragraphs(&xml).map_err(invalid)?;
    debug!("Read {} paragraphs from '{}'", paragraphs.len(), filename);
    Ok(paragraphs)
}

fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Option<String> {
    let mut file = archive.by_name(name).ok()?;
    let mut xml = String::new();
    file.read_to_string(&mut xml).ok()?;
    Some(xml)
}

/// Find the `officeDocument` relationship target in `_rels/.rels`.
fn main_part_from_rels(rels: &str) -> Option<String> {
    let mut reader = Reader::from_str(rels);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut is_main = false;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().ok()?.into_owned();
                    match attr.key.local_name().as_ref() {
                        b"Type" => is_main = value.ends_with(OFFICE_DOCUMENT_REL),
                        b"Target" => target = Some(value),
                        _ => {}
                    }
                }
                if is_main {
                    return target.map(|t| t.trim_start_matches('/').to_string());
                }
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// Walk the document XML and collect body-level paragraph text.
fn parse_body_paragraphs(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    // Depth of the body paragraph element in `stack`, and how many
    // paragraphs (text boxes) are open inside it.
    let mut para_depth = 0usize;
    let mut nested_paras = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("malformed XML at byte {}: {e}", reader.buffer_position()))?;
        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"p" {
                    if current.is_none() && parent_is(&stack, b"body") {
                        current = Some(String::new());
                        para_depth = stack.len() + 1;
                    } else if current.is_some() {
                        nested_paras += 1;
                    }
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name();
                let name = name.as_ref();
                if name == b"p" && current.is_none() && parent_is(&stack, b"body") {
                    paragraphs.push(String::new());
                } else if let Some(text) = current.as_mut() {
                    if nested_paras == 0 && parent_is(&stack, b"r") {
                        match name {
                            b"tab" => text.push('\t'),
                            b"br" | b"cr" => text.push('\n'),
                            b"noBreakHyphen" => text.push('-'),
                            _ => {}
                        }
                    }
                }
            }
            Event::Text(t) => {
                if let Some(text) = current.as_mut() {
                    if nested_paras == 0 && in_run_text(&stack) {
                        let s = t.unescape().map_err(|e| format!("bad text escape: {e}"))?;
                        text.push_str(&s);
                    }
                }
            }
            Event::CData(t) => {
                if let Some(text) = current.as_mut() {
                    if nested_paras == 0 && in_run_text(&stack) {
                        text.push_str(&String::from_utf8_lossy(&t));
                    }
                }
            }
            Event::End(e) => {
                let depth = stack.len();
                stack.pop();
                if e.local_name().as_ref() == b"p" && current.is_some() {
                    if depth == para_depth {
                        paragraphs.extend(current.take());
                    } else {
                        nested_paras = nested_paras.saturating_sub(1);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err("unexpected end of document XML".to_string());
    }
    Ok(paragraphs)
}

fn parent_is(stack: &[Vec<u8>], name: &[u8]) -> bool {
    stack.last().map(|n| n.as_slice() == name).unwrap_or(false)
}

fn in_run_text(stack: &[Vec<u8>]) -> bool {
    let n = stack.len();
    n >= 2 && stack[n - 1] == b"t" && stack[n - 2] == b"r"
}

// ── Writing ──────────────────────────────────────────────────────────────────

/// Build a `.docx` package with one paragraph per input string.
///
/// `\n` inside a string becomes a line break and `\t` a tab; an empty string
/// becomes an empty paragraph.
pub fn write_paragraphs(paragraphs: &[String]) -> Result<Vec<u8>, ConvertError> {
    let mut document = String::from(DOCUMENT_HEAD);
    for p in paragraphs {
        push_paragraph(&mut document, p);
    }
    document.push_str(DOCUMENT_TAIL);

    let archive_err = |detail: String| ConvertError::ArchiveFailed {
        name: "converted.docx".to_string(),
        detail,
    };

    let mut buf = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buf));
        for (name, body) in [
            ("[Content_Types].xml", CONTENT_TYPES_XML),
            ("_rels/.rels", PACKAGE_RELS_XML),
            (DEFAULT_MAIN_PART, document.as_str()),
        ] {
            let options: FileOptions<()> =
                FileOptions::default().compression_method(CompressionMethod::Deflated);
            zip.start_file(name, options)
                .map_err(|e| archive_err(e.to_string()))?;
            zip.write_all(body.as_bytes())
                .map_err(|e| archive_err(e.to_string()))?;
        }
        zip.finish().map_err(|e| archive_err(e.to_string()))?;
    }
    debug!("Wrote {} paragraphs into {} byte docx", paragraphs.len(), buf.len());
    Ok(buf)
}

fn push_paragraph(out: &mut String, text: &str) {
    if text.is_empty() {
        out.push_str("<w:p/>");
        return;
    }
    out.push_str("<w:p><w:r>");
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<w:br/>");
        }
        for (j, segment) in line.split('\t').enumerate() {
            if j > 0 {
                out.push_str("<w:tab/>");
            }
            if !segment.is_empty() {
                out.push_str(r#"<w:t xml:space="preserve">"#);
                out.push_str(&escape(segment));
                out.push_str("</w:t>");
            }
        }
    }
    out.push_str("</w:r></w:p>");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(document_xml: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buf));
            let options: FileOptions<()> = FileOptions::default();
            zip.start_file("word/document.xml", options).unwrap();
            zip.write_all(document_xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        buf
    }

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    #[test]
    fn reads_body_paragraphs_in_order() {
        let xml = format!(
            r#"<w:document {W}><w:body>
<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:p>
<w:p/>
<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c &amp; d</w:t></w:r></w:p>
</w:body></w:document>"#
        );
        let paras = read_paragraphs(&package(&xml), "t.docx").unwrap();
        assert_eq!(paras, vec!["Hello world", "", "a\tb\nc & d"]);
    }

    #[test]
    fn table_and_textbox_paragraphs_are_not_body_paragraphs() {
        let xml = format!(
            r#"<w:document {W}><w:body>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
<w:p><w:r><w:t>outer</w:t><w:drawing><w:txbxContent><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:txbxContent></w:drawing></w:r></w:p>
<w:p><w:hyperlink><w:r><w:t>link</w:t></w:r></w:hyperlink></w:p>
</w:body></w:document>"#
        );
        let paras = read_paragraphs(&package(&xml), "t.docx").unwrap();
        assert_eq!(paras, vec!["outer", "link"]);
    }

    #[test]
    fn not_a_zip_is_invalid_docx() {
        let err = read_paragraphs(b"plain text", "fake.docx").unwrap_err();
        assert!(matches!(err, ConvertError::InvalidDocx { .. }));
        assert!(err.to_string().contains("fake.docx"));
    }

    #[test]
    fn missing_document_part_is_invalid_docx() {
        let mut buf = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buf));
            let options: FileOptions<()> = FileOptions::default();
            zip.start_file("readme.txt", options).unwrap();
            zip.write_all(b"hi").unwrap();
            zip.finish().unwrap();
        }
        let err = read_paragraphs(&buf, "empty.docx").unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }

    #[test]
    fn written_package_reads_back() {
        let input = vec![
            "First page".to_string(),
            String::new(),
            "line one\nline <two>\tend".to_string(),
        ];
        let bytes = write_paragraphs(&input).unwrap();
        assert_eq!(read_paragraphs(&bytes, "converted.docx").unwrap(), input);
    }

    #[test]
    fn written_package_has_required_parts() {
        let bytes = write_paragraphs(&["x".to_string()]).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert!(archive.by_name("[Content_Types].xml").is_ok());
        assert!(archive.by_name("_rels/.rels").is_ok());
        assert!(archive.by_name("word/document.xml").is_ok());
    }

    #[test]
    fn main_part_follows_relationship_target() {
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="/word/document2.xml"/></Relationships>"#;
        assert_eq!(main_part_from_rels(rels).as_deref(), Some("word/document2.xml"));
    }
}
