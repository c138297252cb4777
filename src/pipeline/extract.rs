//! Plain-text extraction from PDF pages.
//!
//! `lopdf` parses the document and lists its pages; `pdf-extract` walks each
//! page's content stream and decodes the text runs through the page fonts.
//! Fonts are decoded through their `/ToUnicode` CMap when they carry one, so
//! composite (Type0, `Identity-H`) fonts and simple fonts with a
//! `/Differences` encoding come out as real text. A glyph with no Unicode
//! mapping yields nothing, never a placeholder. Pages that draw no text, such
//! as scans, yield an empty string rather than an error.

use crate::error::ConvertError;
use crate::pipeline::text;
use lopdf::Document;
use pdf_extract::{output_doc_page, PlainTextOutput};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// A parsed PDF ready for per-page text extraction.
pub struct TextSource {
    document: Document,
    /// Page numbers (1-indexed, as lopdf keys them) in document order.
    page_numbers: Vec<u32>,
    filename: String,
}

impl TextSource {
    /// Parse `bytes` as a PDF.
    pub fn open(bytes: &[u8], filename: &str) -> Result<Self, ConvertError> {
        let document = Document::load_mem(bytes).map_err(|e| ConvertError::CorruptPdf {
            filename: filename.to_string(),
            detail: e.to_string(),
        })?;

        if document.trailer.get(b"Encrypt").is_ok() {
            return Err(ConvertError::EncryptedPdf {
                filename: filename.to_string(),
            });
        }

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        info!("PDF loaded for text extraction: {} pages", page_numbers.len());

        Ok(Self {
            document,
            page_numbers,
            filename: filename.to_string(),
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    /// Sanitised plain text of the page at 0-based `index`.
    pub fn page_text(&self, index: usize) -> Result<String, ConvertError> {
        let page = index + 1;
        let number = *self
            .page_numbers
            .get(index)
            .ok_or_else(|| ConvertError::TextExtractionFailed {
                page,
                detail: format!("'{}' has only {} pages", self.filename, self.page_count()),
            })?;

        let raw = layout_page_text(&self.document, number).map_err(|detail| {
            warn!("Text extraction failed on page {}: {}", page, detail);
            ConvertError::TextExtractionFailed { page, detail }
        })?;

        let cleaned = text::sanitise(&raw);
        debug!("Page {} → {} chars of text", page, cleaned.chars().count());
        Ok(cleaned)
    }
}

/// Run pdf-extract's plain-text layout over one page.
///
/// The decoder panics on some malformed font and content structures; a panic
/// is reported as an error for that page.
fn layout_page_text(document: &Document, page_number: u32) -> Result<String, String> {
    let mut raw = String::new();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut output = PlainTextOutput::new(&mut raw);
        output_doc_page(document, &mut output, page_number)
    }));
    match outcome {
        Ok(Ok(())) => Ok(raw),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!("decoder panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
    use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};

    /// A PDF whose page `i` shows `texts[i]`, or nothing when it is empty.
    fn pdf_with_pages(texts: &[&str]) -> Vec<u8> {
        let mut pdf = Pdf::new();
        let catalog = Ref::new(1);
        let tree = Ref::new(2);
        let font = Ref::new(3);
        let ids: Vec<Ref> = (0..texts.len() as i32).map(|i| Ref::new(10 + 2 * i)).collect();
        pdf.catalog(catalog).pages(tree);
        pdf.pages(tree).kids(ids.iter().copied()).count(ids.len() as i32);
        for (i, text) in texts.iter().enumerate() {
            let content_id = Ref::new(11 + 2 * i as i32);
            let mut page = pdf.page(ids[i]);
            page.media_box(Rect::new(0.0, 0.0, 200.0, 200.0));
            page.parent(tree);
            page.contents(content_id);
            page.resources().fonts().pair(Name(b"F1"), font);
            page.finish();
            let mut content = Content::new();
            if !text.is_empty() {
                content.begin_text();
                content.set_font(Name(b"F1"), 12.0);
                content.next_line(10.0, 100.0);
                content.show(Str(text.as_bytes()));
                content.end_text();
            }
            pdf.stream(content_id, &content.finish());
        }
        pdf.type1_font(font).base_font(Name(b"Helvetica"));
        pdf.finish()
    }

    fn identity_info() -> SystemInfo<'static> {
        SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        }
    }

    /// One page drawing `lines` with a Type0 font under `Identity-H`, the way
    /// office suites and browsers embed fonts. Glyph ids are handed out in
    /// order of first use, so the shown bytes say nothing about the letters.
    fn composite_font_pdf(lines: &[&str], to_unicode: bool) -> Vec<u8> {
        let catalog = Ref::new(1);
        let tree = Ref::new(2);
        let page_id = Ref::new(3);
        let content_id = Ref::new(4);
        let font = Ref::new(5);
        let cid_font = Ref::new(6);
        let descriptor = Ref::new(7);
        let cmap_id = Ref::new(8);

        let mut glyphs: Vec<char> = Vec::new();
        let mut content = Content::new();
        content.begin_text();
        content.set_font(Name(b"F1"), 12.0);
        content.next_line(10.0, 150.0);
        for line in lines {
            let mut codes = Vec::new();
            for c in line.chars() {
                let index = match glyphs.iter().position(|&g| g == c) {
                    Some(i) => i,
                    None => {
                        glyphs.push(c);
                        glyphs.len() - 1
                    }
                };
                codes.extend_from_slice(&(index as u16 + 1).to_be_bytes());
            }
            content.show(Str(&codes));
            content.next_line(0.0, -14.0);
        }
        content.end_text();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog).pages(tree);
        pdf.pages(tree).kids([page_id]).count(1);
        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, 200.0, 200.0));
        page.parent(tree);
        page.contents(content_id);
        page.resources().fonts().pair(Name(b"F1"), font);
        page.finish();
        pdf.stream(content_id, &content.finish());

        let mut type0 = pdf.type0_font(font);
        type0
            .base_font(Name(b"AAAAAA+Fixture"))
            .encoding_predefined(Name(b"Identity-H"))
            .descendant_font(cid_font);
        if to_unicode {
            type0.to_unicode(cmap_id);
        }
        type0.finish();
        pdf.cid_font(cid_font)
            .subtype(CidFontType::Type2)
            .base_font(Name(b"AAAAAA+Fixture"))
            .system_info(identity_info())
            .font_descriptor(descriptor)
            .default_width(500.0)
            .cid_to_gid_map_predefined(Name(b"Identity"));
        pdf.font_descriptor(descriptor)
            .name(Name(b"AAAAAA+Fixture"))
            .flags(FontFlags::NON_SYMBOLIC)
            .bbox(Rect::new(0.0, -200.0, 1000.0, 800.0))
            .italic_angle(0.0)
            .ascent(800.0)
            .descent(-200.0)
            .cap_height(700.0)
            .stem_v(80.0);
        if to_unicode {
            let mut cmap = UnicodeCmap::new(Name(b"Fixture-UTF16"), identity_info());
            for (i, &c) in glyphs.iter().enumerate() {
                cmap.pair(i as u16 + 1, c);
            }
            pdf.stream(cmap_id, &cmap.finish());
        }
        pdf.finish()
    }

    /// One page drawing `text` with Helvetica re-encoded through
    /// `/Differences` onto codes 1.., plus a matching `/ToUnicode`.
    fn differences_font_pdf(text: &str) -> Vec<u8> {
        let font = Ref::new(5);
        let cmap_id = Ref::new(6);

        let mut glyphs: Vec<char> = Vec::new();
        let mut codes = Vec::new();
        for c in text.chars() {
            let index = match glyphs.iter().position(|&g| g == c) {
                Some(i) => i,
                None => {
                    glyphs.push(c);
                    glyphs.len() - 1
                }
            };
            codes.push(index as u8 + 1);
        }
        let names: Vec<Vec<u8>> = glyphs
            .iter()
            .map(|&c| match c {
                ' ' => b"space".to_vec(),
                c => c.to_string().into_bytes(),
            })
            .collect();

        let mut content = Content::new();
        content.begin_text();
        content.set_font(Name(b"F1"), 12.0);
        content.next_line(10.0, 100.0);
        content.show(Str(&codes));
        content.end_text();

        let mut pdf = Pdf::new();
        pdf.catalog(Ref::new(1)).pages(Ref::new(2));
        pdf.pages(Ref::new(2)).kids([Ref::new(3)]).count(1);
        let mut page = pdf.page(Ref::new(3));
        page.media_box(Rect::new(0.0, 0.0, 200.0, 200.0));
        page.parent(Ref::new(2));
        page.contents(Ref::new(4));
        page.resources().fonts().pair(Name(b"F1"), font);
        page.finish();
        pdf.stream(Ref::new(4), &content.finish());

        let mut type1 = pdf.type1_font(font);
        type1.base_font(Name(b"Helvetica")).to_unicode(cmap_id);
        type1
            .encoding_custom()
            .differences()
            .consecutive(1, names.iter().map(|n| Name(n.as_slice())));
        type1.finish();

        let mut cmap = UnicodeCmap::<u8>::new(Name(b"Fixture-UTF16"), identity_info());
        for (i, &c) in glyphs.iter().enumerate() {
            cmap.pair(i as u8 + 1, c);
        }
        pdf.stream(cmap_id, &cmap.finish());
        pdf.finish()
    }

    #[test]
    fn extracts_text_per_page() {
        let bytes = pdf_with_pages(&["First", "", "Third"]);
        let source = TextSource::open(&bytes, "t.pdf").unwrap();
        assert_eq!(source.page_count(), 3);
        assert!(source.page_text(0).unwrap().contains("First"));
        assert_eq!(source.page_text(1).unwrap(), "");
        assert!(source.page_text(2).unwrap().contains("Third"));
    }

    #[test]
    fn identity_h_font_decodes_through_to_unicode() {
        let bytes = composite_font_pdf(&["Quarterly report", "Revenue grew"], true);
        let source = TextSource::open(&bytes, "office.pdf").unwrap();
        assert_eq!(source.page_text(0).unwrap(), "Quarterly report\nRevenue grew");
    }

    #[test]
    fn identity_h_font_without_to_unicode_yields_no_placeholder() {
        let bytes = composite_font_pdf(&["Hidden text"], false);
        let source = TextSource::open(&bytes, "office.pdf").unwrap();
        let text = source.page_text(0).unwrap();
        assert!(!text.contains("Unimplemented"), "got: {text:?}");
        assert_eq!(text, "");
    }

    #[test]
    fn differences_encoding_decodes_through_to_unicode() {
        let bytes = differences_font_pdf("Hello world");
        let source = TextSource::open(&bytes, "tex.pdf").unwrap();
        assert_eq!(source.page_text(0).unwrap(), "Hello world");
    }

    #[test]
    fn leading_blank_lines_are_dropped() {
        let bytes = pdf_with_pages(&["Top"]);
        let source = TextSource::open(&bytes, "t.pdf").unwrap();
        assert_eq!(source.page_text(0).unwrap(), "Top");
    }

    #[test]
    fn panic_payloads_become_messages() {
        let boxed: Box<dyn Any + Send> = Box::new("MediaBox");
        assert_eq!(panic_message(boxed.as_ref()), "MediaBox");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bad cmap"));
        assert_eq!(panic_message(boxed.as_ref()), "bad cmap");
        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown cause");
    }

    #[test]
    fn index_past_end_is_an_error() {
        let bytes = pdf_with_pages(&["Only"]);
        let source = TextSource::open(&bytes, "t.pdf").unwrap();
        let err = source.page_text(5).unwrap_err();
        assert!(matches!(err, ConvertError::TextExtractionFailed { page: 6, .. }));
    }

    #[test]
    fn garbage_is_corrupt_pdf() {
        let err = TextSource::open(b"%PDF-1.4\nthis is not really a pdf", "bad.pdf")
            .err()
            .unwrap();
        assert!(matches!(err, ConvertError::CorruptPdf { .. }));
        assert!(err.to_string().contains("bad.pdf"));
    }
}
