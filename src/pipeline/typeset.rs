//! Typesetting paragraphs as fixed-size text lines on PDF pages.
//!
//! Each paragraph becomes one line of Helvetica (a standard Type1 font every
//! PDF reader ships, so nothing is embedded). A line break inside a
//! paragraph starts a new line; nothing is wrapped. Lines run down from the
//! top margin and continue on a new page once the next baseline would drop
//! below the bottom margin.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};
use tracing::debug;

const FONT_NAME: Name<'static> = Name(b"F1");
const TAB_AS_SPACES: &str = "    ";

/// Page geometry and text metrics, in points.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub left: f32,
    /// Baseline of the first line on each page.
    pub top: f32,
    /// Lowest allowed baseline.
    pub bottom: f32,
    pub font_size: f32,
    pub leading: f32,
}

impl Default for TextLayout {
    /// US Letter, first baseline at (50, 750), 12 pt text.
    fn default() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            left: 50.0,
            top: 750.0,
            bottom: 50.0,
            font_size: 12.0,
            leading: 14.4,
        }
    }
}

impl TextLayout {
    /// Layout for `config`'s text size and line spacing.
    ///
    /// The config fields are public, so a value that never went through the
    /// builder is checked here: both metrics must be finite and positive.
    pub fn from_config(config: &ConversionConfig) -> Result<Self, ConvertError> {
        let font_size = config.font_size;
        if !(font_size.is_finite() && font_size > 0.0) {
            return Err(ConvertError::InvalidConfig(format!(
                "Font size must be a positive number of points, got {font_size}"
            )));
        }
        let leading = font_size * config.line_spacing;
        if !(leading.is_finite() && leading > 0.0) {
            return Err(ConvertError::InvalidConfig(format!(
                "Line spacing must be a positive factor, got {}",
                config.line_spacing
            )));
        }
        Ok(Self {
            font_size,
            leading,
            ..Self::default()
        })
    }

    /// How many baselines fit between `top` and `bottom`, at least one.
    pub fn lines_per_page(&self) -> usize {
        let span = (self.top - self.bottom).max(0.0);
        let extra = span / self.leading;
        if !extra.is_finite() || extra < 0.0 {
            return 1;
        }
        (extra.floor() as usize).saturating_add(1)
    }
}

/// Lay out `paragraphs` and return the finished PDF.
///
/// An empty paragraph list still yields a valid one-page PDF.
pub fn paragraphs_to_pdf(paragraphs: &[String], layout: &TextLayout) -> Vec<u8> {
    let lines: Vec<String> = paragraphs
        .iter()
        .flat_map(|p| p.split('\n').map(|l| l.replace('\t', TAB_AS_SPACES)))
        .collect();

    let per_page = layout.lines_per_page();
    let pages: Vec<&[String]> = if lines.is_empty() {
        vec![lines.as_slice()]
    } else {
        lines.chunks(per_page).collect()
    };

    let catalog_id = Ref::new(1);
    let tree_id = Ref::new(2);
    let font_id = Ref::new(3);
    // Page i is object 4 + 2i, its content stream 5 + 2i.
    let page_ids: Vec<Ref> = (0..pages.len() as i32).map(|i| Ref::new(4 + 2 * i)).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    for (i, (page_lines, &page_id)) in pages.iter().zip(&page_ids).enumerate() {
        let content_id = Ref::new(5 + 2 * i as i32);

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, layout.page_width, layout.page_height));
        page.parent(tree_id);
        page.contents(content_id);
        page.resources().fonts().pair(FONT_NAME, font_id);
        page.finish();

        let mut content = Content::new();
        for (row, line) in page_lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let baseline = layout.top - row as f32 * layout.leading;
            content.begin_text();
            content.set_font(FONT_NAME, layout.font_size);
            content.next_line(layout.left, baseline);
            content.show(Str(&encode_win_ansi(line)));
            content.end_text();
        }
        pdf.stream(content_id, &content.finish());
    }

    pdf.type1_font(font_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    let bytes = pdf.finish();
    debug!(
        "Typeset {} lines on {} pages ({} bytes)",
        lines.len(),
        pages.len(),
        bytes.len()
    );
    bytes
}

/// Encode text for a WinAnsi simple font; unmappable characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => b'?',
        })
        .collect()
}
