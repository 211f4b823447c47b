//! Document Renderer: lays a `ResumeOutline` out on letter pages and writes the PDF.
//!
//! # Architecture
//! - `layout_outline` is pure: it wraps text with the static metric tables and places
//!   every line on a page. All positions are PDF points, origin bottom-left.
//! - `write_pdf` turns placed lines into a printpdf document with built-in fonts.
//! - `render_resume` runs both inside `tokio::task::spawn_blocking`, since the
//!   printpdf document is neither `Send` nor cheap to build.

use bytes::Bytes;
use printpdf::{BuiltinFont, Mm, PdfDocument, Pt};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::layout::font_metrics::{get_metrics, is_winansi, Font, PageConfig};
use crate::layout::outline::{Block, ResumeOutline, BULLET};
use crate::layout::page_fill::{analyze_page_fill, PageFillAnalysis, PageFillVerdict};
use crate::models::resume::RenderedDocument;

// ────────────────────────────────────────────────────────────────────────────
// Styles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub font: Font,
    pub size_pt: f32,
    pub leading_pt: f32,
    pub space_after_pt: f32,
    /// Left indent of the text body, relative to the left margin.
    pub indent_pt: f32,
    pub align: Align,
}

pub const NAME_STYLE: TextStyle = TextStyle {
    font: Font::Helvetica,
    size_pt: 14.0,
    leading_pt: 16.0,
    space_after_pt: 4.0,
    indent_pt: 0.0,
    align: Align::Center,
};

pub const PROFESSION_STYLE: TextStyle = TextStyle {
    font: Font::Helvetica,
    size_pt: 12.0,
    leading_pt: 14.0,
    space_after_pt: 8.0,
    indent_pt: 0.0,
    align: Align::Center,
};

pub const SECTION_STYLE: TextStyle = TextStyle {
    font: Font::HelveticaBold,
    size_pt: 11.0,
    leading_pt: 13.0,
    space_after_pt: 4.0,
    indent_pt: 0.0,
    align: Align::Left,
};

pub const BULLET_STYLE: TextStyle = TextStyle {
    font: Font::Helvetica,
    size_pt: 9.0,
    leading_pt: 11.0,
    space_after_pt: 2.0,
    indent_pt: 20.0,
    align: Align::Left,
};

pub const PARAGRAPH_STYLE: TextStyle = TextStyle {
    font: Font::Helvetica,
    size_pt: 9.0,
    leading_pt: 11.0,
    space_after_pt: 2.0,
    indent_pt: 10.0,
    align: Align::Left,
};

/// Where the bullet glyph sits, relative to the left margin.
pub const BULLET_INDENT_PT: f32 = 10.0;
/// Gap between the header block and the first section.
pub const HEADER_SPACER_PT: f32 = 8.0;

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Name,
    Profession,
    Heading,
    BulletMarker,
    Bullet,
    Paragraph,
}

#[derive(Debug, Clone)]
pub struct PlacedLine {
    /// Zero-based page index.
    pub page: usize,
    pub kind: LineKind,
    pub text: String,
    pub font: Font,
    pub size_pt: f32,
    pub x_pt: f32,
    pub baseline_pt: f32,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub lines: Vec<PlacedLine>,
    pub page_count: usize,
    /// Vertical extent consumed on the first page.
    pub first_page_used_pt: f32,
}

struct Cursor<'a> {
    config: &'a PageConfig,
    page: usize,
    y: f32,
    first_page_used_pt: f32,
    lines: Vec<PlacedLine>,
}

impl<'a> Cursor<'a> {
    fn new(config: &'a PageConfig) -> Self {
        Self {
            config,
            page: 0,
            y: config.page_height_pt - config.margin_top_pt,
            first_page_used_pt: 0.0,
            lines: Vec::new(),
        }
    }

    fn top(&self) -> f32 {
        self.config.page_height_pt - self.config.margin_top_pt
    }

    /// Reserves one line of `leading` height, breaking to a new page when it would
    /// cross the bottom margin. Returns the y of the line's top edge.
    fn take_line(&mut self, leading: f32) -> f32 {
        let at_top = (self.y - self.top()).abs() < f32::EPSILON;
        if !at_top && self.y - leading < self.config.margin_bottom_pt {
            self.page += 1;
            self.y = self.top();
        }
        let line_top = self.y;
        self.y -= leading;
        self.track_first_page();
        line_top
    }

    fn skip(&mut self, amount: f32) {
        // Trailing space never pushes content to the next page by itself.
        self.y = (self.y - amount).max(self.config.margin_bottom_pt);
        self.track_first_page();
    }

    fn track_first_page(&mut self) {
        if self.page == 0 {
            self.first_page_used_pt = self.top() - self.y;
        }
    }

    fn paragraph(&mut self, kind: LineKind, text: &str, style: TextStyle) {
        let metrics = get_metrics(style.font);
        let left = self.config.margin_left_pt + style.indent_pt;
        let available = self.config.text_width_pt() - style.indent_pt;

        for (i, line) in metrics.wrap(text, style.size_pt, available).into_iter().enumerate() {
            let line_top = self.take_line(style.leading_pt);
            let baseline_pt = line_top - style.size_pt;
            let x_pt = match style.align {
                Align::Left => left,
                Align::Center => {
                    left + ((available - metrics.width_pt(&line, style.size_pt)) / 2.0).max(0.0)
                }
            };

            if kind == LineKind::Bullet && i == 0 {
                self.lines.push(PlacedLine {
                    page: self.page,
                    kind: LineKind::BulletMarker,
                    text: BULLET.to_string(),
                    font: style.font,
                    size_pt: style.size_pt,
                    x_pt: self.config.margin_left_pt + BULLET_INDENT_PT,
                    baseline_pt,
                });
            }

            self.lines.push(PlacedLine {
                page: self.page,
                kind,
                text: line,
                font: style.font,
                size_pt: style.size_pt,
                x_pt,
                baseline_pt,
            });
        }
        self.skip(style.space_after_pt);
    }
}

/// Places every outline element on the page grid.
pub fn layout_outline(outline: &ResumeOutline, config: &PageConfig) -> Layout {
    let mut cursor = Cursor::new(config);

    cursor.paragraph(LineKind::Name, &outline.name, NAME_STYLE);
    cursor.paragraph(LineKind::Profession, &outline.profession, PROFESSION_STYLE);
    cursor.skip(HEADER_SPACER_PT);

    for block in &outline.blocks {
        match block {
            Block::Heading(section) => {
                cursor.paragraph(LineKind::Heading, section.header(), SECTION_STYLE)
            }
            Block::Bullet(text) => cursor.paragraph(LineKind::Bullet, text, BULLET_STYLE),
            Block::Paragraph(text) => {
                cursor.paragraph(LineKind::Paragraph, text, PARAGRAPH_STYLE)
            }
        }
    }

    Layout {
        page_count: cursor.page + 1,
        first_page_used_pt: cursor.first_page_used_pt,
        lines: cursor.lines,
    }
}

/// Characters in the outline the built-in fonts cannot draw, each once, in reading order.
/// Whitespace is ignored since wrapping collapses it.
pub fn unsupported_chars(outline: &ResumeOutline) -> Vec<char> {
    let block_texts = outline.blocks.iter().map(|block| match block {
        Block::Heading(section) => section.header(),
        Block::Bullet(text) | Block::Paragraph(text) => text.as_str(),
    });

    let mut missing = Vec::new();
    for c in [outline.name.as_str(), outline.profession.as_str()]
        .into_iter()
        .chain(block_texts)
        .flat_map(str::chars)
    {
        if !c.is_whitespace() && !is_winansi(c) && !missing.contains(&c) {
            missing.push(c);
        }
    }
    missing
}

// ────────────────────────────────────────────────────────────────────────────
// PDF output
// ────────────────────────────────────────────────────────────────────────────

fn mm(pt: f32) -> Mm {
    Mm::from(Pt(pt))
}

/// Writes placed lines into a PDF using the built-in Helvetica faces.
pub fn write_pdf(layout: &Layout, config: &PageConfig, title: &str) -> Result<Vec<u8>, printpdf::Error> {
    let width = mm(config.page_width_pt);
    let height = mm(config.page_height_pt);

    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, "Resume");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut layers = vec![doc.get_page(first_page).get_layer(first_layer)];
    for _ in 1..layout.page_count {
        let (page, layer) = doc.add_page(width, height, "Resume");
        layers.push(doc.get_page(page).get_layer(layer));
    }

    for line in &layout.lines {
        let font = match line.font {
            Font::Helvetica => &regular,
            Font::HelveticaBold => &bold,
        };
        layers[line.page].use_text(
            line.text.as_str(),
            line.size_pt,
            mm(line.x_pt),
            mm(line.baseline_pt),
            font,
        );
    }

    doc.save_to_bytes()
}

/// Lays out and writes the resume. Overflow past one page is logged, not corrected.
pub async fn render_resume(
    outline: ResumeOutline,
    config: PageConfig,
) -> Result<(RenderedDocument, PageFillAnalysis), AppError> {
    tokio::task::spawn_blocking(move || {
        let layout = layout_outline(&outline, &config);
        let analysis = analyze_page_fill(layout.page_count, layout.first_page_used_pt, &config);

        if let PageFillVerdict::Overflow { extra_pages } = analysis.verdict {
            warn!("Resume for '{}' overflows by {extra_pages} page(s)", outline.name);
        }

        let bytes = write_pdf(&layout, &config, &outline.name)
            .map_err(|e| AppError::Render(e.to_string()))?;

        info!(
            "Rendered resume: {} bytes, {} page(s), first page {:.0}% full",
            bytes.len(),
            analysis.page_count,
            analysis.first_page_fill * 100.0
        );

        Ok((
            RenderedDocument {
                bytes: Bytes::from(bytes),
                page_count: layout.page_count,
            },
            analysis,
        ))
    })
    .await
    .map_err(|e| AppError::Render(format!("render task failed: {e}")))?
}
