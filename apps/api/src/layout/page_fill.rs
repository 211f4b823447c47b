//! Page Fill Analysis: how much of the page the laid-out resume uses.
//!
//! The renderer never shrinks or drops content; the one-page target depends on the
//! rewriter producing short enough text. This analysis only reports the outcome.

use serde::Serialize;

use crate::layout::font_metrics::PageConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PageFillVerdict {
    /// Everything fits on the first page.
    FitsOnePage,
    /// Content flowed onto additional pages.
    Overflow { extra_pages: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct PageFillAnalysis {
    pub page_count: usize,
    /// Fraction of the first page's text area in use, 0.0 to 1.0.
    pub first_page_fill: f32,
    pub verdict: PageFillVerdict,
}

/// `first_page_used_pt` is the vertical extent consumed on page one.
pub fn analyze_page_fill(
    page_count: usize,
    first_page_used_pt: f32,
    config: &PageConfig,
) -> PageFillAnalysis {
    let page_count = page_count.max(1);
    let first_page_fill = (first_page_used_pt / config.text_height_pt()).clamp(0.0, 1.0);
    let verdict = if page_count > 1 {
        PageFillVerdict::Overflow {
            extra_pages: page_count - 1,
        }
    } else {
        PageFillVerdict::FitsOnePage
    };

    PageFillAnalysis {
        page_count,
        first_page_fill,
        verdict,
    }
}
