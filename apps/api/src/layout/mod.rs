// Outline parsing, line layout and PDF output for the optimized resume.
// Layout and PDF writing are CPU-bound and run inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod outline;
pub mod page_fill;
pub mod render;

// Re-export the public API consumed by the pipeline.
pub use font_metrics::{default_page_config, PageConfig};
pub use outline::{parse_outline, ResumeOutline};
pub use render::{render_resume, unsupported_chars};
