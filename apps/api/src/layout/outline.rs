//! Outline Parser: turns rewritten resume text into a typed outline for the renderer.
//!
//! Expected shape:
//! ```text
//! <name>
//! <profession>
//! Summary:
//! • bullet
//! plain line
//! Skills:
//! ...
//! ```
//! Missing name/profession or a text with no section header at all is rejected.
//! Section order problems are kept as warnings.

use serde::Serialize;
use thiserror::Error;

pub const BULLET: char = '•';

/// The five resume sections, in the order the rewriter is asked to produce them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Section {
    Summary,
    Skills,
    WorkExperience,
    Certificates,
    Education,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Summary,
        Section::Skills,
        Section::WorkExperience,
        Section::Certificates,
        Section::Education,
    ];

    /// The exact header line, colon included.
    pub fn header(self) -> &'static str {
        match self {
            Section::Summary => "Summary:",
            Section::Skills => "Skills:",
            Section::WorkExperience => "Work Experience:",
            Section::Certificates => "Certificates:",
            Section::Education => "Education:",
        }
    }

    pub fn from_header(line: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|s| s.header() == line)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Block {
    Heading(Section),
    /// Bullet text with the marker and following whitespace removed.
    Bullet(String),
    Paragraph(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeOutline {
    pub name: String,
    pub profession: String,
    pub blocks: Vec<Block>,
    /// Non-fatal shape problems (order, missing or repeated sections).
    pub warnings: Vec<String>,
}

impl ResumeOutline {
    pub fn sections(&self) -> impl Iterator<Item = Section> + '_ {
        self.blocks.iter().filter_map(|b| match b {
            Block::Heading(s) => Some(*s),
            _ => None,
        })
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum OutlineError {
    #[error("resume text is empty")]
    Empty,

    #[error("first line must be the person's name, found section header '{0}'")]
    HeaderInsteadOfName(String),

    #[error("second line must be the profession, found {0}")]
    MissingProfession(String),

    #[error("no section header found; expected lines like 'Summary:' or 'Skills:'")]
    NoSections,
}

pub fn parse_outline(text: &str) -> Result<ResumeOutline, OutlineError> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let name = lines.next().ok_or(OutlineError::Empty)?;
    if Section::from_header(name).is_some() {
        return Err(OutlineError::HeaderInsteadOfName(name.to_string()));
    }

    let profession = match lines.next() {
        None => return Err(OutlineError::MissingProfession("end of text".to_string())),
        Some(l) if Section::from_header(l).is_some() => {
            return Err(OutlineError::MissingProfession(format!(
                "section header '{l}'"
            )))
        }
        Some(l) => l,
    };

    let blocks: Vec<Block> = lines.map(classify_line).collect();

    let outline = ResumeOutline {
        name: name.to_string(),
        profession: profession.to_string(),
        warnings: section_warnings(&blocks),
        blocks,
    };

    if outline.sections().next().is_none() {
        return Err(OutlineError::NoSections);
    }
    Ok(outline)
}

fn classify_line(line: &str) -> Block {
    if let Some(section) = Section::from_header(line) {
        Block::Heading(section)
    } else if let Some(rest) = line.strip_prefix(BULLET) {
        Block::Bullet(rest.trim_start().to_string())
    } else {
        Block::Paragraph(line.to_string())
    }
}

fn section_warnings(blocks: &[Block]) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut seen: Vec<Section> = Vec::new();

    for block in blocks {
        let Block::Heading(section) = block else {
            continue;
        };
        if seen.contains(section) {
            warnings.push(format!("section '{}' appears more than once", section.header()));
            continue;
        }
        if let Some(last) = seen.last() {
            if position(*section) < position(*last) {
                warnings.push(format!(
                    "section '{}' appears after '{}'",
                    section.header(),
                    last.header()
                ));
            }
        }
        seen.push(*section);
    }

    for section in Section::ALL {
        if !seen.contains(&section) {
            warnings.push(format!("section '{}' is missing", section.header()));
        }
    }
    warnings
}

fn position(section: Section) -> usize {
    Section::ALL
        .iter()
        .position(|s| *s == section)
        .unwrap_or(usize::MAX)
}
