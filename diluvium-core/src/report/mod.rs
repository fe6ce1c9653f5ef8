//! Deterministic NFO report generation.
//!
//! Pure text formatting with no side effects and no error path: the same
//! input and template id always produce byte-identical output, and
//! missing optional fields are omitted or rendered as placeholders.

pub mod format;
mod templates;

use std::fmt;

pub use format::{
    format_date, format_eta, format_ratio, format_speed, human_size, human_size_with,
    sanitize_filename,
};

use crate::sync::TorrentFileEntry;

/// One file line of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    pub path: String,
    pub size: u64,
}

impl From<&TorrentFileEntry> for ReportFile {
    fn from(entry: &TorrentFileEntry) -> Self {
        Self {
            path: entry.path.clone(),
            size: entry.size,
        }
    }
}

/// Immutable input to one report render.
///
/// Constructed fresh per render from the current torrent status, the
/// flattened file list, and user-supplied notes. Zero or negative
/// `date_added` means unknown; empty strings mean absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportInput {
    pub name: String,
    pub hash: String,
    pub total_size: u64,
    pub files: Vec<ReportFile>,
    pub tracker: String,
    pub date_added: i64,
    pub piece_size: u64,
    pub num_pieces: u64,
    pub creator: String,
    pub comment: String,
    pub notes: String,
}

/// Report layout selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateId {
    Minimal,
    #[default]
    Detailed,
    Fancy,
}

impl TemplateId {
    pub const ALL: [TemplateId; 3] = [TemplateId::Minimal, TemplateId::Detailed, TemplateId::Fancy];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateId::Minimal => "minimal",
            TemplateId::Detailed => "detailed",
            TemplateId::Fancy => "fancy",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TemplateId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimal" => Ok(TemplateId::Minimal),
            "detailed" => Ok(TemplateId::Detailed),
            "fancy" => Ok(TemplateId::Fancy),
            other => Err(format!("unknown template: {other}")),
        }
    }
}

/// Renders a report under the selected template.
///
/// Total over any well-formed input; never fails for data reasons.
pub fn generate(input: &ReportInput, template: TemplateId) -> String {
    match template {
        TemplateId::Minimal => templates::render_minimal(input),
        TemplateId::Detailed => templates::render_detailed(input),
        TemplateId::Fancy => templates::render_fancy(input),
    }
}
