//! Project - the unit of work
//!
//! A project pairs one script with the viewport it draws into. Timestamps are
//! kept at millisecond precision so that the exchange format reproduces them
//! exactly.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sketchpad_canvas::ViewportSize;

/// Name given to projects restored without one
pub const DEFAULT_PROJECT_NAME: &str = "Untitled";

/// A script, the viewport it renders into, and its lifecycle stamps
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// Display name (never empty)
    pub name: String,
    /// Script text, kept verbatim
    pub script: String,
    /// Drawing area in inches
    pub viewport: ViewportSize,
    /// When the project was created
    pub created_at: DateTime<Utc>,
    /// When the project was last persisted
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Check the data model invariants
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && self.viewport.is_valid() && self.updated_at >= self.created_at
    }

    /// Slug of the project name, suitable for artifact file names
    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

/// Current instant at the precision the exchange format preserves
#[must_use]
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Format a timestamp as RFC 3339 with a `Z` suffix
#[must_use]
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse an RFC 3339 timestamp
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Lowercase ASCII slug; runs of other characters collapse into one `-`
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "sketch".to_string()
    } else {
        trimmed.to_string()
    }
}
