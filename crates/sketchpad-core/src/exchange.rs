//! Exchange file format
//!
//! One JSON document per project:
//!
//! ```json
//! { "version": "1.0", "name": "T", "code": "draw.circle(1, 1, 0.5);",
//!   "viewport": { "width": 8.5, "height": 11, "label": "8.5x11" },
//!   "createdAt": "2024-03-01T10:00:00.123Z", "updatedAt": "2024-03-01T10:05:00Z" }
//! ```
//!
//! The same document is used for the session snapshot key.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sketchpad_canvas::ViewportSize;

use crate::error::{Error, Result};
use crate::project::{format_timestamp, parse_timestamp, Project};

/// Version written into every exchange document
pub const EXCHANGE_VERSION: &str = "1.0";

/// Wire form of a [`Project`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeDocument {
    /// Format version; absent in documents written before versioning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Project name
    pub name: String,
    /// Script text
    pub code: String,
    /// Drawing area
    pub viewport: ViewportSize,
    /// RFC 3339 creation time
    pub created_at: String,
    /// RFC 3339 last update time
    pub updated_at: String,
}

impl ExchangeDocument {
    /// Build the current-version document for a project
    #[must_use]
    pub fn from_project(project: &Project) -> Self {
        Self {
            version: Some(EXCHANGE_VERSION.to_string()),
            name: project.name.clone(),
            code: project.script.clone(),
            viewport: project.viewport.clone(),
            created_at: format_timestamp(&project.created_at),
            updated_at: format_timestamp(&project.updated_at),
        }
    }

    /// Convert into a project, re-checking every invariant
    pub fn into_project(self) -> Result<Project> {
        let created_at = parse_timestamp(&self.created_at)
            .ok_or_else(|| Error::validation("createdAt is not an RFC 3339 timestamp"))?;
        let updated_at = parse_timestamp(&self.updated_at)
            .ok_or_else(|| Error::validation("updatedAt is not an RFC 3339 timestamp"))?;

        let project = Project {
            name: self.name,
            script: self.code,
            viewport: self.viewport,
            created_at,
            updated_at,
        };
        if project.is_valid() {
            Ok(project)
        } else {
            Err(Error::validation("project violates its invariants"))
        }
    }
}

/// Check a parsed candidate against the exchange format.
///
/// Returns the first problem found. Unknown fields are ignored.
pub fn check_candidate(candidate: &Value) -> std::result::Result<(), String> {
    let object = candidate
        .as_object()
        .ok_or_else(|| "document is not a JSON object".to_string())?;

    if let Some(version) = object.get("version") {
        let version = version
            .as_str()
            .ok_or_else(|| "version must be a string".to_string())?;
        if version.split('.').next() != Some("1") {
            return Err(format!("unsupported version {version}"));
        }
    }

    match object.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => {}
        Some(_) => return Err("name must not be empty".to_string()),
        None => return Err("name must be a string".to_string()),
    }

    if !object.get("code").is_some_and(Value::is_string) {
        return Err("code must be a string".to_string());
    }

    check_viewport(object.get("viewport"))?;

    let created_at = timestamp_field(object.get("createdAt"), "createdAt")?;
    let updated_at = timestamp_field(object.get("updatedAt"), "updatedAt")?;
    if updated_at < created_at {
        return Err("updatedAt is earlier than createdAt".to_string());
    }

    Ok(())
}

fn check_viewport(viewport: Option<&Value>) -> std::result::Result<(), String> {
    let viewport = viewport
        .and_then(Value::as_object)
        .ok_or_else(|| "viewport must be an object".to_string())?;

    for dimension in ["width", "height"] {
        match viewport.get(dimension).and_then(Value::as_f64) {
            Some(value) if value.is_finite() && value > 0.0 => {}
            _ => return Err(format!("viewport {dimension} must be a positive number")),
        }
    }

    if !viewport.get("label").is_some_and(Value::is_string) {
        return Err("viewport label must be a string".to_string());
    }
    Ok(())
}

fn timestamp_field(
    value: Option<&Value>,
    field: &str,
) -> std::result::Result<chrono::DateTime<chrono::Utc>, String> {
    let text = value
        .and_then(Value::as_str)
        .ok_or_else(|| format!("{field} must be a string"))?;
    parse_timestamp(text).ok_or_else(|| format!("{field} is not an RFC 3339 timestamp"))
}
