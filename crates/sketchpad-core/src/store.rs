//! ProjectStore - single owner of the current project
//!
//! Everything else reads copies handed out by the store. Persistence goes
//! through an optional [`PersistenceGateway`]; without one, or when the
//! gateway refuses a write, the store keeps working in memory only.

use serde_json::Value;
use sketchpad_canvas::{export_document, ViewportSize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::exchange::{check_candidate, ExchangeDocument};
use crate::persistence::PersistenceGateway;
use crate::project::{timestamp_now, Project, DEFAULT_PROJECT_NAME};

/// Gateway keys used for the session
pub mod keys {
    /// Whole-project snapshot
    pub const PROJECT: &str = "project";
    /// Script text only
    pub const CODE: &str = "code";
    /// Viewport only
    pub const VIEWPORT: &str = "viewport";
    /// Project name only
    pub const NAME: &str = "name";
}

/// Exchange file suffix
pub const PROJECT_EXTENSION: &str = "json";

/// Export artifact suffix
pub const EXPORT_EXTENSION: &str = "svg";

/// Owner of the canonical [`Project`]
#[derive(Debug)]
pub struct ProjectStore {
    project: Project,
    gateway: Option<Arc<PersistenceGateway>>,
    write_legacy_keys: bool,
}

impl ProjectStore {
    /// Create a store holding `project`, without persistence
    #[must_use]
    pub fn new(project: Project) -> Self {
        Self {
            project,
            gateway: None,
            write_legacy_keys: true,
        }
    }

    /// Persist through `gateway`
    #[must_use]
    pub fn with_gateway(mut self, gateway: Arc<PersistenceGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Also write the per-field keys read by older sessions
    #[must_use]
    pub fn with_legacy_keys(mut self, enabled: bool) -> Self {
        self.write_legacy_keys = enabled;
        self
    }

    /// Build a new project stamped with the current time
    pub fn create(
        name: impl Into<String>,
        viewport: ViewportSize,
        script: impl Into<String>,
    ) -> Result<Project> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::validation("project name must not be empty"));
        }
        viewport.validate()?;

        let now = timestamp_now();
        Ok(Project {
            name,
            script: script.into(),
            viewport,
            created_at: now,
            updated_at: now,
        })
    }

    /// Copy of `project` with a fresh `updated_at`
    #[must_use]
    pub fn touch(project: &Project) -> Project {
        Project {
            updated_at: timestamp_now().max(project.created_at),
            ..project.clone()
        }
    }

    /// Check whether a parsed candidate is an acceptable project document
    #[must_use]
    pub fn validate(candidate: &Value) -> bool {
        check_candidate(candidate).is_ok()
    }

    /// Exchange-format text for a project
    pub fn serialize(project: &Project) -> Result<String> {
        Ok(serde_json::to_string_pretty(&ExchangeDocument::from_project(
            project,
        ))?)
    }

    /// Parse exchange-format text, rejecting anything that fails validation
    pub fn deserialize(text: &str) -> Result<Project> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::validation(format!("not a project document: {e}")))?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Project> {
        check_candidate(&value).map_err(Error::validation)?;
        let document: ExchangeDocument = serde_json::from_value(value)?;
        document.into_project()
    }

    /// Copy of the current project
    #[must_use]
    pub fn project(&self) -> Project {
        self.project.clone()
    }

    /// Replace the current project and persist it
    pub async fn replace(&mut self, project: Project) -> Result<bool> {
        if !project.is_valid() {
            return Err(Error::validation("project violates its invariants"));
        }
        self.project = project;
        Ok(self.persist().await)
    }

    /// Record a successfully rendered script and viewport, then persist.
    ///
    /// Returns whether the write reached the durable store.
    pub async fn commit(&mut self, script: &str, viewport: &ViewportSize) -> bool {
        let mut next = self.project.clone();
        next.script = script.to_string();
        if viewport.is_valid() {
            next.viewport = viewport.clone();
        }
        self.project = Self::touch(&next);
        self.persist().await
    }

    /// Write the current project to the gateway
    pub async fn persist(&self) -> bool {
        let Some(gateway) = &self.gateway else {
            return false;
        };

        let mut durable = true;
        if self.write_legacy_keys {
            durable &= gateway.save(keys::CODE, &self.project.script).await;
            durable &= gateway.save(keys::VIEWPORT, &self.project.viewport).await;
            durable &= gateway.save(keys::NAME, &self.project.name).await;
        }
        // Snapshot last: a quota clear during its write must not drop it
        let snapshot = ExchangeDocument::from_project(&self.project);
        durable &= gateway.save(keys::PROJECT, &snapshot).await;

        if durable {
            debug!(name = %self.project.name, "Project persisted");
        } else {
            warn!(
                backend = gateway.backend_name(),
                "Project could not be persisted, continuing in memory"
            );
        }
        durable
    }

    /// Restore the session project.
    ///
    /// Reads the snapshot key first; when it is missing or invalid the
    /// per-field keys are used instead.
    pub async fn restore(gateway: &PersistenceGateway) -> Option<Project> {
        if let Some(value) = gateway.load::<Value>(keys::PROJECT).await {
            match Self::from_value(value) {
                Ok(project) => return Some(project),
                Err(err) => warn!(error = %err, "Stored project snapshot is invalid"),
            }
        }

        let code = gateway.load::<String>(keys::CODE).await;
        let viewport = gateway.load::<ViewportSize>(keys::VIEWPORT).await;
        let name = gateway.load::<String>(keys::NAME).await;
        if code.is_none() && viewport.is_none() && name.is_none() {
            return None;
        }

        info!("Restoring project from per-field session keys");
        let viewport = viewport.filter(ViewportSize::is_valid).unwrap_or_default();
        let name = name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());
        Self::create(name, viewport, code.unwrap_or_default()).ok()
    }

    /// Read an exchange file
    pub async fn load_file(path: &Path) -> Result<Project> {
        let text = tokio::fs::read_to_string(path).await?;
        let project = Self::deserialize(&text)?;
        info!(path = %path.display(), name = %project.name, "Project loaded");
        Ok(project)
    }

    /// Write the current project as an exchange file
    pub async fn save_file(&self, path: &Path) -> Result<()> {
        let text = Self::serialize(&self.project)?;
        tokio::fs::write(path, text).await?;
        info!(path = %path.display(), "Project saved");
        Ok(())
    }

    /// Write rendered markup as a standalone SVG document
    pub async fn export_svg(path: &Path, markup: &str, viewport: &ViewportSize) -> Result<()> {
        tokio::fs::write(path, export_document(markup, viewport)).await?;
        info!(path = %path.display(), "Drawing exported");
        Ok(())
    }

    /// Default artifact path for the current project inside `dir`
    #[must_use]
    pub fn artifact_path(&self, dir: &Path, extension: &str) -> PathBuf {
        dir.join(artifact_file_name(&self.project, extension))
    }
}

/// File name for a project artifact, e.g. `my-sketch.svg`
#[must_use]
pub fn artifact_file_name(project: &Project, extension: &str) -> String {
    format!("{}.{}", project.slug(), extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryBackend;
    use chrono::Duration;

    fn letter_project(script: &str) -> Project {
        ProjectStore::create("T", ViewportSize::letter(), script).unwrap()
    }

    #[test]
    fn test_create_stamps_both_timestamps() {
        let project = letter_project("draw.circle(1, 1, 1);");
        assert_eq!(project.created_at, project.updated_at);
        assert!(project.is_valid());
    }

    #[test]
    fn test_create_rejects_bad_input() {
        assert!(ProjectStore::create("", ViewportSize::letter(), "").is_err());
        let err = ProjectStore::create("T", ViewportSize::new(0.0, 1.0, "bad"), "").unwrap_err();
        assert!(matches!(err, Error::Canvas(_)));
    }

    #[test]
    fn test_touch_returns_copy() {
        let mut original = letter_project("");
        original.created_at = original.created_at - Duration::minutes(5);
        original.updated_at = original.created_at;

        let touched = ProjectStore::touch(&original);
        assert!(touched.updated_at > original.updated_at);
        assert_eq!(touched.created_at, original.created_at);
        assert_eq!(original.updated_at, original.created_at);
    }

    #[test]
    fn test_touch_never_precedes_creation() {
        let mut future = letter_project("");
        future.created_at = future.created_at + Duration::days(1);
        future.updated_at = future.created_at;
        assert!(ProjectStore::touch(&future).is_valid());
    }

    #[test]
    fn test_serialize_deserialize() {
        let project = letter_project("const s = \"q\\\\\";\n\tdraw.text(1, 1, '円');\r\n");
        let text = ProjectStore::serialize(&project).unwrap();
        assert!(text.contains("\"version\": \"1.0\""));
        assert_eq!(ProjectStore::deserialize(&text).unwrap(), project);
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        let err = ProjectStore::deserialize("{\"name\": \"T\"}").unwrap_err();
        assert_eq!(err.code(), "validation_error");

        let err = ProjectStore::deserialize("not json").unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn test_validate() {
        let project = letter_project("");
        let value: Value = serde_json::from_str(&ProjectStore::serialize(&project).unwrap()).unwrap();
        assert!(ProjectStore::validate(&value));
        assert!(!ProjectStore::validate(&serde_json::json!({})));
    }

    #[tokio::test]
    async fn test_commit_without_gateway_stays_in_memory() {
        let mut store = ProjectStore::new(letter_project("old"));
        let durable = store
            .commit("new", &ViewportSize::new(6.0, 6.0, "6x6"))
            .await;
        assert!(!durable);
        assert_eq!(store.project().script, "new");
        assert_eq!(store.project().viewport.label, "6x6");
    }

    #[tokio::test]
    async fn test_persist_and_restore_snapshot() {
        let backend = Arc::new(MemoryBackend::new());
        let gateway = Arc::new(PersistenceGateway::new(backend.clone()));
        let mut store = ProjectStore::new(letter_project("a")).with_gateway(gateway.clone());

        assert!(store.commit("draw.circle(2, 2, 1);", &ViewportSize::letter()).await);
        assert_eq!(backend.writes_for("sketchpad:project").await, 1);
        assert_eq!(backend.writes_for("sketchpad:code").await, 1);

        let restored = ProjectStore::restore(&gateway).await.unwrap();
        assert_eq!(restored, store.project());
    }

    #[tokio::test]
    async fn test_restore_falls_back_to_legacy_keys() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .insert_raw("sketchpad:project", "{\"name\": \"broken\"")
            .await;
        backend.insert_raw("sketchpad:code", "\"draw.line(0, 0, 1, 1);\"").await;
        backend
            .insert_raw(
                "sketchpad:viewport",
                "{\"width\": 5, \"height\": 7, \"label\": \"5x7\"}",
            )
            .await;
        let gateway = PersistenceGateway::new(backend);

        let restored = ProjectStore::restore(&gateway).await.unwrap();
        assert_eq!(restored.script, "draw.line(0, 0, 1, 1);");
        assert_eq!(restored.viewport.label, "5x7");
        assert_eq!(restored.name, DEFAULT_PROJECT_NAME);
    }

    #[tokio::test]
    async fn test_restore_empty_session() {
        let gateway = PersistenceGateway::new(Arc::new(MemoryBackend::new()));
        assert!(ProjectStore::restore(&gateway).await.is_none());
    }

    #[tokio::test]
    async fn test_legacy_keys_disabled() {
        let backend = Arc::new(MemoryBackend::new());
        let gateway = Arc::new(PersistenceGateway::new(backend.clone()));
        let store = ProjectStore::new(letter_project("a"))
            .with_gateway(gateway)
            .with_legacy_keys(false);

        assert!(store.persist().await);
        assert_eq!(backend.writes_for("sketchpad:code").await, 0);
        assert_eq!(backend.writes_for("sketchpad:project").await, 1);
    }

    #[tokio::test]
    async fn test_replace_rejects_invalid_project() {
        let mut store = ProjectStore::new(letter_project("keep"));
        let mut bad = letter_project("x");
        bad.name.clear();

        assert!(store.replace(bad).await.is_err());
        assert_eq!(store.project().script, "keep");
    }

    #[test]
    fn test_artifact_names() {
        let project = ProjectStore::create("My Sketch", ViewportSize::letter(), "").unwrap();
        assert_eq!(artifact_file_name(&project, EXPORT_EXTENSION), "my-sketch.svg");

        let store = ProjectStore::new(project);
        assert_eq!(
            store.artifact_path(Path::new("/tmp"), PROJECT_EXTENSION),
            PathBuf::from("/tmp/my-sketch.json")
        );
    }
}
