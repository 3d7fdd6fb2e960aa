use std::path::Path;

use tracing::info;

use crate::error::ProjectError;
use crate::model::Project;

/// Extension used by the file dialogs.
pub const PROJECT_EXTENSION: &str = "timeline.json";

/// Save a project to a JSON file.
pub fn save_project(project: &Project, path: &Path) -> Result<(), ProjectError> {
    let json = serde_json::to_string_pretty(project)?;
    std::fs::write(path, json).map_err(|e| ProjectError::io(path, e))?;
    info!(path = %path.display(), items = project.items.len(), "project saved");
    Ok(())
}

/// Load a project from a JSON file.
pub fn load_project(path: &Path) -> Result<Project, ProjectError> {
    let json = std::fs::read_to_string(path).map_err(|e| ProjectError::io(path, e))?;
    let project: Project = serde_json::from_str(&json)?;
    info!(path = %path.display(), items = project.items.len(), "project loaded");
    Ok(project)
}
