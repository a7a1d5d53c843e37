//! Single-project state for the detail view.

#[cfg(test)]
#[path = "project_test.rs"]
mod project_test;

use super::errors::ViewError;
use crate::net::api::ProjectsClient;
use crate::net::error::ApiError;
use crate::net::types::{Project, ProjectPatch};

#[derive(Clone, Debug, Default)]
pub struct ProjectState {
    pub project: Option<Project>,
    pub loading: bool,
    pub error: Option<ViewError>,
}

impl ProjectState {
    /// Fetch project `id`, replacing whatever was shown.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] after recording it. On `NotFound` the shown
    /// project is dropped; other failures keep it.
    pub async fn load(&mut self, client: &ProjectsClient, id: i64) -> Result<(), ApiError> {
        self.loading = true;
        let result = client.get(id).await;
        self.loading = false;
        match result {
            Ok(project) => {
                self.project = Some(project);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                if matches!(e, ApiError::NotFound) {
                    self.project = None;
                }
                self.error = Some(ViewError::from_api(&e));
                Err(e)
            }
        }
    }

    /// Flip `isViewable` on the shown project and adopt the server's copy.
    /// Returns the new value, or `None` when there is nothing to flip.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] after recording it; the shown project is
    /// unchanged.
    pub async fn toggle_visible(&mut self, client: &ProjectsClient) -> Result<Option<bool>, ApiError> {
        let Some((id, current)) = self.project.as_ref().and_then(|p| Some((p.id, p.is_viewable?))) else {
            return Ok(None);
        };
        let patch = ProjectPatch::viewable(!current);
        match client.update(id, &patch).await {
            Ok(server_copy) => {
                self.error = None;
                if let Some(server_copy) = server_copy {
                    self.project = Some(server_copy);
                } else if let Some(shown) = self.project.as_mut() {
                    // No body came back: keep the shown copy in step with the patch.
                    patch.apply_to(shown);
                }
                Ok(self.project.as_ref().and_then(|p| p.is_viewable))
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "visibility toggle failed");
                self.error = Some(ViewError::from_api(&e));
                Err(e)
            }
        }
    }
}
