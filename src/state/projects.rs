//! Project-list state for the list, gallery and admin management views.
//!
//! DESIGN
//! ======
//! The collection is a cache of the last `list` plus every write the server
//! has confirmed since. Nothing changes on failure, so a rejected write leaves
//! the view exactly as it was with the error recorded next to it. The cache may
//! drift from the server until the next `load`.

#[cfg(test)]
#[path = "projects_test.rs"]
mod projects_test;

use super::errors::ViewError;
use crate::net::api::ProjectsClient;
use crate::net::error::ApiError;
use crate::net::types::{NewProject, Project, ProjectPatch};

/// Which boolean flag a toggle flips.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectFlag {
    Viewable,
    Published,
}

impl ProjectFlag {
    fn current(self, project: &Project) -> Option<bool> {
        match self {
            Self::Viewable => project.is_viewable,
            Self::Published => project.is_published,
        }
    }

    fn patch(self, value: bool) -> ProjectPatch {
        match self {
            Self::Viewable => ProjectPatch::viewable(value),
            Self::Published => ProjectPatch::published(value),
        }
    }
}

/// Fetched projects plus the status of the last call.
#[derive(Clone, Debug, Default)]
pub struct ProjectsState {
    pub items: Vec<Project>,
    pub loading: bool,
    pub error: Option<ViewError>,
}

impl ProjectsState {
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&Project> {
        self.items.iter().find(|p| p.id == id)
    }

    /// Public gallery subset, in collection order.
    pub fn visible(&self) -> impl Iterator<Item = &Project> {
        self.items.iter().filter(|p| p.is_public())
    }

    /// Replace the collection with the server's.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] after recording it; the previous items stay.
    pub async fn load(&mut self, client: &ProjectsClient) -> Result<(), ApiError> {
        self.loading = true;
        let result = client.list().await;
        self.loading = false;
        let items = self.record(result)?;
        tracing::debug!(count = items.len(), "projects loaded");
        self.items = items;
        Ok(())
    }

    /// Flip `isViewable` on project `id`. Returns the new value, or `None`
    /// when the project is unknown or carries no flag to flip.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] after recording it.
    pub async fn toggle_visible(&mut self, client: &ProjectsClient, id: i64) -> Result<Option<bool>, ApiError> {
        self.toggle(client, id, ProjectFlag::Viewable).await
    }

    /// Flip `isPublished`; otherwise as [`Self::toggle_visible`].
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] after recording it.
    pub async fn toggle_published(&mut self, client: &ProjectsClient, id: i64) -> Result<Option<bool>, ApiError> {
        self.toggle(client, id, ProjectFlag::Published).await
    }

    async fn toggle(&mut self, client: &ProjectsClient, id: i64, flag: ProjectFlag) -> Result<Option<bool>, ApiError> {
        let Some(current) = self.get(id).and_then(|p| flag.current(p)) else {
            tracing::debug!(id, ?flag, "nothing to toggle");
            return Ok(None);
        };
        let next = !current;
        self.update(client, id, &flag.patch(next)).await?;
        Ok(self.get(id).and_then(|p| flag.current(p)).or(Some(next)))
    }

    /// Send `patch` and, once confirmed, replace the cached entry with the
    /// server's copy. Without a response body the patch fields are copied
    /// onto the entry instead.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] after recording it; the entry is unchanged.
    pub async fn update(&mut self, client: &ProjectsClient, id: i64, patch: &ProjectPatch) -> Result<(), ApiError> {
        let result = client.update(id, patch).await;
        let server_copy = self.record(result)?;
        if let Some(project) = self.items.iter_mut().find(|p| p.id == id) {
            match server_copy {
                Some(server_copy) => *project = server_copy,
                None => patch.apply_to(project),
            }
        }
        Ok(())
    }

    /// Delete project `id`; the rest keep their order.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] after recording it; the entry stays.
    pub async fn remove(&mut self, client: &ProjectsClient, id: i64) -> Result<(), ApiError> {
        let result = client.remove(id).await;
        self.record(result)?;
        self.items.retain(|p| p.id != id);
        Ok(())
    }

    /// Create a project and append the server's copy.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] after recording it.
    pub async fn create(&mut self, client: &ProjectsClient, payload: &NewProject) -> Result<Project, ApiError> {
        let result = client.create(payload).await;
        let project = self.record(result)?;
        self.items.push(project.clone());
        Ok(project)
    }

    fn record<T>(&mut self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        match &result {
            Ok(_) => self.error = None,
            Err(e) => {
                tracing::warn!(error = %e, "projects call failed");
                self.error = Some(ViewError::from_api(e));
            }
        }
        result
    }
}
