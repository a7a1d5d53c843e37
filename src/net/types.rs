//! Wire types for the portfolio REST API.
//!
//! The API speaks JSON and JSON-LD with camelCase keys. Linked-data metadata
//! (`@id`, `@type`, `@context`) is ignored on read.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::util::clock::current_year;

/// A portfolio project as served by the API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub project_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    /// Only meaningful to the public when `is_published` is true; the client
    /// does not enforce that pairing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_viewable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Project {
    /// Whether the project belongs in the public gallery.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.is_published == Some(true) && self.is_viewable != Some(false)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Payload for `POST /api/projects`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub project_url: String,
    pub year: String,
    pub is_published: bool,
    pub is_viewable: bool,
}

impl NewProject {
    /// Defaults match the admin form: this year, unpublished, viewable.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            image_url: String::new(),
            project_url: String::new(),
            year: current_year().to_string(),
            is_published: false,
            is_viewable: true,
        }
    }
}

/// Merge-patch body for `PATCH /api/projects/{id}`: absent fields are left
/// unchanged by the server.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_viewable: Option<bool>,
}

impl ProjectPatch {
    #[must_use]
    pub fn viewable(value: bool) -> Self {
        Self { is_viewable: Some(value), ..Self::default() }
    }

    #[must_use]
    pub fn published(value: bool) -> Self {
        Self { is_published: Some(value), ..Self::default() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Copy the supplied fields onto `project`, leaving the rest untouched.
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(title) = &self.title {
            project.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            project.description.clone_from(description);
        }
        if let Some(image_url) = &self.image_url {
            project.image_url.clone_from(image_url);
        }
        if let Some(project_url) = &self.project_url {
            project.project_url.clone_from(project_url);
        }
        if let Some(year) = &self.year {
            project.year.clone_from(year);
        }
        if let Some(is_published) = self.is_published {
            project.is_published = Some(is_published);
        }
        if let Some(is_viewable) = self.is_viewable {
            project.is_viewable = Some(is_viewable);
        }
    }
}

/// A single field-level validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    #[serde(default)]
    pub property_path: String,
    #[serde(default)]
    pub message: String,
}

/// Body for `POST /api/auth`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body for `POST /api/users`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub plain_password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("plain_password", &"<redacted>")
            .finish()
    }
}

/// Body for `POST /api/contact`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Unwrap a collection response: `hydra:member`, then `member`, then a bare
/// array. An object carrying neither envelope is an empty collection.
///
/// # Errors
///
/// Returns an error when the payload is neither an array nor an object, or
/// when an item does not match `T`.
pub fn unwrap_collection<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, serde_json::Error> {
    match value {
        Value::Array(_) => serde_json::from_value(value),
        Value::Object(mut map) => match map.remove("hydra:member").or_else(|| map.remove("member")) {
            Some(members) => serde_json::from_value(members),
            None => Ok(Vec::new()),
        },
        other => serde_json::from_value(other),
    }
}

/// Violations carried by an error body, if any.
#[must_use]
pub fn violations_in(body: &Value) -> Option<Vec<Violation>> {
    let list = body.get("violations")?;
    serde_json::from_value(list.clone()).ok()
}

/// Human-readable message carried by an error body, trying the keys the API
/// uses in order of specificity.
#[must_use]
pub fn error_message_in(body: &Value) -> Option<String> {
    ["detail", "hydra:description", "title", "message"]
        .iter()
        .find_map(|key| {
            body.get(*key)
                .and_then(Value::as_str)
                .filter(|msg| !msg.trim().is_empty())
        })
        .map(ToOwned::to_owned)
}
