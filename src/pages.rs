//! The application's pages and the navigator that guards them.
//!
//! Each page declares the access it needs; [`Navigator`] runs the guard on
//! every navigation and every session change and follows redirects until it
//! lands on a page the session may see.

#[cfg(test)]
#[path = "pages_test.rs"]
mod pages_test;

use std::fmt;

use crate::state::auth::{AuthState, ROLE_ADMIN};
use crate::util::auth::{GuardDecision, Requirement, evaluate};

// Redirect chains end on `/` or `/login`, both of which settle in one hop.
const MAX_REDIRECTS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Home,
    Login,
    Register,
    Projects,
    ProjectDetail(i64),
    Admin,
    ManageProjects,
    NewProject,
    Gallery,
}

impl Page {
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::Login => "/login".to_owned(),
            Self::Register => "/register".to_owned(),
            Self::Projects => "/projects".to_owned(),
            Self::ProjectDetail(id) => format!("/project/{id}"),
            Self::Admin => "/admin".to_owned(),
            Self::ManageProjects => "/admin/manage-projects".to_owned(),
            Self::NewProject => "/admin/projects/new".to_owned(),
            Self::Gallery => "/gallery".to_owned(),
        }
    }

    #[must_use]
    pub fn requirement(&self) -> Requirement {
        match self {
            Self::Gallery => Requirement::None,
            Self::Login | Self::Register => Requirement::Guest,
            Self::Home | Self::Projects | Self::ProjectDetail(_) => Requirement::Authenticated,
            Self::Admin | Self::ManageProjects | Self::NewProject => Requirement::Role(ROLE_ADMIN),
        }
    }

    /// Resolve a path. Query strings and a trailing slash are ignored.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        let page = match path {
            "/" => Self::Home,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/projects" => Self::Projects,
            "/admin" => Self::Admin,
            "/admin/manage-projects" => Self::ManageProjects,
            "/admin/projects/new" => Self::NewProject,
            "/gallery" => Self::Gallery,
            other => Self::ProjectDetail(other.strip_prefix("/project/")?.parse().ok()?),
        };
        Some(page)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Where navigation ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    /// Waiting for the session to restore before `Page` can be judged.
    Pending(Page),
    Showing(Page),
}

impl Location {
    #[must_use]
    pub fn page(&self) -> Page {
        match self {
            Self::Pending(page) | Self::Showing(page) => *page,
        }
    }
}

/// Tracks the current page and keeps it consistent with the session.
#[derive(Clone, Debug)]
pub struct Navigator {
    location: Location,
}

impl Navigator {
    #[must_use]
    pub fn new(start: Page, state: &AuthState) -> Self {
        Self { location: settle(start, state) }
    }

    #[must_use]
    pub fn location(&self) -> Location {
        self.location
    }

    /// Go to `page`, or wherever the guard sends the session instead.
    pub fn navigate(&mut self, page: Page, state: &AuthState) -> Location {
        self.location = settle(page, state);
        self.location
    }

    /// Re-judge the current page after the session changed.
    pub fn on_session_change(&mut self, state: &AuthState) -> Location {
        self.navigate(self.location.page(), state)
    }
}

fn settle(mut page: Page, state: &AuthState) -> Location {
    for _ in 0..MAX_REDIRECTS {
        match evaluate(state, &page.requirement()) {
            GuardDecision::Pending => return Location::Pending(page),
            GuardDecision::Allow => return Location::Showing(page),
            GuardDecision::Redirect(target) => {
                let Some(next) = Page::from_path(target) else {
                    break;
                };
                tracing::debug!(from = %page, to = %next, "guard redirect");
                page = next;
            }
        }
    }
    tracing::warn!(page = %page, "redirect chain did not settle; showing login");
    Location::Showing(Page::Login)
}
