use std::collections::BTreeSet;

use super::*;
use crate::state::auth::User;

fn signed_in(roles: &[&str]) -> AuthState {
    AuthState::signed_in(User {
        email: "a@example.com".to_owned(),
        roles: roles.iter().map(|r| (*r).to_owned()).collect::<BTreeSet<_>>(),
        display_name: None,
    })
}

#[test]
fn paths_round_trip_through_from_path() {
    let pages = [
        Page::Home,
        Page::Login,
        Page::Register,
        Page::Projects,
        Page::ProjectDetail(12),
        Page::Admin,
        Page::ManageProjects,
        Page::NewProject,
        Page::Gallery,
    ];
    for page in pages {
        assert_eq!(Page::from_path(&page.path()), Some(page), "{page}");
    }
}

#[test]
fn from_path_tolerates_trailing_slash_and_query() {
    assert_eq!(Page::from_path("/projects/"), Some(Page::Projects));
    assert_eq!(Page::from_path("/project/3?tab=info"), Some(Page::ProjectDetail(3)));
    assert_eq!(Page::from_path(""), Some(Page::Home));
    assert_eq!(Page::from_path("/project/abc"), None);
    assert_eq!(Page::from_path("/nowhere"), None);
}

#[test]
fn admin_pages_require_admin_role() {
    for page in [Page::Admin, Page::ManageProjects, Page::NewProject] {
        assert_eq!(page.requirement(), Requirement::Role(ROLE_ADMIN));
    }
    assert_eq!(Page::Gallery.requirement(), Requirement::None);
    assert_eq!(Page::Login.requirement(), Requirement::Guest);
}

#[test]
fn navigation_waits_while_restoring() {
    let nav = Navigator::new(Page::Admin, &AuthState::restoring());
    assert_eq!(nav.location(), Location::Pending(Page::Admin));
}

#[test]
fn restore_resolution_redirects_pending_visit() {
    let mut nav = Navigator::new(Page::Admin, &AuthState::restoring());
    assert_eq!(nav.on_session_change(&signed_in(&["ROLE_USER"])), Location::Showing(Page::Login));
}

#[test]
fn restore_resolution_allows_admin() {
    let mut nav = Navigator::new(Page::ManageProjects, &AuthState::restoring());
    assert_eq!(
        nav.on_session_change(&signed_in(&[ROLE_ADMIN, "ROLE_USER"])),
        Location::Showing(Page::ManageProjects)
    );
}

#[test]
fn non_admin_lands_on_login_then_home() {
    // `/admin` sends a plain user to `/login`, which sends any signed-in
    // session home.
    let mut nav = Navigator::new(Page::Gallery, &AuthState::anonymous());
    let state = signed_in(&["ROLE_USER"]);
    assert_eq!(nav.navigate(Page::Admin, &state), Location::Showing(Page::Home));
}

#[test]
fn anonymous_visit_to_projects_lands_on_login() {
    let mut nav = Navigator::new(Page::Gallery, &AuthState::anonymous());
    assert_eq!(nav.navigate(Page::ProjectDetail(4), &AuthState::anonymous()), Location::Showing(Page::Login));
}

#[test]
fn sign_in_on_login_page_moves_home() {
    let mut nav = Navigator::new(Page::Login, &AuthState::anonymous());
    assert_eq!(nav.location(), Location::Showing(Page::Login));
    assert_eq!(nav.on_session_change(&signed_in(&[])), Location::Showing(Page::Home));
}

#[test]
fn sign_out_on_protected_page_moves_to_login() {
    let mut nav = Navigator::new(Page::Projects, &signed_in(&[]));
    assert_eq!(nav.on_session_change(&AuthState::anonymous()), Location::Showing(Page::Login));
}

#[test]
fn gallery_stays_put_across_session_changes() {
    let mut nav = Navigator::new(Page::Gallery, &signed_in(&[]));
    assert_eq!(nav.on_session_change(&AuthState::anonymous()), Location::Showing(Page::Gallery));
}
