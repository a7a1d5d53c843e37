use std::collections::BTreeSet;

use super::*;
use crate::state::auth::{ROLE_ADMIN, User};

fn user_with(roles: &[&str]) -> User {
    User {
        email: "a@example.com".to_owned(),
        roles: roles.iter().map(|r| (*r).to_owned()).collect::<BTreeSet<_>>(),
        display_name: None,
    }
}

const ALL: [Requirement; 4] =
    [Requirement::None, Requirement::Authenticated, Requirement::Role(ROLE_ADMIN), Requirement::Guest];

#[test]
fn never_decides_while_loading() {
    let state = AuthState::restoring();
    for requirement in &ALL {
        assert_eq!(evaluate(&state, requirement), GuardDecision::Pending);
    }
}

#[test]
fn anonymous_is_sent_to_login_for_protected_pages() {
    let state = AuthState::anonymous();
    assert_eq!(evaluate(&state, &Requirement::Authenticated), GuardDecision::Redirect("/login"));
    assert_eq!(evaluate(&state, &Requirement::Role(ROLE_ADMIN)), GuardDecision::Redirect("/login"));
    assert_eq!(evaluate(&state, &Requirement::None), GuardDecision::Allow);
    assert_eq!(evaluate(&state, &Requirement::Guest), GuardDecision::Allow);
}

#[test]
fn plain_user_is_redirected_from_admin_pages() {
    let state = AuthState::signed_in(user_with(&["ROLE_USER"]));
    assert_eq!(evaluate(&state, &Requirement::Role(ROLE_ADMIN)), GuardDecision::Redirect("/login"));
    assert_eq!(evaluate(&state, &Requirement::Authenticated), GuardDecision::Allow);
}

#[test]
fn admin_with_extra_roles_is_allowed() {
    let state = AuthState::signed_in(user_with(&[ROLE_ADMIN, "ROLE_USER"]));
    assert_eq!(evaluate(&state, &Requirement::Role(ROLE_ADMIN)), GuardDecision::Allow);
}

#[test]
fn signed_in_visitor_is_sent_home_from_guest_pages() {
    let state = AuthState::signed_in(user_with(&[]));
    assert_eq!(evaluate(&state, &Requirement::Guest), GuardDecision::Redirect("/"));
}
