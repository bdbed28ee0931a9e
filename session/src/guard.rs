//! Route guard policy.
//!
//! Pure function of the current [`AuthState`] and the route's role requirement.
//! Evaluated on every page load and form post; calling it twice with the same
//! inputs gives the same answer.

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;

use crate::context::AuthState;
use crate::profile::Role;
use crate::route::{Access, Route};

/// Where unauthenticated viewers are sent.
pub const SIGN_IN_PATH: &str = "/auth/login";
/// Where signed-in viewers without the required role are sent.
pub const FALLBACK_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Profile still resolving: show a placeholder, do not redirect.
    Placeholder,
    Redirect(&'static str),
    Allow,
}

/// Decide what a protected page does for `state`.
///
/// `allowed_roles` of `None` admits any signed-in viewer.
#[must_use]
pub fn evaluate(state: &AuthState, allowed_roles: Option<&[Role]>) -> GuardDecision {
    if state.loading {
        return GuardDecision::Placeholder;
    }
    let Some(user) = &state.user else {
        return GuardDecision::Redirect(SIGN_IN_PATH);
    };
    match allowed_roles {
        Some(roles) if !roles.contains(&user.role) => GuardDecision::Redirect(FALLBACK_PATH),
        _ => GuardDecision::Allow,
    }
}

/// [`evaluate`] with the requirement taken from `route`'s access table entry.
/// Public routes are always allowed.
#[must_use]
pub fn evaluate_route(state: &AuthState, route: &Route) -> GuardDecision {
    match route.access() {
        Access::Public => GuardDecision::Allow,
        access => evaluate(state, access.required_roles()),
    }
}
