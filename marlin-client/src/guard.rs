//! Route authorization
//!
//! Permission-set checks are authoritative; the role name is display
//! only. Decisions are made fresh from a session snapshot on every
//! navigation and must never be cached across a commit or clear.

use crate::routes::Destination;
use crate::session::Session;

/// Outcome of a route authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Denied, with the destination the caller must redirect to.
    Denied(Destination),
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted)
    }
}

/// Decide whether the session may reach a destination requiring at least
/// one of `required`.
///
/// An unauthenticated session is denied everything protected and sent to
/// the login entry point; an authenticated session missing every required
/// permission is sent to the fixed unauthorized destination. An empty
/// requirement checks authentication only.
pub fn authorize(session: &Session, required: &[&str]) -> Access {
    if !session.is_authenticated() {
        return Access::Denied(Destination::Login);
    }
    if required.is_empty() || required.iter().any(|p| session.has_permission(p)) {
        Access::Granted
    } else {
        Access::Denied(Destination::Unauthorized)
    }
}

/// Authorization check for a configured route.
pub fn authorize_destination(session: &Session, destination: Destination) -> Access {
    if destination.is_public() {
        return Access::Granted;
    }
    authorize(session, destination.required_permissions())
}
