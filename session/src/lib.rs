//! Session and authorization model for the job board.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every browser client owns one [`SessionStore`] (who is signed in) and one
//! [`AuthContext`] (who is signed in *and* what role their profile grants).
//! Pages consult [`guard::evaluate_route`] against the context's current
//! [`AuthState`] before rendering anything protected.
//!
//! Data flows one way:
//!
//! ```text
//! SessionStore --identity--> AuthContext --resolve--> ProfileResolver
//!                                 |
//!                                 +--AuthState--> route guard --> render | redirect
//! ```
//!
//! This crate has no HTTP or storage dependencies. The profile store sits behind
//! the [`ProfileResolver`] trait.

pub mod context;
pub mod guard;
pub mod identity;
pub mod profile;
pub mod resolver;
pub mod route;
pub mod store;

pub use context::{AuthContext, AuthState, AuthWatch, SessionUser};
pub use guard::GuardDecision;
pub use identity::Identity;
pub use profile::{Profile, ProfileError, ProfileRecord, Role};
pub use resolver::{ProfileResolver, ResolveError};
pub use route::{Access, Route};
pub use store::{IdentitySubscription, SessionStore, StoreClosed};
