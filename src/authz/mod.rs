//! Request authorization: the wildcard path grammar and the ordered
//! first-match-wins rule router.

mod pattern;
mod router;

pub use pattern::PathPattern;
pub use router::{AuthState, AuthorizationRouter, AuthorizationRule, Decision};
