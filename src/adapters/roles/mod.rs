//! Role adapter implementations.

pub mod api;
pub mod briefs;
pub mod fixture;
pub mod registry;
pub mod relay;

pub use api::ApiRole;
pub use fixture::{FailingRole, FixtureRole};
pub use registry::RoleSet;
pub use relay::RelayRole;
