//! Version Module
//!
//! Three-part semantic versions and operator-based constraints:
//! - `Version` parsing and ordering
//! - `VersionConstraint` parsing and evaluation
//! - `satisfies` for dependency checks

pub mod constraint;
pub mod semver;

pub use constraint::{satisfies, Operator, VersionConstraint};
pub use semver::{compare, Version};
