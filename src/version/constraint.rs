//! Version constraints.
//!
//! Grammar: an optional operator (`=`, `>`, `>=`, `<`, `<=`, `~`, `^`)
//! followed by a version. A missing operator means `=`.

use crate::core::{Error, Result};
use crate::version::semver::{compare, Version};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Constraint operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Exact match
    Eq,
    /// Strictly greater
    Gt,
    /// Greater or equal
    Gte,
    /// Strictly less
    Lt,
    /// Less or equal
    Lte,
    /// Same major and minor, patch at least the constraint's
    Tilde,
    /// Same major, at least the constraint's version
    Caret,
}

impl Operator {
    // Two-character tokens must be tried before their one-character prefixes.
    const TOKENS: [(&'static str, Operator); 7] = [
        (">=", Operator::Gte),
        ("<=", Operator::Lte),
        (">", Operator::Gt),
        ("<", Operator::Lt),
        ("=", Operator::Eq),
        ("~", Operator::Tilde),
        ("^", Operator::Caret),
    ];

    /// Token used in constraint strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Tilde => "~",
            Operator::Caret => "^",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operator applied to a version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionConstraint {
    /// Operator
    pub op: Operator,
    /// Version operand
    pub version: Version,
}

impl VersionConstraint {
    /// Create a constraint.
    pub fn new(op: Operator, version: Version) -> Self {
        Self { op, version }
    }

    /// Parse a constraint such as `^1.2.3`, `>= 2.0.0` or `1.0.0`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let (op, rest) = Operator::TOKENS
            .iter()
            .find_map(|(token, op)| trimmed.strip_prefix(token).map(|rest| (*op, rest)))
            .unwrap_or((Operator::Eq, trimmed));

        let version = Version::parse(rest).map_err(|e| Error::InvalidConstraint {
            input: input.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self::new(op, version))
    }

    /// Evaluate the constraint against a version.
    pub fn check(&self, version: &Version) -> bool {
        let ord = compare(version, &self.version);
        match self.op {
            Operator::Eq => ord == Ordering::Equal,
            Operator::Gt => ord == Ordering::Greater,
            Operator::Gte => ord != Ordering::Less,
            Operator::Lt => ord == Ordering::Less,
            Operator::Lte => ord != Ordering::Greater,
            Operator::Tilde => {
                version.major == self.version.major
                    && version.minor == self.version.minor
                    && version.patch >= self.version.patch
            }
            Operator::Caret => version.major == self.version.major && ord != Ordering::Less,
        }
    }
}

impl FromStr for VersionConstraint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}

/// Whether `version` satisfies `constraint`.
///
/// An empty constraint or `*` accepts anything. Unparseable input on either
/// side is reported as unsatisfied rather than as an error.
pub fn satisfies(constraint: &str, version: &str) -> bool {
    let constraint = constraint.trim();
    if constraint.is_empty() || constraint == "*" {
        return true;
    }

    let (Ok(constraint), Ok(version)) =
        (VersionConstraint::parse(constraint), Version::parse(version))
    else {
        return false;
    };
    constraint.check(&version)
}
