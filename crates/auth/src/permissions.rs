use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use sitegate_core::DomainError;

/// Permission code.
///
/// Permissions are dotted `module.action` strings (e.g. "rfi.view").
/// The code doubles as the permission's name: all membership and seeding
/// checks key off this string, never a numeric id, so that re-seeding the
/// catalog is idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(code: impl Into<Cow<'static, str>>) -> Self {
        Self(code.into())
    }

    /// Parse and validate a `module.action` code.
    pub fn parse(code: &str) -> Result<Self, DomainError> {
        let mut parts = code.split('.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(module), Some(action), None) if !module.is_empty() && !action.is_empty() => {
                Ok(Self(Cow::Owned(code.to_string())))
            }
            _ => Err(DomainError::validation(format!(
                "permission code must be 'module.action': '{code}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The module segment ("rfi" in "rfi.view").
    pub fn module(&self) -> &str {
        self.0.split('.').next().unwrap_or("")
    }

    /// The action segment ("view" in "rfi.view").
    pub fn action(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or("")
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_module_action() {
        let p = Permission::parse("document.view").unwrap();
        assert_eq!(p.module(), "document");
        assert_eq!(p.action(), "view");
    }

    #[test]
    fn parse_rejects_missing_action() {
        assert!(Permission::parse("document").is_err());
        assert!(Permission::parse("document.").is_err());
        assert!(Permission::parse(".view").is_err());
    }

    #[test]
    fn parse_rejects_extra_segments() {
        assert!(Permission::parse("a.b.c").is_err());
    }
}
