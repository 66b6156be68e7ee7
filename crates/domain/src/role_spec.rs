//! Role list normalisation for "has any of these roles" checks.

use serde::{Deserialize, Serialize};

/// Normalised set of role names accepted by a role check.
///
/// Inputs may be a single name, a comma-separated list (`"Admin, Editor"`),
/// or a sequence of names. Every entry is trimmed of whitespace and of
/// surrounding `'`/`"` quotes, then lower-cased. Empty entries are dropped so
/// a user without a role never matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSpec {
    names: Vec<String>,
}

impl RoleSpec {
    /// Parses a comma-separated role list.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        Self::from_names([value])
    }

    /// Builds a spec from a sequence of names, each of which may itself be a
    /// comma-separated list.
    #[must_use]
    pub fn from_names<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = Vec::new();
        for value in values {
            for entry in value.as_ref().split(',') {
                let normalized = normalize_role_name(entry);
                if !normalized.is_empty() && !names.contains(&normalized) {
                    names.push(normalized);
                }
            }
        }

        Self { names }
    }

    /// Returns the normalised names in input order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        self.names.as_slice()
    }

    /// Returns whether no usable role name was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Case-insensitive match of a resolved role against any entry.
    #[must_use]
    pub fn matches(&self, role: Option<&str>) -> bool {
        let Some(role) = role else {
            return false;
        };

        let role = role.trim().to_lowercase();
        self.names.iter().any(|name| *name == role)
    }
}

impl From<&str> for RoleSpec {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<Vec<String>> for RoleSpec {
    fn from(values: Vec<String>) -> Self {
        Self::from_names(values)
    }
}

fn normalize_role_name(value: &str) -> String {
    value
        .trim_matches(|character: char| character.is_whitespace() || matches!(character, '\'' | '"'))
        .to_lowercase()
}
