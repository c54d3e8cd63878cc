use std::fmt;

/// Cache key: a scope tag plus, for data entries, the project it belongs to.
///
/// The scope-only form ([`QueryKey::all`]) addresses every entry of the
/// scope at once and never holds data itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    scope: &'static str,
    project_id: Option<String>,
}

impl QueryKey {
    pub fn all(scope: &'static str) -> Self {
        Self {
            scope,
            project_id: None,
        }
    }

    pub fn for_project(scope: &'static str, project_id: impl Into<String>) -> Self {
        Self {
            scope,
            project_id: Some(project_id.into()),
        }
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn is_all(&self) -> bool {
        self.project_id.is_none()
    }

    /// True when `self` is `prefix` or an entry inside `prefix`'s scope
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.scope == prefix.scope && (prefix.is_all() || self.project_id == prefix.project_id)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.project_id {
            Some(id) => write!(f, "{}/{}", self.scope, id),
            None => f.write_str(self.scope),
        }
    }
}
