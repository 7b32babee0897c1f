//! Entity type names known to the CLI
//!
//! Bare filter tokens that match one of these names (ignoring case) restrict
//! the query to that entity type instead of becoming a text filter.

/// Assignable entity types offered by a stock Targetprocess installation
pub const DEFAULT_TYPES: &[&str] = &[
    "Bug",
    "Epic",
    "Feature",
    "Request",
    "Task",
    "TestPlan",
    "TestPlanRun",
    "UserStory",
    "Impediment",
];

/// The set of entity type names that filter tokens are matched against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityTypes {
    names: Vec<String>,
}

impl EntityTypes {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Return the configured spelling of `token` if it names a known type
    pub fn canonical(&self, token: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|name| name.eq_ignore_ascii_case(token))
            .map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.canonical(token).is_some()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for EntityTypes {
    fn default() -> Self {
        Self::new(DEFAULT_TYPES.iter().copied())
    }
}
