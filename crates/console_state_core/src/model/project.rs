//! Project and environment selection models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Project record as tracked by the latest context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    pub fn new(id: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
            name: String::new(),
            extra: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Active environment filter: one name or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Environment {
    Single(String),
    Multiple(Vec<String>),
}

impl Environment {
    /// Environment names in selection order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Single(name) => vec![name.as_str()],
            Self::Multiple(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Environment;
    use serde_json::json;

    #[test]
    fn environment_accepts_single_or_list() {
        let single: Environment = serde_json::from_value(json!("production")).unwrap();
        assert_eq!(single.names(), vec!["production"]);

        let many: Environment = serde_json::from_value(json!(["staging", "dev"])).unwrap();
        assert_eq!(many.names(), vec!["staging", "dev"]);
    }
}
