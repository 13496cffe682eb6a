use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Directory entry. Only people registered here can pass the gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Person {
    #[schema(example = "123456789")]
    pub cedula: String,
    #[sqlx(rename = "nombres")]
    #[serde(rename = "nombres")]
    #[schema(example = "Ana Ruiz")]
    pub name: String,
}

impl Person {
    pub fn new(cedula: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            cedula: cedula.into(),
            name: name.into(),
        }
    }

    /// Compares a typed-in name against the directory record, ignoring case and
    /// surrounding whitespace.
    pub fn name_matches(&self, candidate: &str) -> bool {
        self.name.trim().to_lowercase() == candidate.trim().to_lowercase()
    }
}
