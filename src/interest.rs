//! Study interests offered by each field, grouped by educational stage

use serde::{Deserialize, Serialize};

/// A named interest within a field, tied to one academic stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interest {
    /// Row id; 0 until the store assigns one
    pub id: i64,
    pub name: String,
    pub field: String,
    pub stage: String,
}

impl Interest {
    pub fn new(name: impl Into<String>, field: impl Into<String>, stage: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            field: field.into(),
            stage: stage.into(),
        }
    }
}
