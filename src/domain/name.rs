use serde::{Deserialize, Serialize};

use super::ValidationError;

const MAX_NAME_LENGTH: usize = 255;

/// A display name for a workspace, person, project or skill. Surrounding
/// whitespace is dropped before validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name(String);

impl Name {
    pub fn parse(field: &str, name: &str) -> Result<Self, ValidationError> {
        let trimmed = name.trim();
        match trimmed.chars().count() {
            0 => Err(ValidationError::new(format!("{field} cannot be empty"))),
            x if x > MAX_NAME_LENGTH => Err(ValidationError::new(format!(
                "Max {} length is {} characters",
                field.to_lowercase(),
                MAX_NAME_LENGTH
            ))),
            _ => Ok(Self(trimmed.to_owned())),
        }
    }
}

impl AsRef<String> for Name {
    fn as_ref(&self) -> &String {
        &self.0
    }
}
