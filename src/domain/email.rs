use secrecy::{ExposeSecret, Secret};
use serde::{Serialize, Serializer};

use std::hash::Hash;

use super::ValidationError;

/// Email addresses are normalised to lowercase so that lookups and
/// uniqueness checks are case-insensitive.
#[derive(Debug, Clone)]
pub struct Email(Secret<String>);

impl PartialEq for Email {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

impl Hash for Email {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.expose_secret().hash(state);
    }
}

impl Eq for Email {}

impl Email {
    pub fn parse(s: Secret<String>) -> Result<Self, ValidationError> {
        let normalised = s.expose_secret().trim().to_lowercase();
        if !validator::validate_email(&normalised) {
            return Err(ValidationError::new(String::from(
                "Invalid email address",
            )));
        }

        Ok(Self(Secret::new(normalised)))
    }
}

impl AsRef<Secret<String>> for Email {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl Serialize for Email {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.expose_secret())
    }
}
