use super::ValidationError;
use secrecy::{ExposeSecret, Secret};

const MIN_PASSWORD_CHARACTERS: usize = 8;
const MAX_PASSWORD_CHARACTERS: usize = 128;

/// A plaintext password that satisfies the credentials policy. It only lives
/// long enough to be hashed or verified.
#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

impl Password {
    pub fn parse(s: Secret<String>) -> Result<Password, ValidationError> {
        let char_count = s.expose_secret().chars().count();

        if char_count < MIN_PASSWORD_CHARACTERS {
            return Err(ValidationError::new(format!(
                "Password too short. Should be {} to {} characters.",
                MIN_PASSWORD_CHARACTERS, MAX_PASSWORD_CHARACTERS
            )));
        }

        if char_count > MAX_PASSWORD_CHARACTERS {
            return Err(ValidationError::new(format!(
                "Password too long. Should be {} to {} characters.",
                MIN_PASSWORD_CHARACTERS, MAX_PASSWORD_CHARACTERS
            )));
        }

        Ok(Self(s))
    }
}

impl AsRef<Secret<String>> for Password {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}
