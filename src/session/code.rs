use std::fmt;
use std::str::FromStr;

use super::SessionError;
use crate::store::session_path;
use crate::util::{generate_code, is_valid_code, normalize_code};

/// Six-character session code shared by a coach with athletes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionCode(String);

impl SessionCode {
    pub fn generate() -> Self {
        Self(generate_code())
    }

    /// Parse user input.
    ///
    /// Surrounding whitespace is ignored and letters are uppercased. Blank
    /// input yields `Ok(None)`.
    pub fn parse(input: &str) -> Result<Option<Self>, SessionError> {
        let Some(code) = normalize_code(input) else {
            return Ok(None);
        };
        if !is_valid_code(&code) {
            return Err(SessionError::InvalidCode(code));
        }
        Ok(Some(Self(code)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of this session in the shared store
    pub fn store_path(&self) -> String {
        session_path(&self.0)
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionCode {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)?.ok_or_else(|| SessionError::InvalidCode(String::new()))
    }
}
