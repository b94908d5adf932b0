//! Character profile rendered into the session's system message.

mod prompt;

pub use prompt::render_system_prompt;

use crate::config::CharacterConfig;
use crate::error::StorageError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub personality: String,
    pub owner_identifier: String,
    pub height: String,
    pub weight: String,
    pub catchphrases: Vec<String>,
}

/// Split the stored catchphrase list on ASCII or full-width commas.
pub fn parse_catchphrases(raw: &str) -> Vec<String> {
    raw.split([',', '，'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

impl Persona {
    /// Build a persona from its stored (comma-delimited) form.
    pub fn from_parts(
        name: &str,
        personality: &str,
        owner_identifier: &str,
        height: &str,
        weight: &str,
        catchphrases: &str,
    ) -> Result<Self, StorageError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StorageError::InvalidPersona("name is empty".into()));
        }
        let catchphrases = parse_catchphrases(catchphrases);
        if catchphrases.is_empty() {
            return Err(StorageError::InvalidPersona(format!(
                "{name} has no catchphrases"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            personality: personality.trim().to_string(),
            owner_identifier: owner_identifier.trim().to_string(),
            height: height.trim().to_string(),
            weight: weight.trim().to_string(),
            catchphrases,
        })
    }

    pub fn from_config(config: &CharacterConfig) -> Result<Self, StorageError> {
        Self::from_parts(
            &config.name,
            &config.personality,
            &config.owner_identifier,
            &config.height,
            &config.weight,
            &config.catchphrases,
        )
    }

    /// Comma-joined form used for storage.
    pub fn catchphrases_joined(&self) -> String {
        self.catchphrases.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catchphrases_split_on_both_comma_widths() {
        assert_eq!(
            parse_catchphrases("nya~， uwu ,,  meow"),
            vec!["nya~", "uwu", "meow"]
        );
    }

    #[test]
    fn persona_without_catchphrases_is_rejected() {
        let err = Persona::from_parts("Shizuku", "shy", "", "", "", " , ，").unwrap_err();
        assert!(err.to_string().contains("no catchphrases"));
    }

    #[test]
    fn persona_without_name_is_rejected() {
        assert!(Persona::from_parts(" ", "shy", "", "", "", "nya").is_err());
    }

    #[test]
    fn default_config_yields_valid_persona() {
        let persona = Persona::from_config(&CharacterConfig::default()).unwrap();
        assert_eq!(persona.name, "Shizuku");
        assert_eq!(persona.catchphrases_joined(), "nya~,uwu");
    }
}
