use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Model id that routes `/v1/chat/completions` through the orchestrator.
    #[serde(default = "default_reserved_model")]
    pub reserved_model: String,
    /// Tera template rendered once per session into the system message.
    #[serde(default = "default_system_prompt_template")]
    pub system_prompt_template: String,
    /// Persona used when storage holds no character record.
    #[serde(default)]
    pub character: CharacterConfig,
    #[serde(default)]
    pub replies: RepliesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterConfig {
    #[serde(default = "default_character_name")]
    pub name: String,
    #[serde(default = "default_personality")]
    pub personality: String,
    #[serde(default)]
    pub owner_identifier: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub weight: String,
    /// Comma-delimited (`,` or `，`).
    #[serde(default = "default_catchphrases")]
    pub catchphrases: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepliesConfig {
    #[serde(default = "default_empty_input_reply")]
    pub empty_input: String,
    #[serde(default = "default_timeout_reply")]
    pub timeout: String,
    /// `{error}` is replaced with the scrubbed provider error.
    #[serde(default = "default_error_reply")]
    pub error: String,
    /// Appended to a stream that fails after it started.
    #[serde(default = "default_stream_interrupted_reply")]
    pub stream_interrupted: String,
}

fn default_reserved_model() -> String {
    "neko".into()
}

fn default_system_prompt_template() -> String {
    "You are {{ name }}, a catgirl companion. Personality: {{ personality }}.\
{% if owner_identifier %} Your owner's id is {{ owner_identifier }}.{% endif %}\
{% if height %} Height: {{ height }}.{% endif %}\
{% if weight %} Weight: {{ weight }}.{% endif %} \
Sprinkle in your catchphrases naturally: {{ catchphrases | join(sep=\", \") }}. \
Keep replies short, warm and in character."
        .into()
}

fn default_character_name() -> String {
    "Shizuku".into()
}

fn default_personality() -> String {
    "playful, curious and affectionate".into()
}

fn default_catchphrases() -> String {
    "nya~, uwu".into()
}

fn default_empty_input_reply() -> String {
    "Nya? Please send me some text or a picture~".into()
}

fn default_timeout_reply() -> String {
    "Uwu... thinking took too long! Please try again later (>_<)".into()
}

fn default_error_reply() -> String {
    "Uwu... something went wrong: {error}".into()
}

fn default_stream_interrupted_reply() -> String {
    "\n(the connection got lost, nya...)".into()
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            name: default_character_name(),
            personality: default_personality(),
            owner_identifier: String::new(),
            height: String::new(),
            weight: String::new(),
            catchphrases: default_catchphrases(),
        }
    }
}

impl Default for RepliesConfig {
    fn default() -> Self {
        Self {
            empty_input: default_empty_input_reply(),
            timeout: default_timeout_reply(),
            error: default_error_reply(),
            stream_interrupted: default_stream_interrupted_reply(),
        }
    }
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            reserved_model: default_reserved_model(),
            system_prompt_template: default_system_prompt_template(),
            character: CharacterConfig::default(),
            replies: RepliesConfig::default(),
        }
    }
}

impl RepliesConfig {
    pub fn render_error(&self, detail: &str) -> String {
        self.error.replace("{error}", detail)
    }
}

impl PersonaConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reserved_model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "persona.reserved_model must not be empty".into(),
            ));
        }
        if self.character.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "persona.character.name must not be empty".into(),
            ));
        }
        Ok(())
    }
}
