use super::Persona;
use crate::error::ConfigError;
use tera::{Context, Tera};

/// Render the persona system prompt from a Tera template.
///
/// The template sees every persona field; `catchphrases` is a list.
pub fn render_system_prompt(template: &str, persona: &Persona) -> Result<String, ConfigError> {
    let context =
        Context::from_serialize(persona).map_err(|e| ConfigError::Template(e.to_string()))?;
    let rendered = Tera::one_off(template, &context, false)
        .map_err(|e| ConfigError::Template(describe_tera_error(&e)))?;
    Ok(rendered.trim().to_string())
}

fn describe_tera_error(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
