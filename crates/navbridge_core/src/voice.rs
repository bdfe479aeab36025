use crate::error::{CoreError, Domain, ErrorKind, Result};

/// Voice guidance parameters forwarded to the guidance collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub muted: bool,
    volume: f64,
    language: String,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            muted: false,
            volume: 1.0,
            language: "en".to_string(),
        }
    }
}

impl VoiceSettings {
    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Finite values are clamped into `[0,1]`; NaN/infinite are rejected.
    pub fn set_volume(&mut self, volume: f64) -> Result<f64> {
        if !volume.is_finite() {
            return Err(CoreError::warn()
                .domain(Domain::Guidance)
                .kind(ErrorKind::InvalidArgument)
                .msgf(format_args!("voice volume must be a finite number, got {volume}"))
                .build());
        }
        self.volume = volume.clamp(0.0, 1.0);
        Ok(self.volume)
    }

    pub fn set_language(&mut self, language: &str) -> Result<()> {
        self.language = validate_language(language)?;
        Ok(())
    }
}

/// Trimmed, non-empty language tag.
pub fn validate_language(language: &str) -> Result<String> {
    let trimmed = language.trim();
    if trimmed.is_empty() {
        return Err(CoreError::warn()
            .domain(Domain::Config)
            .kind(ErrorKind::InvalidArgument)
            .msg("language must not be empty")
            .build());
    }
    Ok(trimmed.to_string())
}
