use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::error::AppError;
use crate::services::logo::Logo;
use crate::utils::color::validate_color;

pub const DEFAULT_FOREGROUND: &str = "#000000";
pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ErrorCorrection {
    L,
    M,
    Q,
    #[default]
    H,
}

impl From<ErrorCorrection> for qrcode::EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => qrcode::EcLevel::L,
            ErrorCorrection::M => qrcode::EcLevel::M,
            ErrorCorrection::Q => qrcode::EcLevel::Q,
            ErrorCorrection::H => qrcode::EcLevel::H,
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCorrection::L => write!(f, "L"),
            ErrorCorrection::M => write!(f, "M"),
            ErrorCorrection::Q => write!(f, "Q"),
            ErrorCorrection::H => write!(f, "H"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Reliability {
    Maximum,
    Standard,
}

impl fmt::Display for Reliability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reliability::Maximum => write!(f, "Maximum"),
            Reliability::Standard => write!(f, "Standard"),
        }
    }
}

/// Visual and reliability settings handed to the renderer.
///
/// Colors are passed to the renderer exactly as given; they are only
/// checked, never normalized.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct RenderConfig {
    #[validate(custom(function = "validate_color"))]
    pub foreground: String,
    #[validate(custom(function = "validate_color"))]
    pub background: String,
    pub level: ErrorCorrection,
    pub logo: Option<Logo>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            foreground: DEFAULT_FOREGROUND.to_string(),
            background: DEFAULT_BACKGROUND.to_string(),
            level: ErrorCorrection::H,
            logo: None,
        }
    }
}

impl RenderConfig {
    pub fn effective_reliability(&self) -> Reliability {
        if self.level == ErrorCorrection::H {
            Reliability::Maximum
        } else {
            Reliability::Standard
        }
    }

    /// Warn when a logo covers modules that a lower level may not recover.
    pub fn logo_advisory(&self) -> Option<String> {
        match (&self.logo, self.level) {
            (Some(_), ErrorCorrection::H) | (None, _) => None,
            (Some(_), level) => Some(format!(
                "A logo hides part of the code; level {} may not keep it scannable, H is recommended",
                level
            )),
        }
    }

    /// Apply a partial update. Nothing changes unless the whole update is valid.
    pub fn apply(&mut self, update: ConfigUpdate) -> Result<(), AppError> {
        update.validate()?;

        let mut next = self.clone();
        if let Some(foreground) = update.foreground {
            next.foreground = foreground;
        }
        if let Some(background) = update.background {
            next.background = background;
        }
        if let Some(level) = update.level {
            next.level = level;
        }
        next.validate()?;

        *self = next;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = RenderConfig::default();
    }

    pub fn set_logo(&mut self, logo: Logo) {
        self.logo = Some(logo);
    }

    pub fn clear_logo(&mut self) {
        self.logo = None;
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ConfigUpdate {
    #[validate(custom(function = "validate_color"))]
    pub foreground: Option<String>,
    #[validate(custom(function = "validate_color"))]
    pub background: Option<String>,
    pub level: Option<ErrorCorrection>,
}

#[derive(Debug, Serialize)]
pub struct RenderConfigView {
    pub foreground: String,
    pub background: String,
    pub level: ErrorCorrection,
    pub logo: Option<String>,
    pub reliability: Reliability,
    pub advisory: Option<String>,
}

impl From<&RenderConfig> for RenderConfigView {
    fn from(config: &RenderConfig) -> Self {
        Self {
            foreground: config.foreground.clone(),
            background: config.background.clone(),
            level: config.level,
            logo: config.logo.as_ref().map(|logo| logo.data_uri().to_string()),
            reliability: config.effective_reliability(),
            advisory: config.logo_advisory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::logo::sample_png;

    fn logo() -> Logo {
        Logo::from_bytes(&sample_png(4, 4), 1024 * 1024, 1024).unwrap()
    }

    #[test]
    fn defaults_match_the_editor() {
        let config = RenderConfig::default();
        assert_eq!(config.foreground, "#000000");
        assert_eq!(config.background, "#FFFFFF");
        assert_eq!(config.level, ErrorCorrection::H);
        assert!(config.logo.is_none());
        assert_eq!(config.effective_reliability(), Reliability::Maximum);
    }

    #[test]
    fn reset_restores_defaults_from_any_state() {
        let mut config = RenderConfig::default();
        config
            .apply(ConfigUpdate {
                foreground: Some("#4F46E5".to_string()),
                background: Some("navy".to_string()),
                level: Some(ErrorCorrection::L),
            })
            .unwrap();
        config.set_logo(logo());

        config.reset();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn reliability_is_standard_below_h() {
        for level in [ErrorCorrection::L, ErrorCorrection::M, ErrorCorrection::Q] {
            let config = RenderConfig {
                level,
                ..RenderConfig::default()
            };
            assert_eq!(config.effective_reliability(), Reliability::Standard);
            assert_eq!(config.effective_reliability().to_string(), "Standard");
        }
    }

    #[test]
    fn malformed_color_is_rejected_and_config_untouched() {
        let mut config = RenderConfig::default();
        let err = config
            .apply(ConfigUpdate {
                foreground: Some("#12345".to_string()),
                background: Some("#000000".to_string()),
                level: Some(ErrorCorrection::M),
            })
            .unwrap_err();
        assert!(matches!(err, AppError::RejectedConfiguration(_)));
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn colors_are_kept_verbatim() {
        let mut config = RenderConfig::default();
        config
            .apply(ConfigUpdate {
                foreground: Some("#abc".to_string()),
                ..ConfigUpdate::default()
            })
            .unwrap();
        assert_eq!(config.foreground, "#abc");
        assert_eq!(config.background, "#FFFFFF");
    }

    #[test]
    fn advisory_only_for_logo_below_h() {
        let mut config = RenderConfig::default();
        config.set_logo(logo());
        assert!(config.logo_advisory().is_none());

        config.level = ErrorCorrection::M;
        assert!(config.logo_advisory().unwrap().contains("level M"));

        config.clear_logo();
        assert!(config.logo_advisory().is_none());
    }
}
