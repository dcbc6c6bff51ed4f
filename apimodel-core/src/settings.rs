//! Id codec configuration.

use serde::{Deserialize, Serialize};

use crate::errors::CodecError;

/// Default minimum length of an encoded id.
pub const DEFAULT_MIN_LENGTH: usize = 8;

/// Environment prefix read by [`CodecSettings::from_env`].
pub const ENV_PREFIX: &str = "APIMODEL";

/// Settings for the reversible id codec used by encrypted id fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecSettings {
    /// Secret salt. Must not be empty.
    pub salt: String,

    /// Minimum length of encoded ids.
    #[serde(default = "default_min_length")]
    pub min_length: usize,
}

fn default_min_length() -> usize {
    DEFAULT_MIN_LENGTH
}

impl CodecSettings {
    /// Create settings with the given salt and the default minimum length.
    #[must_use]
    pub fn new(salt: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            min_length: DEFAULT_MIN_LENGTH,
        }
    }

    /// Set the minimum encoded length.
    #[must_use]
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Load from `APIMODEL_ID_SALT` and `APIMODEL_ID_MIN_LENGTH`.
    pub fn from_env() -> Result<Self, CodecError> {
        Self::from_env_prefix(ENV_PREFIX)
    }

    /// Load from environment variables with given prefix.
    ///
    /// Looks for:
    /// - `{PREFIX}_ID_SALT` (required)
    /// - `{PREFIX}_ID_MIN_LENGTH`
    pub fn from_env_prefix(prefix: &str) -> Result<Self, CodecError> {
        let salt_var = format!("{}_ID_SALT", prefix);
        let salt = std::env::var(&salt_var)
            .map_err(|_| CodecError::configuration(format!("{} is not set", salt_var)))?;

        let length_var = format!("{}_ID_MIN_LENGTH", prefix);
        let min_length = match std::env::var(&length_var) {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                CodecError::configuration(format!("{} must be an integer, got \"{}\"", length_var, raw))
            })?,
            Err(_) => DEFAULT_MIN_LENGTH,
        };

        let settings = Self { salt, min_length };
        settings.validate()?;
        Ok(settings)
    }

    /// Check that the settings can build a codec.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.salt.is_empty() {
            return Err(CodecError::configuration(
                "an id salt must be configured before using encrypted id fields",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_settings_builder() {
        let settings = CodecSettings::new("pepper").with_min_length(12);
        assert_eq!(settings.salt, "pepper");
        assert_eq!(settings.min_length, 12);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_empty_salt_is_configuration_error() {
        assert!(matches!(
            CodecSettings::new("").validate(),
            Err(CodecError::Configuration(_))
        ));
    }

    #[test]
    fn test_deserialize_defaults_min_length() {
        let settings: CodecSettings = serde_json::from_str(r#"{"salt": "test"}"#).unwrap();
        assert_eq!(settings, CodecSettings::new("test"));
    }

    #[test]
    fn test_settings_from_env() {
        std::env::set_var("SETTINGS_TEST_ID_SALT", "envsalt");
        std::env::set_var("SETTINGS_TEST_ID_MIN_LENGTH", "10");

        let settings = CodecSettings::from_env_prefix("SETTINGS_TEST").unwrap();
        assert_eq!(settings, CodecSettings::new("envsalt").with_min_length(10));

        std::env::remove_var("SETTINGS_TEST_ID_SALT");
        std::env::remove_var("SETTINGS_TEST_ID_MIN_LENGTH");
    }

    #[test]
    fn test_settings_from_env_requires_salt() {
        let err = CodecSettings::from_env_prefix("SETTINGS_MISSING").unwrap_err();
        assert_eq!(
            err,
            CodecError::Configuration("SETTINGS_MISSING_ID_SALT is not set".into())
        );
    }
}
