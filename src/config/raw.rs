use std::path::Path;

use ::config::{Config, Environment, File, FileFormat};

use crate::Result;
use crate::error::ConfigError;

use super::SettingsOverrides;

const ENV_PREFIX: &str = "TOASTER";

pub(super) fn load(path: Option<&Path>) -> Result<SettingsOverrides> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        builder = builder.add_source(File::from_str(&text, FileFormat::Toml));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let overrides: SettingsOverrides = builder
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))?;

    validate(&overrides)?;
    Ok(overrides)
}

fn validate(overrides: &SettingsOverrides) -> std::result::Result<(), ConfigError> {
    let required = [
        ("container_id", overrides.container_id.as_deref()),
        ("target", overrides.target.as_deref()),
    ];
    for (field, value) in required {
        if value.is_some_and(|value| value.trim().is_empty()) {
            return Err(ConfigError::InvalidField {
                field,
                message: "value cannot be blank".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate;
    use crate::config::SettingsOverrides;
    use crate::error::ConfigError;
    use ::config::{Config, File, FileFormat};
    use std::time::Duration;

    fn parse(toml: &str) -> SettingsOverrides {
        let built = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build();
        match built.and_then(|config| config.try_deserialize::<SettingsOverrides>()) {
            Ok(overrides) => overrides,
            Err(err) => panic!("failed to parse overrides: {err}"),
        }
    }

    #[test]
    fn toml_layer_parses_durations_and_extras() {
        let overrides = parse(
            r#"
            timeout = "0s"
            extended_timeout = "2s"
            prevent_duplicates = true

            [extra]
            theme = "dark"
            "#,
        );
        assert_eq!(overrides.timeout, Some(Duration::ZERO));
        assert_eq!(overrides.extended_timeout, Some(Duration::from_secs(2)));
        assert_eq!(overrides.prevent_duplicates, Some(true));
        assert_eq!(overrides.close_button, None);
        assert_eq!(
            overrides.extra.get("theme").and_then(|v| v.as_str()),
            Some("dark")
        );
    }

    #[test]
    fn blank_container_id_is_rejected() {
        let overrides = SettingsOverrides {
            container_id: Some("  ".to_string()),
            ..SettingsOverrides::default()
        };
        assert!(matches!(
            validate(&overrides),
            Err(ConfigError::InvalidField {
                field: "container_id",
                ..
            })
        ));
    }
}
