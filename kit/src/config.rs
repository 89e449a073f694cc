//! TOML configuration for a whole character setup.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    camera::CameraSettings,
    enemy::EnemySettings,
    error::{ConfigError, SetupError},
    health::HealthSettings,
    input::{ControlScheme, InputSettings},
    jump::JumpSettings,
    motor::MotorSettings,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub settings: InputSettings,
    pub schemes: Vec<ControlScheme>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            settings: InputSettings::default(),
            schemes: vec![ControlScheme::keyboard(), ControlScheme::gamepad()],
        }
    }
}

/// Every tunable in one document. Missing tables and fields fall back to their defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KitConfig {
    pub motor: MotorSettings,
    pub jump: JumpSettings,
    pub health: HealthSettings,
    pub camera: CameraSettings,
    pub input: InputConfig,
    pub enemy: EnemySettings,
}

impl KitConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::info!("config: loaded {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        self.motor.validate()?;
        self.health.validate()?;
        self.camera.validate()?;
        if self.jump.jump_count == 0 {
            return Err(SetupError::InvalidSetting {
                field: "jump.jump_count",
                reason: "must be at least 1",
            });
        }
        if self.input.schemes.is_empty() {
            return Err(SetupError::NoControlSchemes);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{input::ControlType, jump::JumpStyle, layers::LayerMask};

    #[test]
    fn empty_document_gives_defaults() {
        let config = KitConfig::from_toml_str("").expect("config");
        assert_eq!(config.motor.movement.speed, 8.0);
        assert_eq!(config.motor.force_cooldown_secs, 0.1);
        assert_eq!(config.health.max_health, 5);
        assert_eq!(config.camera.position.distance, -8.0);
        assert_eq!(config.camera.collision_mask, LayerMask::ALL);
        assert_eq!(config.input.schemes.len(), 2);
    }

    #[test]
    fn partial_tables_override_fields() {
        let text = r#"
            [jump]
            style = "multi"
            jump_count = 3

            [motor.probes]
            ground_mask = 5

            [camera.orbit]
            h_rotation = 0.0

            [[input.schemes]]
            name = "Touch"
            control_type = "Mobile"
        "#;
        let config = KitConfig::from_toml_str(text).expect("config");

        assert_eq!(config.jump.style, JumpStyle::Multi);
        assert_eq!(config.jump.jump_count, 3);
        assert_eq!(config.motor.probes.ground_mask.bits, 5);
        assert_eq!(config.motor.probes.wall_mask, LayerMask::ALL);
        assert_eq!(config.camera.orbit.h_rotation, 0.0);
        assert_eq!(config.camera.orbit.v_rotation, -20.0);
        assert_eq!(config.input.schemes.len(), 1);
        assert_eq!(config.input.schemes[0].control_type, ControlType::Mobile);
    }

    #[test]
    fn invalid_values_are_setup_errors() {
        let err = KitConfig::from_toml_str("[jump]\njump_count = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Setup(SetupError::InvalidSetting {
                field: "jump.jump_count",
                ..
            })
        ));

        let err = KitConfig::from_toml_str("[input]\nschemes = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Setup(SetupError::NoControlSchemes)));

        let err = KitConfig::from_toml_str("[health]\nmax_health = \"many\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = KitConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
