// src/config/validate.rs

use crate::config::model::{BuildConfig, RawConfigFile};
use crate::errors::{CartwatchError, Result};

impl TryFrom<RawConfigFile> for BuildConfig {
    type Error = CartwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        let cart = raw.cart;
        match (cart.input, cart.output) {
            (Some(input), Some(output)) => Ok(BuildConfig::new(input, output, cart.executable)),
            // `validate_config` already rejected missing paths.
            _ => Err(CartwatchError::ConfigError(
                "input and output are required".to_string(),
            )),
        }
    }
}

/// Check the merged (file + CLI) configuration.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    let input = cfg.cart.input.as_ref().ok_or_else(|| {
        CartwatchError::ConfigError(
            "no input directory given (use --input or [cart].input)".to_string(),
        )
    })?;
    let output = cfg.cart.output.as_ref().ok_or_else(|| {
        CartwatchError::ConfigError(
            "no output cart given (use --output or [cart].output)".to_string(),
        )
    })?;

    if !input.is_dir() {
        return Err(CartwatchError::ConfigError(format!(
            "input {:?} is not a directory",
            input
        )));
    }

    let is_p8 = output
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("p8"))
        .unwrap_or(false);
    if !is_p8 {
        return Err(CartwatchError::ConfigError(format!(
            "output {:?} must be a .p8 cartridge",
            output
        )));
    }

    if output.is_dir() {
        return Err(CartwatchError::ConfigError(format!(
            "output {:?} is a directory",
            output
        )));
    }

    Ok(())
}
