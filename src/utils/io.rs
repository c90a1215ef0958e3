//! IO Utilities

use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::Path};

use crate::egnn::EGNNConfig;
use crate::error::Result;

/// Save data as JSON
pub fn save_json<T: Serialize>(data: &T, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load data from JSON
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Load a model configuration and check it
pub fn load_config(path: impl AsRef<Path>) -> Result<EGNNConfig> {
    let config: EGNNConfig = load_json(path)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::egnn::Pooling;
    use crate::error::Error;

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("egnn.json");

        let config = EGNNConfig::new(3, 16, 4).with_pool(Pooling::Mean).with_rff(9, 0.7);
        save_json(&config, &path).unwrap();

        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_load_config_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "depth": 0 }"#).unwrap();

        assert!(matches!(load_config(&path), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(load_config("/nonexistent/egnn.json"), Err(Error::Io(_))));
    }
}
