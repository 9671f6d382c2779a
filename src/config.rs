use crate::engine::OrderValidation;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub ir_directory: PathBuf,
    pub output_path: PathBuf,
    pub asset: String,
    pub output_format: OutputFormat,
    pub order_validation: OrderValidation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let ir_directory = env_map
            .get("IR_DIRECTORY")
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingEnv("IR_DIRECTORY".to_string()))?;

        let output_path = PathBuf::from(
            env_map
                .get("OUTPUT_PATH")
                .map(|s| s.as_str())
                .unwrap_or("data/gl/gains-and-losses.csv"),
        );

        let asset = env_map
            .get("ASSET")
            .map(|s| s.trim())
            .unwrap_or("BTC")
            .to_ascii_uppercase();
        if asset.is_empty() {
            return Err(ConfigError::InvalidValue(
                "ASSET".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let output_format = match env_map
            .get("OUTPUT_FORMAT")
            .map(|s| s.as_str())
            .unwrap_or("csv")
        {
            "csv" => OutputFormat::Csv,
            "json" => OutputFormat::Json,
            other => {
                return Err(ConfigError::InvalidValue(
                    "OUTPUT_FORMAT".to_string(),
                    format!("must be csv or json, got {}", other),
                ))
            }
        };

        let order_validation = match env_map
            .get("ORDER_VALIDATION")
            .map(|s| s.as_str())
            .unwrap_or("off")
        {
            "off" => OrderValidation::Off,
            "warn" => OrderValidation::Warn,
            other => {
                return Err(ConfigError::InvalidValue(
                    "ORDER_VALIDATION".to_string(),
                    format!("must be off or warn, got {}", other),
                ))
            }
        };

        Ok(Config {
            ir_directory,
            output_path,
            asset,
            output_format,
            order_validation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("IR_DIRECTORY".to_string(), "data/ir".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.ir_directory, PathBuf::from("data/ir"));
        assert_eq!(
            config.output_path,
            PathBuf::from("data/gl/gains-and-losses.csv")
        );
        assert_eq!(config.asset, "BTC");
        assert_eq!(config.output_format, OutputFormat::Csv);
        assert_eq!(config.order_validation, OrderValidation::Off);
    }

    #[test]
    fn test_missing_ir_directory() {
        let result = Config::from_env_map(HashMap::new());
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "IR_DIRECTORY"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_asset_is_upper_cased() {
        let mut env_map = setup_required_env();
        env_map.insert("ASSET".to_string(), " eth ".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.asset, "ETH");
    }

    #[test]
    fn test_empty_asset() {
        let mut env_map = setup_required_env();
        env_map.insert("ASSET".to_string(), "  ".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "ASSET"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_output_format() {
        let mut env_map = setup_required_env();
        env_map.insert("OUTPUT_FORMAT".to_string(), "xml".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "OUTPUT_FORMAT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_order_validation_warn() {
        let mut env_map = setup_required_env();
        env_map.insert("ORDER_VALIDATION".to_string(), "warn".to_string());
        env_map.insert("OUTPUT_FORMAT".to_string(), "json".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.order_validation, OrderValidation::Warn);
        assert_eq!(config.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_invalid_order_validation() {
        let mut env_map = setup_required_env();
        env_map.insert("ORDER_VALIDATION".to_string(), "strict".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "ORDER_VALIDATION"),
            _ => panic!("Expected InvalidValue error"),
        }
    }
}
