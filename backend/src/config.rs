use serde::{Deserialize, Serialize};

/// Recognition service tuning, read from `config/scanner.yaml` at startup.
/// The credential itself comes from the `GEMINI_API_KEY` environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub model: String,
    pub endpoint: String,
    pub max_upload_bytes: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            model: "gemini-pro-latest".to_string(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl ScannerConfig {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let manifest_dir =
            std::env::var("CARGO_MANIFEST_DIR").map_err(|_| "Failed to get manifest directory")?;
        let config_path = format!("{}/../config/scanner.yaml", manifest_dir);
        let config_str = std::fs::read_to_string(config_path)?;
        let config: ScannerConfig = serde_yaml::from_str(&config_str)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let yaml = "model: gemini-pro-latest\nendpoint: https://example.test\nmax_upload_bytes: 1024\n";
        let config: ScannerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.model, "gemini-pro-latest");
        assert_eq!(config.endpoint, "https://example.test");
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: ScannerConfig = serde_yaml::from_str("model: custom-model\n").unwrap();
        assert_eq!(config.model, "custom-model");
        assert_eq!(config.endpoint, ScannerConfig::default().endpoint);
        assert_eq!(
            config.max_upload_bytes,
            ScannerConfig::default().max_upload_bytes
        );
    }
}
