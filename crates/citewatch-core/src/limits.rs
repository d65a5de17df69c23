use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::platform::PlatformId;

/// Optional HTTP endpoint settings for a platform's chat adapter. Platforms
/// without an endpoint (e.g. sources driven by a non-HTTP client) omit it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEndpoint {
    pub base_url: String,
    /// Name of the environment variable holding the provider API key.
    pub api_key_env: Option<String>,
    /// Provider-side model identifier sent with each query.
    pub model: Option<String>,
}

/// Token-bucket quota and endpoint configuration for one platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformLimit {
    pub platform: PlatformId,
    /// Bucket capacity: the largest burst the provider tolerates.
    pub capacity: u32,
    /// Refill rate in tokens per second.
    pub refill_per_sec: f64,
    pub endpoint: Option<PlatformEndpoint>,
}

#[derive(Debug, Deserialize)]
pub struct PlatformLimitsFile {
    pub platforms: Vec<PlatformLimit>,
}

/// Load and validate per-platform quotas from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation (duplicate platform, zero capacity, non-positive refill).
pub fn load_platform_limits(path: &Path) -> Result<PlatformLimitsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LimitsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let limits: PlatformLimitsFile = serde_yaml::from_str(&content)?;
    validate_limits(&limits)?;
    Ok(limits)
}

fn validate_limits(limits: &PlatformLimitsFile) -> Result<(), ConfigError> {
    if limits.platforms.is_empty() {
        return Err(ConfigError::Validation(
            "platform limits file must configure at least one platform".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for limit in &limits.platforms {
        if !seen.insert(limit.platform) {
            return Err(ConfigError::Validation(format!(
                "duplicate platform in limits file: '{}'",
                limit.platform
            )));
        }
        if limit.capacity == 0 {
            return Err(ConfigError::Validation(format!(
                "platform '{}' has zero capacity; buckets must hold at least one token",
                limit.platform
            )));
        }
        if limit.refill_per_sec <= 0.0 || !limit.refill_per_sec.is_finite() {
            return Err(ConfigError::Validation(format!(
                "platform '{}' has invalid refill rate {}; must be a positive number",
                limit.platform, limit.refill_per_sec
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(platform: PlatformId, capacity: u32, refill: f64) -> PlatformLimit {
        PlatformLimit {
            platform,
            capacity,
            refill_per_sec: refill,
            endpoint: None,
        }
    }

    #[test]
    fn rejects_empty_file() {
        let file = PlatformLimitsFile {
            platforms: Vec::new(),
        };
        let err = validate_limits(&file).unwrap_err();
        assert!(err.to_string().contains("at least one platform"));
    }

    #[test]
    fn rejects_duplicate_platform() {
        let file = PlatformLimitsFile {
            platforms: vec![
                limit(PlatformId::ChatGpt, 5, 1.0),
                limit(PlatformId::ChatGpt, 3, 0.5),
            ],
        };
        let err = validate_limits(&file).unwrap_err();
        assert!(err.to_string().contains("duplicate platform"));
    }

    #[test]
    fn rejects_zero_capacity() {
        let file = PlatformLimitsFile {
            platforms: vec![limit(PlatformId::Reddit, 0, 1.0)],
        };
        let err = validate_limits(&file).unwrap_err();
        assert!(err.to_string().contains("zero capacity"));
    }

    #[test]
    fn rejects_non_positive_refill() {
        let file = PlatformLimitsFile {
            platforms: vec![limit(PlatformId::Gemini, 2, 0.0)],
        };
        let err = validate_limits(&file).unwrap_err();
        assert!(err.to_string().contains("invalid refill rate"));
    }

    #[test]
    fn parses_yaml_with_endpoint() {
        let yaml = r"
platforms:
  - platform: chatgpt
    capacity: 5
    refill_per_sec: 1.0
    endpoint:
      base_url: https://api.openai.com
      api_key_env: OPENAI_API_KEY
      model: gpt-4
  - platform: reddit
    capacity: 2
    refill_per_sec: 0.2
";
        let file: PlatformLimitsFile = serde_yaml::from_str(yaml).expect("parse yaml");
        assert!(validate_limits(&file).is_ok());
        assert_eq!(file.platforms.len(), 2);
        let chatgpt = &file.platforms[0];
        assert_eq!(chatgpt.platform, PlatformId::ChatGpt);
        let endpoint = chatgpt.endpoint.as_ref().expect("endpoint");
        assert_eq!(endpoint.api_key_env.as_deref(), Some("OPENAI_API_KEY"));
        assert!(file.platforms[1].endpoint.is_none());
    }
}
