use crate::error::ServiceError;

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_PORT: u16 = 8000;

/// Process configuration, resolved once at startup and injected into the
/// gateway. The credential must come from the environment; there is no
/// baked-in default.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub model: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::resolve(
            std::env::var("GEMINI_API_KEY").ok(),
            std::env::var("GEMINI_MODEL").ok(),
            std::env::var("PORT").ok(),
        )
    }

    fn resolve(
        api_key: Option<String>,
        model: Option<String>,
        port: Option<String>,
    ) -> Result<Self, ServiceError> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ServiceError::Configuration(
                    "GEMINI_API_KEY is not set. Export it before starting the server"
                        .to_string(),
                )
            })?;

        let model = model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let port = match port {
            Some(p) => p.trim().parse::<u16>().map_err(|_| {
                ServiceError::Configuration(format!("PORT is not a valid port number: {}", p))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self { api_key, model, port })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_fails_closed() {
        let err = AppConfig::resolve(None, None, None).unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(_)));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn blank_api_key_fails_closed() {
        let err = AppConfig::resolve(Some("   ".to_string()), None, None).unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(_)));
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = AppConfig::resolve(Some("test-key".to_string()), None, None).unwrap();
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn explicit_model_and_port_override_defaults() {
        let config = AppConfig::resolve(
            Some("test-key".to_string()),
            Some("gemini-2.5-pro".to_string()),
            Some("9090".to_string()),
        )
        .unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn garbage_port_is_a_configuration_error() {
        let err = AppConfig::resolve(
            Some("test-key".to_string()),
            None,
            Some("eight thousand".to_string()),
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(_)));
    }
}
