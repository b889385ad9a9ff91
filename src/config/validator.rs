use thiserror::Error;

use crate::config::{parse_header, ProxySettings, ServerSettings, Settings};
use crate::faker::FakerSettings;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ValidationError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub struct ConfigValidator;

impl ConfigValidator {
    /// Collects every problem instead of stopping at the first one
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        Self::validate_server(&settings.server, &mut errors);
        if let Some(proxy) = &settings.proxy {
            Self::validate_proxy(proxy, &mut errors);
        }
        Self::validate_faker(&settings.faker, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings, errors: &mut Vec<ValidationError>) {
        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::invalid(
                "server.port",
                "Port must be greater than 0",
            ));
        }

        if server
            .cors_origin
            .as_deref()
            .is_some_and(|origin| origin.trim().is_empty())
        {
            errors.push(ValidationError::invalid(
                "server.cors_origin",
                "Origin must not be empty",
            ));
        }
    }

    fn validate_proxy(proxy: &ProxySettings, errors: &mut Vec<ValidationError>) {
        if proxy.url.is_empty() {
            errors.push(ValidationError::MissingField("proxy.url".to_string()));
        } else if !(proxy.url.starts_with("http://") || proxy.url.starts_with("https://")) {
            errors.push(ValidationError::invalid(
                "proxy.url",
                format!("'{}' is not an http(s) URL", proxy.url),
            ));
        }

        for (idx, header) in proxy.headers.iter().enumerate() {
            if parse_header(header).is_none() {
                errors.push(ValidationError::invalid(
                    &format!("proxy.headers[{}]", idx),
                    format!("'{}' is not of the form 'Name: value'", header),
                ));
            }
        }

        for (idx, name) in proxy.forward_headers.iter().enumerate() {
            if name.trim().is_empty() || name.contains(':') {
                errors.push(ValidationError::invalid(
                    &format!("proxy.forward_headers[{}]", idx),
                    format!("'{}' is not a header name", name),
                ));
            }
        }

        if proxy.timeout_seconds == 0 {
            errors.push(ValidationError::invalid(
                "proxy.timeout_seconds",
                "Timeout must be greater than 0",
            ));
        }
    }

    fn validate_faker(faker: &FakerSettings, errors: &mut Vec<ValidationError>) {
        if faker.list_length.min > faker.list_length.max {
            errors.push(ValidationError::invalid(
                "faker.list_length",
                "min must not be greater than max",
            ));
        }

        let types = &faker.types;
        if types.int.min > types.int.max {
            errors.push(ValidationError::invalid(
                "faker.types.int",
                "min must not be greater than max",
            ));
        }
        if types.float.min > types.float.max {
            errors.push(ValidationError::invalid(
                "faker.types.float",
                "min must not be greater than max",
            ));
        }
        if types.float.precision.is_nan() || types.float.precision <= 0.0 {
            errors.push(ValidationError::invalid(
                "faker.types.float.precision",
                "Precision must be greater than 0",
            ));
        }
        if types.id.separator.is_empty() {
            errors.push(ValidationError::MissingField(
                "faker.types.id.separator".to_string(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(ConfigValidator::validate(&Settings::default()).is_ok());
    }

    #[test]
    fn test_server_validation() {
        let mut settings = Settings::default();
        settings.server.host = String::new();
        settings.server.port = 0;

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_proxy_validation_collects_all_problems() {
        let mut proxy = ProxySettings::new("ftp://example.com");
        proxy.headers = vec!["Authorization: ok".into(), "broken".into()];
        proxy.forward_headers = vec!["".into()];
        proxy.timeout_seconds = 0;
        let settings = Settings {
            proxy: Some(proxy),
            ..Default::default()
        };

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(messages.len(), 4, "{messages:?}");
        assert!(messages[0].contains("proxy.url"));
        assert!(messages[1].contains("proxy.headers[1]"));
    }

    #[test]
    fn test_inverted_ranges() {
        let mut settings = Settings::default();
        settings.faker.list_length.min = 5;
        settings.faker.list_length.max = 1;
        settings.faker.types.int.min = 10;
        settings.faker.types.int.max = 0;
        settings.faker.types.float.precision = 0.0;

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
