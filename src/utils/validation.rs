use crate::utils::error::{MapError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(MapError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// Rejects zero, negative, NaN and infinite values.
pub fn validate_positive(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a positive number".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Catches `${VAR}` placeholders the environment could not resolve.
pub fn validate_resolved(field_name: &str, value: &str) -> Result<()> {
    if value.contains("${") {
        return Err(MapError::ConfigValidationError {
            field: field_name.to_string(),
            message: format!("Unresolved environment variable in '{}'", value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("map_endpoint", "https://example.com").is_ok());
        assert!(validate_url("map_endpoint", "http://example.com").is_ok());
        assert!(validate_url("map_endpoint", "").is_err());
        assert!(validate_url("map_endpoint", "invalid-url").is_err());
        assert!(validate_url("map_endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("resolution", 20.0).is_ok());
        assert!(validate_positive("resolution", 0.5).is_ok());
        assert!(validate_positive("resolution", 0.0).is_err());
        assert!(validate_positive("resolution", -3.0).is_err());
        assert!(validate_positive("resolution", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_resolved() {
        assert!(validate_resolved("posemesh_password", "hunter2").is_ok());
        assert!(validate_resolved("posemesh_password", "${POSEMESH_PASSWORD}").is_err());
    }
}
