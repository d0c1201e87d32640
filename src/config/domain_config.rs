use crate::domain::model::ImageFormat;
use crate::utils::error::{MapError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.posemesh.org";
pub const DEFAULT_DDS_BASE_URL: &str = "https://dds.posemesh.org";
pub const DEFAULT_RESOLUTION: f64 = 20.0;
pub const DEFAULT_OUTPUT_DIRECTORY: &str = ".";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    pub domain: DomainSection,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DomainSection {
    pub domain_id: String,
    pub posemesh_account: String,
    pub posemesh_password: String,
    pub map_endpoint: String,
}

impl fmt::Debug for DomainSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainSection")
            .field("domain_id", &self.domain_id)
            .field("posemesh_account", &self.posemesh_account)
            .field("posemesh_password", &"***")
            .field("map_endpoint", &self.map_endpoint)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_dds_base_url")]
    pub dds_base_url: String,
    pub timeout_seconds: Option<u64>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_dds_base_url() -> String {
    DEFAULT_DDS_BASE_URL.to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            dds_base_url: default_dds_base_url(),
            timeout_seconds: None,
        }
    }
}

impl EndpointConfig {
    pub fn login_url(&self) -> String {
        format!("{}/user/login", self.api_base_url.trim_end_matches('/'))
    }

    pub fn domains_access_token_url(&self) -> String {
        format!(
            "{}/service/domains-access-token",
            self.api_base_url.trim_end_matches('/')
        )
    }

    pub fn domain_auth_url(&self, domain_id: &str) -> String {
        format!(
            "{}/api/v1/domains/{}/auth",
            self.dds_base_url.trim_end_matches('/'),
            domain_id
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: Option<String>,
    pub format: Option<ImageFormat>,
    pub resolution: Option<f64>,
}

impl DomainConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MapError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| MapError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${POSEMESH_PASSWORD})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern"));

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("domain.domain_id", &self.domain.domain_id)?;
        validation::validate_non_empty_string(
            "domain.posemesh_account",
            &self.domain.posemesh_account,
        )?;
        validation::validate_non_empty_string(
            "domain.posemesh_password",
            &self.domain.posemesh_password,
        )?;
        validation::validate_resolved("domain.posemesh_account", &self.domain.posemesh_account)?;
        validation::validate_resolved("domain.posemesh_password", &self.domain.posemesh_password)?;

        validation::validate_url("domain.map_endpoint", &self.domain.map_endpoint)?;
        validation::validate_url("endpoints.api_base_url", &self.endpoints.api_base_url)?;
        validation::validate_url("endpoints.dds_base_url", &self.endpoints.dds_base_url)?;

        if let Some(directory) = &self.output.directory {
            validation::validate_path("output.directory", directory)?;
        }
        if let Some(resolution) = self.output.resolution {
            validation::validate_positive("output.resolution", resolution)?;
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.endpoints.timeout_seconds.map(Duration::from_secs)
    }

    pub fn output_directory(&self) -> &str {
        self.output
            .directory
            .as_deref()
            .unwrap_or(DEFAULT_OUTPUT_DIRECTORY)
    }

    pub fn image_format(&self) -> ImageFormat {
        self.output.format.unwrap_or_default()
    }

    pub fn resolution(&self) -> f64 {
        self.output.resolution.unwrap_or(DEFAULT_RESOLUTION)
    }
}

impl Validate for DomainConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[domain]
domain_id = "dom-1"
posemesh_account = "user@example.com"
posemesh_password = "secret"
map_endpoint = "https://maps.example.com/generate"
"#;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = DomainConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.domain.domain_id, "dom-1");
        assert_eq!(config.endpoints.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(
            config.endpoints.login_url(),
            "https://api.posemesh.org/user/login"
        );
        assert_eq!(
            config.endpoints.domain_auth_url("dom-1"),
            "https://dds.posemesh.org/api/v1/domains/dom-1/auth"
        );
        assert_eq!(config.image_format(), ImageFormat::Png);
        assert_eq!(config.resolution(), 20.0);
        assert_eq!(config.output_directory(), ".");
        assert!(config.request_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_output_and_endpoint_sections() {
        let content = format!(
            "{}\n[endpoints]\napi_base_url = \"http://localhost:9000/\"\ntimeout_seconds = 15\n\n[output]\ndirectory = \"./maps\"\nformat = \"pgm\"\nresolution = 50.0\n",
            MINIMAL
        );

        let config = DomainConfig::from_toml_str(&content).unwrap();

        assert_eq!(
            config.endpoints.domains_access_token_url(),
            "http://localhost:9000/service/domains-access-token"
        );
        assert_eq!(config.endpoints.dds_base_url, DEFAULT_DDS_BASE_URL);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.output_directory(), "./maps");
        assert_eq!(config.image_format(), ImageFormat::Pgm);
        assert_eq!(config.resolution(), 50.0);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("POSEMESH_MAP_TEST_PASSWORD", "from-env");

        let content = MINIMAL.replace("\"secret\"", "\"${POSEMESH_MAP_TEST_PASSWORD}\"");
        let config = DomainConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.domain.posemesh_password, "from-env");

        std::env::remove_var("POSEMESH_MAP_TEST_PASSWORD");
    }

    #[test]
    fn test_unresolved_env_var_fails_validation() {
        let content = MINIMAL.replace("\"secret\"", "\"${POSEMESH_MAP_TEST_UNSET_VAR}\"");
        let config = DomainConfig::from_toml_str(&content).unwrap();

        assert_eq!(
            config.domain.posemesh_password,
            "${POSEMESH_MAP_TEST_UNSET_VAR}"
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let bad_endpoint = MINIMAL.replace("https://maps.example.com/generate", "invalid-url");
        let config = DomainConfig::from_toml_str(&bad_endpoint).unwrap();
        assert!(config.validate().is_err());

        let bad_resolution = format!("{}\n[output]\nresolution = 0.0\n", MINIMAL);
        let config = DomainConfig::from_toml_str(&bad_resolution).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_format_is_rejected_at_parse() {
        let content = format!("{}\n[output]\nformat = \"jpeg\"\n", MINIMAL);
        assert!(DomainConfig::from_toml_str(&content).is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let config = DomainConfig::from_toml_str(MINIMAL).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("user@example.com"));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = DomainConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.domain.map_endpoint, "https://maps.example.com/generate");
    }
}
