use crate::adapters::openai::{
    AiSettings, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
};
use crate::config::{parse_min_value, resolve_input, ALLOWED_FORMATS, DEFAULT_FORMATS, DEFAULT_OUTPUT_PATH};
use crate::core::ConfigProvider;
use crate::domain::model::{DealFilter, FxRates, Geography, Sector};
use crate::domain::ports::InputSource;
use crate::utils::error::{IntelError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_output_formats, validate_path, validate_positive_number,
    validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub keywords: KeywordsConfig,
    pub fx: Option<FxConfig>,
    pub ai: Option<AiConfig>,
    #[serde(default)]
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: Option<String>,
    pub sample: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiltersConfig {
    pub sector: Option<String>,
    pub geography: Option<String>,
    pub min_value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordsConfig {
    #[serde(default)]
    pub sectors: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub geographies: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxConfig {
    pub eur: Option<f64>,
    pub usd: Option<f64>,
    pub unknown: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub enabled: bool,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: Option<String>,
    pub output_formats: Option<Vec<String>>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompressionConfig {
    #[serde(default)]
    pub enabled: bool,
    pub filename: Option<String>,
}

fn is_unresolved(value: &str) -> bool {
    ENV_VAR.is_match(value)
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(&path).map_err(|e| IntelError::ConfigError {
                message: format!("cannot read '{}': {}", path.as_ref().display(), e),
            })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| IntelError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OPENAI_API_KEY})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    fn resolved_keywords<K: std::str::FromStr<Err = IntelError>>(
        table: &BTreeMap<String, Vec<String>>,
    ) -> Result<Vec<(K, Vec<String>)>> {
        table
            .iter()
            .map(|(name, words)| Ok((name.parse::<K>()?, words.clone())))
            .collect()
    }

    /// AI 設定；未啟用或金鑰仍是未替換的 ${VAR} 時回傳 None 金鑰
    pub fn ai_settings(&self) -> Option<AiSettings> {
        let ai = self.ai.as_ref().filter(|ai| ai.enabled)?;
        let api_key = ai
            .api_key
            .clone()
            .filter(|key| !is_unresolved(key))
            .unwrap_or_default();

        Some(AiSettings {
            api_key,
            base_url: ai.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: ai.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: ai.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: ai.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            timeout_seconds: ai.timeout_seconds.unwrap_or(120),
        })
    }

    pub fn zip_filename(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .and_then(|c| c.filename.as_deref())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("load.output_path", self.output_path())?;
        validate_output_formats("load.output_formats", &self.output_formats(), ALLOWED_FORMATS)?;

        if let Some(path) = &self.input.path {
            validate_path("input.path", path)?;
        }

        self.filter()?;
        Self::resolved_keywords::<Sector>(&self.keywords.sectors)?;
        Self::resolved_keywords::<Geography>(&self.keywords.geographies)?;

        if let Some(fx) = &self.fx {
            for (field, rate) in [("fx.eur", fx.eur), ("fx.usd", fx.usd), ("fx.unknown", fx.unknown)] {
                if let Some(rate) = rate {
                    validate_range(field, rate, 0.0001, 10_000.0)?;
                }
            }
        }

        if let Some(filename) = self.zip_filename() {
            validate_non_empty_string("load.compression.filename", filename)?;
        }

        if let Some(settings) = self.ai_settings() {
            if settings.api_key.trim().is_empty() {
                return Err(IntelError::MissingConfigError {
                    field: "ai.api_key".to_string(),
                });
            }
            validate_url("ai.base_url", &settings.base_url)?;
            validate_non_empty_string("ai.model", &settings.model)?;
            validate_positive_number("ai.max_tokens", settings.max_tokens, 1)?;
            validate_range("ai.temperature", settings.temperature, 0.0, 2.0)?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn input(&self) -> InputSource {
        resolve_input(self.input.sample.unwrap_or(false), self.input.path.as_deref())
    }

    fn output_path(&self) -> &str {
        self.load.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH)
    }

    fn output_formats(&self) -> Vec<String> {
        self.load
            .output_formats
            .clone()
            .unwrap_or_else(|| DEFAULT_FORMATS.iter().map(|f| f.to_string()).collect())
    }

    fn compress(&self) -> bool {
        self.load.compression.as_ref().is_some_and(|c| c.enabled)
    }

    fn filter(&self) -> Result<DealFilter> {
        Ok(DealFilter {
            sector: self.filters.sector.as_deref().map(str::parse).transpose()?,
            geography: self.filters.geography.as_deref().map(str::parse).transpose()?,
            min_value_millions: match self.filters.min_value.as_deref() {
                Some(value) => parse_min_value(value)?,
                None => None,
            },
        })
    }

    fn fx_rates(&self) -> FxRates {
        let defaults = FxRates::default();
        match &self.fx {
            Some(fx) => FxRates {
                eur: fx.eur.unwrap_or(defaults.eur),
                usd: fx.usd.unwrap_or(defaults.usd),
                unknown: fx.unknown.unwrap_or(defaults.unknown),
            },
            None => defaults,
        }
    }

    fn extra_sector_keywords(&self) -> Vec<(Sector, Vec<String>)> {
        Self::resolved_keywords(&self.keywords.sectors).unwrap_or_default()
    }

    fn extra_geography_keywords(&self) -> Vec<(Geography, Vec<String>)> {
        Self::resolved_keywords(&self.keywords.geographies).unwrap_or_default()
    }

    fn archive_name(&self) -> &str {
        self.zip_filename().unwrap_or("ma_intel")
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[input]
path = "alerts/monday.txt"

[filters]
sector = "real estate"
geography = "uk"
min_value = "£60M+"

[keywords.sectors]
technology = ["quantum"]

[keywords.geographies]
europe = ["nordics"]

[fx]
usd = 0.8

[ai]
enabled = true
api_key = "sk-file"
model = "gpt-4o"
temperature = 0.2

[load]
output_path = "./reports"
output_formats = ["csv", "json"]
compression = { enabled = true, filename = "weekly" }
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.input(), InputSource::File("alerts/monday.txt".to_string()));
        let filter = config.filter().unwrap();
        assert_eq!(filter.sector, Some(Sector::RealEstate));
        assert_eq!(filter.geography, Some(Geography::Uk));
        assert_eq!(filter.min_value_millions, Some(60.0));

        assert_eq!(config.extra_sector_keywords(), vec![(Sector::Technology, vec!["quantum".to_string()])]);
        assert_eq!(config.extra_geography_keywords(), vec![(Geography::Europe, vec!["nordics".to_string()])]);

        let fx = config.fx_rates();
        assert_eq!(fx.usd, 0.8);
        assert_eq!(fx.eur, 0.85);

        let ai = config.ai_settings().unwrap();
        assert_eq!(ai.api_key, "sk-file");
        assert_eq!(ai.model, "gpt-4o");
        assert_eq!(ai.max_tokens, 2000);

        assert_eq!(config.output_path(), "./reports");
        assert_eq!(config.output_formats(), vec!["csv", "json"]);
        assert!(config.compress());
        assert_eq!(config.archive_name(), "weekly");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.input(), InputSource::Stdin);
        assert_eq!(config.output_path(), "./output");
        assert_eq!(config.output_formats(), vec!["csv", "md"]);
        assert!(!config.compress());
        assert!(config.ai_settings().is_none());
        assert_eq!(config.filter().unwrap(), DealFilter::default());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MA_INTEL_TEST_KEY", "sk-from-env");

        let toml_content = r#"
[ai]
enabled = true
api_key = "${MA_INTEL_TEST_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.ai_settings().unwrap().api_key, "sk-from-env");

        std::env::remove_var("MA_INTEL_TEST_KEY");
    }

    #[test]
    fn test_unresolved_api_key_fails_validation() {
        let toml_content = r#"
[ai]
enabled = true
api_key = "${MA_INTEL_SURELY_UNSET_VARIABLE}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.ai_settings().unwrap().api_key, "");
        assert!(matches!(
            config.validate(),
            Err(IntelError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_validation_errors() {
        let bad_sector = TomlConfig::from_toml_str("[filters]\nsector = \"space\"\n").unwrap();
        assert!(bad_sector.validate().is_err());
        assert!(bad_sector.filter().is_err());

        let bad_min = TomlConfig::from_toml_str("[filters]\nmin_value = \"lots\"\n").unwrap();
        assert!(matches!(
            bad_min.filter(),
            Err(IntelError::InvalidConfigValueError { .. })
        ));

        let bad_format = TomlConfig::from_toml_str("[load]\noutput_formats = [\"pdf\"]\n").unwrap();
        assert!(bad_format.validate().is_err());

        let bad_keyword = TomlConfig::from_toml_str("[keywords.sectors]\nmining = [\"gold\"]\n").unwrap();
        assert!(bad_keyword.validate().is_err());

        let bad_url = TomlConfig::from_toml_str(
            "[ai]\nenabled = true\napi_key = \"sk\"\nbase_url = \"not a url\"\n",
        )
        .unwrap();
        assert!(bad_url.validate().is_err());

        assert!(TomlConfig::from_toml_str("[load\n").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[input]
sample = true

[load]
output_path = "./file-output"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.input(), InputSource::Sample);
        assert_eq!(config.output_path(), "./file-output");

        assert!(matches!(
            TomlConfig::from_file("/no/such/ma-intel.toml"),
            Err(IntelError::ConfigError { .. })
        ));
    }
}
