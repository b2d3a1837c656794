pub mod cli;
pub mod toml_config;

use crate::domain::model::MinValue;
use crate::domain::ports::InputSource;
use crate::utils::error::Result;

pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_FORMATS: &[&str] = &["csv", "md"];
pub const ALLOWED_FORMATS: &[&str] = &["csv", "md", "json", "txt"];

/// Parses a minimum value flag; `any` and an empty string mean no bound.
pub fn parse_min_value(value: &str) -> Result<Option<f64>> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("any") || trimmed.eq_ignore_ascii_case("any value") {
        return Ok(None);
    }
    Ok(Some(trimmed.parse::<MinValue>()?.0))
}

/// Resolves where the email text is read from. `-` means stdin.
pub fn resolve_input(sample: bool, input: Option<&str>) -> InputSource {
    if sample {
        return InputSource::Sample;
    }
    match input {
        Some("-") | None => InputSource::Stdin,
        Some(path) => InputSource::File(path.to_string()),
    }
}

#[cfg(feature = "cli")]
pub use args::CliConfig;

#[cfg(feature = "cli")]
mod args {
    use super::*;
    use super::toml_config::{AiConfig, TomlConfig};
    use crate::adapters::openai::{AiSettings, DEFAULT_BASE_URL, DEFAULT_MODEL};
    use crate::core::ConfigProvider;
    use crate::domain::model::{DealFilter, FxRates, Geography, Sector};
    use crate::utils::validation::{
        validate_output_formats, validate_path, validate_url, Validate,
    };
    use clap::Parser;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "ma-intel")]
    #[command(about = "Turn M&A alert emails into structured deals, analytics and reports")]
    pub struct CliConfig {
        /// Email file to process; `-` or omitted reads stdin
        #[arg(short, long)]
        pub input: Option<String>,

        /// Process the built-in sample alert
        #[arg(long, conflicts_with = "input")]
        pub sample: bool,

        /// TOML configuration file; flags override its values
        #[arg(short, long)]
        pub config: Option<String>,

        /// Sector focus, e.g. technology or "real estate"
        #[arg(long)]
        pub sector: Option<Sector>,

        /// Geography focus, e.g. uk, germany, usa
        #[arg(long)]
        pub geography: Option<Geography>,

        /// Minimum deal value in GBP, e.g. 30m, 300m, 1bn, any
        #[arg(long)]
        pub min_value: Option<String>,

        #[arg(long)]
        pub output_path: Option<String>,

        /// Output formats: csv, md, json, txt
        #[arg(long, value_delimiter = ',')]
        pub formats: Option<Vec<String>>,

        /// Bundle all outputs into one ZIP archive
        #[arg(long)]
        pub zip: bool,

        /// Generate a narrative report through the OpenAI API
        #[arg(long)]
        pub ai_report: bool,

        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        pub api_key: Option<String>,

        #[arg(long)]
        pub model: Option<String>,

        #[arg(long)]
        pub api_base: Option<String>,

        /// Do not print deal cards to stdout
        #[arg(short, long)]
        pub quiet: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        /// Emit logs as JSON lines
        #[arg(long)]
        pub log_json: bool,

        /// Parse and filter, print the result, write nothing
        #[arg(long)]
        pub dry_run: bool,
    }

    impl CliConfig {
        pub fn ai_settings(&self) -> Option<AiSettings> {
            if !self.ai_report {
                return None;
            }
            let mut settings = AiSettings::new(self.api_key.clone().unwrap_or_default());
            settings.model = self.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string());
            settings.base_url = self
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
            Some(settings)
        }

        /// 以命令列參數覆寫 TOML 設定
        pub fn merge_into(&self, file: &mut TomlConfig) {
            if self.sample {
                file.input.sample = Some(true);
            }
            if let Some(input) = &self.input {
                file.input.path = Some(input.clone());
                file.input.sample = Some(false);
            }

            if let Some(sector) = self.sector {
                file.filters.sector = Some(sector.name().to_string());
            }
            if let Some(geography) = self.geography {
                file.filters.geography = Some(geography.name().to_string());
            }
            if let Some(min_value) = &self.min_value {
                file.filters.min_value = Some(min_value.clone());
            }

            if let Some(output_path) = &self.output_path {
                file.load.output_path = Some(output_path.clone());
            }
            if let Some(formats) = &self.formats {
                file.load.output_formats = Some(formats.clone());
            }
            if self.zip {
                file.load.compression.get_or_insert_with(Default::default).enabled = true;
            }

            if self.ai_report {
                file.ai.get_or_insert_with(AiConfig::default).enabled = true;
            }
            if let Some(ai) = file.ai.as_mut() {
                if let Some(api_key) = &self.api_key {
                    ai.api_key = Some(api_key.clone());
                }
                if let Some(model) = &self.model {
                    ai.model = Some(model.clone());
                }
                if let Some(api_base) = &self.api_base {
                    ai.base_url = Some(api_base.clone());
                }
            }
        }
    }

    impl ConfigProvider for CliConfig {
        fn input(&self) -> InputSource {
            resolve_input(self.sample, self.input.as_deref())
        }

        fn output_path(&self) -> &str {
            self.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH)
        }

        fn output_formats(&self) -> Vec<String> {
            self.formats
                .clone()
                .unwrap_or_else(|| DEFAULT_FORMATS.iter().map(|f| f.to_string()).collect())
        }

        fn compress(&self) -> bool {
            self.zip
        }

        fn filter(&self) -> Result<DealFilter> {
            Ok(DealFilter {
                sector: self.sector,
                geography: self.geography,
                min_value_millions: match self.min_value.as_deref() {
                    Some(value) => parse_min_value(value)?,
                    None => None,
                },
            })
        }

        fn fx_rates(&self) -> FxRates {
            FxRates::default()
        }

        fn extra_sector_keywords(&self) -> Vec<(Sector, Vec<String>)> {
            Vec::new()
        }

        fn extra_geography_keywords(&self) -> Vec<(Geography, Vec<String>)> {
            Vec::new()
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_path("output_path", self.output_path())?;
            validate_output_formats("formats", &self.output_formats(), ALLOWED_FORMATS)?;
            self.filter()?;
            if let Some(path) = &self.input {
                validate_path("input", path)?;
            }
            if let Some(settings) = self.ai_settings() {
                if settings.api_key.trim().is_empty() {
                    return Err(crate::utils::error::IntelError::MissingConfigError {
                        field: "api_key (set OPENAI_API_KEY or pass --api-key)".to_string(),
                    });
                }
                validate_url("api_base", &settings.base_url)?;
            }
            Ok(())
        }
    }

}
