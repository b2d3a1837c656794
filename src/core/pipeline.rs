use crate::core::analytics::compute;
use crate::core::classify::Classifier;
use crate::core::filter::apply_filter;
use crate::core::parser::DealParser;
use crate::core::report::{render_csv, render_display, render_json, render_summary_markdown};
use crate::core::sample::SAMPLE_EMAIL;
use crate::core::{ConfigProvider, Pipeline, Storage, TransformResult};
use crate::domain::model::{Deal, DealFilter, RenderedOutputs};
use crate::domain::ports::{InputSource, ReportGenerator};
use crate::utils::error::{IntelError, Result};
use std::io::{IsTerminal, Write};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use zip::write::{FileOptions, ZipWriter};

pub struct DealPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    parser: DealParser,
    reporter: Option<Arc<dyn ReportGenerator>>,
    stamp: String,
    generated_at: String,
}

impl<S: Storage, C: ConfigProvider> DealPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let classifier = Classifier::with_extra_keywords(
            &config.extra_sector_keywords(),
            &config.extra_geography_keywords(),
        )?;
        let now = chrono::Local::now();

        Ok(Self {
            storage,
            config,
            parser: DealParser::new(classifier),
            reporter: None,
            stamp: now.format("%Y%m%d_%H%M%S").to_string(),
            generated_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }

    pub fn with_report_generator(mut self, reporter: Arc<dyn ReportGenerator>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// 固定檔名時間戳記 (測試用)
    pub fn with_stamp(mut self, stamp: impl Into<String>) -> Self {
        self.stamp = stamp.into();
        self
    }

    async fn read_stdin() -> Result<String> {
        if std::io::stdin().is_terminal() {
            return Err(IntelError::InputError {
                message: "no input provided; pass --input <file>, --sample, or pipe an email on stdin"
                    .to_string(),
            });
        }

        let mut buffer = String::new();
        tokio::io::stdin().read_to_string(&mut buffer).await?;
        Ok(buffer)
    }

    async fn ai_report(
        &self,
        filtered: &[Deal],
        filter: &DealFilter,
    ) -> (Option<String>, Option<String>) {
        let Some(reporter) = &self.reporter else {
            return (None, None);
        };

        if filtered.is_empty() {
            tracing::warn!("Skipping AI report: no deals match the current filters");
            return (None, Some("no deals match the current filters".to_string()));
        }

        match reporter.generate_report(filtered, filter).await {
            Ok(report) => {
                tracing::info!("AI report generated ({} chars)", report.len());
                (Some(report), None)
            }
            Err(e) => {
                // AI 失敗不影響其他輸出
                tracing::warn!("AI report failed: {} ({})", e, e.recovery_suggestion());
                (None, Some(e.to_string()))
            }
        }
    }

    async fn build_result(&self, content: String, use_ai: bool) -> Result<TransformResult> {
        let deals = self.parser.parse(&content);
        if deals.is_empty() {
            tracing::warn!("No numbered deals found in the email content");
        }

        let filter = self.config.filter()?;
        let fx = self.config.fx_rates();
        let filtered = apply_filter(&deals, &filter, &fx);
        tracing::debug!(
            "Filter [{} | {} | {}] kept {} of {} deals",
            filter.sector_label(),
            filter.geography_label(),
            filter.value_label(),
            filtered.len(),
            deals.len()
        );

        let analytics = compute(&deals, &filtered, content.len(), &fx);
        let (ai_report, ai_error) = if use_ai {
            self.ai_report(&filtered, &filter).await
        } else {
            if self.reporter.is_some() {
                tracing::info!("Dry run: AI report skipped");
            }
            (None, None)
        };

        let outputs = RenderedOutputs {
            csv: render_csv(&filtered)?,
            summary_markdown: render_summary_markdown(
                &analytics,
                &filtered,
                &filter,
                &self.generated_at,
                ai_error.as_deref(),
            ),
            json: render_json(&analytics, &filtered, &filter, &self.generated_at)?,
            display: render_display(&analytics, &filtered),
        };

        Ok(TransformResult {
            deals,
            filtered,
            analytics,
            outputs,
            ai_report,
            ai_error,
        })
    }

    /// 依設定的格式列出要輸出的檔案
    fn output_files(&self, result: &TransformResult) -> Vec<(String, Vec<u8>)> {
        let stamp = &self.stamp;
        let mut files = Vec::new();

        for format in self.config.output_formats() {
            let file = match format.as_str() {
                "csv" => (format!("ma_deals_{}.csv", stamp), &result.outputs.csv),
                "md" => (format!("ma_summary_{}.md", stamp), &result.outputs.summary_markdown),
                "json" => (format!("ma_deals_{}.json", stamp), &result.outputs.json),
                "txt" => (format!("ma_deals_{}.txt", stamp), &result.outputs.display),
                other => {
                    tracing::warn!("Ignoring unsupported output format: {}", other);
                    continue;
                }
            };
            files.push((file.0, file.1.as_bytes().to_vec()));
        }

        if let Some(report) = &result.ai_report {
            files.push((
                format!("ai_intelligence_report_{}.md", stamp),
                report.as_bytes().to_vec(),
            ));
        }

        files
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DealPipeline<S, C> {
    async fn extract(&self) -> Result<String> {
        let content = match self.config.input() {
            InputSource::File(path) => {
                tracing::debug!("Reading email from: {}", path);
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| IntelError::InputError {
                        message: format!("cannot read '{}': {}", path, e),
                    })?
            }
            InputSource::Stdin => {
                tracing::debug!("Reading email from stdin");
                Self::read_stdin().await?
            }
            InputSource::Sample => {
                tracing::debug!("Using built-in sample email");
                SAMPLE_EMAIL.to_string()
            }
        };

        if content.trim().is_empty() {
            return Err(IntelError::InputError {
                message: "email content is empty".to_string(),
            });
        }

        Ok(content)
    }

    async fn transform(&self, content: String) -> Result<TransformResult> {
        self.build_result(content, true).await
    }

    async fn preview(&self, content: String) -> Result<TransformResult> {
        self.build_result(content, false).await
    }

    async fn load(&self, result: &TransformResult) -> Result<Vec<String>> {
        let files = self.output_files(result);

        if !self.config.compress() {
            let mut written = Vec::with_capacity(files.len());
            for (name, data) in files {
                tracing::debug!("Writing {} ({} bytes)", name, data.len());
                self.storage.write_file(&name, &data).await?;
                written.push(self.storage.location(&name));
            }
            return Ok(written);
        }

        let archive = format!("{}_{}.zip", self.config.archive_name(), self.stamp);
        tracing::debug!("Creating ZIP file with {} files", files.len());

        // 創建ZIP文件
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            for (name, data) in &files {
                zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                zip.write_all(data)?;
            }
            // 完成並取回底層 Vec<u8>
            zip.finish()?.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(&archive, &zip_data).await?;

        Ok(vec![self.storage.location(&archive)])
    }
}
