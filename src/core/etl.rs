use crate::core::{Pipeline, TransformResult};
use crate::utils::error::Result;
use std::time::Instant;

/// What a run produced, for the binary to report back.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub written: Vec<String>,
    pub total_deals: usize,
    pub filtered_deals: usize,
    pub ai_report_generated: bool,
    pub ai_error: Option<String>,
    pub display: String,
}

impl RunSummary {
    fn from_result(result: &TransformResult, written: Vec<String>) -> Self {
        Self {
            written,
            total_deals: result.analytics.total_deals,
            filtered_deals: result.analytics.filtered_deals,
            ai_report_generated: result.ai_report.is_some(),
            ai_error: result.ai_error.clone(),
            display: result.outputs.display.clone(),
        }
    }
}

pub struct IntelEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> IntelEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    async fn extract_and_transform(&self, dry_run: bool) -> Result<TransformResult> {
        // Extract
        tracing::info!("Reading email content...");
        let content = self.pipeline.extract().await?;
        tracing::info!("Read {} characters", content.len());

        // Transform
        tracing::info!("Parsing deals...");
        let result = if dry_run {
            self.pipeline.preview(content).await?
        } else {
            self.pipeline.transform(content).await?
        };
        tracing::info!(
            "Parsed {} deals, {} after filtering",
            result.analytics.total_deals,
            result.analytics.filtered_deals
        );

        Ok(result)
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let result = self.extract_and_transform(false).await?;

        // Load
        tracing::info!("Writing outputs...");
        let written = self.pipeline.load(&result).await?;
        for path in &written {
            tracing::info!("Output saved to: {}", path);
        }

        tracing::info!("Run finished in {:.2}s", started.elapsed().as_secs_f64());
        Ok(RunSummary::from_result(&result, written))
    }

    /// 只解析與篩選，不呼叫 AI 也不寫出任何檔案
    pub async fn preview(&self) -> Result<RunSummary> {
        let result = self.extract_and_transform(true).await?;
        tracing::info!("Dry run: skipping output");
        Ok(RunSummary::from_result(&result, Vec::new()))
    }
}
