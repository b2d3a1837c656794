use crate::domain::model::{Deal, DealFilter, FxRates, Geography, Sector, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Location a written file ends up at, for reporting back to the user.
    fn location(&self, path: &str) -> String;
}

/// Where the raw email text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(String),
    Stdin,
    Sample,
}

pub trait ConfigProvider: Send + Sync {
    fn input(&self) -> InputSource;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> Vec<String>;
    fn compress(&self) -> bool;
    /// Fails when a configured filter value cannot be parsed.
    fn filter(&self) -> Result<DealFilter>;
    fn fx_rates(&self) -> FxRates;
    fn extra_sector_keywords(&self) -> Vec<(Sector, Vec<String>)>;
    fn extra_geography_keywords(&self) -> Vec<(Geography, Vec<String>)>;

    /// ZIP archive base name, without the stamp and extension.
    fn archive_name(&self) -> &str {
        "ma_intel"
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<String>;
    async fn transform(&self, content: String) -> Result<TransformResult>;

    /// Transform for a dry run: no calls to paid external services.
    async fn preview(&self, content: String) -> Result<TransformResult> {
        self.transform(content).await
    }

    async fn load(&self, result: &TransformResult) -> Result<Vec<String>>;
}

/// Produces a narrative intelligence report for a set of deals.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate_report(&self, deals: &[Deal], filter: &DealFilter) -> Result<String>;
}
