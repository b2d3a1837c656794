use anyhow::Context;
use clap::Parser;
use ma_intel::core::ConfigProvider;
use ma_intel::utils::{logger, validation::Validate};
use ma_intel::{
    AiSettings, CliConfig, DealPipeline, IntelEngine, LocalStorage, OpenAiReportGenerator,
    RunSummary, TomlConfig,
};
use std::io::Write;
use std::sync::Arc;

async fn execute<C: ConfigProvider + Validate>(
    config: C,
    ai: Option<AiSettings>,
    dry_run: bool,
) -> ma_intel::Result<RunSummary> {
    // 驗證配置
    config.validate()?;

    let storage = LocalStorage::new(config.output_path().to_string());
    let mut pipeline = DealPipeline::new(storage, config)?;

    if let Some(settings) = ai {
        tracing::info!("🤖 AI report enabled (model: {})", settings.model);
        pipeline = pipeline.with_report_generator(Arc::new(OpenAiReportGenerator::new(settings)?));
    }

    let engine = IntelEngine::new(pipeline);
    if dry_run {
        engine.preview().await
    } else {
        engine.run().await
    }
}

async fn run(cli: &CliConfig) -> ma_intel::Result<RunSummary> {
    match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            let mut file = TomlConfig::from_file(path)?;
            cli.merge_into(&mut file);
            let ai = file.ai_settings();
            execute(file, ai, cli.dry_run).await
        }
        None => execute(cli.clone(), cli.ai_settings(), cli.dry_run).await,
    }
}

fn print_summary(cli: &CliConfig, summary: &RunSummary) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();

    if !cli.quiet {
        writeln!(out, "{}", summary.display).context("failed to print deal cards")?;
        writeln!(out)?;
    }

    if cli.dry_run {
        writeln!(
            out,
            "Dry run: {} of {} deals matched, nothing written",
            summary.filtered_deals, summary.total_deals
        )?;
        return Ok(());
    }

    writeln!(
        out,
        "✅ Processed {} deals ({} after filtering)",
        summary.total_deals, summary.filtered_deals
    )?;
    for path in &summary.written {
        writeln!(out, "📁 Output saved to: {}", path)?;
    }
    if let Some(error) = &summary.ai_error {
        writeln!(out, "⚠️  AI report not generated: {}", error)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting ma-intel");

    match run(&cli).await {
        Ok(summary) => {
            tracing::info!("✅ Run completed");
            print_summary(&cli, &summary)?;
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
