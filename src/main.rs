use clap::Parser;
use label_audit::adapters::ocr::OcrEngine;
use label_audit::app::discovery::discover_inputs;
use label_audit::domain::ports::ConfigProvider;
use label_audit::utils::error::{AuditError, ErrorSeverity};
use label_audit::utils::{logger, validation::Validate};
use label_audit::{
    AuditEngine, AuditSettings, CliConfig, CompliancePipeline, LocalStorage, PdfTextExtractor,
};

const EXIT_NON_COMPLIANT: i32 = 4;

fn fail(e: &AuditError) -> ! {
    tracing::error!(
        "❌ Label audit failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn display_settings_summary(settings: &AuditSettings) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("  Inputs: {}", settings.inputs.join(", "));
    tracing::info!(
        "  Regulation: {}",
        settings.regulation_file.as_deref().unwrap_or("(none)")
    );
    tracing::info!("  Output: {}", settings.output_path);
    tracing::info!("  Formats: {}", settings.output_formats.join(", "));
    tracing::info!("  Workers: {}", settings.concurrent_files);
    tracing::info!(
        "  OCR: {} (min chars {}, lang {}, {} dpi)",
        if settings.ocr.enabled { "on" } else { "off" },
        settings.ocr.min_chars,
        settings.ocr.lang,
        settings.ocr.dpi
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting label-audit CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let settings = cli.resolve().unwrap_or_else(|e| fail(&e));

    // 驗證配置
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_settings_summary(&settings);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        let files = discover_inputs(settings.inputs()).unwrap_or_else(|e| fail(&e));
        for file in &files {
            println!("{}", file.display());
        }
        println!("{} PDF files would be audited", files.len());
        return Ok(());
    }

    if settings.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    if settings.ocr.enabled && !OcrEngine::new(settings.ocr_settings()).is_available() {
        tracing::warn!("⚠️ OCR tools not found, scanned documents will have no text");
    }

    let storage = LocalStorage::new(settings.output_path.clone());
    let extractor = PdfTextExtractor::new(settings.ocr_settings());
    let monitor_enabled = settings.monitor;
    let pipeline =
        CompliancePipeline::new(storage, settings, extractor).unwrap_or_else(|e| fail(&e));

    let engine = AuditEngine::new_with_monitoring(pipeline, monitor_enabled);

    let summary = match engine.run().await {
        Ok(summary) => summary,
        Err(e) => fail(&e),
    };

    tracing::info!("✅ Label audit completed successfully!");
    println!("✅ Label audit completed successfully!");
    println!(
        "📊 {} products: {} compliant, {} non-compliant, {} unverified ({} findings)",
        summary.products,
        summary.compliant,
        summary.non_compliant,
        summary.unverified,
        summary.findings
    );
    println!("📁 Report saved to: {}", summary.output_path);

    if cli.strict && summary.non_compliant > 0 {
        tracing::warn!(
            "🚩 Strict mode: {} non-compliant products",
            summary.non_compliant
        );
        std::process::exit(EXIT_NON_COMPLIANT);
    }

    Ok(())
}
