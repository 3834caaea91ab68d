use crate::core::Pipeline;
use crate::domain::model::{RunSummary, Verdict};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Drives a [`Pipeline`] through its three stages.
pub struct AuditEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> AuditEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("🚀 Starting label audit");

        // Normalización
        tracing::info!("📥 Normalizing documents...");
        let products = self.pipeline.extract().await?;
        tracing::info!("Normalized {} documents", products.len());
        self.monitor.log_stats("Normalization");

        // Análisis
        tracing::info!("🔬 Analyzing against regulation...");
        let result = self.pipeline.transform(products).await?;
        tracing::info!(
            "Analyzed {} products, {} findings",
            result.assessments.len(),
            result.findings.len()
        );
        self.monitor.log_stats("Analysis");

        let products = result.assessments.len();
        let compliant = result.count(Verdict::Compliant);
        let non_compliant = result.count(Verdict::NonCompliant);
        let unverified = result.count(Verdict::Unverified);
        let findings = result.findings.len();

        // Reporte
        tracing::info!("📝 Writing report...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Report saved to: {}", output_path);
        self.monitor.log_stats("Report");
        self.monitor.log_final_stats();

        Ok(RunSummary {
            output_path,
            products,
            compliant,
            non_compliant,
            unverified,
            findings,
        })
    }
}
