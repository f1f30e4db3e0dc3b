use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct StatsEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> StatsEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting statistics run...");

        // Extract
        tracing::info!("Extracting passenger data...");
        let passengers = self.pipeline.extract().await?;
        tracing::info!("Extracted {} passengers", passengers.len());

        // Transform
        tracing::info!("Computing statistics...");
        let report = self.pipeline.transform(passengers).await?;
        if report.r_naught < 0.0 {
            tracing::warn!("⚠️ Not enough infection days to estimate R0");
        } else {
            tracing::info!("R0 estimate: {:.3}", report.r_naught);
        }
        tracing::info!(
            "Computed series over {} days ({} infected)",
            report.dates.len(),
            report.total_infections_per_day.values().last().copied().unwrap_or(0)
        );

        // Load
        tracing::info!("Writing report...");
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Output saved to: {} in {:?}", output_path, started.elapsed());

        Ok(output_path)
    }
}
