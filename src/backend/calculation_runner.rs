use rayon::prelude::*;

use crate::backend::calculation_meta::{CalculationMetadata, CalculationParameters};
use crate::calculations::calculator::CalculationError;
use crate::calculations::head_loss::pipe_flow_with_head_loss;
use crate::calculations::overfall_calculator::overfall;
use crate::series::time_series::{FlowSeries, LevelSeries};

/// One stored calculation applied to the level series of its signal.
#[derive(Debug, Clone)]
pub struct CalculationJob {
    pub metadata: CalculationMetadata,
    pub level: LevelSeries,
}

pub struct CalculationRunner;

impl CalculationRunner {
    /// Overfall runs the weir model; pipe flow runs the head-loss corrected pipe model.
    pub fn run(
        metadata: &CalculationMetadata,
        level: &LevelSeries,
    ) -> Result<FlowSeries, CalculationError> {
        metadata.validate()?;
        log::info!(
            "Running calculation '{}' ({}) on signal '{}'",
            metadata.unique_id,
            metadata.calc_type,
            metadata.original_signal_id
        );

        match &metadata.parameters {
            CalculationParameters::Overfall(params) => {
                overfall(level, params.height_p, params.width_b, metadata.unit)
            }
            CalculationParameters::PipeFlow(params) => {
                pipe_flow_with_head_loss(level, params, metadata.unit)
            }
        }
    }

    /// Runs independent jobs in parallel. Results keep the order of `jobs`; one failing
    /// job does not stop the others.
    pub fn run_many(jobs: &[CalculationJob]) -> Vec<Result<FlowSeries, CalculationError>> {
        log::info!("Running {} calculations", jobs.len());

        let results: Vec<Result<FlowSeries, CalculationError>> = jobs
            .par_iter()
            .map(|job| CalculationRunner::run(&job.metadata, &job.level))
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            log::error!("{} of {} calculations failed", failed, jobs.len());
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::overfall_calculator::WeirParameters;
    use crate::calculations::units::Unit;

    fn weir_metadata(id: &str, height_p: f64) -> CalculationMetadata {
        CalculationMetadata {
            unique_id: id.to_string(),
            name: id.to_string(),
            original_signal_id: "signal".to_string(),
            calc_type: crate::backend::calculation_meta::CalcType::Overfall,
            unit: Unit::LitersPerSecond,
            parameters: CalculationParameters::Overfall(WeirParameters {
                height_p,
                width_b: 0.4,
            }),
        }
    }

    #[test]
    fn failing_job_does_not_stop_the_batch() {
        let level = LevelSeries::from_values(vec![0.2, 0.5]);
        let jobs = vec![
            CalculationJob {
                metadata: weir_metadata("ok", 0.3),
                level: level.clone(),
            },
            CalculationJob {
                metadata: weir_metadata("bad", -0.3),
                level,
            },
        ];
        let results = CalculationRunner::run_many(&jobs);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(CalculationError::InvalidParameter(_))));
    }
}
