pub mod backend;
pub mod calculations;
pub mod series;
pub mod utils;

pub use backend::calculation_meta::{CalcType, CalculationMetadata, CalculationParameters};
pub use backend::calculation_runner::{CalculationJob, CalculationRunner};
pub use backend::storage_rows::{
    metadata_to_json, storage_batches, to_storage_rows, write_csv, StorageError, StorageRow,
    STORAGE_BATCH_SIZE,
};
pub use calculations::calculator::{CalculationError, DegeneracyPolicy, FlowCalculator};
pub use calculations::circular_geometry::{CircularGeometry, FlowRegime, WettedSection};
pub use calculations::head_loss::{
    converge_head_loss, pipe_flow_with_head_loss, velocity_head_loss, ConvergedLevel,
    ConvergenceCriterion, ConvergenceState, HeadLossOptions,
};
pub use calculations::overfall_calculator::{
    overfall, OverfallCalculator, WeirAdvisory, WeirParameters,
};
pub use calculations::pipe_flow_calculator::{
    pipe_flow, pipe_velocity, PipeFlowCalculator, PipeOutput, PipeParameters,
};
pub use calculations::units::{to_liters_per_second, Unit};
pub use series::time_series::{FlowSeries, LevelSeries, Quantity};
pub use utils::logger::Logger;
pub use utils::parsing::parse_decimal;
