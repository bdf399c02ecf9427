pub mod calculator;
pub mod circular_geometry;
pub mod head_loss;
pub mod overfall_calculator;
pub mod pipe_flow_calculator;
pub mod units;
