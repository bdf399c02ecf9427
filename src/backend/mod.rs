pub mod calculation_meta;
pub mod calculation_runner;
pub mod storage_rows;
