pub mod binning;
pub mod categorical;
pub mod correlation;
pub mod distance;
pub mod interpret;
pub mod output;
pub mod pipeline;
pub mod rank;
pub mod sample;
