pub mod datetime;
pub mod export;
pub mod generator;
