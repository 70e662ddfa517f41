pub mod compile;
pub mod export;
pub mod probe;
