pub mod analysis;
pub mod financials;
