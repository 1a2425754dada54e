pub mod config;
pub mod error;
pub mod portfolio;
pub mod quote;
pub mod report;
pub mod shell;
pub mod ticker;
pub mod valuation;
