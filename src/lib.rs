// Library exports for taxicheck
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod outcome;
pub mod report;
pub mod suites;
