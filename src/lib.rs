pub mod aggregation;
pub mod config;
pub mod domain;
pub mod routes;
pub mod startup;
pub mod storage;
pub mod telemetry;
