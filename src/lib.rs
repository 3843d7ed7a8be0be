pub mod config;
pub mod data;
pub mod error;
pub mod generator;
pub mod server;
pub mod solver;
pub mod store;
pub mod topology;
