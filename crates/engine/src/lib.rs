pub mod broker;
pub mod config;
pub mod connect;
pub mod diagnose;
pub mod evaluate;
pub mod report;
