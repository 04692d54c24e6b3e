pub mod broker;
pub mod connection_settings;
pub mod error;
pub mod queries;
