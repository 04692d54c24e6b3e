pub mod app_config;
pub mod error;
pub mod lag_api;
pub mod startup;
pub mod time_util;
