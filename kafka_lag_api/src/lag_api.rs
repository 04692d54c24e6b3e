mod api;
mod converter;

pub use api::*;
pub use converter::*;
