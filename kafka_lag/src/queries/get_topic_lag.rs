mod aggregator;
mod handler;
mod inspector;
mod query;
mod response;
mod validator;

pub use aggregator::*;
pub use handler::*;
pub use inspector::*;
pub use query::*;
pub use response::*;
pub use validator::*;
