mod consumer_wrapper;
#[cfg(any(test, feature = "test-util"))]
mod in_memory;
mod kafka_session;
mod security_protocol;
mod session;

pub use consumer_wrapper::*;
#[cfg(any(test, feature = "test-util"))]
pub use in_memory::*;
pub use kafka_session::*;
pub use security_protocol::*;
pub use session::*;
