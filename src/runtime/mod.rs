//! Host-facing runtime facade and tick drivers.

pub mod host;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_driver;

pub use host::Runtime;
#[cfg(feature = "tokio-runtime")]
pub use tokio_driver::TickDriver;
