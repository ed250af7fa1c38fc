//! Tracing and logging setup shared by EventDesk binaries.

pub mod logging;

pub use logging::{LogFormat, UnknownLogFormat};

