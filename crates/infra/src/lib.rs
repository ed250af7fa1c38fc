//! Infrastructure layer: in-memory state, the audit journal and the
//! application services built on top of them.

pub mod journal;
pub mod services;
pub mod store;


pub use services::{ServiceConfig, ServiceError, Services};
