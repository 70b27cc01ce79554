// ghwatch-api: Async Rust client for the getter/executor status backend

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{DataClient, Endpoint};
pub use error::Error;
pub use models::{
    ExecutorEntry, ExecutorList, GetterDetail, GetterEntry, GetterMap, StatusReport, TypeSchema,
    TypedValue,
};
pub use transport::{TlsMode, TransportConfig};
