//! Data source implementations

pub mod service;

pub use service::ServiceDataSource;
