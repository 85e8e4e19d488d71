pub mod cli;
pub mod entity;
pub mod error;
pub mod package;
pub mod paths;
pub mod scan;
pub mod service;
pub mod store;

pub use error::{QuadraError, Result};
pub use service::StoreService;
