pub mod canonical;
pub mod config;
pub mod content;
pub mod contract;
pub mod directory;
pub mod error;
pub mod integrity;
pub mod parameters;
pub mod service;
pub mod store;
pub mod types;
pub mod utils;

pub use contract::{Contract, ContractStatus};
pub use error::ContractError;
pub use service::ContractService;
