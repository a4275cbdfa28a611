pub mod convert;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod seed;
pub mod service;
pub mod shopping;

pub use error::{BasketError, Result};
pub use service::BasketService;
