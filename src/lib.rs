//! Vehicle features - признаки для объявлений о продаже автомобилей

pub mod config;
pub mod error;
pub mod pipeline;
pub mod preprocessing;
pub mod types;

pub use config::*;
pub use error::{FeatureError, Result};
pub use pipeline::*;
pub use preprocessing::*;
pub use types::*;
