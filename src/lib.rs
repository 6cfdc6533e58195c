pub mod asset;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod pipeline;
pub mod process;
pub mod publish;
pub mod write;

pub use asset::Asset;
pub use config::Config;
pub use error::{FlowError, Result};
