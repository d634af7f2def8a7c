pub mod boundary;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod logging;
pub mod provider;
pub mod ui;
pub mod workflow;

pub use error::{ReleaseTrainError, Result};
pub use workflow::Workflow;
