pub mod action;
pub mod args;
pub mod asset;
pub mod config;
pub mod driver;
pub mod env;
pub mod error;
pub mod events;
pub mod human;
pub mod io;
pub mod job;
pub mod orchestrator;
pub mod parameters;
pub mod paths;
pub mod remote;
pub mod script;
pub mod selector;
pub mod site;
pub mod template;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{AutostepError, Result};
