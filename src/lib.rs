pub mod app;
pub mod bus;
pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod files;
pub mod logging;
pub mod notify;
pub mod presenter;
pub mod search;
pub mod store;
pub mod workflow;

pub use app::{App, AppParts};
pub use bus::{Command, CommandBus, DispatchReport};
pub use error::{LexdeskError, Result};
pub use store::CatalogStore;
