pub mod api;
pub mod backend;
pub mod config;
pub mod logging;
pub mod tracking;

pub use api::client::Client;
pub use api::id::{ExperimentName, RunNumber};
pub use backend::rest::Server;
pub use config::Config;
pub use tracking::{Session, Target};
