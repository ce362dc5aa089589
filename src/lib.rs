pub mod billing;
pub mod config;
pub mod error;
pub mod graph;
pub mod messages;
pub mod webhook;

pub use config::Config;
pub use error::{FulfillmentError, Result};
pub use webhook::{Dispatcher, WebhookServer};
