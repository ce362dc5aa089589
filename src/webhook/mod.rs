//! Webhook surface: request/response types, action dispatch and the HTTP server.

pub mod dispatch;
pub mod http;
pub mod types;

pub use dispatch::{Action, Dispatcher};
pub use http::WebhookServer;
pub use types::{FulfillmentResponse, WebhookRequest};
