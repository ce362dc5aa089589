//! Billing facade: the four read operations behind the webhook actions.
//!
//! Stateless. Nothing is fetched at construction; each operation runs exactly
//! one query for the customer it is given.

pub mod queries;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::config::BillingConfig;
use crate::graph::{QueryGateway, QueryParams, QueryResult, QueryTemplate};
use crate::Result;

/// Non-empty customer name used as the `$name` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerName(String);

impl CustomerName {
    /// Trimmed, non-empty name; `None` otherwise
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Accepts `"Bob"` or `["Bob", ...]`, as conversational platforms send either.
    pub fn from_param(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::new(s),
            Value::Array(items) => items.first().and_then(Value::as_str).and_then(Self::new),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct BillingFacade {
    gateway: Arc<dyn QueryGateway>,
    recharge_month: String,
}

impl BillingFacade {
    pub fn new(gateway: Arc<dyn QueryGateway>, settings: &BillingConfig) -> Self {
        Self {
            gateway,
            recharge_month: settings.recharge_month.clone(),
        }
    }

    /// Plan(s) the customer subscribes to: alias → {name, fee, url}
    pub async fn current_plan(&self, customer: &CustomerName) -> Result<QueryResult> {
        self.run(&queries::CURRENT_PLAN, Self::params(customer)).await
    }

    /// Up to two upgrade steps from the current plan: `rec1`, `rec2` (either may be null)
    pub async fn recommendation(&self, customer: &CustomerName) -> Result<QueryResult> {
        self.run(&queries::RECOMMENDATION, Self::params(customer)).await
    }

    /// Bill record for the configured billing month
    pub async fn recharge(&self, customer: &CustomerName) -> Result<QueryResult> {
        let params = Self::params(customer).with("month", self.recharge_month.as_str());
        self.run(&queries::RECHARGE, params).await
    }

    /// Usage records by month
    pub async fn analyze(&self, customer: &CustomerName) -> Result<QueryResult> {
        self.run(&queries::ANALYZE, Self::params(customer)).await
    }

    fn params(customer: &CustomerName) -> QueryParams {
        QueryParams::new().with("name", customer.as_str())
    }

    async fn run(&self, template: &QueryTemplate, params: QueryParams) -> Result<QueryResult> {
        let result = self.gateway.execute(template, &params).await?;
        if result.is_empty() {
            log::info!("{}: no records for the requested customer", template.name);
        }
        Ok(result)
    }
}
