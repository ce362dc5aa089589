//! In-memory gateway for tests: canned records per (template, customer name).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{merge_record, QueryGateway, QueryParams, QueryResult, QueryTemplate};
use crate::{FulfillmentError, Result};

/// One executed query, as seen by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedQuery {
    pub template: &'static str,
    pub params: QueryParams,
}

#[derive(Default)]
pub struct StaticGateway {
    records: HashMap<(&'static str, String), Vec<Vec<(String, Value)>>>,
    failure: Option<String>,
    executed: Mutex<Vec<ExecutedQuery>>,
}

impl StaticGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one record returned by `template` when queried for `name`
    pub fn with_record(mut self, template: &'static str, name: &str, record: Vec<(&str, Value)>) -> Self {
        let record = record
            .into_iter()
            .map(|(alias, value)| (alias.to_string(), value))
            .collect();
        self.records
            .entry((template, name.to_string()))
            .or_default()
            .push(record);
        self
    }

    /// Make every query fail with a query error
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn executed(&self) -> Vec<ExecutedQuery> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryGateway for StaticGateway {
    async fn execute(&self, template: &QueryTemplate, params: &QueryParams) -> Result<QueryResult> {
        self.executed.lock().unwrap().push(ExecutedQuery {
            template: template.name,
            params: params.clone(),
        });

        if let Some(message) = &self.failure {
            return Err(FulfillmentError::Query(message.clone()));
        }

        let name = params.get("name").unwrap_or_default().to_string();
        let mut result = QueryResult::new();
        if let Some(records) = self.records.get(&(template.name, name)) {
            for record in records {
                merge_record(&mut result, record.clone());
            }
        }
        Ok(result)
    }
}
