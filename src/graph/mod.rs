//! Query gateway: runs fixed Cypher templates with bound parameters and
//! flattens the returned records into a single alias → value mapping.

mod neo4j;
#[cfg(test)]
pub mod testing;

pub use neo4j::Neo4jGateway;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::Result;

/// Flattened query output: return alias → JSON value, in the order aliases
/// were first seen.
pub type QueryResult = Map<String, Value>;

/// A static Cypher query plus the return aliases it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTemplate {
    /// Short name used in logs and errors
    pub name: &'static str,
    pub cypher: &'static str,
    pub aliases: &'static [&'static str],
}

/// Parameter values bound to `$key` placeholders by the driver.
///
/// Values never become part of the query text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a parameter
    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Read-only access to the billing graph.
#[async_trait]
pub trait QueryGateway: Send + Sync {
    /// Execute `template` with `params` and flatten every record into one mapping.
    async fn execute(&self, template: &QueryTemplate, params: &QueryParams) -> Result<QueryResult>;
}

/// Merge one record into the accumulated result; later records win on alias collisions.
pub fn merge_record<I>(result: &mut QueryResult, record: I)
where
    I: IntoIterator<Item = (String, Value)>,
{
    for (alias, value) in record {
        result.insert(alias, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_last_write_wins() {
        let mut result = QueryResult::new();
        merge_record(&mut result, vec![("m".to_string(), json!({"Month": "2019-01"}))]);
        merge_record(&mut result, vec![("m".to_string(), json!({"Month": "2019-02"}))]);
        assert_eq!(result.len(), 1);
        assert_eq!(result["m"]["Month"], "2019-02");
    }

    #[test]
    fn test_merge_preserves_first_seen_order() {
        let mut result = QueryResult::new();
        merge_record(
            &mut result,
            vec![
                ("rec1".to_string(), json!({"name": "Plus"})),
                ("rec2".to_string(), Value::Null),
            ],
        );
        merge_record(&mut result, vec![("rec1".to_string(), json!({"name": "Max"}))]);
        let keys: Vec<_> = result.keys().cloned().collect();
        assert_eq!(keys, vec!["rec1", "rec2"]);
        assert_eq!(result["rec1"]["name"], "Max");
    }

    #[test]
    fn test_params_replace_existing_key() {
        let params = QueryParams::new()
            .with("name", "Bob")
            .with("month", "2019-01")
            .with("name", "Alice");
        assert_eq!(params.get("name"), Some("Alice"));
        assert_eq!(params.iter().count(), 2);
        assert_eq!(params.get("missing"), None);
    }
}
