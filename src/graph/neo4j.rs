//! Neo4j-backed gateway over a pooled `neo4rs::Graph`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph, Node, Row};
use serde_json::{Map, Value};

use super::{merge_record, QueryGateway, QueryParams, QueryResult, QueryTemplate};
use crate::config::Config;
use crate::{FulfillmentError, Result};

const PING: QueryTemplate = QueryTemplate {
    name: "ping",
    cypher: "RETURN 1 AS ok",
    aliases: &["ok"],
};

/// Gateway backed by a Neo4j connection pool.
///
/// Each `execute` borrows one pooled connection for the duration of the call;
/// the connection goes back to the pool when the row stream is dropped.
pub struct Neo4jGateway {
    graph: Graph,
    timeout: Duration,
}

impl Neo4jGateway {
    /// Build the connection pool from configuration
    pub async fn connect(config: &Config) -> Result<Self> {
        let password = config
            .neo4j_password()
            .map_err(|e| FulfillmentError::Config(e.to_string()))?;

        let neo4j_config = ConfigBuilder::default()
            .uri(config.neo4j.uri.as_str())
            .user(config.neo4j.user.as_str())
            .password(password)
            .max_connections(config.neo4j.max_connections)
            .build()?;

        let graph = Graph::connect(neo4j_config).await?;

        Ok(Self {
            graph,
            timeout: config.query_timeout(),
        })
    }

    /// Round-trip a trivial query to confirm the database is reachable
    pub async fn ping(&self) -> Result<()> {
        let result = self.execute(&PING, &QueryParams::new()).await?;
        if result.get("ok").is_none() {
            return Err(FulfillmentError::Query("ping returned no rows".to_string()));
        }
        Ok(())
    }

    async fn run(&self, template: &QueryTemplate, params: &QueryParams) -> Result<(QueryResult, usize)> {
        let mut q = query(template.cypher);
        for (key, value) in params.iter() {
            q = q.param(key, value.to_string());
        }

        let mut stream = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }

        let result = flatten_rows(template, &rows)?;
        Ok((result, rows.len()))
    }
}

#[async_trait]
impl QueryGateway for Neo4jGateway {
    async fn execute(&self, template: &QueryTemplate, params: &QueryParams) -> Result<QueryResult> {
        let started = Instant::now();

        let (result, records) = tokio::time::timeout(self.timeout, self.run(template, params))
            .await
            .map_err(|_| FulfillmentError::QueryTimeout {
                template: template.name.to_string(),
                elapsed: started.elapsed(),
            })??;

        log::debug!(
            "Query {} returned {} records ({} aliases) in {:?}",
            template.name,
            records,
            result.len(),
            started.elapsed()
        );

        Ok(result)
    }
}

/// Read every template alias from every row; later rows win on collisions.
fn flatten_rows(template: &QueryTemplate, rows: &[Row]) -> Result<QueryResult> {
    let mut result = QueryResult::new();
    for row in rows {
        let mut record = Vec::with_capacity(template.aliases.len());
        for alias in template.aliases {
            record.push((alias.to_string(), row_value(row, alias)?));
        }
        merge_record(&mut result, record);
    }
    Ok(result)
}

/// Decode one returned column. Nodes flatten to an object of their properties.
fn row_value(row: &Row, alias: &str) -> Result<Value> {
    if let Ok(node) = row.get::<Node>(alias) {
        return node_properties(&node, alias);
    }

    row.get::<Value>(alias)
        .map_err(|e| FulfillmentError::Decode(format!("column '{}': {}", alias, e)))
}

fn node_properties(node: &Node, alias: &str) -> Result<Value> {
    let mut keys = node.keys();
    keys.sort_unstable();

    let mut props = Map::new();
    for key in keys {
        let value: Value = node
            .get(key)
            .map_err(|e| FulfillmentError::Decode(format!("{}.{}: {}", alias, key, e)))?;
        props.insert(key.to_string(), value);
    }

    Ok(Value::Object(props))
}

#[cfg(test)]
mod tests {
    use super::*;
    use neo4rs::{BoltInteger, BoltList, BoltMap, BoltNode, BoltNull, BoltString, BoltType};
    use serde_json::json;

    const PLAN_PAIR: QueryTemplate = QueryTemplate {
        name: "plan_pair",
        cypher: "RETURN rec1, rec2",
        aliases: &["rec1", "rec2"],
    };

    fn plan_node(id: i64, props: &[(&str, &str)]) -> BoltType {
        let mut properties = BoltMap::default();
        for (key, value) in props {
            properties.put(BoltString::from(*key), BoltType::String(BoltString::from(*value)));
        }
        let labels = BoltList::from(vec![BoltType::String(BoltString::from("Plan"))]);
        BoltType::Node(BoltNode::new(BoltInteger::new(id), labels, properties))
    }

    fn row(columns: &[&str], values: Vec<BoltType>) -> Row {
        let fields = columns
            .iter()
            .map(|c| BoltType::String(BoltString::from(*c)))
            .collect::<Vec<_>>();
        Row::new(BoltList::from(fields), BoltList::from(values))
    }

    #[test]
    fn test_node_column_flattens_to_sorted_properties() {
        let row = row(
            &["rec1"],
            vec![plan_node(1, &[("url", "http://x/img.png"), ("name", "Basic"), ("fee", "$10")])],
        );

        let value = row_value(&row, "rec1").unwrap();
        assert_eq!(value, json!({"fee": "$10", "name": "Basic", "url": "http://x/img.png"}));
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["fee", "name", "url"]);
    }

    #[test]
    fn test_null_column_decodes_to_null() {
        let row = row(
            &["rec1", "rec2"],
            vec![plan_node(1, &[("name", "Basic")]), BoltType::Null(BoltNull)],
        );

        assert_eq!(row_value(&row, "rec2").unwrap(), Value::Null);
    }

    #[test]
    fn test_scalar_column_decodes_directly() {
        let row = row(&["ok"], vec![BoltType::Integer(BoltInteger::new(1))]);

        assert_eq!(row_value(&row, "ok").unwrap(), json!(1));
    }

    #[test]
    fn test_rows_merge_last_write_wins() {
        let rows = vec![
            row(
                &["rec1", "rec2"],
                vec![plan_node(1, &[("name", "Plus")]), BoltType::Null(BoltNull)],
            ),
            row(
                &["rec1", "rec2"],
                vec![plan_node(2, &[("name", "Max")]), plan_node(3, &[("name", "Ultra")])],
            ),
        ];

        let result = flatten_rows(&PLAN_PAIR, &rows).unwrap();
        let keys: Vec<_> = result.keys().cloned().collect();
        assert_eq!(keys, vec!["rec1", "rec2"]);
        assert_eq!(result["rec1"]["name"], "Max");
        assert_eq!(result["rec2"]["name"], "Ultra");
    }

    #[test]
    fn test_no_rows_yield_empty_result() {
        assert!(flatten_rows(&PLAN_PAIR, &[]).unwrap().is_empty());
    }
}
