//! Cypher templates for the billing graph.
//!
//! Topology: `(:User)-[:subscribe]->(:Plan)<-[:plan]-(:Plans)`,
//! `(:Plan)-[:upgrade]->(:Plan)`, `(:User)-[:Bill]->()-[:Month]->(:Bill)` and
//! `(:User)-[:usage]->()-[:Month]->()`.

use crate::graph::QueryTemplate;

pub const CURRENT_PLAN: QueryTemplate = QueryTemplate {
    name: "current_plan",
    cypher: "MATCH (u:User)-[:subscribe]->(p:Plan)<-[:plan]-(dp:Plans) \
             WHERE u.name = $name \
             RETURN p",
    aliases: &["p"],
};

pub const RECOMMENDATION: QueryTemplate = QueryTemplate {
    name: "recommendation",
    cypher: "MATCH (u:User)-[:subscribe]->(p:Plan)<-[:plan]-(dp:Plans) \
             WHERE u.name = $name \
             OPTIONAL MATCH (p)-[:upgrade]->(up1)-[:upgrade]->(up2) \
             RETURN up1 AS rec1, up2 AS rec2",
    aliases: &["rec1", "rec2"],
};

pub const RECHARGE: QueryTemplate = QueryTemplate {
    name: "recharge",
    cypher: "MATCH (u:User)-[:Bill]->(b)-[:Month]->(m:Bill {Month: $month}) \
             WHERE u.name = $name \
             RETURN m",
    aliases: &["m"],
};

pub const ANALYZE: QueryTemplate = QueryTemplate {
    name: "analyze",
    cypher: "MATCH (u:User)-[:usage]->(b)-[:Month]->(m) \
             WHERE u.name = $name \
             RETURN m",
    aliases: &["m"],
};
