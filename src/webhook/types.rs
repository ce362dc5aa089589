use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::messages::Message;

/// Inbound webhook request (Dialogflow v2 layout)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(default)]
    pub response_id: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub query_result: Option<IntentResult>,
}

/// The classified intent: action name, extracted parameters and live contexts
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResult {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub parameters: Value,
    #[serde(default)]
    pub output_contexts: Vec<OutputContext>,
}

/// Conversation context carried over from earlier turns
#[derive(Debug, Default, Deserialize)]
pub struct OutputContext {
    #[serde(default)]
    pub parameters: Value,
}

/// Response envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FulfillmentResponse {
    #[serde(rename = "fulfillmentMessages")]
    pub fulfillment_messages: Vec<Message>,
}

impl FulfillmentResponse {
    pub fn new(fulfillment_messages: Vec<Message>) -> Self {
        Self {
            fulfillment_messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::text_message;
    use serde_json::json;

    #[test]
    fn test_request_deserialize_full() {
        let request: WebhookRequest = serde_json::from_value(json!({
            "responseId": "r-1",
            "session": "projects/x/agent/sessions/abc",
            "queryResult": {
                "action": "recommendation",
                "parameters": {},
                "outputContexts": [
                    {"name": "ctx", "parameters": {"given-name": ["Alice"]}}
                ]
            }
        }))
        .unwrap();

        let intent = request.query_result.unwrap();
        assert_eq!(intent.action.as_deref(), Some("recommendation"));
        assert_eq!(intent.output_contexts.len(), 1);
        assert_eq!(intent.output_contexts[0].parameters["given-name"][0], "Alice");
        assert_eq!(request.response_id.as_deref(), Some("r-1"));
    }

    #[test]
    fn test_request_tolerates_missing_sections() {
        let request: WebhookRequest = serde_json::from_value(json!({"queryResult": {}})).unwrap();
        let intent = request.query_result.unwrap();
        assert!(intent.action.is_none());
        assert!(intent.parameters.is_null());
        assert!(intent.output_contexts.is_empty());
    }

    #[test]
    fn test_envelope_key() {
        let value = serde_json::to_value(FulfillmentResponse::new(vec![text_message("hi")])).unwrap();
        assert_eq!(value["fulfillmentMessages"][0]["text"]["text"][0], "hi");
    }
}
