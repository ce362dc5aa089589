//! Action routing: request → customer name → facade query → view → envelope.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::types::{FulfillmentResponse, IntentResult, WebhookRequest};
use crate::billing::{BillingFacade, CustomerName};
use crate::config::BillingConfig;
use crate::messages::{
    analyze_view, current_plan_view, recharge_view, recommendation_view, text_message,
};
use crate::{FulfillmentError, Result};

const CUSTOMER_PARAM: &str = "given-name";

const CLARIFICATION_PROMPT: &str =
    "Whose bill would you like me to check? Please tell me your name.";

/// Supported action vocabulary of the upstream agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CheckBill,
    Recommendation,
    RechargeExistingPlan,
    AnalyzeUsage,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CheckBill => "check_bill",
            Action::Recommendation => "recommendation",
            // Spelling matches the action name configured in the agent.
            Action::RechargeExistingPlan => "recharge_exisiting_plan",
            Action::AnalyzeUsage => "analyze_usage",
        }
    }

    /// Follow-up actions read the customer from the context set by `check_bill`
    pub fn reads_context(&self) -> bool {
        !matches!(self, Action::CheckBill)
    }
}

impl FromStr for Action {
    type Err = FulfillmentError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "check_bill" => Ok(Action::CheckBill),
            "recommendation" => Ok(Action::Recommendation),
            "recharge_exisiting_plan" => Ok(Action::RechargeExistingPlan),
            "analyze_usage" => Ok(Action::AnalyzeUsage),
            other => Err(FulfillmentError::UnsupportedAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode a raw request body. Anything but a JSON object is malformed.
pub fn parse_request(body: &[u8]) -> Result<WebhookRequest> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| FulfillmentError::MalformedRequest(format!("invalid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(FulfillmentError::MalformedRequest(
            "request body must be a JSON object".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| FulfillmentError::MalformedRequest(format!("unexpected request shape: {}", e)))
}

/// Customer name for `action`: direct parameter for `check_bill`, first output
/// context for follow-ups (falling back to the direct parameter).
pub fn resolve_customer(action: Action, intent: &IntentResult) -> Option<CustomerName> {
    let direct = || intent.parameters.get(CUSTOMER_PARAM).and_then(CustomerName::from_param);

    if action.reads_context() {
        intent
            .output_contexts
            .first()
            .and_then(|ctx| ctx.parameters.get(CUSTOMER_PARAM))
            .and_then(CustomerName::from_param)
            .or_else(direct)
    } else {
        direct()
    }
}

pub struct Dispatcher {
    facade: BillingFacade,
    card_last_digits: String,
}

impl Dispatcher {
    pub fn new(facade: BillingFacade, settings: &BillingConfig) -> Self {
        Self {
            facade,
            card_last_digits: settings.card_last_digits.clone(),
        }
    }

    /// Handle one webhook request end to end
    pub async fn handle(&self, request: &WebhookRequest) -> Result<FulfillmentResponse> {
        let intent = request
            .query_result
            .as_ref()
            .ok_or_else(|| FulfillmentError::MalformedRequest("queryResult is missing".to_string()))?;

        let action: Action = intent
            .action
            .as_deref()
            .ok_or_else(|| {
                FulfillmentError::MalformedRequest("queryResult.action is missing".to_string())
            })?
            .parse()?;

        let session = request.session.as_deref().unwrap_or("-");
        let response_id = request.response_id.as_deref().unwrap_or("-");

        let Some(customer) = resolve_customer(action, intent) else {
            log::warn!(
                "{}: no customer name in parameters or context (session {}, response {})",
                action,
                session,
                response_id
            );
            return Ok(FulfillmentResponse::new(vec![text_message(CLARIFICATION_PROMPT)]));
        };

        log::info!(
            "Action: {} (session {}, response {})",
            action,
            session,
            response_id
        );

        let messages = match action {
            Action::CheckBill => {
                let plans = self.facade.current_plan(&customer).await?;
                current_plan_view(&customer, &plans)?
            }
            Action::Recommendation => {
                let plans = self.facade.recommendation(&customer).await?;
                recommendation_view(&plans)?
            }
            Action::RechargeExistingPlan => {
                let bills = self.facade.recharge(&customer).await?;
                recharge_view(&bills, &self.card_last_digits)?
            }
            Action::AnalyzeUsage => {
                let usage = self.facade.analyze(&customer).await?;
                analyze_view(&usage)?
            }
        };

        Ok(FulfillmentResponse::new(messages))
    }
}
