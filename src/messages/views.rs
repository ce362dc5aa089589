//! Per-action message sequences. Entries are rendered in the order the
//! gateway returned them; `null` entries (unmatched optional aliases) are skipped.

use serde_json::Value;

use super::{card_message, text_message, Button, Message};
use crate::billing::CustomerName;
use crate::graph::QueryResult;
use crate::{FulfillmentError, Result};

/// Intro text, then one card per subscribed plan
pub fn current_plan_view(customer: &CustomerName, plans: &QueryResult) -> Result<Vec<Message>> {
    let mut output = vec![text_message(format!(
        "Greetings, {}! It seems it's time to recharge your plan!\n",
        customer
    ))];

    for (alias, plan) in entries(plans) {
        let title = format!(
            "Your current plan is {}, and the monthly fee is {}",
            field(alias, plan, "name")?,
            field(alias, plan, "fee")?
        );
        output.push(card_message(
            title,
            field(alias, plan, "url")?,
            [
                Button::new("Recharge Now", None),
                Button::new("Find a New Plan", None),
                Button::new("Analyze my Usage", None),
            ],
        ));
    }

    Ok(output)
}

/// Intro text, then one card per recommended upgrade
pub fn recommendation_view(plans: &QueryResult) -> Result<Vec<Message>> {
    let mut output = vec![text_message(
        "Based on your historical usage, we recommend you the following plan:\n",
    )];

    for (alias, plan) in entries(plans) {
        let name = field(alias, plan, "name")?;
        let title = format!(
            "Recommended! {}, and the monthly fee is {}",
            name,
            field(alias, plan, "fee")?
        );
        output.push(card_message(
            title,
            field(alias, plan, "url")?,
            [
                Button::new("Why this plan?", Some(format!("How about {}", name))),
                Button::new(
                    "No, I will use my existing plan",
                    Some("recharge exisiting plan".to_string()),
                ),
                Button::new("Talk to an agent", None),
            ],
        ));
    }

    Ok(output)
}

/// One charge line per bill, then the payment confirmation prompt
pub fn recharge_view(bills: &QueryResult, card_last_digits: &str) -> Result<Vec<Message>> {
    let mut output = Vec::new();

    for (alias, bill) in entries(bills) {
        output.push(text_message(format!(
            "Ok, your charge is {}",
            field(alias, bill, "fee")?
        )));
    }

    output.push(text_message(format!(
        "I see we have your VISA credit card ending with {} in your information. \
         Should I complete the payment with the same card?\n",
        card_last_digits
    )));

    Ok(output)
}

/// Intro text, then one summary line per usage record
pub fn analyze_view(usage: &QueryResult) -> Result<Vec<Message>> {
    let mut output = vec![text_message("Here is a summary of your usage history:\n")];

    for (alias, record) in entries(usage) {
        let props = record.as_object().ok_or_else(|| missing(alias, "Month"))?;

        let label = match props.get("Month") {
            Some(month) => scalar(month).ok_or_else(|| missing(alias, "Month"))?,
            None => alias.to_string(),
        };

        let details: Vec<String> = props
            .iter()
            .filter(|(key, _)| key.as_str() != "Month")
            .filter_map(|(key, value)| scalar(value).map(|v| format!("{} {}", key, v)))
            .collect();

        let line = if details.is_empty() {
            format!("Usage for {}: no usage recorded", label)
        } else {
            format!("Usage for {}: {}", label, details.join(", "))
        };
        output.push(text_message(line));
    }

    Ok(output)
}

fn entries(result: &QueryResult) -> impl Iterator<Item = (&str, &Value)> {
    result
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(alias, value)| (alias.as_str(), value))
}

/// Required string-ish property of a result entry
fn field(alias: &str, entry: &Value, name: &str) -> Result<String> {
    entry
        .get(name)
        .and_then(scalar)
        .ok_or_else(|| missing(alias, name))
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn missing(alias: &str, field: &str) -> FulfillmentError {
    FulfillmentError::MissingField {
        alias: alias.to_string(),
        field: field.to_string(),
    }
}
