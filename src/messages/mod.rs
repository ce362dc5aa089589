//! Chat-platform message shapes and the per-action views built from query results.

mod views;

pub use views::{analyze_view, current_plan_view, recharge_view, recommendation_view};

use serde::Serialize;

/// Target chat platform tag carried by every message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    Facebook,
}

/// One outbound message: `{"text": {...}, "platform": ...}` or `{"card": {...}, "platform": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    #[serde(flatten)]
    pub body: MessageBody,
    pub platform: Platform,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageBody {
    Text { text: Vec<String> },
    Card(Card),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub title: String,
    pub image_uri: String,
    pub buttons: [Button; 3],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub text: String,
    pub postback: String,
}

impl Button {
    /// A button whose postback falls back to its own text
    pub fn new(text: impl Into<String>, postback: Option<String>) -> Self {
        let text = text.into();
        let postback = postback.unwrap_or_else(|| text.clone());
        Self { text, postback }
    }
}

/// Single-bubble text message
pub fn text_message(body: impl Into<String>) -> Message {
    Message {
        body: MessageBody::Text {
            text: vec![body.into()],
        },
        platform: Platform::Facebook,
    }
}

/// Card with a title, an image and exactly three buttons
pub fn card_message(title: impl Into<String>, image_url: impl Into<String>, buttons: [Button; 3]) -> Message {
    Message {
        body: MessageBody::Card(Card {
            title: title.into(),
            image_uri: image_url.into(),
            buttons,
        }),
        platform: Platform::Facebook,
    }
}

impl Message {
    pub fn is_text(&self) -> bool {
        matches!(self.body, MessageBody::Text { .. })
    }

    pub fn as_card(&self) -> Option<&Card> {
        match &self.body {
            MessageBody::Card(card) => Some(card),
            MessageBody::Text { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_message_shape() {
        let value = serde_json::to_value(text_message("Hello")).unwrap();
        assert_eq!(
            value,
            json!({"text": {"text": ["Hello"]}, "platform": "FACEBOOK"})
        );
    }

    #[test]
    fn test_card_message_shape() {
        let card = card_message(
            "Plan",
            "http://x/img.png",
            [
                Button::new("A", None),
                Button::new("B", Some("go b".to_string())),
                Button::new("C", None),
            ],
        );
        let value = serde_json::to_value(card).unwrap();
        assert_eq!(
            value,
            json!({
                "card": {
                    "title": "Plan",
                    "imageUri": "http://x/img.png",
                    "buttons": [
                        {"text": "A", "postback": "A"},
                        {"text": "B", "postback": "go b"},
                        {"text": "C", "postback": "C"}
                    ]
                },
                "platform": "FACEBOOK"
            })
        );
    }

    #[test]
    fn test_button_postback_defaults_to_text() {
        let button = Button::new("Recharge Now", None);
        assert_eq!(button.postback, "Recharge Now");
        let button = Button::new("Why this plan?", Some("How about Plus".to_string()));
        assert_eq!(button.postback, "How about Plus");
    }

    #[test]
    fn test_message_accessors() {
        assert!(text_message("x").is_text());
        assert!(text_message("x").as_card().is_none());
        let card = card_message("t", "u", [Button::new("a", None), Button::new("b", None), Button::new("c", None)]);
        assert!(!card.is_text());
        assert_eq!(card.as_card().unwrap().buttons.len(), 3);
    }
}
