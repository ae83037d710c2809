//! Normalized chat message model.
//!
//! Chat sources yield duck-typed JSON records in whatever shape the
//! platform exporter produced. [`ChatMessage::from_value`] narrows a raw
//! record down to the closed set of fields the analytics pass consumes:
//! timestamp, kind, author, and (for paid events) the monetary amount.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Classification of a single chat event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Ordinary text message.
    #[default]
    Text,
    /// Paid message carrying a monetary amount (superchat, paid sticker).
    Paid,
    /// Moderation or platform system event.
    System,
    /// Anything else the platform emits.
    Other,
}

impl MessageKind {
    /// Map an exporter `message_type` discriminator onto a kind.
    ///
    /// Unrecognized discriminators fall through to [`MessageKind::Other`]
    /// rather than being rejected; only missing required fields make a
    /// record unusable.
    pub fn from_type_str(message_type: &str) -> Self {
        match message_type {
            "text_message" => Self::Text,
            "paid_message"
            | "paid_sticker"
            | "ticker_paid_message_item"
            | "ticker_paid_sticker_item" => Self::Paid,
            "membership_item"
            | "ban_user"
            | "delete_message"
            | "mark_chat_item_as_deleted"
            | "mark_chat_items_by_author_as_deleted" => Self::System,
            _ => Self::Other,
        }
    }
}

/// Why a raw chat record could not be turned into a [`ChatMessage`].
///
/// These are recoverable: the report builder logs the record and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageParseError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("missing or non-numeric `time_in_seconds`")]
    MissingTimestamp,
    #[error("message has no author identifier")]
    MissingAuthor,
    #[error("paid message has no parsable amount")]
    MissingAmount,
}

/// One normalized chat event.
///
/// Owned transiently by the analysis pass: a message is consumed by a
/// single bucket update and never retained afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Seconds since the start of the broadcast.
    pub timestamp: f64,
    pub kind: MessageKind,
    /// Opaque author identifier. Moderation/system events may carry none.
    pub author: Option<String>,
    /// Monetary amount, present only for [`MessageKind::Paid`].
    pub amount: Option<f64>,
}

impl ChatMessage {
    /// Extract a message from a duck-typed exporter record.
    ///
    /// Required fields per kind: `time_in_seconds` always; an author
    /// identifier for text and paid messages; an amount for paid
    /// messages. Records that violate the contract are rejected so the
    /// caller can skip them.
    pub fn from_value(record: &Value) -> std::result::Result<Self, MessageParseError> {
        let obj = record.as_object().ok_or(MessageParseError::NotAnObject)?;

        let timestamp = obj
            .get("time_in_seconds")
            .and_then(Value::as_f64)
            .ok_or(MessageParseError::MissingTimestamp)?;

        let kind = obj
            .get("message_type")
            .and_then(Value::as_str)
            .map(MessageKind::from_type_str)
            .unwrap_or(MessageKind::Other);

        let author = obj
            .get("author")
            .and_then(|author| author.get("id").or_else(|| author.get("name")))
            .and_then(Value::as_str)
            .map(str::to_owned);

        let amount = obj
            .get("money")
            .and_then(|money| money.get("amount"))
            .and_then(parse_amount);

        match kind {
            MessageKind::Text | MessageKind::Paid if author.is_none() => {
                return Err(MessageParseError::MissingAuthor);
            }
            MessageKind::Paid if amount.is_none() => {
                return Err(MessageParseError::MissingAmount);
            }
            _ => {}
        }

        Ok(Self {
            timestamp,
            kind,
            author,
            // Amounts on non-paid records are exporter noise; drop them.
            amount: if kind == MessageKind::Paid { amount } else { None },
        })
    }
}

/// Parse an amount that exporters encode either as a number or as a
/// currency-formatted string ("¥1,000.00", "$5.00").
fn parse_amount(value: &Value) -> Option<f64> {
    if let Some(amount) = value.as_f64() {
        return Some(amount);
    }
    let digits: String = value
        .as_str()?
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_message_extraction() {
        let record = json!({
            "time_in_seconds": 12.5,
            "message_type": "text_message",
            "message": "hello",
            "author": {"id": "abc123", "name": "viewer"},
        });

        let msg = ChatMessage::from_value(&record).unwrap();
        assert_eq!(msg.timestamp, 12.5);
        assert_eq!(msg.kind, MessageKind::Text);
        assert_eq!(msg.author.as_deref(), Some("abc123"));
        assert_eq!(msg.amount, None);
    }

    #[test]
    fn test_paid_message_extraction() {
        let record = json!({
            "time_in_seconds": 90,
            "message_type": "paid_message",
            "author": {"name": "generous"},
            "money": {"amount": 5.0, "currency": "USD"},
        });

        let msg = ChatMessage::from_value(&record).unwrap();
        assert_eq!(msg.kind, MessageKind::Paid);
        assert_eq!(msg.amount, Some(5.0));
    }

    #[test]
    fn test_string_amount_is_parsed() {
        let record = json!({
            "time_in_seconds": 3,
            "message_type": "paid_sticker",
            "author": {"id": "x"},
            "money": {"amount": "¥1,000.00"},
        });

        let msg = ChatMessage::from_value(&record).unwrap();
        assert_eq!(msg.amount, Some(1000.0));
    }

    #[test]
    fn test_missing_timestamp_is_rejected() {
        let record = json!({
            "message_type": "text_message",
            "author": {"id": "abc"},
        });

        assert_eq!(
            ChatMessage::from_value(&record),
            Err(MessageParseError::MissingTimestamp)
        );
    }

    #[test]
    fn test_paid_without_amount_is_rejected() {
        let record = json!({
            "time_in_seconds": 1,
            "message_type": "paid_message",
            "author": {"id": "abc"},
        });

        assert_eq!(
            ChatMessage::from_value(&record),
            Err(MessageParseError::MissingAmount)
        );
    }

    #[test]
    fn test_text_without_author_is_rejected() {
        let record = json!({
            "time_in_seconds": 1,
            "message_type": "text_message",
        });

        assert_eq!(
            ChatMessage::from_value(&record),
            Err(MessageParseError::MissingAuthor)
        );
    }

    #[test]
    fn test_moderation_event_without_author_is_fine() {
        let record = json!({
            "time_in_seconds": 44.0,
            "message_type": "delete_message",
        });

        let msg = ChatMessage::from_value(&record).unwrap();
        assert_eq!(msg.kind, MessageKind::System);
        assert_eq!(msg.author, None);
    }

    #[test]
    fn test_unknown_type_maps_to_other() {
        assert_eq!(
            MessageKind::from_type_str("sponsorships_gift_redemption_announcement"),
            MessageKind::Other
        );
    }

    #[test]
    fn test_amount_dropped_from_non_paid_records() {
        let record = json!({
            "time_in_seconds": 7,
            "message_type": "text_message",
            "author": {"id": "abc"},
            "money": {"amount": 2.0},
        });

        let msg = ChatMessage::from_value(&record).unwrap();
        assert_eq!(msg.amount, None);
    }
}
