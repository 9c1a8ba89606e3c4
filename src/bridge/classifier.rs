use super::event::{tokens, EventKind, MessageRecord};
use crate::error::PayloadParseError;

/// Classifier output. `fault` is set when a payload token failed to parse;
/// the event is then `Unrecognized` carrying the raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: EventKind,
    pub fault: Option<PayloadParseError>,
}

impl Classification {
    fn ok(kind: EventKind) -> Self {
        Self { kind, fault: None }
    }

    fn rejected(raw: &str, fault: PayloadParseError) -> Self {
        Self {
            kind: EventKind::Unrecognized(raw.to_string()),
            fault: Some(fault),
        }
    }
}

/// Maps one record to an event. First match wins:
/// 1. payload token anywhere in the text (numeric suffix)
/// 2. exact literal token
/// 3. `Unrecognized`
pub fn classify(record: &MessageRecord) -> Classification {
    classify_str(record.as_str())
}

pub fn classify_str(text: &str) -> Classification {
    if text.contains(tokens::MAILBOX_TEMPERATURE) {
        return match parse_payload(text) {
            Ok(value) => Classification::ok(EventKind::TemperatureReading(value)),
            Err(fault) => Classification::rejected(text, fault),
        };
    }

    match EventKind::from_token(text) {
        Some(kind) => Classification::ok(kind),
        None => Classification::ok(EventKind::Unrecognized(text.to_string())),
    }
}

/// Second `:`-separated field as a base-10 float.
fn parse_payload(text: &str) -> Result<f64, PayloadParseError> {
    let field = text
        .split(tokens::PAYLOAD_SEPARATOR)
        .nth(1)
        .ok_or(PayloadParseError::MissingField)?;

    field
        .parse::<f64>()
        .map_err(|e| PayloadParseError::InvalidNumber {
            field: field.to_string(),
            reason: e.to_string(),
        })
}
