//! Conversion between JSON note values and DynamoDB attribute values.

use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

use super::StoreError;
use crate::domain::models::{Attributes, Note, ID_FIELD};

pub type Item = HashMap<String, AttributeValue>;

pub fn to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(flag) => AttributeValue::Bool(*flag),
        Value::Number(number) => AttributeValue::N(number.to_string()),
        Value::String(text) => AttributeValue::S(text.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(to_attribute).collect()),
        Value::Object(fields) => AttributeValue::M(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), to_attribute(value)))
                .collect(),
        ),
    }
}

pub fn from_attribute(attribute: &AttributeValue) -> Result<Value, StoreError> {
    let value = match attribute {
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Bool(flag) => Value::Bool(*flag),
        AttributeValue::N(number) => Value::Number(parse_number(number)?),
        AttributeValue::S(text) => Value::String(text.clone()),
        AttributeValue::Ss(texts) => Value::Array(texts.iter().cloned().map(Value::String).collect()),
        AttributeValue::Ns(numbers) => Value::Array(
            numbers
                .iter()
                .map(|number| parse_number(number).map(Value::Number))
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::L(values) => {
            Value::Array(values.iter().map(from_attribute).collect::<Result<_, _>>()?)
        }
        AttributeValue::M(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, value)| from_attribute(value).map(|value| (name.clone(), value)))
                .collect::<Result<Map<_, _>, _>>()?,
        ),
        other => {
            return Err(StoreError::Integrity(format!(
                "unsupported attribute type: {other:?}"
            )))
        }
    };
    Ok(value)
}

fn parse_number(raw: &str) -> Result<Number, StoreError> {
    if let Ok(int) = raw.parse::<i64>() {
        return Ok(Number::from(int));
    }
    if let Ok(int) = raw.parse::<u64>() {
        return Ok(Number::from(int));
    }
    let malformed = || StoreError::Integrity(format!("malformed number attribute: {raw}"));
    let float = raw.parse::<f64>().map_err(|_| malformed())?;
    let number = Number::from_f64(float).ok_or_else(malformed)?;
    // f64 holds ~17 significant digits, DynamoDB up to 38.
    if decimal_key(raw) != decimal_key(&float.to_string()) {
        return Err(StoreError::Integrity(format!(
            "number attribute {raw} does not fit a JSON number without rounding"
        )));
    }
    Ok(number)
}

/// Canonical `(negative, significant digits, exponent)` of a decimal string,
/// so `1.50`, `1.5` and `15e-1` compare equal.
fn decimal_key(raw: &str) -> Option<(bool, String, i64)> {
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i64>().ok()?),
        None => (unsigned, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    let digits = format!("{int_part}{frac_part}");
    let mut exponent = exponent - frac_part.len() as i64;
    let digits = digits.trim_start_matches('0');
    let significant = digits.trim_end_matches('0');
    if significant.is_empty() {
        return Some((false, String::new(), 0));
    }
    exponent += (digits.len() - significant.len()) as i64;
    Some((negative, significant.to_string(), exponent))
}

pub fn key(id: &str) -> Item {
    HashMap::from([(ID_FIELD.to_string(), AttributeValue::S(id.to_string()))])
}

pub fn to_item(note: &Note) -> Item {
    let mut item: Item = note
        .attributes
        .iter()
        .map(|(name, value)| (name.clone(), to_attribute(value)))
        .collect();
    item.insert(ID_FIELD.to_string(), AttributeValue::S(note.id.clone()));
    item
}

pub fn to_note(item: &Item) -> Result<Note, StoreError> {
    let id = match item.get(ID_FIELD) {
        Some(AttributeValue::S(id)) if !id.is_empty() => id.clone(),
        Some(_) => {
            return Err(StoreError::Integrity(
                "note id is not a non-empty string".into(),
            ))
        }
        None => return Err(StoreError::Integrity("stored note has no id".into())),
    };
    let mut attributes = Attributes::new();
    for (name, value) in item {
        if name == ID_FIELD {
            continue;
        }
        let value = from_attribute(value)
            .map_err(|err| StoreError::Integrity(format!("note {id}, attribute {name}: {err}")))?;
        attributes.insert(name.clone(), value);
    }
    Ok(Note { id, attributes })
}
