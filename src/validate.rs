use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde_json::Value;

/// Wire format for every datetime accepted on input.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug)]
pub enum FieldKind {
    Str { max_length: Option<usize> },
    Int,
    DateTime,
    Enum { allowed: &'static [&'static str] },
}

#[derive(Debug)]
pub struct FieldRule {
    pub name: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

/// A fixed set of field rules for one operation's payload.
pub struct Schema(pub &'static [FieldRule]);

impl Schema {
    pub fn rules(&self) -> &'static [FieldRule] {
        self.0
    }

    /// Check `payload` against every rule. Unknown keys are ignored; they
    /// never reach the persistence layer because column binding is driven
    /// by the same rule set.
    pub fn validate(&self, payload: &Value) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let Some(obj) = payload.as_object() else {
            push(&mut errors, "payload", "payload must be a JSON object");
            return Err(errors);
        };

        for rule in self.0 {
            let value = obj.get(rule.name);

            if is_absent(value) {
                if rule.required {
                    push(&mut errors, rule.name, &format!("{} is required", rule.name));
                }
                continue;
            }
            let value = value.unwrap_or(&Value::Null);

            match &rule.kind {
                FieldKind::Str { max_length } => match (value.as_str(), max_length) {
                    (Some(s), Some(max)) if s.chars().count() > *max => push(
                        &mut errors,
                        rule.name,
                        &format!("{} must not exceed {} characters", rule.name, max),
                    ),
                    (Some(_), _) => {}
                    (None, _) => push(
                        &mut errors,
                        rule.name,
                        &format!("{} must be a string", rule.name),
                    ),
                },
                FieldKind::Int => {
                    if value.as_i64().is_none() {
                        push(
                            &mut errors,
                            rule.name,
                            &format!("{} must be an integer", rule.name),
                        );
                    }
                }
                FieldKind::DateTime => match value.as_str() {
                    Some(s) if parse_datetime(s).is_some() => {}
                    _ => push(
                        &mut errors,
                        rule.name,
                        &format!("{} must match the format YYYY-MM-DD HH:MM:SS", rule.name),
                    ),
                },
                FieldKind::Enum { allowed } => match value.as_str() {
                    Some(s) if allowed.contains(&s) => {}
                    _ => push(
                        &mut errors,
                        rule.name,
                        &format!("{} must be one of: {}", rule.name, allowed.join(", ")),
                    ),
                },
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Absent for validation purposes: key missing, explicit null, or an empty
/// string. Explicit null on an optional field still binds as SQL NULL.
fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

pub fn push(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT).ok()
}
