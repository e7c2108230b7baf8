use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepts a JSON string or number and keeps it as text so the validators can
/// report "must be a number" instead of a deserialization failure.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::string_or_number;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "string_or_number")]
        amount: Option<String>,
    }

    #[test]
    fn numbers_and_strings_become_text() {
        let form: Form = serde_json::from_str(r#"{"amount": 1000000}"#).unwrap();
        assert_eq!(form.amount.as_deref(), Some("1000000"));

        let form: Form = serde_json::from_str(r#"{"amount": "750000"}"#).unwrap();
        assert_eq!(form.amount.as_deref(), Some("750000"));
    }

    #[test]
    fn missing_and_null_are_none() {
        let form: Form = serde_json::from_str("{}").unwrap();
        assert!(form.amount.is_none());

        let form: Form = serde_json::from_str(r#"{"amount": null}"#).unwrap();
        assert!(form.amount.is_none());
    }
}
