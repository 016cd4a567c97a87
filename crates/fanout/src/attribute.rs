use std::collections::HashMap;

use bytes::Bytes;

/// Structured attributes sent alongside a published message.
pub type MessageAttributes = HashMap<String, AttributeValue>;

/// Value of a single message attribute.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AttributeValue {
    /// UTF-8 string.
    String(String),

    /// Decimal number kept in its textual form.
    Number(String),

    /// Opaque bytes.
    Binary(Bytes),

    /// List of strings, sent as a JSON array.
    StringArray(Vec<String>),
}

impl AttributeValue {
    /// Data type label understood by the topic service.
    #[must_use]
    pub const fn data_type(&self) -> &'static str {
        match self {
            Self::String(_) => "String",
            Self::Number(_) => "Number",
            Self::Binary(_) => "Binary",
            Self::StringArray(_) => "String.Array",
        }
    }

    /// String payload, if this is not a binary value.
    #[must_use]
    pub fn string_value(&self) -> Option<String> {
        match self {
            Self::String(value) | Self::Number(value) => Some(value.clone()),
            Self::StringArray(values) => Some(serde_json::Value::from(values.clone()).to_string()),
            Self::Binary(_) => None,
        }
    }

    /// Binary payload, if this is a binary value.
    #[must_use]
    pub const fn binary_value(&self) -> Option<&Bytes> {
        match self {
            Self::Binary(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Number(value.to_string())
    }
}

impl From<Bytes> for AttributeValue {
    fn from(value: Bytes) -> Self {
        Self::Binary(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(values: Vec<String>) -> Self {
        Self::StringArray(values)
    }
}

/// Drops an empty attribute map so it is sent the same way as no attributes.
#[must_use]
pub fn normalize(attributes: Option<MessageAttributes>) -> Option<MessageAttributes> {
    attributes.filter(|attributes| !attributes.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_types() {
        assert_eq!(AttributeValue::from("eu").data_type(), "String");
        assert_eq!(AttributeValue::from(42_i64).data_type(), "Number");
        assert_eq!(
            AttributeValue::from(Bytes::from_static(b"\x00\x01")).data_type(),
            "Binary"
        );
        assert_eq!(
            AttributeValue::from(vec!["a".to_string()]).data_type(),
            "String.Array"
        );
    }

    #[test]
    fn test_string_array_encodes_as_json() {
        let value = AttributeValue::StringArray(vec!["red".to_string(), "blue".to_string()]);

        assert_eq!(value.string_value().as_deref(), Some(r#"["red","blue"]"#));
        assert!(value.binary_value().is_none());
    }

    #[test]
    fn test_binary_has_no_string_value() {
        let value = AttributeValue::Binary(Bytes::from_static(b"raw"));

        assert!(value.string_value().is_none());
        assert_eq!(value.binary_value(), Some(&Bytes::from_static(b"raw")));
    }

    #[test]
    fn test_normalize_drops_empty_map() {
        assert_eq!(normalize(Some(MessageAttributes::new())), None);
        assert_eq!(normalize(None), None);

        let mut attributes = MessageAttributes::new();
        attributes.insert("region".to_string(), "eu".into());

        assert_eq!(normalize(Some(attributes.clone())), Some(attributes));
    }
}
