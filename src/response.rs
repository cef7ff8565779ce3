//! Uniform result object returned by every operation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::OpError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    pub message: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl OperationResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self::ok_lines(vec![message.into()])
    }

    pub fn ok_lines(message: Vec<String>) -> Self {
        Self {
            success: true,
            message,
            data: None,
        }
    }

    pub fn ok_with(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: vec![message.into()],
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: vec![message.into()],
            data: None,
        }
    }

    /// Text items for a tool-call reply: one per message line, then the data.
    pub fn text_items(&self) -> Vec<String> {
        let mut items = self.message.clone();
        match &self.data {
            Some(Value::String(s)) => items.push(s.clone()),
            Some(Value::Null) | None => {}
            Some(other) => items.push(other.to_string()),
        }
        items
    }
}

impl From<OpError> for OperationResult {
    fn from(err: OpError) -> Self {
        Self::error(err.to_string())
    }
}

impl From<Result<OperationResult, OpError>> for OperationResult {
    fn from(result: Result<OperationResult, OpError>) -> Self {
        result.unwrap_or_else(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_is_omitted_when_unset() {
        let value = serde_json::to_value(OperationResult::ok("done")).unwrap();
        assert_eq!(value, serde_json::json!({"success": true, "message": ["done"]}));
    }

    #[test]
    fn text_items_append_string_data_verbatim() {
        let result = OperationResult::ok_with("README fetch successful", Value::from("# body"));
        assert_eq!(
            result.text_items(),
            vec!["README fetch successful".to_string(), "# body".to_string()]
        );
    }

    #[test]
    fn text_items_render_structured_data_as_json() {
        let result = OperationResult::ok_with("ok", serde_json::json!({"a": 1}));
        assert_eq!(result.text_items()[1], r#"{"a":1}"#);
    }

    #[test]
    fn op_errors_become_failed_results() {
        let result: OperationResult = OpError::NotFound("demo".into()).into();
        assert!(!result.success);
        assert_eq!(result.message, vec!["Server 'demo' not found".to_string()]);
    }
}
