use serde::{Deserialize, Serialize};

/// JSON envelope shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Points a client form at the input that caused a refusal.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub code: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<FieldError> {
    pub fn rejected(field: &str, code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Some(FieldError {
                field: field.to_string(),
                code: code.to_string(),
            }),
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_parts_are_left_out_of_the_json() {
        let json = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "message": "nope" }));
    }

    #[test]
    fn rejection_carries_field_and_code() {
        let json =
            serde_json::to_value(ApiResponse::rejected("start_date", "past_date", "too early"))
                .unwrap();
        assert_eq!(json["data"]["field"], "start_date");
        assert_eq!(json["data"]["code"], "past_date");
        assert_eq!(json["success"], false);
    }
}
