//! Success envelope: `{success: true, message, data, statusCode}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// A successful response. `data` serializes as `null` when absent.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    message: String,
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// `200 OK` carrying `data`.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
            data: Some(data),
        }
    }

    /// `201 Created` carrying `data`.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// `200 OK` with `data: null`.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a, T> {
    success: bool,
    message: &'a str,
    data: Option<&'a T>,
    status_code: u16,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = Json(Envelope {
            success: true,
            message: &self.message,
            data: self.data.as_ref(),
            status_code: self.status.as_u16(),
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render<T: Serialize>(resp: ApiResponse<T>) -> (StatusCode, serde_json::Value) {
        let resp = resp.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn created_sets_status_in_header_and_body() {
        let (status, json) = render(ApiResponse::created("made", vec![1, 2])).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "made");
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["statusCode"], 201);
    }

    #[tokio::test]
    async fn message_only_has_null_data() {
        let (status, json) = render(ApiResponse::message("bye")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["data"].is_null());
        assert!(json.as_object().unwrap().contains_key("data"));
    }
}
