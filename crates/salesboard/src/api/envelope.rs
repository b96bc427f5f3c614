use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub const FAILURE_MESSAGE: &str = "Something Went Wrong";

/// Uniform `{statusCode, message, data?}` body shared by every endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    #[serde(skip)]
    status: StatusCode,
    status_code: u16,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(message: &'static str, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            status_code: StatusCode::OK.as_u16(),
            message,
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    pub fn message(message: &'static str) -> Self {
        Self {
            status: StatusCode::OK,
            status_code: StatusCode::OK.as_u16(),
            message,
            data: None,
        }
    }

    pub fn failure() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            message: FAILURE_MESSAGE,
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_carries_data() {
        let body = serde_json::to_value(Envelope::success("List Fetched Successfully", vec![1, 2])).unwrap();
        assert_eq!(
            body,
            json!({"statusCode": 200, "message": "List Fetched Successfully", "data": [1, 2]})
        );
    }

    #[test]
    fn message_and_failure_omit_data() {
        assert_eq!(
            serde_json::to_value(Envelope::message("Data Seeded Successfully")).unwrap(),
            json!({"statusCode": 200, "message": "Data Seeded Successfully"})
        );
        assert_eq!(
            serde_json::to_value(Envelope::failure()).unwrap(),
            json!({"statusCode": 500, "message": FAILURE_MESSAGE})
        );
    }

    #[test]
    fn failure_maps_to_internal_server_error() {
        assert_eq!(
            Envelope::failure().into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
