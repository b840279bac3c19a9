//! Default request deserializer and response serializer.
//!
//! Both are registered into the service registry alongside the schema unless
//! the application already provided its own.

use serde::{Deserialize, Serialize};

use crate::error::SerializationError;

/// A GraphQL request as posted by clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

/// Turns a request body into a [`QueryRequest`].
pub trait RequestDeserializer: Send + Sync {
    fn deserialize(&self, body: &[u8]) -> Result<QueryRequest, SerializationError>;
}

/// Encodes an execution result for the response body.
pub trait ResponseSerializer: Send + Sync {
    fn serialize(&self, response: &serde_json::Value) -> Result<Vec<u8>, SerializationError>;

    /// Content type written alongside the body.
    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

/// JSON request deserializer.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRequestDeserializer;

impl RequestDeserializer for DefaultRequestDeserializer {
    fn deserialize(&self, body: &[u8]) -> Result<QueryRequest, SerializationError> {
        let request: QueryRequest =
            serde_json::from_slice(body).map_err(SerializationError::Request)?;
        if request.query.trim().is_empty() {
            return Err(SerializationError::MissingQuery);
        }
        Ok(request)
    }
}

/// JSON response serializer.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultResponseSerializer;

impl ResponseSerializer for DefaultResponseSerializer {
    fn serialize(&self, response: &serde_json::Value) -> Result<Vec<u8>, SerializationError> {
        serde_json::to_vec(response).map_err(SerializationError::Response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_request() {
        let body = br#"{"query":"{ people { id } }","operationName":"People","variables":{"n":1}}"#;
        let request = DefaultRequestDeserializer.deserialize(body).unwrap();

        assert_eq!(request.query, "{ people { id } }");
        assert_eq!(request.operation_name.as_deref(), Some("People"));
        assert_eq!(request.variables, Some(serde_json::json!({"n": 1})));
    }

    #[test]
    fn test_deserialize_rejects_blank_query() {
        let result = DefaultRequestDeserializer.deserialize(br#"{"query":"   "}"#);
        assert!(matches!(result, Err(SerializationError::MissingQuery)));
    }

    #[test]
    fn test_deserialize_rejects_malformed_json() {
        let result = DefaultRequestDeserializer.deserialize(b"{not json");
        assert!(matches!(result, Err(SerializationError::Request(_))));
    }

    #[test]
    fn test_serialize_response() {
        let response = serde_json::json!({"data": {"person": null}});
        let bytes = DefaultResponseSerializer.serialize(&response).unwrap();

        assert_eq!(bytes, br#"{"data":{"person":null}}"#);
        assert_eq!(DefaultResponseSerializer.content_type(), "application/json");
    }
}
