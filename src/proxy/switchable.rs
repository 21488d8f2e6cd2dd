//! Envelopes accepting either API Gateway payload version.
//!
//! The version is decided once, from which discriminator field the payload carries, and is
//! then carried by the enum variant. Serialization writes the inner value and restores the
//! discriminator when the inner type omits it as empty.

use serde::de::{self, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{
    ApiGatewayProxyRequest, ApiGatewayProxyResponse, ApiGatewayV2httpRequest,
    ApiGatewayV2httpResponse, Error, Result,
};

const V1_REQUEST_FIELD: &str = "multiValueQueryStringParameters";
const V2_REQUEST_FIELD: &str = "rawQueryString";
const STATUS_CODE_FIELD: &str = "statusCode";
const COOKIES_FIELD: &str = "cookies";

/// A REST API or HTTP API request event.
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchableRequest {
    V1(ApiGatewayProxyRequest),
    V2(ApiGatewayV2httpRequest),
}

/// A REST API or HTTP API response.
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchableResponse {
    V1(ApiGatewayProxyResponse),
    V2(ApiGatewayV2httpResponse),
}

impl SwitchableRequest {
    /// Decodes a request event, picking the version from its discriminator field.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON, or with [`Error::UnknownVersion`] when the payload carries
    /// neither or both of `multiValueQueryStringParameters` and `rawQueryString`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    /// # Errors
    ///
    /// As [`SwitchableRequest::from_slice`].
    pub fn from_value(value: Value) -> Result<Self> {
        let (v1, v2) = value.as_object().map_or((false, false), |map| {
            (
                map.contains_key(V1_REQUEST_FIELD),
                map.contains_key(V2_REQUEST_FIELD),
            )
        });
        match (v1, v2) {
            (true, false) => Ok(Self::V1(serde_json::from_value(value)?)),
            (false, true) => Ok(Self::V2(serde_json::from_value(value)?)),
            _ => Err(Error::UnknownVersion("request")),
        }
    }

    /// # Errors
    ///
    /// Fails only if the inner event cannot be serialized.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    #[must_use]
    pub const fn version1(&self) -> Option<&ApiGatewayProxyRequest> {
        match self {
            Self::V1(request) => Some(request),
            Self::V2(_) => None,
        }
    }

    #[must_use]
    pub const fn version2(&self) -> Option<&ApiGatewayV2httpRequest> {
        match self {
            Self::V2(request) => Some(request),
            Self::V1(_) => None,
        }
    }
}

impl SwitchableResponse {
    /// Decodes a response: `statusCode` alone means version 1, `statusCode` with `cookies`
    /// means version 2.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON, or with [`Error::UnknownVersion`] when `statusCode` is
    /// missing.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    /// # Errors
    ///
    /// As [`SwitchableResponse::from_slice`].
    pub fn from_value(value: Value) -> Result<Self> {
        let (status, cookies) = value.as_object().map_or((false, false), |map| {
            (
                map.contains_key(STATUS_CODE_FIELD),
                map.contains_key(COOKIES_FIELD),
            )
        });
        match (status, cookies) {
            (true, false) => Ok(Self::V1(serde_json::from_value(value)?)),
            (true, true) => Ok(Self::V2(serde_json::from_value(value)?)),
            _ => Err(Error::UnknownVersion("response")),
        }
    }

    /// # Errors
    ///
    /// Fails only if the inner response cannot be serialized.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    #[must_use]
    pub const fn version1(&self) -> Option<&ApiGatewayProxyResponse> {
        match self {
            Self::V1(response) => Some(response),
            Self::V2(_) => None,
        }
    }

    #[must_use]
    pub const fn version2(&self) -> Option<&ApiGatewayV2httpResponse> {
        match self {
            Self::V2(response) => Some(response),
            Self::V1(_) => None,
        }
    }
}

/// Serializes `inner` as an object that is guaranteed to carry `field`.
fn with_discriminator<T, S>(
    serializer: S,
    inner: &T,
    field: &str,
    empty: Value,
) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    let mut value = serde_json::to_value(inner).map_err(ser::Error::custom)?;
    if let Value::Object(map) = &mut value {
        map.entry(field).or_insert(empty);
    }
    value.serialize(serializer)
}

impl Serialize for SwitchableRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::V1(request) => {
                with_discriminator(serializer, request, V1_REQUEST_FIELD, Value::Null)
            }
            Self::V2(request) => with_discriminator(
                serializer,
                request,
                V2_REQUEST_FIELD,
                Value::String(String::new()),
            ),
        }
    }
}

impl Serialize for SwitchableResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::V1(response) => response.serialize(serializer),
            Self::V2(response) => {
                with_discriminator(serializer, response, COOKIES_FIELD, Value::Array(Vec::new()))
            }
        }
    }
}

impl<'de> Deserialize<'de> for SwitchableRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for SwitchableResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(de::Error::custom)
    }
}

impl From<ApiGatewayProxyRequest> for SwitchableRequest {
    fn from(request: ApiGatewayProxyRequest) -> Self {
        Self::V1(request)
    }
}

impl From<ApiGatewayV2httpRequest> for SwitchableRequest {
    fn from(request: ApiGatewayV2httpRequest) -> Self {
        Self::V2(request)
    }
}

impl From<ApiGatewayProxyResponse> for SwitchableResponse {
    fn from(response: ApiGatewayProxyResponse) -> Self {
        Self::V1(response)
    }
}

impl From<ApiGatewayV2httpResponse> for SwitchableResponse {
    fn from(response: ApiGatewayV2httpResponse) -> Self {
        Self::V2(response)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v1_event() -> Value {
        json!({
            "path": "/v1",
            "httpMethod": "GET",
            "headers": {},
            "multiValueHeaders": {},
            "queryStringParameters": null,
            "multiValueQueryStringParameters": null,
            "requestContext": {"httpMethod": "GET", "identity": {}},
            "isBase64Encoded": false
        })
    }

    fn v2_event() -> Value {
        json!({
            "version": "2.0",
            "rawPath": "/v2",
            "rawQueryString": "",
            "headers": {},
            "requestContext": {
                "http": {"method": "GET", "path": "/v2"},
                "timeEpoch": 0
            },
            "isBase64Encoded": false
        })
    }

    #[test]
    fn test_request_discriminators() {
        let v1 = SwitchableRequest::from_value(v1_event()).unwrap();
        assert_eq!(v1.version1().unwrap().path.as_deref(), Some("/v1"));
        assert!(v1.version2().is_none());

        let v2 = SwitchableRequest::from_value(v2_event()).unwrap();
        assert_eq!(v2.version2().unwrap().raw_path.as_deref(), Some("/v2"));
    }

    #[test]
    fn test_ambiguous_request_fails() {
        let neither = SwitchableRequest::from_value(json!({"path": "/"})).unwrap_err();
        assert_eq!(neither.to_string(), "unable to determine request version");

        let both = SwitchableRequest::from_value(json!({
            "multiValueQueryStringParameters": {},
            "rawQueryString": ""
        }))
        .unwrap_err();
        assert!(matches!(both, Error::UnknownVersion("request")));

        assert!(SwitchableRequest::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn test_response_discriminators() {
        let v1 = SwitchableResponse::from_value(json!({"statusCode": 200, "body": "ok"})).unwrap();
        assert_eq!(v1.version1().unwrap().status_code, 200);

        let v2 =
            SwitchableResponse::from_value(json!({"statusCode": 200, "cookies": ["a=1"]})).unwrap();
        assert_eq!(v2.version2().unwrap().cookies, vec!["a=1"]);

        let err = SwitchableResponse::from_value(json!({"cookies": []})).unwrap_err();
        assert_eq!(err.to_string(), "unable to determine response version");
    }

    #[test]
    fn test_serialization_keeps_discriminators() {
        let v1 = SwitchableRequest::from_value(v1_event()).unwrap();
        let value = serde_json::to_value(&v1).unwrap();
        assert!(value.get(V1_REQUEST_FIELD).is_some());
        assert!(SwitchableRequest::from_value(value).unwrap().version1().is_some());

        let v2 = SwitchableRequest::from_value(v2_event()).unwrap();
        let value = serde_json::to_value(&v2).unwrap();
        assert!(value.get(V2_REQUEST_FIELD).is_some());
        assert!(SwitchableRequest::from_value(value).unwrap().version2().is_some());

        let response = SwitchableResponse::from(ApiGatewayV2httpResponse::default());
        let bytes = response.to_vec().unwrap();
        assert!(SwitchableResponse::from_slice(&bytes).unwrap().version2().is_some());
    }

    #[test]
    fn test_serde_deserialize_uses_discriminators() {
        let request: SwitchableRequest = serde_json::from_value(v2_event()).unwrap();
        assert!(request.version2().is_some());

        let err = serde_json::from_str::<SwitchableRequest>("{}").unwrap_err();
        assert!(err.to_string().contains("unable to determine request version"));
    }
}
