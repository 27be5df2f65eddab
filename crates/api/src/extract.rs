//! Request extractors that turn rejections into [`AppError`] bodies.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::error::AppError;

/// JSON body that is deserialized and then checked with `validator`.
///
/// Malformed JSON is a 400; a well-formed body failing field rules is a 422
/// with per-field messages.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

/// Query string extractor. Values that fail to parse (an unknown status, a
/// malformed date) are reported as validation failures.
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| AppError::validation(e.body_text()))?;
        Ok(QueryParams(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        // Syntactically valid JSON with missing or mistyped fields.
        JsonRejection::JsonDataError(e) => AppError::validation(e.body_text()),
        other => AppError::BadRequest(other.body_text()),
    }
}

/// Deserializer for clearable fields: an absent key stays `None` (through
/// `#[serde(default)]`), an explicit `null` becomes `Some(None)`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        reviewer_id: Option<Option<i64>>,
    }

    #[test]
    fn nullable_distinguishes_absent_null_and_value() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"reviewer_id": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"reviewer_id": 4}"#).unwrap();

        assert_eq!(absent.reviewer_id, None);
        assert_eq!(null.reviewer_id, Some(None));
        assert_eq!(set.reviewer_id, Some(Some(4)));
    }
}
