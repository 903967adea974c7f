//! HTTP API.
pub mod posts;
pub mod profile;
pub mod status;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::error::ServerError;

/// JSON body checked with [`validator`] before reaching the handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Valid<T>(pub T);

impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Valid(value))
    }
}

/// Reject strings made only of whitespace.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }

    Ok(())
}

/// Keep optional text only when it carries something.
pub(crate) fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// Parse `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|date| date.date_naive()))
}

/// Reject anything that is not a date, blank strings included.
pub fn date(value: &str) -> Result<(), ValidationError> {
    match parse_date(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("date")),
    }
}

/// Like [`date`], but blank means "not supplied".
pub fn optional_date(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }

    date(value)
}

/// Date from an optional field already checked with [`date`] or
/// [`optional_date`].
pub(crate) fn supplied_date(value: Option<String>) -> Option<NaiveDate> {
    supplied(value).as_deref().and_then(parse_date)
}

/// Application state over an in-memory store seeded with two users.
#[cfg(test)]
pub(crate) async fn state() -> (crate::AppState, crate::database::memory::MemoryStore) {
    use std::sync::Arc;

    use crate::database::Database;
    use crate::database::memory::MemoryStore;
    use crate::github::GithubClient;
    use crate::token::TokenManager;
    use crate::user::{User, UserId};

    let store = MemoryStore::default();
    for (id, name) in [(crate::TEST_USER, "Alice"), ("bob", "Bob")] {
        let id = UserId::parse(id).unwrap();
        let avatar = Some(format!("https://avatars.example.com/{id}"));
        store.insert_user(User::new(id, name, avatar)).await;
    }

    let mut config = crate::config::Configuration::default();
    config.name = "devhub".into();
    config.url = "https://devhub.example.com/".into();
    let github =
        GithubClient::new(&crate::github::tests::config(crate::github::tests::fake_github().await))
            .unwrap();

    let state = crate::AppState::new(
        Arc::new(config.clone()),
        Database::memory(store.clone()),
        TokenManager::with_secret(&config.url, "test-secret"),
        Arc::new(github),
    );

    (state, store)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct Body {
        #[validate(required, custom(function = "crate::router::not_blank"))]
        text: Option<String>,
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("").is_err());
        assert!(not_blank(" \t\n").is_err());
    }

    #[test]
    fn test_supplied() {
        assert_eq!(supplied(Some("Acme".into())).as_deref(), Some("Acme"));
        assert_eq!(supplied(Some("  ".into())), None);
        assert_eq!(supplied(None), None);
    }

    #[test]
    fn test_dates() {
        assert!(date("2021-03-01").is_ok());
        assert!(date("2021-03-01T08:30:00Z").is_ok());
        assert!(date("").is_err());
        assert!(date("2021-13-01").is_err());
        assert!(date("yesterday").is_err());

        assert!(optional_date(" ").is_ok());
        assert!(optional_date("2021-03-01").is_ok());
        assert!(optional_date("03/01/2021").is_err());

        assert_eq!(
            supplied_date(Some("2021-03-01T08:30:00+02:00".into())),
            NaiveDate::from_ymd_opt(2021, 3, 1)
        );
        assert_eq!(supplied_date(Some("".into())), None);
        assert_eq!(supplied_date(None), None);
    }

    #[test]
    fn test_required_and_not_blank() {
        let body: Body = serde_json::from_str(r#"{"text":"  "}"#).unwrap();
        assert!(body.validate().is_err());

        let body: Body = serde_json::from_str("{}").unwrap();
        assert!(body.validate().is_err());

        let body: Body = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert!(body.validate().is_ok());
    }
}
