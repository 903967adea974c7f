//! Work experience entries of the caller's profile.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::profile::{NewExperience, ProfileView};
use crate::router::{Valid, supplied, supplied_date};
use crate::user::UserId;

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(
        required(message = "Title is required."),
        custom(function = "crate::router::not_blank", message = "Title is required.")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "Company is required."),
        custom(function = "crate::router::not_blank", message = "Company is required.")
    )]
    pub company: Option<String>,
    pub location: Option<String>,
    #[validate(
        required(message = "From date is required."),
        custom(
            function = "crate::router::date",
            message = "From date must be a date (YYYY-MM-DD)."
        )
    )]
    pub from: Option<String>,
    #[validate(custom(
        function = "crate::router::optional_date",
        message = "To date must be a date (YYYY-MM-DD)."
    ))]
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

impl From<Body> for NewExperience {
    fn from(body: Body) -> Self {
        NewExperience {
            title: body.title.unwrap_or_default(),
            company: body.company.unwrap_or_default(),
            location: supplied(body.location),
            from: supplied_date(body.from).unwrap_or_default(),
            to: supplied_date(body.to),
            current: body.current,
            description: supplied(body.description),
        }
    }
}

/// Add an entry on top of the list.
pub async fn add(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    Valid(body): Valid<Body>,
) -> Result<Json<ProfileView>> {
    Ok(Json(state.profiles.add_experience(&user, body.into()).await?))
}

/// Unknown identifiers leave the profile untouched.
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    Path(exp_id): Path<String>,
) -> Result<Json<ProfileView>> {
    Ok(Json(state.profiles.remove_experience(&user, &exp_id).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use uuid::Uuid;

    use crate::profile::ProfileFields;
    use crate::user::UserId;
    use crate::*;

    async fn setup() -> (AppState, axum::Router) {
        let (state, _) = router::state().await;
        state
            .profiles
            .upsert(
                &UserId::parse(TEST_USER).unwrap(),
                ProfileFields {
                    status: "Developer".into(),
                    skills: vec!["rust".into()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let app = app(state.clone());

        (state, app)
    }

    async fn add(state: &AppState, app: &axum::Router, title: &str) -> Value {
        let response = make_request(
            Some(state),
            app.clone(),
            Method::PUT,
            "/profile/experience",
            json!({
                "title": title,
                "company": "Acme",
                "from": "2021-03-01",
                "current": true,
            })
            .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn titles(profile: &Value) -> Vec<&str> {
        profile["experience"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["title"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_add_and_remove_experience() {
        let (state, app) = setup().await;

        add(&state, &app, "Intern").await;
        let profile = add(&state, &app, "Engineer").await;
        assert_eq!(titles(&profile), vec!["Engineer", "Intern"]);
        assert_eq!(profile["experience"][0]["from"], "2021-03-01");

        for id in [Uuid::new_v4().to_string(), "not-a-uuid".to_owned()] {
            let response = make_request(
                Some(&state),
                app.clone(),
                Method::DELETE,
                &format!("/profile/experience/{id}"),
                String::default(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
            let body = response.into_body().collect().await.unwrap().to_bytes();
            let body: Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(titles(&body), vec!["Engineer", "Intern"]);
        }

        let intern = profile["experience"][1]["id"].as_str().unwrap();
        let response = make_request(
            Some(&state),
            app,
            Method::DELETE,
            &format!("/profile/experience/{intern}"),
            String::default(),
        )
        .await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(titles(&body), vec!["Engineer"]);
    }

    #[tokio::test]
    async fn test_add_experience_validation() {
        let (state, app) = setup().await;

        let response = make_request(
            Some(&state),
            app,
            Method::PUT,
            "/profile/experience",
            json!({ "title": "Engineer" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        let fields = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|error| error["field"].as_str().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(fields, vec!["company", "from"]);
    }

    #[tokio::test]
    async fn test_add_experience_dates() {
        let (state, app) = setup().await;

        let response = make_request(
            Some(&state),
            app.clone(),
            Method::PUT,
            "/profile/experience",
            json!({ "title": "Engineer", "company": "Acme", "from": "2020-01-01", "to": "" })
                .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["experience"][0]["from"], "2020-01-01");
        assert!(body["experience"][0]["to"].is_null());

        for (from, to, field) in [
            ("", "2022-01-01", "from"),
            ("last spring", "2022-01-01", "from"),
            ("2020-01-01", "2022-02-30", "to"),
        ] {
            let response = make_request(
                Some(&state),
                app.clone(),
                Method::PUT,
                "/profile/experience",
                json!({ "title": "Engineer", "company": "Acme", "from": from, "to": to })
                    .to_string(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let body = response.into_body().collect().await.unwrap().to_bytes();
            let body: Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(body["errors"][0]["field"], field);
        }
    }

    #[tokio::test]
    async fn test_add_experience_without_token() {
        let (_, app) = setup().await;

        let response = make_request(
            None,
            app,
            Method::PUT,
            "/profile/experience",
            json!({ "title": "Engineer", "company": "Acme", "from": "2020-01-01" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_add_experience_without_profile() {
        let (state, _) = router::state().await;
        let app = app(state.clone());

        let response = make_request(
            Some(&state),
            app,
            Method::PUT,
            "/profile/experience",
            json!({ "title": "Engineer", "company": "Acme", "from": "2020-01-01" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
