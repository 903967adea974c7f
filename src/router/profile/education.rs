//! Education entries of the caller's profile.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::profile::{NewEducation, ProfileView};
use crate::router::{Valid, supplied, supplied_date};
use crate::user::UserId;

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(
        required(message = "School is required."),
        custom(function = "crate::router::not_blank", message = "School is required.")
    )]
    pub school: Option<String>,
    #[validate(
        required(message = "Degree is required."),
        custom(function = "crate::router::not_blank", message = "Degree is required.")
    )]
    pub degree: Option<String>,
    #[serde(alias = "fieldofstudy")]
    #[validate(
        required(message = "Field of study is required."),
        custom(
            function = "crate::router::not_blank",
            message = "Field of study is required."
        )
    )]
    pub field_of_study: Option<String>,
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

impl From<Body> for NewEducation {
    fn from(body: Body) -> Self {
        NewEducation {
            school: body.school.unwrap_or_default(),
            degree: body.degree.unwrap_or_default(),
            field_of_study: body.field_of_study.unwrap_or_default(),
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
    Ok(Json(state.profiles.add_education(&user, body.into()).await?))
}

/// Unknown identifiers leave the profile untouched.
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    Path(edu_id): Path<String>,
) -> Result<Json<ProfileView>> {
    Ok(Json(state.profiles.remove_education(&user, &edu_id).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

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

    async fn errors(response: axum::http::Response<axum::body::Body>) -> Vec<String> {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|error| error["field"].as_str().unwrap().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn test_add_and_remove_education() {
        let (state, app) = setup().await;

        let mut profile = Value::Null;
        for school in ["MIT", "EPFL"] {
            let response = make_request(
                Some(&state),
                app.clone(),
                Method::PUT,
                "/profile/education",
                json!({
                    "school": school,
                    "degree": "MSc",
                    "fieldofstudy": "Computer science",
                    "from": "2016-09-01",
                    "to": "2018-06-30",
                })
                .to_string(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
            let body = response.into_body().collect().await.unwrap().to_bytes();
            profile = serde_json::from_slice(&body).unwrap();
        }
        assert_eq!(profile["education"][0]["school"], "EPFL");
        assert_eq!(profile["education"][1]["school"], "MIT");
        assert_eq!(profile["education"][1]["field_of_study"], "Computer science");
        assert_eq!(profile["education"][1]["current"], false);

        let mit = profile["education"][1]["id"].as_str().unwrap();
        let response = make_request(
            Some(&state),
            app,
            Method::DELETE,
            &format!("/profile/education/{mit}"),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        let education = body["education"].as_array().unwrap();
        assert_eq!(education.len(), 1);
        assert_eq!(education[0]["school"], "EPFL");
    }

    #[tokio::test]
    async fn test_add_education_validation() {
        let (state, app) = setup().await;

        let response = make_request(
            Some(&state),
            app.clone(),
            Method::PUT,
            "/profile/education",
            json!({ "school": " ", "current": true }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            errors(response).await,
            vec!["degree", "field_of_study", "from", "school"]
        );

        let response = make_request(
            Some(&state),
            app,
            Method::PUT,
            "/profile/education",
            json!({
                "school": "MIT",
                "degree": "MSc",
                "fieldofstudy": "Computer science",
                "from": "",
                "to": "June",
            })
            .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(errors(response).await, vec!["from", "to"]);
    }

    #[tokio::test]
    async fn test_add_education_blank_end_date() {
        let (state, app) = setup().await;

        let response = make_request(
            Some(&state),
            app,
            Method::PUT,
            "/profile/education",
            json!({
                "school": "MIT",
                "degree": "MSc",
                "field_of_study": "Computer science",
                "from": "2016-09-01",
                "to": "",
                "current": true,
            })
            .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["education"][0]["field_of_study"], "Computer science");
        assert_eq!(body["education"][0]["from"], "2016-09-01");
        assert!(body["education"][0]["to"].is_null());
        assert_eq!(body["education"][0]["current"], true);
    }

    #[tokio::test]
    async fn test_add_education_without_profile() {
        let (state, _) = router::state().await;
        let app = app(state.clone());

        let response = make_request(
            Some(&state),
            app,
            Method::PUT,
            "/profile/education",
            json!({
                "school": "MIT",
                "degree": "MSc",
                "fieldofstudy": "Computer science",
                "from": "2016-09-01",
            })
            .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_add_education_without_token() {
        let (_, app) = setup().await;

        let response = make_request(
            None,
            app,
            Method::PUT,
            "/profile/education",
            json!({
                "school": "MIT",
                "degree": "MSc",
                "fieldofstudy": "Computer science",
                "from": "2016-09-01",
            })
            .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_remove_education_without_token() {
        let (state, _) = router::state().await;
        let app = app(state);

        let response = make_request(
            None,
            app,
            Method::DELETE,
            "/profile/education/00000000-0000-0000-0000-000000000000",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
