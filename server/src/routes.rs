//! HTTP route handlers and the router wiring for the service.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, State},
    http::{header, request::Parts, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use railcast_features::{DateFormat, FeatureVector, Observation, RawObservation};
use railcast_storage::{PredictionRecord, UserRecord};
use shared_logging::EventLevel;

use crate::{auth, error::ApiError, state::AppState};

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Desired login name.
    pub username: String,
    /// Contact address for the welcome mail.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// Response carrying a fresh session token.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Account name.
    pub username: String,
    /// Bearer token for subsequent requests.
    pub token: String,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

/// Authenticated profile answer.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// Account name.
    pub username: String,
}

/// Liveness answer.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Fixed `"ok"`.
    pub status: &'static str,
    /// Whether a model artifact is loaded.
    pub model_loaded: bool,
}

/// Prediction answer.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Predicted delay in minutes, rounded to two decimals.
    pub predicted_delay: f64,
}

/// One row of the history answer, newest first.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    /// Journey date as submitted.
    pub date: String,
    /// Temperature input.
    pub temperature: f64,
    /// Rain indicator input.
    pub rain: u8,
    /// Fog indicator input.
    pub fog: u8,
    /// Visibility input.
    pub visibility: f64,
    /// Wind speed input.
    pub windspeed: f64,
    /// Delay the model answered.
    pub predicted_delay: f64,
}

/// The authenticated principal, resolved from the bearer token.
#[derive(Debug)]
pub struct CurrentUser {
    /// Account record.
    pub record: UserRecord,
    /// Token the request presented (needed for logout).
    pub token: String,
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?
            .to_owned();
        let user_id = state.sessions.resolve(&token).ok_or(ApiError::Unauthorized)?;
        let record = state.users.get(user_id).ok_or(ApiError::Unauthorized)?;
        Ok(Self { record, token })
    }
}

/// Builds the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/profile", get(profile))
        .route("/predict", post(predict))
        .route("/history", get(history))
        .with_state(state)
}

/// Root banner.
pub async fn index() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Railcast prediction API is running".to_owned(),
    })
}

/// Liveness probe.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model_loaded: state.model.is_some(),
    })
}

/// Creates an account, opens a session, and queues the welcome mail.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let username = request.username.trim().to_owned();
    let email = request.email.trim().to_owned();
    if username.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username, email, and password are required".to_owned(),
        ));
    }

    let salt = auth::generate_salt();
    let record = UserRecord {
        id: Uuid::new_v4(),
        username: username.clone(),
        email: email.clone(),
        password_hash: auth::hash_password(&request.password, &salt),
        salt,
        created_at: Utc::now(),
    };
    state.users.insert(record.clone())?;
    let token = state.sessions.issue(record.id);
    state.record_event(
        EventLevel::Info,
        "user_registered",
        json!({ "username": username }),
    );

    // Mail is best-effort and kept off the request path.
    let mailer = state.mailer.clone();
    tokio::spawn(async move {
        if let Err(error) = mailer.send_welcome(&record.username, &record.email).await {
            tracing::warn!(%error, "welcome mail failed");
        }
    });

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            message: "registration successful".to_owned(),
            username,
            token,
        }),
    ))
}

/// Verifies credentials and opens a session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let record = state
        .users
        .find_by_username(request.username.trim())
        .ok_or(ApiError::BadCredentials)?;
    if !auth::verify_password(&request.password, &record.salt, &record.password_hash) {
        state.record_event(
            EventLevel::Warn,
            "login_failed",
            json!({ "username": record.username }),
        );
        return Err(ApiError::BadCredentials);
    }
    let token = state.sessions.issue(record.id);
    state.record_event(
        EventLevel::Info,
        "login",
        json!({ "username": record.username }),
    );
    Ok(Json(SessionResponse {
        message: "login successful".to_owned(),
        username: record.username,
        token,
    }))
}

/// Invalidates the presented session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Json<MessageResponse> {
    state.sessions.revoke(&user.token);
    state.record_event(
        EventLevel::Info,
        "logout",
        json!({ "username": user.record.username }),
    );
    Json(MessageResponse {
        message: "logged out".to_owned(),
    })
}

/// Profile of the authenticated principal.
pub async fn profile(user: CurrentUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        username: user.record.username,
    })
}

/// Serves one prediction and appends it to the caller's history.
///
/// The history write is lenient: a failed append is logged and the
/// prediction is still returned.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(raw): Json<RawObservation>,
) -> Result<Json<PredictResponse>, ApiError> {
    let model = state.model.clone().ok_or(ApiError::ModelUnavailable)?;

    let observation = Observation::from_raw(&raw, DateFormat::Live)?;
    let features = FeatureVector::from_observation(&observation);
    let predicted_delay = model
        .predict_rounded(&features)
        .map_err(ApiError::Prediction)?;

    let record = PredictionRecord {
        id: Uuid::new_v4(),
        user_id: user.record.id,
        date: raw.date.clone(),
        temperature: observation.temperature,
        rain: u8::from(observation.rain),
        fog: u8::from(observation.fog),
        visibility: observation.visibility,
        windspeed: observation.wind_speed,
        predicted_delay,
        created_at: Utc::now(),
    };
    if let Err(error) = state.history.append(record) {
        tracing::warn!(%error, "history append failed");
        state.record_event(
            EventLevel::Warn,
            "history_write_failed",
            json!({ "username": user.record.username }),
        );
    } else {
        state.record_event(
            EventLevel::Info,
            "prediction_served",
            json!({ "username": user.record.username, "predicted_delay": predicted_delay }),
        );
    }

    Ok(Json(PredictResponse { predicted_delay }))
}

/// The caller's prediction history, most recent first.
pub async fn history(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Json<Vec<HistoryEntry>> {
    let entries = state
        .history
        .for_user(user.record.id)
        .into_iter()
        .map(|record| HistoryEntry {
            date: record.date,
            temperature: record.temperature,
            rain: record.rain,
            fog: record.fog,
            visibility: record.visibility,
            windspeed: record.windspeed,
            predicted_delay: record.predicted_delay,
        })
        .collect();
    Json(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use chrono::{Duration, NaiveDate};
    use railcast_features::parse_date;
    use railcast_modeling::{train, TrainingFrame, TrainingOptions};
    use tempfile::TempDir;

    fn synthetic_frame() -> TrainingFrame {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let pairs: Vec<(Observation, f64)> = (0..30)
            .map(|i| {
                let date = start + Duration::days(i * 11);
                let rain = i % 3 == 0;
                let observation = Observation::new(
                    date,
                    5.0 + f64::from(i as i32),
                    rain,
                    false,
                    6.0,
                    10.0 + f64::from(i as i32) / 2.0,
                );
                let delay = 2.0 + if rain { 6.0 } else { 0.0 } + f64::from(i as i32) * 0.1;
                (observation, delay)
            })
            .collect();
        TrainingFrame::from_observations(&pairs)
    }

    fn test_state(with_model: bool) -> (TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            artifact_path: dir.path().join("model.json"),
            data_dir: dir.path().join("data"),
            event_log: Some(dir.path().join("events.jsonl")),
            ..ServerConfig::default()
        };
        if with_model {
            let outcome = train(&synthetic_frame(), TrainingOptions::default()).unwrap();
            outcome.artifact.save(&config.artifact_path).unwrap();
        }
        let state = AppState::initialize(config).unwrap();
        (dir, state)
    }

    async fn registered(state: &Arc<AppState>, username: &str) -> String {
        let (status, Json(session)) = register(
            State(state.clone()),
            Json(RegisterRequest {
                username: username.to_owned(),
                email: format!("{username}@example.net"),
                password: "secret".to_owned(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        session.token
    }

    async fn principal(state: &Arc<AppState>, token: &str) -> CurrentUser {
        let user_id = state.sessions.resolve(token).unwrap();
        CurrentUser {
            record: state.users.get(user_id).unwrap(),
            token: token.to_owned(),
        }
    }

    fn example_request() -> RawObservation {
        serde_json::from_value(json!({
            "date": "2024-03-15",
            "temperature": 15.5,
            "rain": 0,
            "fog": 0,
            "visibility": 8.0,
            "windspeed": 12.0,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn register_login_predict_history_flow() {
        let (_dir, state) = test_state(true);
        let token = registered(&state, "alice").await;

        let Json(answer) = predict(
            State(state.clone()),
            principal(&state, &token).await,
            Json(example_request()),
        )
        .await
        .unwrap();
        assert!(answer.predicted_delay.is_finite());
        let rounded = (answer.predicted_delay * 100.0).round() / 100.0;
        assert!((rounded - answer.predicted_delay).abs() < f64::EPSILON);

        let Json(entries) = history(State(state.clone()), principal(&state, &token).await).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].date, "2024-03-15");
        assert!((entries[0].predicted_delay - answer.predicted_delay).abs() < f64::EPSILON);

        // A second login works against the persisted registry.
        let Json(session) = login(
            State(state.clone()),
            Json(LoginRequest {
                username: "alice".to_owned(),
                password: "secret".to_owned(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(session.username, "alice");
    }

    #[tokio::test]
    async fn duplicate_registration_answers_conflict() {
        let (_dir, state) = test_state(true);
        let _ = registered(&state, "alice").await;
        let error = register(
            State(state.clone()),
            Json(RegisterRequest {
                username: "alice".to_owned(),
                email: "second@example.net".to_owned(),
                password: "secret".to_owned(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(error.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn wrong_password_answers_unauthorized() {
        let (_dir, state) = test_state(true);
        let _ = registered(&state, "alice").await;
        let error = login(
            State(state.clone()),
            Json(LoginRequest {
                username: "alice".to_owned(),
                password: "wrong".to_owned(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn predict_without_model_answers_service_unavailable() {
        let (_dir, state) = test_state(false);
        let token = registered(&state, "alice").await;
        let error = predict(
            State(state.clone()),
            principal(&state, &token).await,
            Json(example_request()),
        )
        .await
        .unwrap_err();
        assert_eq!(error.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn malformed_input_answers_bad_request() {
        let (_dir, state) = test_state(true);
        let token = registered(&state, "alice").await;

        let mut bad_date = example_request();
        bad_date.date = "15-03-2024".to_owned();
        let error = predict(
            State(state.clone()),
            principal(&state, &token).await,
            Json(bad_date),
        )
        .await
        .unwrap_err();
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);

        let mut bad_reading = example_request();
        bad_reading.temperature = json!("warm");
        let error = predict(
            State(state.clone()),
            principal(&state, &token).await,
            Json(bad_reading),
        )
        .await
        .unwrap_err();
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn logout_revokes_the_session() {
        let (_dir, state) = test_state(true);
        let token = registered(&state, "alice").await;
        let user = principal(&state, &token).await;
        let Json(answer) = logout(State(state.clone()), user).await;
        assert_eq!(answer.message, "logged out");
        assert!(state.sessions.resolve(&token).is_none());
    }

    #[tokio::test]
    async fn history_is_scoped_per_user_and_newest_first() {
        let (_dir, state) = test_state(true);
        let alice = registered(&state, "alice").await;
        let bob = registered(&state, "bob").await;

        for date in ["2024-03-15", "2024-03-16"] {
            let mut request = example_request();
            request.date = date.to_owned();
            predict(
                State(state.clone()),
                principal(&state, &alice).await,
                Json(request),
            )
            .await
            .unwrap();
        }
        predict(
            State(state.clone()),
            principal(&state, &bob).await,
            Json(example_request()),
        )
        .await
        .unwrap();

        let Json(entries) = history(State(state.clone()), principal(&state, &alice).await).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, "2024-03-16");
        assert_eq!(entries[1].date, "2024-03-15");
    }

    #[test]
    fn live_batch_equivalence_reaches_the_model_identically() {
        // The serving path parses `2024-03-15`; the training path parsed
        // `15-03-2024`. Both must produce the same vector.
        let live = Observation::from_raw(&example_request(), DateFormat::Live).unwrap();
        let batch = Observation::new(
            parse_date("15-03-2024", DateFormat::Batch).unwrap(),
            15.5,
            false,
            false,
            8.0,
            12.0,
        );
        assert_eq!(
            FeatureVector::from_observation(&live),
            FeatureVector::from_observation(&batch)
        );
    }
}
