//! # Session Guard Middleware
//!
//! Runs [`SessionPolicyGuard`](crate::backend::domain::SessionPolicyGuard)
//! in front of every protected route. Accepted requests get the acting
//! [`Principal`] in their extensions; handlers extract it with
//! `Extension<Principal>`.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, SecondsFormat, Utc};
use tower_sessions::Session;
use tracing::{debug, warn};

use shared::SessionNotice;

use crate::backend::domain::models::user::Principal;
use crate::backend::domain::{SessionClaims, SessionState};
use crate::backend::io::rest::error::ApiError;
use crate::backend::AppState;

pub const PRINCIPAL_ID_KEY: &str = "principal_id";
pub const SESSION_TOKEN_KEY: &str = "session_token";
pub const LAST_ACTIVITY_KEY: &str = "last_activity";

pub const LOGIN_REDIRECT: &str = "/login";

/// Store a fresh login in the session
pub async fn open_session(session: &Session, principal_id: i64, token: &str) -> Result<(), ApiError> {
    session.cycle_id().await?;
    session.insert(PRINCIPAL_ID_KEY, principal_id).await?;
    session.insert(SESSION_TOKEN_KEY, token).await?;
    session.insert(LAST_ACTIVITY_KEY, activity_timestamp(Utc::now())).await?;
    Ok(())
}

async fn read_claims(session: &Session) -> Result<Option<SessionClaims>, ApiError> {
    let Some(principal_id) = session.get::<i64>(PRINCIPAL_ID_KEY).await? else {
        return Ok(None);
    };
    Ok(Some(SessionClaims {
        principal_id,
        token: session.get::<String>(SESSION_TOKEN_KEY).await?,
        last_activity: session.get::<String>(LAST_ACTIVITY_KEY).await?,
    }))
}

/// Middleware rejecting requests without a valid, non-idle, current session
pub async fn require_session(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = read_claims(&session).await?;
    let stored_token = match &claims {
        Some(c) => state.auth_service.stored_token(c.principal_id).await?,
        None => None,
    };

    let now = Utc::now();
    let outcome = state
        .session_guard
        .evaluate(claims.as_ref(), stored_token.as_deref(), now);

    match (outcome, claims) {
        (SessionState::ForcedLogoutIdle | SessionState::ForcedLogoutSuperseded, claims) => {
            warn!(
                "Forced logout ({}) for principal {:?}",
                outcome.reason().unwrap_or_default(),
                claims.map(|c| c.principal_id)
            );
            session.flush().await?;
            let notice = SessionNotice {
                reason: outcome.reason().unwrap_or_default().to_string(),
                message: state.session_guard.notice_message(outcome).unwrap_or_default(),
                redirect: LOGIN_REDIRECT.to_string(),
            };
            Ok((StatusCode::UNAUTHORIZED, Json(notice)).into_response())
        }
        (SessionState::Authenticated, Some(claims)) => {
            let user = state
                .auth_service
                .load_user(claims.principal_id)
                .await?
                .ok_or_else(|| ApiError::unauthorized("Login required"))?;

            session.insert(LAST_ACTIVITY_KEY, activity_timestamp(now)).await?;
            state.auth_service.record_activity(user.id, now).await?;

            request.extensions_mut().insert(Principal::from(&user));
            Ok(next.run(request).await)
        }
        (SessionState::Unauthenticated, _) | (SessionState::Authenticated, None) => {
            debug!("Rejected {} without a login", request.uri().path());
            Err(ApiError::unauthorized("Login required"))
        }
    }
}

fn activity_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
