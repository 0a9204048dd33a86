//! # Session Policy Guard
//!
//! Decides, for every request that carries a logged-in session, whether the
//! session may continue. Two rules apply, in this order:
//!
//! 1. **Idle timeout**: a session whose last activity is older than the idle
//!    threshold (or whose last activity cannot be read) is closed.
//! 2. **Single session per principal**: the token held by the session must
//!    match the token stored for the principal. Logging in elsewhere rotates
//!    the stored token, which closes every older session on its next request.
//!
//! The guard is pure: the caller supplies the clock and the stored token, and
//! applies the resulting [`SessionState`] (clearing the session, refreshing
//! the last-activity mark).

use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_IDLE_MINUTES: i64 = 15;

/// What the session itself remembers about the login
#[derive(Debug, Clone, PartialEq)]
pub struct SessionClaims {
    pub principal_id: i64,
    pub token: Option<String>,
    /// RFC 3339 timestamp of the last accepted request
    pub last_activity: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No login in the session; the guard does not apply
    Unauthenticated,
    /// The request may proceed and the last-activity mark moves to now
    Authenticated,
    ForcedLogoutIdle,
    ForcedLogoutSuperseded,
}

impl SessionState {
    /// Short machine-readable reason for forced logouts
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            SessionState::ForcedLogoutIdle => Some("idle_timeout"),
            SessionState::ForcedLogoutSuperseded => Some("session_superseded"),
            _ => None,
        }
    }

    pub fn is_forced_logout(&self) -> bool {
        self.reason().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct SessionPolicyGuard {
    idle_threshold: Duration,
}

impl Default for SessionPolicyGuard {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_IDLE_MINUTES))
    }
}

impl SessionPolicyGuard {
    pub fn new(idle_threshold: Duration) -> Self {
        Self { idle_threshold }
    }

    pub fn idle_threshold(&self) -> Duration {
        self.idle_threshold
    }

    /// Evaluate a request.
    ///
    /// `claims` is `None` when the session holds no login. `stored_token` is
    /// the principal's current token, `None` when logged out everywhere or
    /// when the principal no longer exists.
    pub fn evaluate(
        &self,
        claims: Option<&SessionClaims>,
        stored_token: Option<&str>,
        now: DateTime<Utc>,
    ) -> SessionState {
        let Some(claims) = claims else {
            return SessionState::Unauthenticated;
        };

        if let Some(last) = claims.last_activity.as_deref() {
            match DateTime::parse_from_rfc3339(last) {
                Ok(last) if now - last.with_timezone(&Utc) > self.idle_threshold => {
                    return SessionState::ForcedLogoutIdle;
                }
                Ok(_) => {}
                Err(_) => return SessionState::ForcedLogoutIdle,
            }
        }

        match (claims.token.as_deref(), stored_token) {
            (Some(presented), Some(stored)) if presented == stored => SessionState::Authenticated,
            _ => SessionState::ForcedLogoutSuperseded,
        }
    }

    /// Message shown to the user after a forced logout
    pub fn notice_message(&self, state: SessionState) -> Option<String> {
        match state {
            SessionState::ForcedLogoutIdle => Some(format!(
                "Session closed after {} minutes of inactivity.",
                self.idle_threshold.num_minutes()
            )),
            SessionState::ForcedLogoutSuperseded => Some(
                "Your session was opened on another device. This session was closed.".to_string(),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap()
    }

    fn claims(token: Option<&str>, last_activity: Option<DateTime<Utc>>) -> SessionClaims {
        SessionClaims {
            principal_id: 1,
            token: token.map(str::to_string),
            last_activity: last_activity.map(|t| t.to_rfc3339()),
        }
    }

    #[test]
    fn test_no_login_is_unauthenticated() {
        let guard = SessionPolicyGuard::default();
        assert_eq!(guard.evaluate(None, Some("abc"), now()), SessionState::Unauthenticated);
    }

    #[test]
    fn test_matching_token_is_authenticated() {
        let guard = SessionPolicyGuard::default();
        let c = claims(Some("abc"), Some(now() - Duration::minutes(3)));
        assert_eq!(guard.evaluate(Some(&c), Some("abc"), now()), SessionState::Authenticated);
    }

    #[test]
    fn test_token_mismatch_or_absence_is_superseded() {
        let guard = SessionPolicyGuard::default();
        let recent = Some(now() - Duration::minutes(1));

        let other = claims(Some("xyz"), recent);
        assert_eq!(guard.evaluate(Some(&other), Some("abc"), now()), SessionState::ForcedLogoutSuperseded);

        let missing = claims(None, recent);
        assert_eq!(guard.evaluate(Some(&missing), Some("abc"), now()), SessionState::ForcedLogoutSuperseded);

        let logged_out = claims(Some("abc"), recent);
        assert_eq!(guard.evaluate(Some(&logged_out), None, now()), SessionState::ForcedLogoutSuperseded);

        // Comparison is exact
        let upper = claims(Some("ABC"), recent);
        assert_eq!(guard.evaluate(Some(&upper), Some("abc"), now()), SessionState::ForcedLogoutSuperseded);
    }

    #[test]
    fn test_idle_threshold_is_strict() {
        let guard = SessionPolicyGuard::default();

        let at_threshold = claims(Some("abc"), Some(now() - Duration::minutes(15)));
        assert_eq!(guard.evaluate(Some(&at_threshold), Some("abc"), now()), SessionState::Authenticated);

        let past = claims(Some("abc"), Some(now() - Duration::minutes(15) - Duration::seconds(1)));
        assert_eq!(guard.evaluate(Some(&past), Some("abc"), now()), SessionState::ForcedLogoutIdle);
    }

    #[test]
    fn test_idle_wins_over_superseded() {
        let guard = SessionPolicyGuard::default();
        let c = claims(Some("old"), Some(now() - Duration::hours(2)));
        assert_eq!(guard.evaluate(Some(&c), Some("new"), now()), SessionState::ForcedLogoutIdle);
    }

    #[test]
    fn test_unreadable_last_activity_fails_closed() {
        let guard = SessionPolicyGuard::default();
        let mut c = claims(Some("abc"), None);
        c.last_activity = Some("yesterday-ish".to_string());
        assert_eq!(guard.evaluate(Some(&c), Some("abc"), now()), SessionState::ForcedLogoutIdle);
    }

    #[test]
    fn test_missing_last_activity_skips_idle_check() {
        let guard = SessionPolicyGuard::default();
        let c = claims(Some("abc"), None);
        assert_eq!(guard.evaluate(Some(&c), Some("abc"), now()), SessionState::Authenticated);
    }

    #[test]
    fn test_custom_threshold_and_notices() {
        let guard = SessionPolicyGuard::new(Duration::minutes(5));
        let c = claims(Some("abc"), Some(now() - Duration::minutes(6)));
        let state = guard.evaluate(Some(&c), Some("abc"), now());

        assert_eq!(state, SessionState::ForcedLogoutIdle);
        assert_eq!(state.reason(), Some("idle_timeout"));
        assert!(guard.notice_message(state).unwrap().contains("5 minutes"));
        assert_eq!(guard.notice_message(SessionState::Authenticated), None);
        assert!(!SessionState::Authenticated.is_forced_logout());
    }
}
