use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, error};
use uuid::Uuid;

use shield_dashboard_domain::health::HealthServiceTrait;
use shield_dashboard_domain::page::{DashboardSession, LabSession};
use shield_dashboard_domain::services::ScoringServiceTrait;

use crate::config::AppConfig;

/// Cookie carrying the browser session id
pub const SESSION_COOKIE: &str = "shield_session";

/// Service type for dependency injection
pub type ScoringService = Arc<dyn ScoringServiceTrait>;

/// Health service type for dependency injection
pub type HealthService = Arc<dyn HealthServiceTrait>;

/// Everything one browser session has on screen
#[derive(Debug, Clone)]
pub struct PageSession {
    pub dashboard: DashboardSession,
    pub lab: LabSession,
    touched_at: DateTime<Utc>,
}

impl Default for PageSession {
    fn default() -> Self {
        Self {
            dashboard: DashboardSession::default(),
            lab: LabSession::default(),
            touched_at: Utc::now(),
        }
    }
}

impl PageSession {
    /// A request for this session is still outstanding
    pub fn is_busy(&self) -> bool {
        self.dashboard.score.is_busy() || self.lab.report.is_busy()
    }

    /// Idle past `ttl`; sessions waiting on the backend never expire
    fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        if self.is_busy() {
            return false;
        }
        now.signed_duration_since(self.touched_at)
            .to_std()
            .map(|idle| idle > ttl)
            .unwrap_or(false)
    }
}

/// Session resolved for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHandle {
    pub id: Uuid,
    /// The browser does not know this id yet
    pub is_new: bool,
}

impl SessionHandle {
    /// Attach the session cookie when the browser needs it
    pub fn attach_cookie(&self, mut response: Response) -> Response {
        if self.is_new {
            let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, self.id);
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
                Err(e) => error!("Could not build session cookie: {}", e),
            }
        }
        response
    }
}

/// In-process page state for every browser session
///
/// The lock is only held to read or update state, never across a backend call.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, PageSession>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Find the session named by the request cookie, or start a new one
    pub async fn resolve(&self, headers: &HeaderMap) -> SessionHandle {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(self.ttl, now));
        if sessions.len() < before {
            debug!("Pruned {} idle sessions", before - sessions.len());
        }

        if let Some(id) = session_id_from(headers) {
            if let Some(session) = sessions.get_mut(&id) {
                session.touched_at = now;
                return SessionHandle { id, is_new: false };
            }
        }

        let id = Uuid::new_v4();
        sessions.insert(id, PageSession::default());
        debug!("Started session {}", id);
        SessionHandle { id, is_new: true }
    }

    /// Run `f` against a session's state under the write lock
    pub async fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut PageSession) -> R) -> R {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(id).or_default();
        session.touched_at = Utc::now();
        f(session)
    }

    /// Copy of a session's current state
    pub async fn snapshot(&self, id: Uuid) -> PageSession {
        self.sessions.read().await.get(&id).cloned().unwrap_or_default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Read the session id out of the `Cookie` header
fn session_id_from(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub scoring: ScoringService,
    pub health: HealthService,
    pub sessions: SessionStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, scoring: ScoringService, health: HealthService) -> Self {
        Self {
            scoring,
            health,
            sessions: SessionStore::new(config.session_ttl),
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie_headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_session_id_from_cookie_header() {
        let id = Uuid::new_v4();
        let headers = cookie_headers(&format!("theme=dark; {}={}; other=1", SESSION_COOKIE, id));
        assert_eq!(session_id_from(&headers), Some(id));

        assert_eq!(session_id_from(&cookie_headers("shield_session=not-a-uuid")), None);
        assert_eq!(session_id_from(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_resolve_reuses_known_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let first = store.resolve(&HeaderMap::new()).await;
        assert!(first.is_new);

        let headers = cookie_headers(&format!("{}={}", SESSION_COOKIE, first.id));
        let second = store.resolve(&headers).await;
        assert_eq!(second, SessionHandle { id: first.id, is_new: false });
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_session_id_is_replaced() {
        let store = SessionStore::new(Duration::from_secs(60));
        let stranger = Uuid::new_v4();
        let headers = cookie_headers(&format!("{}={}", SESSION_COOKIE, stranger));

        let handle = store.resolve(&headers).await;
        assert!(handle.is_new);
        assert_ne!(handle.id, stranger);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_pruned() {
        let store = SessionStore::new(Duration::from_secs(60));
        let stale = store.resolve(&HeaderMap::new()).await;
        store
            .update(stale.id, |session| {
                session.touched_at = Utc::now() - chrono::Duration::seconds(120);
            })
            .await;

        let fresh = store.resolve(&HeaderMap::new()).await;
        assert_eq!(store.len().await, 1);
        assert!(store.sessions.read().await.contains_key(&fresh.id));
        assert!(!store.sessions.read().await.contains_key(&stale.id));
    }

    #[tokio::test]
    async fn test_busy_sessions_survive_pruning() {
        let store = SessionStore::new(Duration::from_secs(60));
        let scoring = store.resolve(&HeaderMap::new()).await;
        let uploading = store.resolve(&HeaderMap::new()).await;

        let long_ago = Utc::now() - chrono::Duration::seconds(120);
        store
            .update(scoring.id, |session| {
                session.dashboard.score.begin().unwrap();
                session.touched_at = long_ago;
            })
            .await;
        store
            .update(uploading.id, |session| {
                session.lab.begin_upload("labs.pdf").unwrap();
                session.touched_at = long_ago;
            })
            .await;

        store.resolve(&HeaderMap::new()).await;

        let sessions = store.sessions.read().await;
        assert_eq!(sessions.len(), 3);
        assert!(sessions[&scoring.id].dashboard.score.is_busy());
        assert!(sessions[&uploading.id].lab.report.is_busy());
    }

    #[test]
    fn test_new_sessions_set_cookie() {
        let handle = SessionHandle { id: Uuid::new_v4(), is_new: true };
        let response = handle.attach_cookie(Response::new(axum::body::Body::empty()));
        let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with(&format!("{}={}", SESSION_COOKIE, handle.id)));

        let known = SessionHandle { is_new: false, ..handle };
        let response = known.attach_cookie(Response::new(axum::body::Body::empty()));
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }
}
