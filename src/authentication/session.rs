use crate::authentication::{AuthError, CredentialVerifier, Credentials};
use crate::utils::spawn_blocking_task_with_tracing;
use actix_session::{Session, SessionExt, SessionGetError, SessionInsertError};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use std::future::{ready, Ready};
use std::sync::Arc;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AdminIdentity {
    pub username: String,
    pub role: Role,
}

/// Proof of a successful login, stored in the session.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SessionTicket {
    pub identity: AdminIdentity,
    pub issued_at: DateTime<Utc>,
}

/// Admits administrators: checks credentials on login and decides whether a
/// ticket presented later is still alive.
pub struct SessionGate {
    verifier: Arc<dyn CredentialVerifier>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SessionGate {
    pub fn new(verifier: Arc<dyn CredentialVerifier>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            verifier,
            clock,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    #[tracing::instrument(
        name = "Authenticate an administrator",
        skip_all,
        fields(username = %credentials.username)
    )]
    pub async fn login(&self, credentials: Credentials) -> Result<SessionTicket, AuthError> {
        let verifier = Arc::clone(&self.verifier);
        let username = spawn_blocking_task_with_tracing(move || verifier.verify(&credentials))
            .await
            .context("Failed to spawn blocking task")
            .map_err(AuthError::UnexpectedError)??;

        Ok(SessionTicket {
            identity: AdminIdentity {
                username,
                role: Role::Admin,
            },
            issued_at: self.clock.now(),
        })
    }

    /// A ticket is alive strictly before `issued_at + ttl`, whatever the
    /// session backend still holds.
    pub fn admit(&self, ticket: Option<SessionTicket>) -> Result<AdminIdentity, AuthError> {
        match ticket {
            Some(ticket) if self.clock.now() < ticket.issued_at + self.ttl => Ok(ticket.identity),
            _ => Err(AuthError::NotAuthenticated),
        }
    }

    pub fn who_am_i(&self, session: &AdminSession) -> Result<AdminIdentity, AuthError> {
        let ticket = session
            .get_ticket()
            .context("Failed to read the session ticket")?;
        self.admit(ticket)
    }
}

pub struct AdminSession(Session);

impl AdminSession {
    const TICKET_KEY: &'static str = "admin_ticket";

    pub fn new(session: Session) -> Self {
        Self(session)
    }

    pub fn renew(&self) {
        self.0.renew();
    }

    pub fn insert_ticket(&self, ticket: &SessionTicket) -> Result<(), SessionInsertError> {
        self.0.insert(Self::TICKET_KEY, ticket)
    }

    pub fn get_ticket(&self) -> Result<Option<SessionTicket>, SessionGetError> {
        self.0.get(Self::TICKET_KEY)
    }

    pub fn logout(&self) {
        self.0.purge();
    }
}

impl FromRequest for AdminSession {
    type Error = <Session as FromRequest>::Error;
    // Nothing to await here, the session is already attached by the middleware
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(AdminSession::new(req.get_session())))
    }
}
