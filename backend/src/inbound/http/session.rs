//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie carries the caller's id and email. Both are re-validated on
//! every read; a cookie that fails validation is treated as no session.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Caller, EmailAddress, Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const EMAIL_KEY: &str = "email";

/// Newtype wrapper that exposes caller-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated caller, rotating the session identifier.
    pub fn persist_caller(&self, caller: &Caller) -> Result<(), Error> {
        self.0.renew();
        self.insert(USER_ID_KEY, caller.user_id().to_string())?;
        self.insert(EMAIL_KEY, caller.email().to_string())
    }

    fn insert(&self, key: &str, value: String) -> Result<(), Error> {
        self.0
            .insert(key, value)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        self.0
            .get::<String>(key)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    }

    /// The authenticated caller, if the session holds a valid one.
    pub fn caller(&self) -> Result<Option<Caller>, Error> {
        let (Some(raw_id), Some(raw_email)) = (self.read(USER_ID_KEY)?, self.read(EMAIL_KEY)?)
        else {
            return Ok(None);
        };
        let user_id = match UserId::new(&raw_id) {
            Ok(id) => id,
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                return Ok(None);
            }
        };
        match EmailAddress::parse(&raw_email) {
            Ok(email) => Ok(Some(Caller::new(user_id, email))),
            Err(error) => {
                warn!(%error, "invalid email in session cookie");
                Ok(None)
            }
        }
    }

    /// Require an authenticated caller or return `401 Unauthorized`.
    pub fn require_caller(&self) -> Result<Caller, Error> {
        self.caller()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop all session state; the cookie is removed on the response.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
