//! Driving port for user profile queries.
//!
//! Inbound adapters use this port to load a user's profile without importing
//! persistence details. Fixture implementations keep HTTP handlers testable
//! before databases are wired.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

use super::fixtures::fixture_user;

/// Domain use-case port for reading the current user's profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Return the profile for the authenticated user.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error>;
}

/// Fixture profile query that knows only the fixture account.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserProfileQuery;

#[async_trait]
impl UserProfileQuery for FixtureUserProfileQuery {
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        let user = fixture_user()?;
        if user.id() == user_id {
            Ok(user)
        } else {
            Err(Error::not_found(format!("user {user_id} not found")))
        }
    }
}
