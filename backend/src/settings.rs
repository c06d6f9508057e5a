//! Process configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `COURIER_*` environment variables and an
//! optional configuration file, in the usual OrthoConfig precedence.
//! Session cookie toggles are read separately by
//! [`crate::inbound::http::session_config`].

use std::net::SocketAddr;
use std::time::Duration;

use chrono::TimeDelta;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

use crate::domain::{
    DEFAULT_NOTIFY_FROM, DEFAULT_RESET_LINK_BASE, DEFAULT_RESET_TOKEN_TTL_MINUTES,
    DeliverySettings, RecipientPolicy, ResetSettings,
};
use crate::outbound::notify::DEFAULT_RESEND_ENDPOINT;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address `{value}`: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid notifier endpoint `{value}`: {source}")]
    NotifyEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid reset link base `{value}`: {source}")]
    ResetLink {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("reset token lifetime must be at least one minute")]
    ResetTokenTtl,
}

/// Top-level settings for the courier server.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COURIER")]
pub struct CourierSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without it the server runs on fixture ports.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_pool_max_size: Option<u32>,
    /// Comma-separated recipient domain allow-list.
    pub allowed_domains: Option<String>,
    /// Resend API key. Without it notifications are logged, not sent.
    pub notify_api_key: Option<String>,
    /// Resend-compatible submission endpoint.
    pub notify_endpoint: Option<String>,
    /// `from` header used for notification emails.
    pub notify_from: Option<String>,
    /// Provider request timeout in seconds.
    pub notify_timeout_secs: Option<u64>,
    /// Absolute URL of the reset page that emailed links point at.
    pub reset_link_base: Option<String>,
    /// Minutes a password reset token stays valid.
    pub reset_token_ttl_mins: Option<u64>,
}

impl CourierSettings {
    /// Parsed bind address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn db_pool_max_size(&self) -> u32 {
        self.db_pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Recipient allow-list; the default admits the two webmail domains.
    pub fn recipient_policy(&self) -> RecipientPolicy {
        self.allowed_domains
            .as_deref()
            .map(RecipientPolicy::from_csv)
            .unwrap_or_default()
    }

    /// API key for the provider, when one is configured.
    pub fn notify_api_key(&self) -> Option<&str> {
        self.notify_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn notify_endpoint(&self) -> Result<Url, SettingsError> {
        let value = self
            .notify_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_RESEND_ENDPOINT);
        Url::parse(value).map_err(|source| SettingsError::NotifyEndpoint {
            value: value.to_owned(),
            source,
        })
    }

    pub fn notify_from(&self) -> &str {
        self.notify_from.as_deref().unwrap_or(DEFAULT_NOTIFY_FROM)
    }

    /// Recipient policy and sender header for the mailbox service.
    pub fn delivery(&self) -> DeliverySettings {
        DeliverySettings {
            policy: self.recipient_policy(),
            notify_from: self.notify_from().to_owned(),
        }
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(
            self.notify_timeout_secs
                .unwrap_or(DEFAULT_NOTIFY_TIMEOUT_SECS),
        )
    }

    /// Link target, token lifetime and sender for password reset emails.
    pub fn reset(&self) -> Result<ResetSettings, SettingsError> {
        let link_base = self
            .reset_link_base
            .as_deref()
            .unwrap_or(DEFAULT_RESET_LINK_BASE);
        Url::parse(link_base).map_err(|source| SettingsError::ResetLink {
            value: link_base.to_owned(),
            source,
        })?;
        let minutes = match self.reset_token_ttl_mins {
            None => DEFAULT_RESET_TOKEN_TTL_MINUTES,
            Some(0) => return Err(SettingsError::ResetTokenTtl),
            Some(minutes) => i64::try_from(minutes).map_err(|_| SettingsError::ResetTokenTtl)?,
        };
        let ttl = TimeDelta::try_minutes(minutes).ok_or(SettingsError::ResetTokenTtl)?;
        Ok(ResetSettings {
            link_base: link_base.to_owned(),
            ttl,
            notify_from: self.notify_from().to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings loading and defaults.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "COURIER_BIND_ADDR",
        "COURIER_DATABASE_URL",
        "COURIER_DB_POOL_MAX_SIZE",
        "COURIER_ALLOWED_DOMAINS",
        "COURIER_NOTIFY_API_KEY",
        "COURIER_NOTIFY_ENDPOINT",
        "COURIER_NOTIFY_FROM",
        "COURIER_NOTIFY_TIMEOUT_SECS",
        "COURIER_RESET_LINK_BASE",
        "COURIER_RESET_TOKEN_TTL_MINS",
    ];

    fn load() -> CourierSettings {
        CourierSettings::load_from_iter([OsString::from("courier")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("default addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(settings.database_url(), None);
        assert_eq!(settings.db_pool_max_size(), DEFAULT_POOL_MAX_SIZE);
        assert_eq!(
            settings.recipient_policy().allowed_domains(),
            ["gmail.com".to_owned(), "outlook.com".to_owned()]
        );
        assert_eq!(settings.notify_api_key(), None);
        assert_eq!(
            settings.notify_endpoint().expect("default endpoint").as_str(),
            DEFAULT_RESEND_ENDPOINT
        );
        assert_eq!(settings.notify_from(), DEFAULT_NOTIFY_FROM);
        assert_eq!(settings.notify_timeout(), Duration::from_secs(10));
        let reset = settings.reset().expect("default reset settings");
        assert_eq!(reset.link_base, DEFAULT_RESET_LINK_BASE);
        assert_eq!(reset.ttl_minutes(), 60);
        assert_eq!(reset.notify_from, DEFAULT_NOTIFY_FROM);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("COURIER_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "COURIER_DATABASE_URL",
                Some("postgres://courier@localhost/courier".to_owned()),
            ),
            ("COURIER_DB_POOL_MAX_SIZE", Some("4".to_owned())),
            ("COURIER_ALLOWED_DOMAINS", Some("Example.org, corp.test".to_owned())),
            ("COURIER_NOTIFY_API_KEY", Some("re_test".to_owned())),
            (
                "COURIER_NOTIFY_ENDPOINT",
                Some("http://localhost:4010/emails".to_owned()),
            ),
            ("COURIER_NOTIFY_FROM", Some("Ops <ops@example.org>".to_owned())),
            ("COURIER_NOTIFY_TIMEOUT_SECS", Some("3".to_owned())),
            (
                "COURIER_RESET_LINK_BASE",
                Some("https://mail.example.org/reset".to_owned()),
            ),
            ("COURIER_RESET_TOKEN_TTL_MINS", Some("15".to_owned())),
        ]);

        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("addr").to_string(),
            "127.0.0.1:9000"
        );
        assert_eq!(
            settings.database_url(),
            Some("postgres://courier@localhost/courier")
        );
        assert_eq!(settings.db_pool_max_size(), 4);
        assert_eq!(
            settings.recipient_policy().allowed_domains(),
            ["example.org".to_owned(), "corp.test".to_owned()]
        );
        assert_eq!(settings.notify_api_key(), Some("re_test"));
        assert_eq!(
            settings.notify_endpoint().expect("endpoint").as_str(),
            "http://localhost:4010/emails"
        );
        assert_eq!(settings.notify_from(), "Ops <ops@example.org>");
        assert_eq!(settings.notify_timeout(), Duration::from_secs(3));
        let reset = settings.reset().expect("reset settings");
        assert_eq!(reset.link_base, "https://mail.example.org/reset");
        assert_eq!(reset.ttl_minutes(), 15);
        assert_eq!(reset.notify_from, "Ops <ops@example.org>");
    }

    #[rstest]
    #[case(Some("   "))]
    #[case(Some(""))]
    fn blank_secrets_count_as_unset(#[case] value: Option<&str>) {
        let settings = CourierSettings {
            notify_api_key: value.map(str::to_owned),
            database_url: value.map(str::to_owned),
            ..CourierSettings::default()
        };
        assert_eq!(settings.notify_api_key(), None);
        assert_eq!(settings.database_url(), None);
    }

    #[rstest]
    fn malformed_addresses_are_reported() {
        let settings = CourierSettings {
            bind_addr: Some("not-an-addr".to_owned()),
            notify_endpoint: Some("::nope".to_owned()),
            ..CourierSettings::default()
        };
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
        assert!(matches!(
            settings.notify_endpoint(),
            Err(SettingsError::NotifyEndpoint { .. })
        ));
    }

    #[rstest]
    #[case(Some("reset-password".to_owned()), None)]
    #[case(None, Some(0))]
    fn malformed_reset_settings_are_reported(
        #[case] link_base: Option<String>,
        #[case] ttl: Option<u64>,
    ) {
        let settings = CourierSettings {
            reset_link_base: link_base,
            reset_token_ttl_mins: ttl,
            ..CourierSettings::default()
        };
        assert!(matches!(
            settings.reset(),
            Err(SettingsError::ResetLink { .. } | SettingsError::ResetTokenTtl)
        ));
    }
}
