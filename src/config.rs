//! Connection settings for the logbook service.
//!
//! A [`Config`] is either assembled in code or read from a config file made of
//! `key=value` entries:
//!
//! ```text
//! logbook_endpoint=https://pswww.example.org/ws-auth/lgbk/
//! logbook_uid=opr
//! logbook_pwd=secret
//! logbook_use_kerberos=false
//! ```

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use thiserror::Error;

const ENDPOINT: &str = "logbook_endpoint";
const UID: &str = "logbook_uid";
const PASSWORD: &str = "logbook_pwd";
const USE_KERBEROS: &str = "logbook_use_kerberos";

/// How requests are authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// HTTP basic auth with the configured user id and password.
    Basic,
    /// Delegated Kerberos tickets.
    ///
    /// Accepted for compatibility with existing config files, but requests
    /// are still sent with basic auth. No ticket negotiation takes place.
    Kerberos,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: String,
    pub uid: String,
    pub password: Option<String>,
    pub auth: AuthMode,
    pub verbose: bool,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {path} is missing key '{key}'")]
    MissingKey { path: PathBuf, key: &'static str },
    #[error("need a server URL for the logbook client, got '{0}'")]
    InvalidEndpoint(String),
    #[error("specify a user id and password or enable Kerberos for authentication")]
    MissingAuthentication,
}

impl Config {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Config {
            endpoint: endpoint.into(),
            uid: String::new(),
            password: None,
            auth: AuthMode::Basic,
            verbose: false,
        }
    }

    pub fn credentials(mut self, uid: impl Into<String>, password: impl Into<String>) -> Self {
        self.uid = uid.into();
        self.password = Some(password.into());
        self
    }

    pub fn use_kerberos(mut self, use_kerberos: bool) -> Self {
        self.auth = if use_kerberos {
            AuthMode::Kerberos
        } else {
            AuthMode::Basic
        };
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::debug!("Reading from config file '{}'", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_key_values(&text, path)
    }

    /// Parses whitespace separated `key=value` entries. Entries without `=`
    /// are skipped and later entries override earlier ones.
    pub fn from_key_values(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let mut entries = HashMap::new();
        for token in text.split_whitespace() {
            match token.split_once('=') {
                Some((key, value)) => {
                    entries.insert(key, value);
                }
                None => log::debug!("Skipping entry without '=' in '{}'", origin.display()),
            }
        }

        let mut take = |key: &'static str| {
            entries.remove(key).ok_or_else(|| ConfigError::MissingKey {
                path: origin.to_owned(),
                key,
            })
        };
        let endpoint = take(ENDPOINT)?;
        let uid = take(UID)?;
        let password = take(PASSWORD)?;
        let use_kerberos = take(USE_KERBEROS)? == "true";

        Ok(Config::new(endpoint)
            .credentials(uid, password)
            .use_kerberos(use_kerberos))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.len() <= 10 {
            return Err(ConfigError::InvalidEndpoint(self.endpoint.clone()));
        }
        let has_basic = !self.uid.is_empty() && self.password.is_some();
        if !has_basic && self.auth != AuthMode::Kerberos {
            return Err(ConfigError::MissingAuthentication);
        }
        Ok(())
    }
}
