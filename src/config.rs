// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATABASE_PATH` | redb file holding the drinks | `data/drinks.redb` |
//! | `AUTH0_DOMAIN` | Identity provider domain | Required |
//! | `API_AUDIENCE` | Expected JWT audience claim | Required |
//! | `AUTH_ISSUER` | Expected JWT issuer claim | `https://{AUTH0_DOMAIN}/` |
//! | `AUTH_JWKS_URL` | JWKS endpoint | `https://{AUTH0_DOMAIN}/.well-known/jwks.json` |
//! | `AUTH_ALGORITHMS` | Comma-separated signature algorithms | `RS256` |
//! | `AUTH_LEEWAY_SECS` | Clock skew tolerance | `60` |
//! | `JWKS_CACHE_TTL_SECS` | JWKS cache TTL, `0` fetches per request | `300` |
//! | `JWKS_FETCH_TIMEOUT_SECS` | JWKS request timeout | `10` |
//! | `TLS_CERT_PATH` | PEM certificate chain (enables HTTPS with `TLS_KEY_PATH`) | Unset |
//! | `TLS_KEY_PATH` | PEM private key | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use url::Url;

use crate::auth::jwks::{DEFAULT_CACHE_TTL, DEFAULT_FETCH_TIMEOUT};
use crate::auth::verifier::CLOCK_SKEW_LEEWAY;
use crate::auth::{AuthError, JwksManager, TokenVerifier, VerifierConfig};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";
pub const AUTH0_DOMAIN_ENV: &str = "AUTH0_DOMAIN";
pub const API_AUDIENCE_ENV: &str = "API_AUDIENCE";
pub const AUTH_ISSUER_ENV: &str = "AUTH_ISSUER";
pub const AUTH_JWKS_URL_ENV: &str = "AUTH_JWKS_URL";
pub const AUTH_ALGORITHMS_ENV: &str = "AUTH_ALGORITHMS";
pub const AUTH_LEEWAY_SECS_ENV: &str = "AUTH_LEEWAY_SECS";
pub const JWKS_CACHE_TTL_SECS_ENV: &str = "JWKS_CACHE_TTL_SECS";
pub const JWKS_FETCH_TIMEOUT_SECS_ENV: &str = "JWKS_FETCH_TIMEOUT_SECS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_PATH: &str = "data/drinks.redb";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            var,
            reason: reason.to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unknown values fall back to `Pretty`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(LOG_FORMAT_ENV) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Token verification settings.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub issuer: String,
    pub audience: String,
    pub jwks_url: Url,
    pub algorithms: Vec<Algorithm>,
    pub leeway_secs: u64,
    pub jwks_cache_ttl: Duration,
    pub jwks_fetch_timeout: Duration,
}

impl AuthSettings {
    pub fn verifier_config(&self) -> VerifierConfig {
        VerifierConfig::new(self.issuer.clone(), self.audience.clone())
            .with_algorithms(self.algorithms.clone())
            .with_leeway(self.leeway_secs)
    }

    /// Build the verifier these settings describe.
    pub fn verifier(&self) -> Result<TokenVerifier, AuthError> {
        let jwks = JwksManager::with_fetch_timeout(self.jwks_url.clone(), self.jwks_fetch_timeout)?
            .with_cache_ttl(self.jwks_cache_ttl);
        Ok(TokenVerifier::new(self.verifier_config(), jwks))
    }
}

/// PEM files for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub auth: AuthSettings,
    pub tls: Option<TlsPaths>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(get(PORT_ENV), PORT_ENV, DEFAULT_PORT)?;
        let database_path = get(DATABASE_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let domain = get(AUTH0_DOMAIN_ENV).ok_or(ConfigError::Missing(AUTH0_DOMAIN_ENV))?;
        let audience = get(API_AUDIENCE_ENV).ok_or(ConfigError::Missing(API_AUDIENCE_ENV))?;
        let issuer = get(AUTH_ISSUER_ENV).unwrap_or_else(|| format!("https://{domain}/"));
        let jwks_url = match get(AUTH_JWKS_URL_ENV) {
            Some(url) => Url::parse(&url).map_err(|e| ConfigError::invalid(AUTH_JWKS_URL_ENV, e))?,
            None => jwks_url_for_domain(&domain)
                .map_err(|e| ConfigError::invalid(AUTH0_DOMAIN_ENV, e))?,
        };
        let algorithms = match get(AUTH_ALGORITHMS_ENV) {
            Some(list) => parse_algorithms(&list)?,
            None => vec![Algorithm::RS256],
        };

        let auth = AuthSettings {
            issuer,
            audience,
            jwks_url,
            algorithms,
            leeway_secs: parse_or(get(AUTH_LEEWAY_SECS_ENV), AUTH_LEEWAY_SECS_ENV, CLOCK_SKEW_LEEWAY)?,
            jwks_cache_ttl: parse_or(
                get(JWKS_CACHE_TTL_SECS_ENV),
                JWKS_CACHE_TTL_SECS_ENV,
                DEFAULT_CACHE_TTL.as_secs(),
            )
            .map(Duration::from_secs)?,
            jwks_fetch_timeout: parse_or(
                get(JWKS_FETCH_TIMEOUT_SECS_ENV),
                JWKS_FETCH_TIMEOUT_SECS_ENV,
                DEFAULT_FETCH_TIMEOUT.as_secs(),
            )
            .map(Duration::from_secs)?,
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert_path: cert.into(),
                key_path: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        Ok(Self {
            host,
            port,
            database_path,
            auth,
            tls,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::invalid(HOST_ENV, e))
    }
}

/// `https://{domain}/.well-known/jwks.json`
pub fn jwks_url_for_domain(domain: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!("https://{domain}/"))?.join(".well-known/jwks.json")
}

fn parse_or<T>(value: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v.parse().map_err(|e| ConfigError::invalid(var, e)),
        None => Ok(default),
    }
}

/// Parse a comma-separated algorithm list. Only asymmetric algorithms are
/// accepted.
fn parse_algorithms(list: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let mut algorithms = Vec::new();
    for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let algorithm = Algorithm::from_str(name)
            .map_err(|_| ConfigError::invalid(AUTH_ALGORITHMS_ENV, format!("unknown algorithm {name}")))?;
        if matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(ConfigError::invalid(
                AUTH_ALGORITHMS_ENV,
                format!("{name} is symmetric"),
            ));
        }
        if !algorithms.contains(&algorithm) {
            algorithms.push(algorithm);
        }
    }

    if algorithms.is_empty() {
        return Err(ConfigError::invalid(AUTH_ALGORITHMS_ENV, "no algorithms listed"));
    }
    Ok(algorithms)
}
