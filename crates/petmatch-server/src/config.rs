//! Server configuration loaded from environment variables.
//!
//! Everything except the identity-provider secret has a default suitable for
//! local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Env: `PETMATCH_HOST`, `PETMATCH_PORT`
    /// Default: `0.0.0.0:3000`
    pub addr: SocketAddr,

    /// SQLite file.
    /// Env: `PETMATCH_DB_PATH`
    /// Default: `petmatch.db`
    pub db_path: PathBuf,

    /// HS256 secret shared with the identity provider.
    /// Env: `PETMATCH_IDP_SECRET` (required)
    pub idp_secret: String,

    /// Expected `iss` claim. Unchecked when unset.
    /// Env: `PETMATCH_IDP_ISSUER`
    pub idp_issuer: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let idp_secret = var("PETMATCH_IDP_SECRET").unwrap_or_default();
        if idp_secret.trim().is_empty() || PLACEHOLDER_SECRETS.contains(&idp_secret.as_str()) {
            bail!("PETMATCH_IDP_SECRET is unset or still a placeholder");
        }

        let host = var("PETMATCH_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("PETMATCH_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("PETMATCH_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let db_path = var("PETMATCH_DB_PATH").unwrap_or_else(|| "petmatch.db".into()).into();
        let idp_issuer = var("PETMATCH_IDP_ISSUER").filter(|iss| !iss.trim().is_empty());

        Ok(Self {
            addr,
            db_path,
            idp_secret,
            idp_issuer,
        })
    }
}
