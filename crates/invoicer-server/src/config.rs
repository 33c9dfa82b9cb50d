use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

const DEFAULT_USER: &str = "samantha";
const DEFAULT_PASSWORD: &str = "1ns3cur3";

/// Process configuration, read from `INVOICER_*` environment variables.
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub statics_dir: PathBuf,
    pub auth_user: String,
    pub auth_password: String,
    /// Base64 CSRF signing key. A random key is generated when unset.
    pub csrf_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        check_store_backend(std::env::var("INVOICER_USE_POSTGRES").ok().as_deref())?;

        let host = env_or("INVOICER_HOST", "0.0.0.0");
        let port: u16 = env_or("INVOICER_PORT", "8080")
            .parse()
            .context("INVOICER_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .context("INVOICER_HOST must be an IP address")?;

        Ok(Self {
            addr,
            db_path: env_or("INVOICER_DB_PATH", "invoicer.db").into(),
            statics_dir: env_or("INVOICER_STATICS_DIR", "./statics").into(),
            auth_user: env_or("INVOICER_AUTH_USER", DEFAULT_USER),
            auth_password: env_or("INVOICER_AUTH_PASSWORD", DEFAULT_PASSWORD),
            csrf_key: std::env::var("INVOICER_CSRF_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
        })
    }

    pub fn uses_default_password(&self) -> bool {
        self.auth_password == DEFAULT_PASSWORD
    }
}

/// Only the SQLite store exists. A deployment still asking for Postgres
/// fails at start-up instead of silently writing to a local file.
fn check_store_backend(use_postgres: Option<&str>) -> Result<()> {
    match use_postgres.map(str::trim) {
        None | Some("") | Some("0") | Some("false") => Ok(()),
        Some(value) => bail!(
            "INVOICER_USE_POSTGRES={} is not supported; unset it and point INVOICER_DB_PATH at a SQLite file",
            value
        ),
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}
