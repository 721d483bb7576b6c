use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::{errors::Error, Result};

/// Typed configuration for the adapter.
///
/// Credentials come either from the environment (`TG_API_ID` / `TG_API_HASH`)
/// or from a JSON credentials file (`PNBA_CREDENTIALS_FILE`, containing
/// `{"api_id": ..., "api_hash": "..."}`).
#[derive(Clone, Debug)]
pub struct Config {
    pub api_id: i32,
    pub api_hash: String,
    /// Directory for the file-backed session store.
    pub sessions_dir: PathBuf,
    /// Fallback validity window for login codes when the provider does not
    /// report one.
    pub code_ttl: Duration,
}

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    api_id: i32,
    api_hash: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let (api_id, api_hash) = match env_str("PNBA_CREDENTIALS_FILE") {
            Some(path) => load_credentials(Path::new(&path))?,
            None => {
                let api_id = env_str("TG_API_ID")
                    .ok_or_else(|| {
                        Error::Config(
                            "TG_API_ID (or PNBA_CREDENTIALS_FILE) is required".to_string(),
                        )
                    })?
                    .trim()
                    .parse::<i32>()
                    .map_err(|e| Error::Config(format!("TG_API_ID: {e}")))?;
                let api_hash = env_str("TG_API_HASH")
                    .ok_or_else(|| Error::Config("TG_API_HASH is required".to_string()))?;
                (api_id, api_hash)
            }
        };

        if api_hash.trim().is_empty() {
            return Err(Error::Config("api_hash must not be empty".to_string()));
        }

        let sessions_dir = env_str("PNBA_SESSIONS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("sessions"));
        let code_ttl = Duration::from_secs(env_u64("PNBA_CODE_TTL_SECS").unwrap_or(300));

        Ok(Self {
            api_id,
            api_hash,
            sessions_dir,
            code_ttl,
        })
    }
}

/// Load credentials from a JSON file (the format the gateway operator ships).
fn load_credentials(path: &Path) -> Result<(i32, String)> {
    let txt = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("credentials file {}: {e}", path.display())))?;
    let creds: CredentialsFile = serde_json::from_str(&txt)
        .map_err(|e| Error::Config(format!("credentials file {}: {e}", path.display())))?;
    Ok((creds.api_id, creds.api_hash))
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}
