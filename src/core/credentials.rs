//! Access key resolution
//!
//! The access key secret never leaves the process: it is only used to sign
//! requests (see [`crate::core::signer`]). Prefer the environment or a
//! credentials file over hard-coding keys.

use ini::{Ini, ParseOption};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::errors::{LaraError, Result};

pub const ACCESS_KEY_ID_ENV: &str = "LARA_ACCESS_KEY_ID";
pub const ACCESS_KEY_SECRET_ENV: &str = "LARA_ACCESS_KEY_SECRET";

const DEFAULT_PROFILE: &str = "default";
const KEY_ID_FIELD: &str = "lara_access_key_id";
const KEY_SECRET_FIELD: &str = "lara_access_key_secret";

/// Access key pair used to sign requests
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    access_key_secret: String,
}

// The secret stays out of logs and panics.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
        }
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn access_key_secret(&self) -> &str {
        &self.access_key_secret
    }

    /// Read `LARA_ACCESS_KEY_ID` and `LARA_ACCESS_KEY_SECRET`
    pub fn from_env() -> Result<Self> {
        Self::from_env_vars(ACCESS_KEY_ID_ENV, ACCESS_KEY_SECRET_ENV)
    }

    /// Read the key pair from two custom environment variables
    pub fn from_env_vars(id_var: &str, secret_var: &str) -> Result<Self> {
        match (std::env::var(id_var), std::env::var(secret_var)) {
            (Ok(id), Ok(secret)) if !id.is_empty() && !secret.is_empty() => {
                Ok(Self::new(id, secret))
            }
            _ => Err(LaraError::Credentials {
                message: format!("\"{id_var}\" and \"{secret_var}\" not found in environment"),
            }),
        }
    }

    /// Environment first, then `profile` of the default credentials file
    pub fn load(profile: Option<&str>) -> Result<Self> {
        match Self::from_env() {
            Ok(credentials) => Ok(credentials),
            Err(_) => {
                debug!("No credentials in environment, trying credentials file");
                Self::from_file(default_credentials_path()?, profile)
            }
        }
    }

    /// Read a profile from an INI credentials file:
    ///
    /// ```text
    /// [default]
    /// lara_access_key_id = ...
    /// lara_access_key_secret = ...
    /// ```
    ///
    /// Keys before the first section belong to `default`.
    pub fn from_file<P: AsRef<Path>>(path: P, profile: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let profile = profile.unwrap_or(DEFAULT_PROFILE);

        if !path.is_file() {
            return Err(LaraError::Credentials {
                message: format!("credentials file not found: {}", path.display()),
            });
        }

        let mut profiles = read_profiles(path)?;
        let fields = profiles.remove(profile).ok_or_else(|| LaraError::Credentials {
            message: format!(
                "profile \"{profile}\" not found in credentials file: {}",
                path.display()
            ),
        })?;

        let field = |name: &str| {
            fields.get(name).cloned().ok_or_else(|| LaraError::Credentials {
                message: format!(
                    "missing \"{name}\" for profile \"{profile}\": {}",
                    path.display()
                ),
            })
        };

        Ok(Self::new(field(KEY_ID_FIELD)?, field(KEY_SECRET_FIELD)?))
    }
}

/// `~/.lara/credentials`
pub fn default_credentials_path() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .ok_or_else(|| LaraError::Credentials {
            message: "cannot locate home directory".to_string(),
        })?;

    Ok(PathBuf::from(home).join(".lara").join("credentials"))
}

/// Values are taken verbatim: quotes and backslashes are part of the secret.
fn read_profiles(path: &Path) -> Result<HashMap<String, HashMap<String, String>>> {
    let options = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    let ini = Ini::load_from_file_opt(path, options).map_err(|e| LaraError::Credentials {
        message: format!("invalid credentials file {}: {e}", path.display()),
    })?;

    let mut profiles: HashMap<String, HashMap<String, String>> = HashMap::new();

    for (section, properties) in ini.iter() {
        if section.is_none() && properties.is_empty() {
            continue;
        }

        let entry = profiles
            .entry(section.unwrap_or(DEFAULT_PROFILE).to_string())
            .or_default();
        for (key, value) in properties.iter() {
            check_key(key)?;
            entry.insert(key.to_string(), value.trim().to_string());
        }
    }

    Ok(profiles)
}

fn check_key(key: &str) -> Result<()> {
    if key == KEY_ID_FIELD || key == KEY_SECRET_FIELD {
        Ok(())
    } else {
        Err(LaraError::Credentials {
            message: format!("invalid key in credentials file: {key}"),
        })
    }
}
