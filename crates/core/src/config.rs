use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ZaptosError, ZaptosResult};

/// Directory name under the per-user config dir.
pub const APP_DIR_NAME: &str = "zaptos";
pub const PROFILES_FILE_NAME: &str = "profiles.yaml";
pub const CAMPAIGNS_FILE_NAME: &str = "campaigns.json";

/// Environment variables consulted, paired with the config key they feed.
const ENV_KEYS: &[(&str, &str)] = &[
    ("ZAPTOS_INSTANCE", "zaptos_instance"),
    ("ZAPTOS_TOKEN", "zaptos_token"),
    ("ZAPTOS_BASE_URL", "zaptos_base_url"),
    ("GHL_API_KEY", "ghl_api_key"),
    ("GHL_LOCATION_ID", "ghl_location_id"),
    ("GHL_BASE_URL", "ghl_base_url"),
    ("ZAPTOS_OUTPUT", "output"),
    ("ZAPTOS_REQUEST_TIMEOUT_SECS", "request_timeout_secs"),
    ("ZAPTOS_SEND_DELAY_MS", "send_delay_ms"),
    ("ZAPTOS_CAMPAIGNS_FILE", "campaigns_file"),
];

/// Resolved application configuration. Built once at process start from
/// defaults, environment, the selected profile and CLI flags (in increasing
/// precedence), then passed by reference to every client.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub zaptos_instance: String,
    #[serde(default)]
    pub zaptos_token: String,
    #[serde(default = "default_zaptos_base_url")]
    pub zaptos_base_url: String,
    #[serde(default)]
    pub ghl_api_key: String,
    #[serde(default)]
    pub ghl_location_id: String,
    #[serde(default = "default_ghl_base_url")]
    pub ghl_base_url: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,
    #[serde(default)]
    pub campaigns_file: Option<PathBuf>,
}

fn default_zaptos_base_url() -> String {
    "https://api.zaptoswpp.com".to_string()
}
fn default_ghl_base_url() -> String {
    "https://rest.gohighlevel.com/v1".to_string()
}
fn default_output() -> String {
    "json".to_string()
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_send_delay_ms() -> u64 {
    2000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            zaptos_instance: String::new(),
            zaptos_token: String::new(),
            zaptos_base_url: default_zaptos_base_url(),
            ghl_api_key: String::new(),
            ghl_location_id: String::new(),
            ghl_base_url: default_ghl_base_url(),
            output: default_output(),
            request_timeout_secs: default_request_timeout_secs(),
            send_delay_ms: default_send_delay_ms(),
            campaigns_file: None,
        }
    }
}

/// Values given on the command line. `None` leaves lower layers untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub profile: Option<String>,
    pub zaptos_instance: Option<String>,
    pub zaptos_token: Option<String>,
    pub ghl_api_key: Option<String>,
    pub ghl_location_id: Option<String>,
    pub output: Option<String>,
}

// ─── Profiles ──────────────────────────────────────────────────────────────

/// One named credential set from `profiles.yaml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Profile {
    pub zaptos_instance: Option<String>,
    pub zaptos_token: Option<String>,
    pub zaptos_base_url: Option<String>,
    pub ghl_api_key: Option<String>,
    pub ghl_location_id: Option<String>,
    pub ghl_base_url: Option<String>,
    pub output: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub send_delay_ms: Option<u64>,
    pub campaigns_file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProfilesFile {
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl ProfilesFile {
    /// Pick the named profile, or the file's default when no name is given.
    pub fn select(&self, name: Option<&str>) -> ZaptosResult<Option<&Profile>> {
        match name {
            Some(name) => self.profiles.get(name).map(Some).ok_or_else(|| {
                ZaptosError::Configuration(format!("profile '{name}' not found"))
            }),
            None => {
                let Some(default) = self.default.as_deref() else {
                    return Ok(None);
                };
                let profile = self.profiles.get(default);
                if profile.is_none() {
                    tracing::warn!(profile = default, "Default profile is not defined, ignoring");
                }
                Ok(profile)
            }
        }
    }
}

/// Per-user application directory, e.g. `~/.config/zaptos` on Linux.
pub fn app_dir() -> ZaptosResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| {
            ZaptosError::Configuration("could not determine the user config directory".into())
        })
}

pub fn default_profiles_path() -> ZaptosResult<PathBuf> {
    Ok(app_dir()?.join(PROFILES_FILE_NAME))
}

/// Read `profiles.yaml`. A missing or empty file means no profiles.
pub fn load_profiles(path: &Path) -> ZaptosResult<ProfilesFile> {
    if !path.exists() {
        return Ok(ProfilesFile::default());
    }
    let raw = std::fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(ProfilesFile::default());
    }
    serde_yaml::from_str(&raw).map_err(|e| {
        ZaptosError::Configuration(format!("invalid profiles file {}: {e}", path.display()))
    })
}

// ─── Resolution ────────────────────────────────────────────────────────────

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

fn config_error(e: config::ConfigError) -> ZaptosError {
    ZaptosError::Configuration(e.to_string())
}

fn override_opt<V>(builder: Builder, key: &str, value: Option<V>) -> ZaptosResult<Builder>
where
    V: Into<config::Value>,
{
    match value {
        Some(value) => builder.set_override(key, value).map_err(config_error),
        None => Ok(builder),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

impl AppConfig {
    /// Load from the process environment and the default profiles file.
    pub fn load(overrides: &ConfigOverrides) -> ZaptosResult<Self> {
        let profiles = load_profiles(&default_profiles_path()?)?;
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::resolve(&env, &profiles, overrides)
    }

    /// Layer defaults, `env`, the selected profile and `overrides`.
    pub fn resolve(
        env: &HashMap<String, String>,
        profiles: &ProfilesFile,
        overrides: &ConfigOverrides,
    ) -> ZaptosResult<Self> {
        let env_layer: config::Map<String, String> = ENV_KEYS
            .iter()
            .filter_map(|(var, key)| {
                env.get(*var)
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (key.to_string(), v.clone()))
            })
            .collect();

        let mut builder = config::Config::builder()
            .add_source(config::Environment::default().source(Some(env_layer)));

        if let Some(profile) = profiles.select(overrides.profile.as_deref())? {
            builder = override_opt(builder, "zaptos_instance", non_empty(&profile.zaptos_instance))?;
            builder = override_opt(builder, "zaptos_token", non_empty(&profile.zaptos_token))?;
            builder = override_opt(builder, "zaptos_base_url", non_empty(&profile.zaptos_base_url))?;
            builder = override_opt(builder, "ghl_api_key", non_empty(&profile.ghl_api_key))?;
            builder = override_opt(builder, "ghl_location_id", non_empty(&profile.ghl_location_id))?;
            builder = override_opt(builder, "ghl_base_url", non_empty(&profile.ghl_base_url))?;
            builder = override_opt(builder, "output", non_empty(&profile.output))?;
            builder = override_opt(
                builder,
                "request_timeout_secs",
                profile.request_timeout_secs.map(|v| v.to_string()),
            )?;
            builder = override_opt(
                builder,
                "send_delay_ms",
                profile.send_delay_ms.map(|v| v.to_string()),
            )?;
            builder = override_opt(builder, "campaigns_file", non_empty(&profile.campaigns_file))?;
        }

        builder = override_opt(builder, "zaptos_instance", non_empty(&overrides.zaptos_instance))?;
        builder = override_opt(builder, "zaptos_token", non_empty(&overrides.zaptos_token))?;
        builder = override_opt(builder, "ghl_api_key", non_empty(&overrides.ghl_api_key))?;
        builder = override_opt(builder, "ghl_location_id", non_empty(&overrides.ghl_location_id))?;
        builder = override_opt(builder, "output", non_empty(&overrides.output))?;

        builder
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)
    }

    pub fn has_zaptos(&self) -> bool {
        !self.zaptos_instance.is_empty() && !self.zaptos_token.is_empty()
    }

    pub fn has_ghl(&self) -> bool {
        !self.ghl_api_key.is_empty()
    }

    pub fn require_zaptos(&self) -> ZaptosResult<()> {
        if self.has_zaptos() {
            Ok(())
        } else {
            Err(ZaptosError::Configuration(
                "ZAPTOS_INSTANCE and ZAPTOS_TOKEN must be set or provided.".into(),
            ))
        }
    }

    pub fn require_ghl(&self) -> ZaptosResult<()> {
        if self.has_ghl() {
            Ok(())
        } else {
            Err(ZaptosError::Configuration(
                "GHL_API_KEY must be set or provided for GHL operations.".into(),
            ))
        }
    }

    /// Per-instance base URL of the messaging API.
    pub fn zaptos_url(&self) -> String {
        format!(
            "{}/{}",
            self.zaptos_base_url.trim_end_matches('/'),
            self.zaptos_instance
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }

    /// Location of the campaign document.
    pub fn campaigns_path(&self) -> ZaptosResult<PathBuf> {
        match &self.campaigns_file {
            Some(path) => Ok(path.clone()),
            None => Ok(app_dir()?.join(CAMPAIGNS_FILE_NAME)),
        }
    }
}
