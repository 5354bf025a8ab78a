//! Persistent settings at ~/.config/mtuci-timetable/config.toml

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::commute::CommuteConfig;
use crate::constants::{DEFAULT_NOTES_PATH, DEFAULT_VAULT_PATH};
use crate::error::{TimetableError, TimetableResult};

/// Environment variable that overrides `apiKey` from the file.
pub const API_KEY_ENV: &str = "MTUCI_API_KEY";

fn default_true() -> bool {
    true
}

fn default_notes_path() -> String {
    DEFAULT_NOTES_PATH.to_string()
}

fn default_vault_path() -> PathBuf {
    PathBuf::from(DEFAULT_VAULT_PATH)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Token from the MTUCI app, used for `api/web/token/validate`.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_true")]
    pub generate_commute: bool,

    /// Vault-relative folder for generated notes.
    #[serde(default = "default_notes_path")]
    pub path: String,

    /// Vault root directory. May start with `~`.
    #[serde(default = "default_vault_path")]
    pub vault: PathBuf,

    #[serde(default)]
    pub commute: CommuteConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_key: String::new(),
            generate_commute: true,
            path: default_notes_path(),
            vault: default_vault_path(),
            commute: CommuteConfig::default(),
        }
    }
}

impl Settings {
    pub fn config_path() -> TimetableResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TimetableError::Config("Could not determine config directory".into()))?
            .join("mtuci-timetable");

        Ok(config_dir.join("config.toml"))
    }

    /// Load settings from the default location, creating a commented
    /// template on first use.
    pub fn load() -> TimetableResult<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            Self::create_default_config(&path)?;
        }

        Self::load_from(&path)
    }

    /// Apply `MTUCI_API_KEY` on top of the file settings.
    ///
    /// Only used for syncing; settings saved afterwards would persist the key.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api_key = key.trim().to_string();
            }
        }
        self
    }

    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> TimetableResult<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(path)?;
        let mut settings: Settings = toml::from_str(&content).map_err(|e| {
            TimetableError::Config(format!("Could not parse {}: {}", path.display(), e))
        })?;
        settings.path = clean_notes_path(&settings.path)
            .map_err(|e| TimetableError::Config(format!("{} in {}", e, path.display())))?;

        Ok(settings)
    }

    pub fn save(&self) -> TimetableResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Write settings to `path`, owner-only since the file holds the API key.
    pub fn save_to(&self, path: &Path) -> TimetableResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| TimetableError::Serialization(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| TimetableError::Config(format!("Could not write config file: {e}")))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Create a config file with every option commented out.
    pub fn create_default_config(path: &Path) -> TimetableResult<()> {
        let contents = format!(
            "\
# mtuci-timetable configuration

# Token from the MTUCI app:
# apiKey = \"\"

# Also write commute notes before and after classes:
# generateCommute = true

# Vault root and the folder inside it that holds the notes:
# vault = \"{DEFAULT_VAULT_PATH}\"
# path = \"{DEFAULT_NOTES_PATH}\"

# Travel time to each building and back (HH:MM):
# [commute.OP]
# forwards = \"00:45\"
# backwards = \"00:50\"
#
# [commute.A]
# forwards = \"01:00\"
# backwards = \"01:00\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TimetableError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| TimetableError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Absolute folder that holds `учёба/` and `дорога/`.
    pub fn notes_dir(&self) -> PathBuf {
        self.vault_path().join(&self.path)
    }

    /// Vault root with `~` expanded.
    pub fn vault_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.vault.to_string_lossy()).into_owned())
    }

    pub fn require_api_key(&self) -> TimetableResult<&str> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(TimetableError::Config(
                "API token is not set. Run `mtuci-timetable config token` first".into(),
            ));
        }
        Ok(key)
    }

    /// The API key with all but the last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.is_empty() {
            return String::from("(not set)");
        }
        let visible = chars.len().min(4);
        let hidden = chars.len() - visible;
        "*".repeat(hidden) + &chars[hidden..].iter().collect::<String>()
    }

    /// Commute config when commute notes are enabled.
    pub fn commute_if_enabled(&self) -> Option<&CommuteConfig> {
        self.generate_commute.then_some(&self.commute)
    }
}

/// Normalize a vault-relative notes folder: surrounding whitespace and
/// slashes are dropped, and the result must stay inside the vault.
pub fn clean_notes_path(raw: &str) -> Result<String, String> {
    let path = raw.trim().trim_matches('/');
    if path.is_empty() {
        return Err("notes path must name a folder inside the vault".into());
    }
    if path.split('/').any(|segment| segment == ".." || segment == ".") {
        return Err(format!("notes path '{raw}' must not contain '.' or '..'"));
    }
    Ok(path.to_string())
}
