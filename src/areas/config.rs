//! User identity configuration
//!
//! Commits need an author. The identity lives outside the repository, in a
//! global TOML file:
//!
//! ```toml
//! [user]
//! name = "Ada Lovelace"
//! email = "ada@example.com"
//! ```
//!
//! The file is `$GOGIT_CONFIG` when set, `~/.gogitconfig` otherwise.

use crate::artifacts::objects::commit::Author;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Environment variable overriding the global config location
pub const CONFIG_ENV_VAR: &str = "GOGIT_CONFIG";

/// Config file name in the home directory
pub const GLOBAL_CONFIG_FILE: &str = ".gogitconfig";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Identity {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn to_author(&self) -> Author {
        Author::new(self.name.clone(), self.email.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    UserName,
    UserEmail,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 2] = [ConfigKey::UserName, ConfigKey::UserEmail];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::UserName => "user.name",
            ConfigKey::UserEmail => "user.email",
        }
    }
}

impl TryFrom<&str> for ConfigKey {
    type Error = anyhow::Error;

    fn try_from(key: &str) -> anyhow::Result<Self> {
        match key {
            "user.name" | "name" => Ok(ConfigKey::UserName),
            "user.email" | "email" => Ok(ConfigKey::UserEmail),
            _ => anyhow::bail!("unknown config key '{}'", key),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct UserSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

impl UserSection {
    fn get(&self, key: ConfigKey) -> Option<&String> {
        match key {
            ConfigKey::UserName => self.name.as_ref(),
            ConfigKey::UserEmail => self.email.as_ref(),
        }
    }

    fn set(&mut self, key: ConfigKey, value: &str) {
        let slot = match key {
            ConfigKey::UserName => &mut self.name,
            ConfigKey::UserEmail => &mut self.email,
        };
        *slot = Some(value.to_string());
    }

    fn identity(&self) -> Option<Identity> {
        match (&self.name, &self.email) {
            (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => {
                Some(Identity::new(name, email))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    user: UserSection,
}

/// Source of the commit author
pub trait IdentityStore: Send + Sync {
    /// The configured identity, `None` unless both name and email are set
    fn identity(&self) -> anyhow::Result<Option<Identity>>;

    fn get(&self, key: ConfigKey) -> anyhow::Result<Option<String>>;

    fn set(&self, key: ConfigKey, value: &str) -> anyhow::Result<()>;

    fn list(&self) -> anyhow::Result<Vec<(ConfigKey, String)>> {
        let mut values = Vec::new();
        for key in ConfigKey::ALL {
            if let Some(value) = self.get(key)? {
                values.push((key, value));
            }
        }

        Ok(values)
    }
}

/// Identity persisted in the global TOML config file
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    path: PathBuf,
}

impl GlobalConfig {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        GlobalConfig { path: path.into() }
    }

    /// `$GOGIT_CONFIG`, falling back to `~/.gogitconfig`
    pub fn locate() -> anyhow::Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
            && !path.is_empty()
        {
            return Ok(Self::at(path));
        }

        let home = dirs::home_dir().context("Unable to determine the home directory")?;
        Ok(Self::at(home.join(GLOBAL_CONFIG_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> anyhow::Result<ConfigFile> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ConfigFile::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Unable to read config {}", self.path.display()));
            }
        };

        toml::from_str(&contents)
            .with_context(|| format!("Unable to parse config {}", self.path.display()))
    }

    fn write(&self, config: &ConfigFile) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Unable to create {}", parent.display()))?;
        }

        let contents = toml::to_string(config).context("Unable to serialize config")?;
        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, contents)
            .with_context(|| format!("Unable to write {}", temp_path.display()))?;
        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Unable to replace config {}", self.path.display()))?;

        Ok(())
    }
}

impl IdentityStore for GlobalConfig {
    fn identity(&self) -> anyhow::Result<Option<Identity>> {
        Ok(self.read()?.user.identity())
    }

    fn get(&self, key: ConfigKey) -> anyhow::Result<Option<String>> {
        Ok(self.read()?.user.get(key).cloned())
    }

    fn set(&self, key: ConfigKey, value: &str) -> anyhow::Result<()> {
        let mut config = self.read()?;
        config.user.set(key, value);
        self.write(&config)
    }
}

/// In-process identity, nothing touches the filesystem
#[derive(Debug, Default)]
pub struct MemoryIdentity {
    user: Mutex<UserSection>,
}

impl MemoryIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        MemoryIdentity {
            user: Mutex::new(UserSection {
                name: Some(name.into()),
                email: Some(email.into()),
            }),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    fn user(&self) -> anyhow::Result<std::sync::MutexGuard<'_, UserSection>> {
        self.user
            .lock()
            .map_err(|_| anyhow::anyhow!("identity store lock poisoned"))
    }
}

impl IdentityStore for MemoryIdentity {
    fn identity(&self) -> anyhow::Result<Option<Identity>> {
        Ok(self.user()?.identity())
    }

    fn get(&self, key: ConfigKey) -> anyhow::Result<Option<String>> {
        Ok(self.user()?.get(key).cloned())
    }

    fn set(&self, key: ConfigKey, value: &str) -> anyhow::Result<()> {
        self.user()?.set(key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    #[test]
    fn global_config_round_trips_identity() {
        let dir = TempDir::new().unwrap();
        let config = GlobalConfig::at(dir.path().join(GLOBAL_CONFIG_FILE));

        assert_eq!(config.identity().unwrap(), None);

        config.set(ConfigKey::UserName, "Ada").unwrap();
        assert_eq!(config.identity().unwrap(), None);

        config.set(ConfigKey::UserEmail, "ada@example.com").unwrap();
        assert_eq!(
            config.identity().unwrap(),
            Some(Identity::new("Ada", "ada@example.com"))
        );
        let contents = std::fs::read_to_string(config.path()).unwrap();
        assert!(contents.contains("[user]"));
        assert!(contents.contains("email = \"ada@example.com\""));
    }

    #[test]
    fn list_skips_unset_keys() {
        let store = MemoryIdentity::empty();
        store.set(ConfigKey::UserEmail, "x@y.z").unwrap();

        assert_eq!(
            store.list().unwrap(),
            vec![(ConfigKey::UserEmail, "x@y.z".to_string())]
        );
    }

    #[test]
    fn key_parsing_accepts_short_names() {
        assert_eq!(ConfigKey::try_from("name").unwrap(), ConfigKey::UserName);
        assert_eq!(ConfigKey::try_from("user.email").unwrap(), ConfigKey::UserEmail);
        assert!(ConfigKey::try_from("core.editor").is_err());
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(GLOBAL_CONFIG_FILE);
        std::fs::write(&path, "[user\nname = ").unwrap();

        assert!(GlobalConfig::at(path).identity().is_err());
    }
}
