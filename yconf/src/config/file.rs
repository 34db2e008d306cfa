//! Configuration backed by a YAML file.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use super::{Config, ConfigBuilder, EnvironmentConfig};
use crate::error::Result;
use crate::schema::Schema;

/// A [`Config`] loaded from, and saved to, a YAML file.
///
/// A missing file is created with the commented defaults document. An
/// empty file counts as an empty mapping.
///
/// # Examples
///
/// ```
/// use yconf::config::ConfigFile;
/// use yconf::schema::{CompositeDecl, FieldDecl, Schema};
///
/// struct Settings;
///
/// impl Schema for Settings {
///     fn declare() -> CompositeDecl {
///         CompositeDecl::new("Settings")
///             .doc("Demo settings.")
///             .field(FieldDecl::new::<u16>("port").default(8080))
///     }
/// }
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("settings.yaml");
/// let file = ConfigFile::<Settings>::open_at(&path).unwrap();
/// assert!(path.exists());
/// assert_eq!(file.config().data().get("port").unwrap().as_i64(), Some(8080));
/// ```
pub struct ConfigFile<S: Schema> {
    path: PathBuf,
    track_extra: bool,
    config: Config<S>,
}

impl<S: Schema> fmt::Debug for ConfigFile<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigFile")
            .field("path", &self.path)
            .field("track_extra", &self.track_extra)
            .field("config", &self.config)
            .finish()
    }
}

impl<S: Schema> ConfigFile<S> {
    /// Opens the file named by `YCONF_CONFIG_FILE`, or `./config.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error when the path cannot be resolved or the file cannot
    /// be read, parsed or validated.
    pub fn open() -> Result<Self> {
        Self::open_at(EnvironmentConfig::config_file()?)
    }

    /// Opens the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be created, read, parsed or
    /// validated.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path.as_ref(), false)
    }

    /// Opens the file at `path` and tracks undeclared keys.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigFile::open_at`].
    pub fn with_extra_fields(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path.as_ref(), true)
    }

    /// Writes the defaults document to `path`, replacing any existing file,
    /// and opens it.
    ///
    /// Unlike [`ConfigFile::reset`] this works on a file that no longer
    /// loads.
    ///
    /// # Errors
    ///
    /// Returns an error when the schema lacks defaults or the file cannot
    /// be written.
    pub fn reset_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = EnvironmentConfig::resolve(path.as_ref())?;
        write_defaults::<S>(&path)?;
        Self::open_with(&path, false)
    }

    /// Loads and validates the file at `path` without creating it.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, parsed or validated.
    pub fn read(path: impl AsRef<Path>) -> Result<Config<S>> {
        let path = EnvironmentConfig::resolve(path.as_ref())?;
        Config::from_data(read_data(&path)?)
    }

    fn open_with(path: &Path, track_extra: bool) -> Result<Self> {
        let path = EnvironmentConfig::resolve(path)?;
        if !path.exists() {
            write_defaults::<S>(&path)?;
        }
        let data = read_data(&path)?;
        let config = ConfigBuilder::<S>::new()
            .with_data(data)
            .track_extra_fields(track_extra)
            .build()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(Self {
            path,
            track_extra,
            config,
        })
    }

    /// Returns the file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns whether undeclared keys are tracked.
    #[must_use]
    pub fn tracks_extra_fields(&self) -> bool {
        self.track_extra
    }

    /// Returns the loaded configuration.
    #[must_use]
    pub fn config(&self) -> &Config<S> {
        &self.config
    }

    /// Re-reads the file. The loaded configuration is kept on failure.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, parsed or validated.
    pub fn reload(&mut self) -> Result<()> {
        let data = read_data(&self.path)?;
        self.config.overwrite(&data)?;
        log::debug!("Reloaded {}", self.path.display());
        Ok(())
    }

    /// Merges `partial` and writes the result.
    ///
    /// The loaded configuration only changes once the file has been written.
    /// Tracked extra fields of every composite the update touches, the root
    /// included, are replaced by the unknown keys of `partial`; see
    /// [`Config::update`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Merge`] for an invalid update, or an I/O error
    /// when writing fails.
    pub fn update(&mut self, partial: &Value) -> Result<()> {
        let mut updated = self.config.clone();
        updated.update(partial)?;
        write_text(&self.path, &updated.to_yaml()?)?;
        self.config = updated;
        log::info!("Saved configuration to {}", self.path.display());
        Ok(())
    }

    /// Rewrites the file with the defaults document and reloads it.
    ///
    /// # Errors
    ///
    /// Returns an error when the schema lacks defaults or the file cannot
    /// be written.
    pub fn reset(&mut self) -> Result<()> {
        write_defaults::<S>(&self.path)?;
        self.reload()
    }

    /// Writes the current configuration as a commented YAML document.
    ///
    /// Extra fields are written after the declared ones.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when writing fails.
    pub fn save(&self) -> Result<()> {
        let text = self.config.to_yaml()?;
        write_text(&self.path, &text)?;
        log::info!("Saved configuration to {}", self.path.display());
        Ok(())
    }

    /// Returns the commented defaults document for `S`.
    ///
    /// # Errors
    ///
    /// Returns an error when the schema lacks defaults.
    pub fn default_yaml() -> Result<String> {
        Config::<S>::default_yaml()
    }
}

fn write_defaults<S: Schema>(path: &Path) -> Result<()> {
    let text = Config::<S>::default_yaml()?;
    write_text(path, &text)?;
    log::info!("Created default configuration at {}", path.display());
    Ok(())
}

// Writes a sibling temp file and renames it over `path`.
fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp = temp_path(path);
    let written = write_synced(&temp, text).and_then(|()| fs::rename(&temp, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(())
}

fn write_synced(path: &Path, text: &str) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(text.as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_all()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn read_data(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(Value::Mapping(Mapping::new()));
    }
    match serde_yaml::from_str(&text)? {
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        value => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::schema::{CompositeDecl, FieldDecl};
    use tempfile::TempDir;

    struct Settings;

    impl Schema for Settings {
        fn declare() -> CompositeDecl {
            CompositeDecl::new("Settings")
                .doc("Demo settings.")
                .field(FieldDecl::new::<String>("host").doc("Server host.").default("localhost"))
                .field(FieldDecl::new::<u16>("port").default(8080))
        }
    }

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_missing_file_is_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.yaml");
        let file = ConfigFile::<Settings>::open_at(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "# Demo settings.\n\n# Server host.\nhost: localhost\nport: 8080\n"
        );
        assert_eq!(file.path(), path.as_path());
    }

    #[test]
    fn test_empty_file_is_an_empty_mapping() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "").unwrap();

        let err = ConfigFile::<Settings>::open_at(&path).unwrap_err();
        let report = err.report().unwrap();
        assert_eq!(report.count(crate::validate::ErrorKind::MissingRequired), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "host: a\nport: high\n").unwrap();

        let err = ConfigFile::<Settings>::open_at(&path).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(
            err.to_string(),
            "'high' is not of type 'integer' in section 'port'"
        );
    }

    #[test]
    fn test_update_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        let mut file = ConfigFile::<Settings>::open_at(&path).unwrap();
        file.update(&yaml("port: 9000")).unwrap();

        let reopened = ConfigFile::<Settings>::open_at(&path).unwrap();
        assert_eq!(reopened.config().to_data(), yaml("host: localhost\nport: 9000"));
    }

    #[test]
    fn test_failed_write_keeps_loaded_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        let mut file = ConfigFile::<Settings>::open_at(&path).unwrap();
        let before = file.config().to_data();

        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        let err = file.update(&yaml("port: 9000")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(file.config().to_data(), before);
        assert!(!dir.path().join("settings.yaml.tmp").exists());
    }

    #[test]
    fn test_reload_keeps_old_on_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        let mut file = ConfigFile::<Settings>::open_at(&path).unwrap();

        fs::write(&path, "host: remote\nport: 1\n").unwrap();
        file.reload().unwrap();
        assert_eq!(file.config().to_data(), yaml("host: remote\nport: 1"));

        fs::write(&path, "port: [1]\n").unwrap();
        assert!(file.reload().is_err());
        assert_eq!(file.config().to_data(), yaml("host: remote\nport: 1"));
    }

    #[test]
    fn test_reset_rewrites_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "host: remote\nport: 1\n").unwrap();

        let mut file = ConfigFile::<Settings>::open_at(&path).unwrap();
        file.reset().unwrap();
        assert_eq!(file.config().to_data(), yaml("host: localhost\nport: 8080"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            ConfigFile::<Settings>::default_yaml().unwrap() + "\n"
        );
    }

    #[test]
    fn test_save_keeps_extra_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "host: a\nport: 1\ntheme: dark\n").unwrap();

        let file = ConfigFile::<Settings>::with_extra_fields(&path).unwrap();
        file.save().unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# Demo settings.\n\n# Server host.\nhost: a\nport: 1\ntheme: dark\n"
        );
    }

    #[test]
    fn test_reset_at_replaces_broken_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "port: [\n").unwrap();
        assert!(ConfigFile::<Settings>::open_at(&path).is_err());

        let file = ConfigFile::<Settings>::reset_at(&path).unwrap();
        assert_eq!(file.config().to_data(), yaml("host: localhost\nport: 8080"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("{}\n", ConfigFile::<Settings>::default_yaml().unwrap())
        );
    }

    #[test]
    fn test_read_does_not_create() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        assert!(matches!(
            ConfigFile::<Settings>::read(&path),
            Err(Error::Io(_))
        ));
        assert!(!path.exists());

        fs::write(&path, "host: a\nport: 2\n").unwrap();
        let config = ConfigFile::<Settings>::read(&path).unwrap();
        assert_eq!(config.to_data(), yaml("host: a\nport: 2"));
    }

    #[test]
    fn test_extra_fields_are_tracked() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "host: a\nport: 1\ntheme: dark\n").unwrap();

        let file = ConfigFile::<Settings>::with_extra_fields(&path).unwrap();
        assert!(file.tracks_extra_fields());
        assert_eq!(file.config().extra_data(), yaml("theme: dark"));
    }
}
