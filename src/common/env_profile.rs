use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::common::constants::{DEFAULT_ENV_DIR, DEFAULT_NODE_ENV, NODE_ENV_VAR};
use crate::common::error::ConfigError;

/// Running mode selecting which env files apply, e.g. `test` or `production`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMode(String);

impl RunMode {
    pub fn new(mode: impl Into<String>) -> Self {
        RunMode(mode.into())
    }

    /// Explicit value first, then `NODE_ENV`, then the default `test` mode.
    pub fn resolve(explicit: Option<&str>) -> Self {
        Self::resolve_with(explicit, env::var(NODE_ENV_VAR).ok().as_deref())
    }

    fn resolve_with(explicit: Option<&str>, from_env: Option<&str>) -> Self {
        explicit
            .filter(|m| !m.is_empty())
            .or(from_env.filter(|m| !m.is_empty()))
            .map(RunMode::new)
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_test(&self) -> bool {
        self.0 == DEFAULT_NODE_ENV
    }
}

impl Default for RunMode {
    fn default() -> Self {
        RunMode::new(DEFAULT_NODE_ENV)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A directory of `.env` files plus the mode that picks among them.
#[derive(Debug, Clone)]
pub struct EnvProfile {
    dir: PathBuf,
    mode: RunMode,
}

impl EnvProfile {
    pub fn new(dir: impl Into<PathBuf>, mode: RunMode) -> Self {
        EnvProfile {
            dir: dir.into(),
            mode,
        }
    }

    /// Profile rooted at `envs/` in the working directory.
    pub fn with_mode(mode: RunMode) -> Self {
        Self::new(DEFAULT_ENV_DIR, mode)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn mode(&self) -> &RunMode {
        &self.mode
    }

    /// Files to read, lowest priority first.
    ///
    /// `.env.local` is left out in test mode so test runs do not pick up
    /// machine-specific overrides.
    pub fn candidate_files(&self) -> Vec<PathBuf> {
        let mut files = vec![self.dir.join(".env")];
        if !self.mode.is_test() {
            files.push(self.dir.join(".env.local"));
        }
        files.push(self.dir.join(format!(".env.{}", self.mode)));
        files.push(self.dir.join(format!(".env.{}.local", self.mode)));
        files
    }

    /// Reads every candidate file that exists.
    ///
    /// Missing files and unparseable lines are skipped. Only an I/O failure on
    /// a file that does exist is an error.
    pub fn load(&self) -> Result<EnvVars, ConfigError> {
        let mut file_values = BTreeMap::new();
        let mut loaded = 0usize;

        for path in self.candidate_files() {
            let contents = match fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!("env file {} not present, skipping", path.display());
                    continue;
                }
                Err(source) => return Err(ConfigError::EnvFile { path, source }),
            };
            for item in dotenv::from_read_iter(Cursor::new(literal_values(&contents))) {
                match item {
                    Ok((key, value)) => {
                        file_values.insert(key, value);
                    }
                    Err(dotenv::Error::LineParse(_, index)) => {
                        warn!(
                            "skipping unparseable line in {} (column {})",
                            path.display(),
                            index
                        );
                    }
                    Err(e) => warn!("skipping entry in {}: {}", path.display(), e),
                }
            }
            debug!("loaded env file {}", path.display());
            loaded += 1;
        }

        info!(
            "env profile '{}' from {}: {} file(s), {} variable(s)",
            self.mode,
            self.dir.display(),
            loaded,
            file_values.len()
        );
        Ok(EnvVars { file_values })
    }
}

/// Escapes `$` in values outside single quotes so the dotenv parser keeps
/// them literally instead of expanding `$NAME`.
fn literal_values(contents: &str) -> String {
    contents
        .lines()
        .map(literal_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn literal_line(line: &str) -> String {
    let Some((key, value)) = line.split_once('=') else {
        return line.to_string();
    };
    let mut out = String::with_capacity(line.len() + 4);
    out.push_str(key);
    out.push('=');

    let (mut single, mut double, mut escaped) = (false, false, false);
    for c in value.chars() {
        if escaped {
            escaped = false;
        } else {
            match c {
                '\\' if !single => escaped = true,
                '\'' if !double => single = !single,
                '"' if !single => double = !double,
                '$' if !single => out.push('\\'),
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

/// Variables gathered from a profile's files, layered under the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars {
    file_values: BTreeMap<String, String>,
}

impl EnvVars {
    pub fn from_file_values(file_values: BTreeMap<String, String>) -> Self {
        EnvVars { file_values }
    }

    /// Process environment wins; file values fill the gaps.
    pub fn get(&self, key: &str) -> Option<String> {
        env::var(key)
            .ok()
            .or_else(|| self.file_values.get(key).cloned())
    }

    pub fn file_value(&self, key: &str) -> Option<&str> {
        self.file_values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.file_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_values.is_empty()
    }

    /// Exports file values into the process environment without overriding
    /// variables that are already set.
    ///
    /// Library-only: the loader and `Config` never call this, for callers that
    /// still read settings through `std::env`.
    pub fn apply(&self) {
        for (key, value) in &self.file_values {
            if env::var_os(key).is_none() {
                env::set_var(key, value);
            }
        }
    }
}
