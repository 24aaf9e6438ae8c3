//! Defaults registry consulted when optional step keys are omitted.
//!
//! Values are layered with increasing precedence:
//!
//! 1. Built-in values (lowest priority)
//! 2. A TOML file: `--defaults <path>`, else `RISKFLOW_DEFAULTS`, else
//!    `defaults.toml` in the platform configuration directory
//! 3. Environment variables (`RISKFLOW_BACKEND`, `RISKFLOW_MODIS_PRODUCT`)
//!
//! The registry is loaded once before a run starts and is only ever read
//! afterwards.

use crate::error::{ConfigFileError, ErrorCode, ErrorExt, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit defaults file.
pub const DEFAULTS_ENV: &str = "RISKFLOW_DEFAULTS";
/// Environment variable overriding the backend program.
pub const BACKEND_ENV: &str = "RISKFLOW_BACKEND";
/// Environment variable overriding the default MODIS product.
pub const MODIS_PRODUCT_ENV: &str = "RISKFLOW_MODIS_PRODUCT";

/// Read-only fallback values for the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Defaults {
    #[serde(default)]
    pub chirps: ChirpsDefaults,
    #[serde(default)]
    pub modis: ModisDefaults,
    #[serde(default)]
    pub hazard_impact: HazardImpactDefaults,
    #[serde(default)]
    pub naming: NamingDefaults,
    #[serde(default)]
    pub backend: BackendDefaults,
}

/// CHIRPS rainfall settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChirpsDefaults {
    /// Statistics computed by `longterm_average` when `functions` is omitted.
    #[serde(default = "default_longterm_functions")]
    pub longterm_functions: Vec<String>,
}

/// MODIS vegetation and temperature settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModisDefaults {
    #[serde(default = "default_modis_product")]
    pub default_product: String,
}

/// Hazard impact settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardImpactDefaults {
    /// Hazard variable whose threshold applies when `hazard_threshold` is omitted.
    #[serde(default = "default_hazard_var")]
    pub hazard_var: String,
    #[serde(default = "default_thresholds")]
    pub thresholds: BTreeMap<String, f64>,
}

/// Filename conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamingDefaults {
    /// Regex used to name impact outputs when the hazard file is explicit.
    #[serde(default = "default_hazard_pattern")]
    pub hazard_pattern: String,
}

/// External geoprocessing backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendDefaults {
    #[serde(default = "default_backend_program")]
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_longterm_functions() -> Vec<String> {
    vec!["AVG".to_string()]
}

fn default_modis_product() -> String {
    "MOD13A3.005".to_string()
}

fn default_hazard_var() -> String {
    "vhi".to_string()
}

fn default_thresholds() -> BTreeMap<String, f64> {
    BTreeMap::from([("vhi".to_string(), 40.0)])
}

fn default_hazard_pattern() -> String {
    r"^(?P<prefix>.+)\.(?P<year>\d{4})\.(?P<month>\d{2})(?P<suffix>.*)\.tif$".to_string()
}

fn default_backend_program() -> String {
    "riskflow-geo".to_string()
}

impl Default for ChirpsDefaults {
    fn default() -> Self {
        Self {
            longterm_functions: default_longterm_functions(),
        }
    }
}

impl Default for ModisDefaults {
    fn default() -> Self {
        Self {
            default_product: default_modis_product(),
        }
    }
}

impl Default for HazardImpactDefaults {
    fn default() -> Self {
        Self {
            hazard_var: default_hazard_var(),
            thresholds: default_thresholds(),
        }
    }
}

impl Default for NamingDefaults {
    fn default() -> Self {
        Self {
            hazard_pattern: default_hazard_pattern(),
        }
    }
}

impl Default for BackendDefaults {
    fn default() -> Self {
        Self {
            program: default_backend_program(),
            args: Vec::new(),
        }
    }
}

impl HazardImpactDefaults {
    /// Threshold registered for the configured hazard variable.
    pub fn threshold(&self) -> Option<f64> {
        self.thresholds.get(&self.hazard_var).copied()
    }
}

impl Defaults {
    /// Load the registry from the process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, |name| std::env::var(name).ok())
    }

    /// Load the registry, reading environment variables through `env`.
    pub fn load_with(explicit: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let file = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => env(DEFAULTS_ENV)
                .map(PathBuf::from)
                .or_else(|| default_location().filter(|p| p.is_file())),
        };

        let defaults = match file {
            Some(path) => {
                debug!("Loading defaults from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                debug!("Using built-in defaults");
                Self::default()
            }
        };

        Ok(defaults.merge_env(env))
    }

    /// Parse a defaults file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigFileError::document_with_code(
                ErrorCode::CONFIG_NOT_FOUND,
                format!("Defaults file not found: {}", path.display()),
                Some(path.to_path_buf()),
            ));
        }
        let content = std::fs::read_to_string(path).to_document_error(
            ErrorCode::CONFIG_NOT_FOUND,
            path,
            "Failed to read defaults file",
        )?;
        toml::from_str(&content).to_document_error(
            ErrorCode::CONFIG_INVALID_DEFAULTS,
            path,
            "Invalid defaults file",
        )
    }

    /// Parse defaults from TOML text; omitted sections keep built-in values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides on top of the loaded values.
    pub fn merge_env(mut self, env: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(program) = env(BACKEND_ENV).filter(|v| !v.is_empty()) {
            debug!("Backend program overridden by {BACKEND_ENV}");
            self.backend.program = program;
        }
        if let Some(product) = env(MODIS_PRODUCT_ENV).filter(|v| !v.is_empty()) {
            debug!("MODIS product overridden by {MODIS_PRODUCT_ENV}");
            self.modis.default_product = product;
        }
        self
    }
}

/// `defaults.toml` in the platform configuration directory.
pub fn default_location() -> Option<PathBuf> {
    ProjectDirs::from("org", "riskflow", "riskflow")
        .map(|dirs| dirs.config_dir().join("defaults.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_built_in_values() {
        let defaults = Defaults::default();
        assert_eq!(defaults.chirps.longterm_functions, vec!["AVG"]);
        assert_eq!(defaults.modis.default_product, "MOD13A3.005");
        assert_eq!(defaults.hazard_impact.threshold(), Some(40.0));
        assert_eq!(defaults.backend.program, "riskflow-geo");
        assert!(defaults.backend.args.is_empty());
    }

    #[test]
    fn test_partial_file_keeps_built_ins() {
        let defaults = Defaults::from_toml_str(
            r#"
[modis]
default_product = "MOD13Q1.006"
"#,
        )
        .unwrap();
        assert_eq!(defaults.modis.default_product, "MOD13Q1.006");
        assert_eq!(defaults.chirps.longterm_functions, vec!["AVG"]);
        assert_eq!(defaults.hazard_impact.hazard_var, "vhi");
    }

    #[test]
    fn test_threshold_follows_hazard_var() {
        let defaults = Defaults::from_toml_str(
            r#"
[hazard_impact]
hazard_var = "vci"

[hazard_impact.thresholds]
vci = 35.0
"#,
        )
        .unwrap();
        assert_eq!(defaults.hazard_impact.threshold(), Some(35.0));
    }

    #[test]
    fn test_file_then_env_layering() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("defaults.toml");
        std::fs::write(
            &path,
            "[backend]\nprogram = \"from-file\"\nargs = [\"--quiet\"]\n[modis]\ndefault_product = \"FILE\"\n",
        )
        .unwrap();

        let env: HashMap<&str, &str> = HashMap::from([(BACKEND_ENV, "from-env")]);
        let defaults =
            Defaults::load_with(Some(&path), |name| env.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(defaults.backend.program, "from-env");
        assert_eq!(defaults.backend.args, vec!["--quiet"]);
        assert_eq!(defaults.modis.default_product, "FILE");
    }

    #[test]
    fn test_defaults_env_names_the_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("site.toml");
        std::fs::write(&path, "[chirps]\nlongterm_functions = [\"AVG\", \"STD\"]\n").unwrap();

        let path_str = path.to_string_lossy().to_string();
        let defaults = Defaults::load_with(None, |name| {
            (name == DEFAULTS_ENV).then(|| path_str.clone())
        })
        .unwrap();
        assert_eq!(defaults.chirps.longterm_functions, vec!["AVG", "STD"]);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Defaults::load_with(Some(Path::new("/nonexistent/defaults.toml")), no_env)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_invalid_toml_is_a_document_error() {
        let err = Defaults::from_toml_str("[modis\ndefault_product = 1").unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_DEFAULTS);
    }
}
