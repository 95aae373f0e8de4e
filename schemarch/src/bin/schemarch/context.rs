use anyhow::{Context, Result};
use schemarch::{DEFAULT_GENERATED_BY, PipelineConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "schemarch.toml";

/// Project context for schemarch operations
pub struct ProjectContext {
    /// Directory holding schemarch.toml, or the working directory when none exists
    pub project_root: PathBuf,
    /// Path to config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: Option<SchemarchConfig>,
}

/// Configuration stored in schemarch.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemarchConfig {
    #[serde(default)]
    pub scan: ScanSettings,
    #[serde(default)]
    pub openapi: OpenApiSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSettings {
    #[serde(default = "default_scan_root")]
    pub root: String,
    #[serde(default = "schemarch::source::default_markers")]
    pub markers: Vec<String>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            root: default_scan_root(),
            markers: schemarch::source::default_markers(),
        }
    }
}

fn default_scan_root() -> String {
    "./src".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSettings {
    /// Empty means no document
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_out")]
    pub out: String,
    #[serde(default)]
    pub raw_out: String,
    #[serde(default)]
    pub diagram_out: String,
    #[serde(default = "default_generated_by")]
    pub generated_by: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            out: default_out(),
            raw_out: String::new(),
            diagram_out: String::new(),
            generated_by: default_generated_by(),
        }
    }
}

fn default_out() -> String {
    "schema.logical.json".to_string()
}

fn default_generated_by() -> String {
    DEFAULT_GENERATED_BY.to_string()
}

/// Input overrides shared by the commands that run the pipeline
#[derive(Debug, Clone, Default)]
pub struct InputOverrides {
    pub root: Option<PathBuf>,
    pub openapi: Option<PathBuf>,
}

impl ProjectContext {
    /// Find and load project context from current directory or ancestors
    pub fn find() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::find_from(&current_dir)
    }

    /// Find project context starting from the given directory
    pub fn find_from(start: &Path) -> Result<Self> {
        let project_root = Self::find_project_root(start).unwrap_or_else(|| start.to_path_buf());
        Self::from_root(project_root)
    }

    /// Create context from a known project root
    pub fn from_root(project_root: PathBuf) -> Result<Self> {
        let config_path = project_root.join(CONFIG_FILE);

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).context("Failed to read schemarch.toml")?;
            let config: SchemarchConfig = toml::from_str(&content).context("Failed to parse schemarch.toml")?;
            Some(config)
        } else {
            None
        };

        Ok(Self {
            project_root,
            config_path,
            config,
        })
    }

    /// Nearest ancestor holding a schemarch.toml
    fn find_project_root(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(CONFIG_FILE).is_file())
            .map(Path::to_path_buf)
    }

    pub fn settings(&self) -> SchemarchConfig {
        self.config.clone().unwrap_or_default()
    }

    /// Resolve a configured path against the project root. Empty means unset.
    pub fn resolve(&self, configured: &str) -> Option<PathBuf> {
        if configured.trim().is_empty() {
            return None;
        }
        let path = Path::new(configured);
        Some(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        })
    }

    /// Pipeline inputs: command-line flags first, then config, then defaults.
    pub fn pipeline_config(&self, overrides: &InputOverrides) -> PipelineConfig {
        let settings = self.settings();
        let scan_root = overrides
            .root
            .clone()
            .or_else(|| self.resolve(&settings.scan.root))
            .unwrap_or_else(|| self.project_root.clone());

        PipelineConfig {
            scan_root,
            markers: settings.scan.markers,
            openapi: overrides.openapi.clone().or_else(|| self.resolve(&settings.openapi.path)),
            generated_by: settings.output.generated_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchemarchConfig::default();
        assert_eq!(config.scan.root, "./src");
        assert_eq!(config.scan.markers, vec!["/model/do", "/api"]);
        assert_eq!(config.output.out, "schema.logical.json");
        assert_eq!(config.output.generated_by, "schemarch");
        assert!(config.openapi.path.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = SchemarchConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[scan]"));
        assert!(toml_str.contains("markers"));

        let parsed: SchemarchConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SchemarchConfig = toml::from_str("[openapi]\npath = \"openapi.yaml\"\n").unwrap();
        assert_eq!(config.openapi.path, "openapi.yaml");
        assert_eq!(config.scan.root, "./src");
        assert_eq!(config.output.out, "schema.logical.json");
    }

    #[test]
    fn test_find_from_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[scan]\nroot = \"internal\"\n").unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = ProjectContext::find_from(&nested).unwrap();
        assert_eq!(ctx.project_root, dir.path());

        let pipeline = ctx.pipeline_config(&InputOverrides::default());
        assert_eq!(pipeline.scan_root, dir.path().join("internal"));
        assert!(pipeline.openapi.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[openapi]\npath = \"spec.json\"\n").unwrap();

        let ctx = ProjectContext::from_root(dir.path().to_path_buf()).unwrap();
        let overrides = InputOverrides {
            root: Some(PathBuf::from("/elsewhere")),
            openapi: Some(PathBuf::from("other.yaml")),
        };
        let pipeline = ctx.pipeline_config(&overrides);
        assert_eq!(pipeline.scan_root, PathBuf::from("/elsewhere"));
        assert_eq!(pipeline.openapi, Some(PathBuf::from("other.yaml")));
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ProjectContext::find_from(dir.path()).unwrap();
        assert!(ctx.config.is_none());
        assert_eq!(ctx.pipeline_config(&InputOverrides::default()).scan_root, dir.path().join("./src"));
    }
}
