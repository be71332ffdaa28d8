use crate::errors::ConfigError;
use crate::services::ConstructorNamePolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options that control inference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceOptions {
    /// Method names whose calls produce an instance of the owning class
    /// (default: new, get)
    #[serde(default = "default_constructor_names")]
    pub constructor_names: Vec<String>,

    /// Callee names treated as module require functions (default: require)
    #[serde(default = "default_require_functions")]
    pub require_functions: Vec<String>,

    /// Maximum depth of recursive descent in one query (default: 200)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Lua-style search templates for package names, `?` replaced by the
    /// slash-separated module name
    #[serde(default = "default_module_paths")]
    pub module_paths: Vec<String>,
}

fn default_constructor_names() -> Vec<String> {
    vec!["new".to_string(), "get".to_string()]
}

fn default_require_functions() -> Vec<String> {
    vec!["require".to_string()]
}

fn default_max_depth() -> usize {
    200
}

fn default_module_paths() -> Vec<String> {
    vec!["?.lua".to_string(), "?/init.lua".to_string()]
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            constructor_names: default_constructor_names(),
            require_functions: default_require_functions(),
            max_depth: default_max_depth(),
            module_paths: default_module_paths(),
        }
    }
}

impl InferenceOptions {
    pub fn is_require_function(&self, name: &str) -> bool {
        self.require_functions.iter().any(|f| f == name)
    }
}

impl ConstructorNamePolicy for InferenceOptions {
    fn is_constructor_name(&self, name: &str) -> bool {
        self.constructor_names.iter().any(|n| n == name)
    }
}

/// Configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    #[serde(default)]
    pub inference_options: InferenceOptions,
}

impl InferenceConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Write the default configuration to `path`
    pub fn init_file(path: &Path) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(&InferenceConfig::default())?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Apply host overrides; only `Some` fields replace file values
    pub fn merge(&mut self, overrides: &OptionOverrides) {
        let options = &mut self.inference_options;
        if let Some(ref constructor_names) = overrides.constructor_names {
            options.constructor_names = constructor_names.clone();
        }
        if let Some(ref require_functions) = overrides.require_functions {
            options.require_functions = require_functions.clone();
        }
        if let Some(max_depth) = overrides.max_depth {
            options.max_depth = max_depth;
        }
        if let Some(ref module_paths) = overrides.module_paths {
            options.module_paths = module_paths.clone();
        }
    }
}

/// Host-supplied overrides for configuration
#[derive(Debug, Default, Clone)]
pub struct OptionOverrides {
    pub constructor_names: Option<Vec<String>>,
    pub require_functions: Option<Vec<String>>,
    pub max_depth: Option<usize>,
    pub module_paths: Option<Vec<String>>,
}
