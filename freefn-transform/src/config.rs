//! Configuration for the transformers
//!
//! Defaults reproduce the conventions of the AFIO headers, so an empty config
//! file (or none at all) regenerates those headers byte for byte.

use serde::{Deserialize, Serialize};

/// Settings for the free-function generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeFnConfig {
    /// Macro that marks a member function for freeing
    pub marker: String,
    /// Macros that may appear between `class` and the class name
    pub class_decl_macros: Vec<String>,
    /// Macros removed from the generated declarations
    pub strip_macros: Vec<String>,
    /// Prefix of the line the generated block is inserted in front of
    pub namespace_end: String,
    /// Sentinel line opening the generated block
    pub block_begin: String,
    /// Sentinel line closing the generated block
    pub block_end: String,
    /// Names declared inside the class that must be qualified outside it
    pub nested_types: Vec<String>,
    /// Maximum number of lines a marked declaration may span
    pub max_lookahead: usize,
    /// Header globs, relative to the root directory
    pub headers: Vec<String>,
}

impl Default for FreeFnConfig {
    fn default() -> Self {
        Self {
            marker: "AFIO_MAKE_FREE_FUNCTION".to_string(),
            class_decl_macros: vec!["AFIO_DECL".to_string()],
            strip_macros: vec![
                "AFIO_HEADERS_ONLY_MEMFUNC_SPEC".to_string(),
                "AFIO_HEADERS_ONLY_VIRTUAL_SPEC".to_string(),
            ],
            namespace_end: "AFIO_V2_NAMESPACE_END".to_string(),
            block_begin: "// BEGIN make_free_functions.py".to_string(),
            block_end: "// END make_free_functions.py".to_string(),
            nested_types: default_nested_types(),
            max_lookahead: 100,
            headers: vec!["include/afio/*/*.hpp".to_string()],
        }
    }
}

fn default_nested_types() -> Vec<String> {
    [
        "path_view_type",
        "extent_type",
        "size_type",
        "buffers_type",
        "const_buffers_type",
        "io_result",
        "io_request",
        "io_state_ptr",
        "mode",
        "creation",
        "caching",
        "flag",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

impl FreeFnConfig {
    /// Check the settings for values that would make the generator misbehave
    pub fn validate(&self) -> crate::Result<()> {
        let empty = [
            ("marker", &self.marker),
            ("namespace_end", &self.namespace_end),
            ("block_begin", &self.block_begin),
            ("block_end", &self.block_end),
        ];
        for (key, value) in empty {
            if value.trim().is_empty() {
                return Err(crate::TransformError::Config(format!("`{key}` must not be empty")));
            }
        }
        if self.block_begin.trim() == self.block_end.trim() {
            return Err(crate::TransformError::Config(
                "`block_begin` and `block_end` must differ".to_string(),
            ));
        }
        if self.max_lookahead == 0 {
            return Err(crate::TransformError::Config(
                "`max_lookahead` must be at least 1".to_string(),
            ));
        }
        if !self
            .marker
            .chars()
            .all(|c| c == '_' || c.is_alphanumeric())
        {
            return Err(crate::TransformError::Config(format!(
                "marker `{}` is not an identifier",
                self.marker
            )));
        }
        Ok(())
    }
}

/// Settings for tab expansion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabConfig {
    /// Spaces per tab stop
    pub tab_width: usize,
    /// File extensions (without the dot) to expand
    pub extensions: Vec<String>,
}

impl Default for TabConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            extensions: vec!["hpp".to_string(), "cpp".to_string()],
        }
    }
}

/// Everything that can be set in a `freefn` config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeFnSettings {
    pub free_functions: FreeFnConfig,
    pub tabs: TabConfig,
}
