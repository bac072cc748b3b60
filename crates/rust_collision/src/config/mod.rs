//! Configuration system
//!
//! Tunables for tree construction, loadable from TOML or RON files.

pub use serde::{Deserialize, Serialize};

use crate::spatial::octree::MESH_OCTREE_DEPTH;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;

        // Pick the format from the file extension
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Octree construction settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Subdivision depth used by [`Octree::for_mesh`](crate::spatial::Octree::for_mesh)
    pub mesh_depth: u32,

    /// Seed the mesh bounds accumulator at the coordinate origin instead of
    /// the first point. Reproduces bounds that always include the origin.
    pub seed_bounds_at_origin: bool,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            mesh_depth: MESH_OCTREE_DEPTH,
            seed_bounds_at_origin: false,
        }
    }
}

/// Top-level collision settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Octree settings
    pub octree: OctreeConfig,
}

impl Config for CollisionConfig {}
