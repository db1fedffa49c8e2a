//! Client configuration, read from an optional JSON file.
//!
//! Every field has a default, so an empty object or a missing file yields a
//! working search engine with logging at `info`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engines::engine_greedy::GreedyEngine;
use crate::engines::engine_random::RandomEngine;
use crate::engines::engine_search::SearchEngine;
use crate::engines::engine_trait::Engine;
use crate::search::move_search::SearchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Search,
    Greedy,
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub engine: EngineKind,
    /// Seed for the engine RNG; entropy when absent.
    pub seed: Option<u64>,
    pub blocking_filter: bool,
    pub two_ply_lookahead: bool,
    /// Default `env_logger` filter; `RUST_LOG` still wins.
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Search,
            seed: None,
            blocking_filter: true,
            two_ply_lookahead: true,
            log_level: "info".to_owned(),
        }
    }
}

impl ClientConfig {
    /// Load from `path`. No path, or a path that does not exist, gives the
    /// defaults; an unreadable or malformed file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {e}", path.display()))?;
        Self::from_json(&text)
            .map_err(|e| format!("invalid config {}: {e}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| e.to_string())
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            blocking_filter: self.blocking_filter,
            two_ply_lookahead: self.two_ply_lookahead,
        }
    }

    pub fn build_engine(&self) -> Box<dyn Engine> {
        match self.engine {
            EngineKind::Search => Box::new(SearchEngine::new(self.search_config(), self.seed)),
            EngineKind::Greedy => Box::new(GreedyEngine::new(self.seed)),
            EngineKind::Random => Box::new(RandomEngine::new(self.seed)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = ClientConfig::from_json("{}").expect("config should parse");
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.build_engine().name(), "Labyrinth Search");
    }

    #[test]
    fn fields_override_defaults() {
        let config = ClientConfig::from_json(
            r#"{"engine":"greedy","seed":7,"two_ply_lookahead":false,"log_level":"debug"}"#,
        )
        .expect("config should parse");
        assert_eq!(config.engine, EngineKind::Greedy);
        assert_eq!(config.seed, Some(7));
        assert!(config.blocking_filter);
        assert!(!config.search_config().two_ply_lookahead);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.build_engine().name(), "Labyrinth Greedy");
    }

    #[test]
    fn missing_file_falls_back_and_bad_json_fails() {
        let missing = Path::new("definitely/not/a/real/labyrinth_config.json");
        assert_eq!(
            ClientConfig::load(Some(missing)).expect("missing file should give defaults"),
            ClientConfig::default()
        );
        assert_eq!(ClientConfig::load(None), Ok(ClientConfig::default()));
        assert!(ClientConfig::from_json(r#"{"engine":"minimax"}"#).is_err());
    }
}
