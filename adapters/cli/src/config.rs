use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use maze_escape_system_bootstrap::SessionConfig;
use serde::Deserialize;

const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Settings read from an optional TOML file; command-line flags take precedence.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) version: u32,
    pub(crate) maze: MazeSection,
    pub(crate) session: SessionConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            maze: MazeSection::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Maze parameters that may be preset in the configuration file.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MazeSection {
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) difficulty: Option<u8>,
    pub(crate) character: Option<u8>,
    pub(crate) seed: Option<u64>,
}

impl FileConfig {
    /// Loads and validates the configuration stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid configuration at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse configuration toml contents")?;
        if config.version != SUPPORTED_CONFIG_VERSION {
            bail!(
                "unsupported configuration version {}; expected {}",
                config.version,
                SUPPORTED_CONFIG_VERSION
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(FileConfig::parse("").expect("config"), FileConfig::default());
    }

    #[test]
    fn parses_every_section() {
        let config = FileConfig::parse(
            r#"
            version = 1

            [maze]
            width = 31
            height = 17
            difficulty = 2
            seed = 99

            [session]
            enemy_count = 4
            seed = 7
        "#,
        )
        .expect("config");

        assert_eq!(config.maze.width, Some(31));
        assert_eq!(config.maze.height, Some(17));
        assert_eq!(config.maze.difficulty, Some(2));
        assert_eq!(config.maze.character, None);
        assert_eq!(config.maze.seed, Some(99));
        assert_eq!(config.session.enemy_count, Some(4));
        assert_eq!(config.session.seed, 7);
    }

    #[test]
    fn rejects_unknown_versions_and_keys() {
        let error = FileConfig::parse("version = 2").expect_err("future version");
        assert!(error.to_string().contains("unsupported configuration version"));

        assert!(FileConfig::parse("[maze]\ncolour = \"red\"").is_err());
    }
}
