use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::board::{FruitKind, RandomBoardParams};
use crate::session::{
    DEFAULT_INITIAL_PLAYER_X, DEFAULT_INITIAL_PLAYER_Y, DEFAULT_MAX_GEN, DEFAULT_ORCHARD_HEIGHT,
    DEFAULT_ORCHARD_WIDTH, DEFAULT_POND_PERCENT, DEFAULT_SECONDS_PER_GEN, MAX_POND_PERCENT,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_pond_percent")]
    pub pond_percent: u32,
    #[serde(default = "default_player_x")]
    pub player_x: i32,
    #[serde(default = "default_player_y")]
    pub player_y: i32,
    #[serde(default = "default_seconds_per_generation")]
    pub seconds_per_generation: u64,
    #[serde(default = "default_max_generations")]
    pub max_generations: u64,
    #[serde(default = "default_moves_per_generation")]
    pub moves_per_generation: u32,
    /// 0 picks a fresh seed at startup.
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "FruitKind::defaults")]
    pub fruits: Vec<FruitKind>,
}

fn default_width() -> usize {
    DEFAULT_ORCHARD_WIDTH
}
fn default_height() -> usize {
    DEFAULT_ORCHARD_HEIGHT
}
fn default_pond_percent() -> u32 {
    DEFAULT_POND_PERCENT
}
fn default_player_x() -> i32 {
    DEFAULT_INITIAL_PLAYER_X
}
fn default_player_y() -> i32 {
    DEFAULT_INITIAL_PLAYER_Y
}
fn default_seconds_per_generation() -> u64 {
    DEFAULT_SECONDS_PER_GEN
}
fn default_max_generations() -> u64 {
    DEFAULT_MAX_GEN
}
fn default_moves_per_generation() -> u32 {
    5
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: default_width(),
            height: default_height(),
            pond_percent: default_pond_percent(),
            player_x: default_player_x(),
            player_y: default_player_y(),
            seconds_per_generation: default_seconds_per_generation(),
            max_generations: default_max_generations(),
            moves_per_generation: default_moves_per_generation(),
            seed: 0,
            log_level: default_log_level(),
            fruits: FruitKind::defaults(),
        }
    }
}

impl GameConfig {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content, path)
    }

    /// Load from `path`, or fall back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, String> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, String> {
        let config: GameConfig =
            toml::from_str(content).map_err(|e| format!("{}: {}", source_path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if self.width == 0 {
            errors.push("width must be > 0, got 0. Example: width = 15".to_string());
        }

        if self.height == 0 {
            errors.push("height must be > 0, got 0. Example: height = 15".to_string());
        }

        if self.pond_percent > MAX_POND_PERCENT {
            errors.push(format!(
                "pond_percent must be 0-{}, got {}. Example: pond_percent = 10",
                MAX_POND_PERCENT, self.pond_percent
            ));
        }

        let x_ok = usize::try_from(self.player_x).is_ok_and(|x| x < self.width);
        let y_ok = usize::try_from(self.player_y).is_ok_and(|y| y < self.height);
        if !x_ok || !y_ok {
            errors.push(format!(
                "player position ({}, {}) must lie inside the {}x{} orchard",
                self.player_x, self.player_y, self.width, self.height
            ));
        }

        if self.seconds_per_generation == 0 {
            errors.push(
                "seconds_per_generation must be > 0, got 0. Example: seconds_per_generation = 5"
                    .to_string(),
            );
        }

        if self.max_generations == 0 {
            errors.push(
                "max_generations must be > 0, got 0. Example: max_generations = 30".to_string(),
            );
        }

        if self.moves_per_generation == 0 {
            errors.push(
                "moves_per_generation must be > 0, got 0. Example: moves_per_generation = 5"
                    .to_string(),
            );
        }

        if self.fruits.is_empty() {
            errors.push(
                "fruits must list at least one kind. Example: fruits = [{ name = \"Apple\", color = \"#ff0000\" }]"
                    .to_string(),
            );
        }
        let mut seen = HashSet::new();
        for fruit in &self.fruits {
            if fruit.name.trim().is_empty() {
                errors.push("fruit names must not be blank".to_string());
            } else if !seen.insert(fruit.name.as_str()) {
                errors.push(format!("fruit '{}' is listed more than once", fruit.name));
            }
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {:?}, got '{}'. Example: log_level = \"info\"",
                valid_levels, self.log_level
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }

    /// Seed to use for this run: the configured one, or a fresh one when 0.
    pub fn resolve_seed(&self) -> u64 {
        if self.seed == 0 {
            rand::random::<u64>().max(1)
        } else {
            self.seed
        }
    }

    pub fn board_params(&self) -> RandomBoardParams {
        RandomBoardParams {
            width: self.width,
            height: self.height,
            fruits: self.fruits.clone(),
            pond_percent: self.pond_percent,
            player_x: self.player_x,
            player_y: self.player_y,
        }
    }
}
