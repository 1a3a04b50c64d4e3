use anyhow::Result;
use common::{Config, ConfigLoader};
use std::ops::Range;
use std::path::PathBuf;

use super::matcher::EPSILON;
use super::task::Task;

/// A contiguous range of game ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameRange {
    pub start_id: u64,
    pub num_games: u64,
}

impl GameRange {
    pub fn ids(&self) -> Range<u64> {
        self.start_id..self.start_id + self.num_games
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExtractOptions {
    pub games_dir: PathBuf,
    pub output_dir: PathBuf,
    pub tasks: Vec<Task>,
    pub train: GameRange,
    pub test: GameRange,
    pub batch_size: usize,
    pub shuffle_seed: u64,
    pub epsilon: f64,
}

impl Config for ExtractOptions {
    fn load(config: &ConfigLoader) -> Result<Self> {
        let tasks = match config.get("tasks").and_then(|v| v.as_string()) {
            Some(tasks) => Task::parse_list(&tasks)?,
            None => Task::ALL.to_vec(),
        };
        let u64_or = |name: &str, default: u64| {
            config
                .get(name)
                .and_then(|v| v.as_u64())
                .unwrap_or(default)
        };

        Ok(Self {
            games_dir: config
                .get_relative_path("games_dir")
                .unwrap_or_else(|_| PathBuf::from("./data/games")),
            output_dir: config
                .get_relative_path("output_dir")
                .unwrap_or_else(|_| PathBuf::from("./data/corpus")),
            tasks,
            train: GameRange {
                start_id: u64_or("train_start_id", 1),
                num_games: u64_or("train_games", 5000),
            },
            test: GameRange {
                start_id: u64_or("test_start_id", 5001),
                num_games: u64_or("test_games", 1000),
            },
            batch_size: config
                .get("batch_size")
                .and_then(|v| v.as_usize())
                .unwrap_or(100)
                .max(1),
            shuffle_seed: u64_or("shuffle_seed", 0),
            epsilon: config.get("epsilon").and_then(|v| v.as_f64()).unwrap_or(EPSILON),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn load(conf: &str) -> Result<ExtractOptions> {
        ConfigLoader::from_hocon_str(conf, "extract".to_string())?.load()
    }

    #[test]
    fn test_defaults() {
        let options = load("other { batch_size = 3 }").unwrap();
        assert_eq!(options.tasks, Task::ALL.to_vec());
        assert_eq!(options.train.ids(), 1..5001);
        assert_eq!(options.test.ids(), 5001..6001);
        assert_eq!(options.batch_size, 100);
        assert_approx_eq!(options.epsilon, 0.00001);
    }

    #[test]
    fn test_scoped_values() {
        let conf = r#"
            extract {
                tasks = "normal_play,4"
                train_start_id = 10
                train_games = 20
                batch_size = 5
                shuffle_seed = 99
                epsilon = 0.001
            }
        "#;
        let options = load(conf).unwrap();
        assert_eq!(options.tasks, vec![Task::NormalPlay, Task::Discard]);
        assert_eq!(options.train.ids(), 10..30);
        assert_eq!(options.batch_size, 5);
        assert_eq!(options.shuffle_seed, 99);
        assert_approx_eq!(options.epsilon, 0.001);
    }

    #[test]
    fn test_rejects_unknown_task() {
        assert!(load(r#"extract { tasks = "trading" }"#).is_err());
    }
}
