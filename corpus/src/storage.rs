use anyhow::{Context, Result};
use catan::{ActionRow, LoggedSnapshot};
use common::assert_dir_exists;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Read access to the rows of logged games.
pub trait GameLog {
    fn select_logged_row(&self, game_id: u64, row_id: usize) -> Result<Option<LoggedSnapshot>>;

    /// The action whose id is `row_id`, executed from row `row_id - 1`.
    fn select_action(&self, game_id: u64, row_id: usize) -> Result<Option<ActionRow>>;

    fn table_size(&self, game_id: u64) -> Result<usize>;

    fn action_table_size(&self, game_id: u64) -> Result<usize>;
}

/// Every row and action of one logged game, ordered by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: u64,
    pub rows: Vec<LoggedSnapshot>,
    pub actions: Vec<ActionRow>,
}

impl GameRecord {
    pub fn new(game_id: u64, mut rows: Vec<LoggedSnapshot>, mut actions: Vec<ActionRow>) -> Self {
        rows.sort_by_key(|r| r.observed.id);
        actions.sort_by_key(|a| a.id);

        Self {
            game_id,
            rows,
            actions,
        }
    }

    pub fn row(&self, row_id: usize) -> Option<&LoggedSnapshot> {
        self.rows
            .binary_search_by_key(&row_id, |r| r.observed.id)
            .ok()
            .map(|i| &self.rows[i])
    }

    pub fn action(&self, row_id: usize) -> Option<&ActionRow> {
        self.actions
            .binary_search_by_key(&row_id, |a| a.id)
            .ok()
            .map(|i| &self.actions[i])
    }
}

impl GameLog for GameRecord {
    fn select_logged_row(&self, game_id: u64, row_id: usize) -> Result<Option<LoggedSnapshot>> {
        Ok((game_id == self.game_id)
            .then(|| self.row(row_id).cloned())
            .flatten())
    }

    fn select_action(&self, game_id: u64, row_id: usize) -> Result<Option<ActionRow>> {
        Ok((game_id == self.game_id)
            .then(|| self.action(row_id).copied())
            .flatten())
    }

    fn table_size(&self, game_id: u64) -> Result<usize> {
        Ok(if game_id == self.game_id { self.rows.len() } else { 0 })
    }

    fn action_table_size(&self, game_id: u64) -> Result<usize> {
        Ok(if game_id == self.game_id { self.actions.len() } else { 0 })
    }
}

/// Games held in memory, keyed by id.
#[derive(Default)]
pub struct MemoryLog {
    games: HashMap<u64, GameRecord>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: GameRecord) {
        self.games.insert(record.game_id, record);
    }

    pub fn game_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.games.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn game(&self, game_id: u64) -> Option<&GameRecord> {
        self.games.get(&game_id)
    }
}

impl GameLog for MemoryLog {
    fn select_logged_row(&self, game_id: u64, row_id: usize) -> Result<Option<LoggedSnapshot>> {
        Ok(self.game(game_id).and_then(|g| g.row(row_id).cloned()))
    }

    fn select_action(&self, game_id: u64, row_id: usize) -> Result<Option<ActionRow>> {
        Ok(self.game(game_id).and_then(|g| g.action(row_id).copied()))
    }

    fn table_size(&self, game_id: u64) -> Result<usize> {
        Ok(self.game(game_id).map_or(0, |g| g.rows.len()))
    }

    fn action_table_size(&self, game_id: u64) -> Result<usize> {
        Ok(self.game(game_id).map_or(0, |g| g.actions.len()))
    }
}

/// One gzipped JSON file per game, `game-{id}.json.gz`, in a single directory. Games are
/// loaded whole into a [`GameRecord`], which the reconstruction procedures then walk.
pub struct FileLog {
    games_dir: PathBuf,
}

impl FileLog {
    pub fn new(games_dir: PathBuf) -> Result<Self> {
        assert_dir_exists(&games_dir).context("Games directory is missing")?;

        Ok(Self { games_dir })
    }

    pub fn games_dir(&self) -> &Path {
        &self.games_dir
    }

    pub fn save(&self, record: &GameRecord) -> Result<()> {
        let file_path = self.file_path(record.game_id);
        let file = File::create(&file_path)
            .with_context(|| format!("Failed to create {:?}", file_path))?;
        let compressor = GzEncoder::new(file, Compression::default());
        serde_json::to_writer(compressor, record)?;

        Ok(())
    }

    pub fn load(&self, game_id: u64) -> Result<Option<GameRecord>> {
        let file_path = self.file_path(game_id);
        if !file_path.is_file() {
            return Ok(None);
        }

        let file = File::open(&file_path).with_context(|| format!("Failed to open {:?}", file_path))?;
        let content = GzDecoder::new(file);
        let record: GameRecord = serde_json::from_reader(content)
            .with_context(|| format!("Failed to parse {:?}", file_path))?;

        Ok(Some(GameRecord::new(record.game_id, record.rows, record.actions)))
    }

    /// Ids of every game file in the directory, ascending.
    pub fn game_ids(&self) -> Result<Vec<u64>> {
        let mut ids: Vec<u64> = fs::read_dir(&self.games_dir)?
            .flatten()
            .filter(|p| p.file_type().is_ok_and(|p| p.is_file()))
            .filter_map(|p| Self::game_id_of(&p.file_name().to_string_lossy()))
            .collect();
        ids.sort_unstable();

        Ok(ids)
    }

    fn game_id_of(file_name: &str) -> Option<u64> {
        file_name
            .strip_prefix("game-")?
            .strip_suffix(".json.gz")?
            .parse()
            .ok()
    }

    fn file_path(&self, game_id: u64) -> PathBuf {
        self.games_dir.join(format!("game-{}.json.gz", game_id))
    }
}
