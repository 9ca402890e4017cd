use std::{collections::BTreeMap, fs, io, path::PathBuf, sync::RwLock};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DAILY_GOAL_KEY: &str = "dailyGoal";
pub const DEFAULT_DAILY_GOAL: u32 = 10_000;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("stored values are not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("stored {key} {value:?} is not a positive integer")]
    InvalidValue { key: String, value: String },
}

/// String-keyed slots persisted as one JSON object. The app uses a single
/// slot, `dailyGoal`, holding a base-10 integer as text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct Slots(BTreeMap<String, String>);

pub struct GoalStore {
    path: PathBuf,
    data: RwLock<Slots>,
}

impl GoalStore {
    /// Opens the store, seeding the cache from disk when the file exists.
    /// A file that fails to parse is treated as empty here; per-mount loads
    /// go through `load_daily_goal`, which reports corruption instead.
    pub fn new(path: PathBuf) -> Result<Self, StorageError> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| StorageError::Read {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            Slots::default()
        };

        info!("goal store opened at {}", path.display());

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.data.read().unwrap().0.get(key).cloned()
    }

    /// Write-through set: the file is written first and the cache updated
    /// only once the write succeeds, so cache and disk never diverge.
    pub fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut guard = self.data.write().unwrap();
        let mut next = guard.clone();
        next.0.insert(key.to_string(), value);
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }

    /// The goal currently in effect according to the cache; the default when
    /// nothing has been stored yet.
    pub fn daily_goal(&self) -> u32 {
        self.data
            .read()
            .unwrap()
            .0
            .get(DAILY_GOAL_KEY)
            .and_then(|raw| parse_goal(raw))
            .unwrap_or(DEFAULT_DAILY_GOAL)
    }

    /// Re-reads the backing file and returns the persisted goal, `None` when
    /// the file or the slot is absent. The cache is refreshed on success.
    pub fn load_daily_goal(&self) -> Result<Option<u32>, StorageError> {
        let slots = self.read_from_disk()?;
        let goal = match slots.0.get(DAILY_GOAL_KEY) {
            Some(raw) => Some(parse_goal(raw).ok_or_else(|| StorageError::InvalidValue {
                key: DAILY_GOAL_KEY.to_string(),
                value: raw.clone(),
            })?),
            None => None,
        };

        *self.data.write().unwrap() = slots;
        Ok(goal)
    }

    pub fn save_daily_goal(&self, goal: u32) -> Result<(), StorageError> {
        self.set(DAILY_GOAL_KEY, goal.to_string())
    }

    fn read_from_disk(&self) -> Result<Slots, StorageError> {
        if !self.path.exists() {
            return Ok(Slots::default());
        }
        let contents = fs::read_to_string(&self.path).map_err(|source| StorageError::Read {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn persist(&self, data: &Slots) -> Result<(), StorageError> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized).map_err(|source| StorageError::Write {
            path: self.path.display().to_string(),
            source,
        })
    }
}

fn parse_goal(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|goal| *goal > 0)
}
