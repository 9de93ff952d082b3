use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use engine::{read_json_file, write_json_file_atomic, JsonFileError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::session::{Item, PlayerProfile, PlayerStats};

pub(crate) const SAVE_FILE_NAME: &str = "infinite_survival_save_v1.json";
pub(crate) const SAVE_VERSION: &str = "0.1.0";

/// On-disk snapshot of a session. Older saves without `inventory`,
/// `teammates` or `points` load with empty defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SaveData {
    pub(crate) player: PlayerProfile,
    #[serde(default)]
    pub(crate) inventory: Vec<Item>,
    #[serde(default)]
    pub(crate) teammates: Vec<String>,
    #[serde(default)]
    pub(crate) points: u32,
    pub(crate) timestamp: u64,
    pub(crate) version: String,
}

impl SaveData {
    pub(crate) fn new(
        player: PlayerProfile,
        inventory: Vec<Item>,
        teammates: Vec<String>,
        points: u32,
        timestamp: u64,
    ) -> Self {
        Self {
            player,
            inventory,
            teammates,
            points,
            timestamp,
            version: SAVE_VERSION.to_string(),
        }
    }
}

/// Who saved the slot and when, read without validating the whole file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SaveMeta {
    pub(crate) player_name: String,
    pub(crate) timestamp_ms: u64,
}

impl SaveMeta {
    pub(crate) fn of(data: &SaveData) -> Self {
        Self {
            player_name: data.player.name.clone(),
            timestamp_ms: data.timestamp,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SaveHeader {
    player: SaveHeaderPlayer,
    timestamp: u64,
}

#[derive(Debug, Deserialize)]
struct SaveHeaderPlayer {
    name: String,
}

#[derive(Debug, Error)]
pub(crate) enum SaveError {
    #[error(transparent)]
    Json(#[from] JsonFileError),
    #[error("invalid save {path}: {message}")]
    Validation { path: PathBuf, message: String },
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub(crate) fn in_dir(saves_dir: &Path) -> Self {
        Self {
            path: saves_dir.join(SAVE_FILE_NAME),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn save(&self, data: &SaveData) -> Result<(), SaveError> {
        validate_save_data(data).map_err(|message| SaveError::Validation {
            path: self.path.clone(),
            message,
        })?;
        write_json_file_atomic(&self.path, data)?;
        Ok(())
    }

    /// Saves `data` and returns the slot metadata it now carries.
    pub(crate) fn save_with_meta(&self, data: &SaveData) -> Result<SaveMeta, SaveError> {
        self.save(data)?;
        Ok(SaveMeta::of(data))
    }

    /// Reads only the player name and timestamp. `Ok(None)` when the slot
    /// is empty.
    pub(crate) fn peek_meta(&self) -> Result<Option<SaveMeta>, SaveError> {
        match read_json_file::<SaveHeader>(&self.path) {
            Ok(header) => Ok(Some(SaveMeta {
                player_name: header.player.name,
                timestamp_ms: header.timestamp,
            })),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Removes the save file. Returns `false` when there was nothing to
    /// remove.
    pub(crate) fn delete(&self) -> Result<bool, SaveError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "save_deleted");
                Ok(true)
            }
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(SaveError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// `Ok(None)` when no save file exists yet.
    pub(crate) fn load(&self) -> Result<Option<SaveData>, SaveError> {
        let data = match read_json_file::<SaveData>(&self.path) {
            Ok(data) => data,
            Err(error) if error.is_not_found() => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        validate_save_data(&data).map_err(|message| SaveError::Validation {
            path: self.path.clone(),
            message,
        })?;
        if data.version != SAVE_VERSION {
            warn!(
                path = %self.path.display(),
                save_version = %data.version,
                expected_version = SAVE_VERSION,
                "save_version_mismatch"
            );
        }
        Ok(Some(data))
    }
}

pub(crate) fn now_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

fn validation_err(path: &str, message: impl Into<String>) -> String {
    format!("validation failed at {path}: {}", message.into())
}

fn expected_actual(path: &str, expected: impl Display, actual: impl Display) -> String {
    validation_err(path, format!("expected {expected}, got {actual}"))
}

fn validate_save_data(data: &SaveData) -> Result<(), String> {
    if data.version.trim().is_empty() {
        return Err(validation_err("version", "must not be empty"));
    }
    if data.player.name.trim().is_empty() {
        return Err(validation_err("player.name", "must not be empty"));
    }
    validate_stats(&data.player.stats)?;
    for (index, item) in data.inventory.iter().enumerate() {
        if item.id.is_empty() {
            return Err(validation_err(
                &format!("inventory[{index}].id"),
                "must not be empty",
            ));
        }
        if item.quantity == 0 {
            return Err(expected_actual(
                &format!("inventory[{index}].quantity"),
                "at least 1",
                item.quantity,
            ));
        }
    }
    if let Some(index) = data.teammates.iter().position(|id| id.is_empty()) {
        return Err(validation_err(
            &format!("teammates[{index}]"),
            "must not be empty",
        ));
    }
    Ok(())
}

fn validate_stats(stats: &PlayerStats) -> Result<(), String> {
    let pools = [
        ("player.stats.hp", stats.hp, stats.max_hp),
        ("player.stats.stamina", stats.stamina, stats.max_stamina),
        ("player.stats.spirit", stats.spirit, stats.max_spirit),
    ];
    for (path, current, max) in pools {
        if max < 0 {
            return Err(expected_actual(path, "non-negative maximum", max));
        }
        if current < 0 || current > max {
            return Err(expected_actual(path, format!("0..={max}"), current));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::*;
    use crate::app::session::{ItemKind, Trait};

    fn sample_save() -> SaveData {
        SaveData::new(
            PlayerProfile {
                name: "林".to_string(),
                gender: "female".to_string(),
                stats: PlayerStats {
                    hp: 80,
                    max_hp: 100,
                    stamina: 50,
                    max_stamina: 50,
                    spirit: 10,
                    max_spirit: 20,
                    strength: 10,
                    ..PlayerStats::default()
                },
                traits: vec![Trait {
                    id: "strong".to_string(),
                    name: "巨力".to_string(),
                    description: "力量 +10".to_string(),
                }],
            },
            vec![Item {
                id: "water".to_string(),
                name: "矿泉水".to_string(),
                description: "普通的瓶装水".to_string(),
                quantity: 1,
                kind: ItemKind::Consumable,
            }],
            vec!["npc_veteran".to_string()],
            0,
            1_700_000_000_000,
        )
    }

    #[test]
    fn save_uses_camel_case_stats_and_type_tag() {
        let value = serde_json::to_value(sample_save()).expect("to_value");
        assert_eq!(value["player"]["stats"]["maxHp"], json!(100));
        assert_eq!(value["inventory"][0]["type"], json!("consumable"));
        assert_eq!(value["version"], json!(SAVE_VERSION));
    }

    #[test]
    fn missing_inventory_and_teammates_default_to_empty() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = SaveStore::in_dir(temp.path());
        let mut value = serde_json::to_value(sample_save()).expect("to_value");
        let object = value.as_object_mut().expect("object");
        object.remove("inventory");
        object.remove("teammates");
        object.remove("points");
        fs::write(store.path(), serde_json::to_string(&value).expect("json")).expect("write");

        let loaded = store.load().expect("load").expect("present");

        assert!(loaded.inventory.is_empty());
        assert!(loaded.teammates.is_empty());
        assert_eq!(loaded.points, 0);
    }

    #[test]
    fn parse_error_names_json_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = SaveStore::in_dir(temp.path());
        let mut value = serde_json::to_value(sample_save()).expect("to_value");
        value["player"]["stats"]["maxHp"] = json!("lots");
        fs::write(store.path(), serde_json::to_string(&value).expect("json")).expect("write");

        let error = store.load().expect_err("should fail");
        let message = error.to_string();
        assert!(
            message.contains("player.stats.maxHp"),
            "unexpected message: {message}"
        );
    }

    #[test]
    fn validation_rejects_hp_above_max() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = SaveStore::in_dir(temp.path());
        let mut save = sample_save();
        save.player.stats.hp = 150;

        let error = store.save(&save).expect_err("should fail");
        assert!(matches!(error, SaveError::Validation { .. }));
        assert!(error.to_string().contains("player.stats.hp"));
        assert!(!store.path().exists());
    }

    #[test]
    fn validation_rejects_zero_quantity_items() {
        let mut save = sample_save();
        save.inventory[0].quantity = 0;
        let message = validate_save_data(&save).expect_err("should fail");
        assert!(message.contains("inventory[0].quantity"));
    }

    #[test]
    fn older_version_still_loads() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = SaveStore::in_dir(temp.path());
        let mut save = sample_save();
        save.version = "0.0.9".to_string();
        store.save(&save).expect("save");

        let loaded = store.load().expect("load").expect("present");
        assert_eq!(loaded.version, "0.0.9");
    }

    #[test]
    fn peek_meta_reads_name_and_timestamp() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = SaveStore::in_dir(temp.path());
        assert_eq!(store.peek_meta().expect("peek"), None);

        let meta = store.save_with_meta(&sample_save()).expect("save");

        assert_eq!(
            meta,
            SaveMeta {
                player_name: "林".to_string(),
                timestamp_ms: 1_700_000_000_000,
            }
        );
        assert_eq!(store.peek_meta().expect("peek"), Some(meta));
    }

    #[test]
    fn peek_meta_ignores_fields_it_does_not_need() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = SaveStore::in_dir(temp.path());
        let value = json!({"player": {"name": "Ada"}, "timestamp": 42, "inventory": "junk"});
        fs::write(store.path(), value.to_string()).expect("write");

        let meta = store.peek_meta().expect("peek").expect("present");
        assert_eq!(meta.player_name, "Ada");
        assert_eq!(meta.timestamp_ms, 42);
        assert!(store.load().is_err());
    }

    #[test]
    fn delete_removes_slot_and_reports_absence() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = SaveStore::in_dir(temp.path());
        store.save(&sample_save()).expect("save");

        assert!(store.delete().expect("delete"));
        assert!(!store.path().exists());
        assert!(store.load().expect("load").is_none());
        assert!(!store.delete().expect("second delete"));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = SaveStore::in_dir(temp.path());
        assert!(store.load().expect("load").is_none());
        assert!(store.path().ends_with(SAVE_FILE_NAME));
    }
}
