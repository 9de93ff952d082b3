use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::gameplay::{DialogueAction, DialogueActionSink};
use super::save::{SaveData, SaveError, SaveMeta, SaveStore};

pub(crate) const NOTICE_SECONDS: f32 = 3.0;
pub(crate) const WELCOME_NOTICE: &str = "Welcome to the Infinite Space";
pub(crate) const RECRUITED_NOTICE: &str = "New Teammate Recruited!";
pub(crate) const SAVED_NOTICE: &str = "Game Saved Successfully";
pub(crate) const SAVE_FAILED_NOTICE: &str = "Failed to Save Game";
pub(crate) const LOADED_NOTICE: &str = "Game Loaded";
pub(crate) const LOAD_CORRUPT_NOTICE: &str = "Save File Corrupted";
pub(crate) const NO_SAVE_NOTICE: &str = "No Save Found";
pub(crate) const DELETED_NOTICE: &str = "Save Deleted";
pub(crate) const DELETE_FAILED_NOTICE: &str = "Failed to Delete Save";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayerStats {
    pub(crate) hp: i32,
    pub(crate) max_hp: i32,
    pub(crate) stamina: i32,
    pub(crate) max_stamina: i32,
    pub(crate) spirit: i32,
    pub(crate) max_spirit: i32,
    pub(crate) strength: i32,
    pub(crate) agility: i32,
    pub(crate) resilience: i32,
    pub(crate) intuition: i32,
    pub(crate) luck: i32,
    pub(crate) physical: i32,
    pub(crate) shooting: i32,
    pub(crate) melee: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Trait {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ItemKind {
    Consumable,
    Material,
    Weapon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Item {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) quantity: u32,
    #[serde(rename = "type")]
    pub(crate) kind: ItemKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PlayerProfile {
    pub(crate) name: String,
    pub(crate) gender: String,
    pub(crate) stats: PlayerStats,
    #[serde(default)]
    pub(crate) traits: Vec<Trait>,
}

/// Recruited teammate ids in recruitment order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TeammateRoster {
    ids: Vec<String>,
}

impl TeammateRoster {
    pub(crate) fn from_ids(ids: impl IntoIterator<Item = String>) -> Self {
        let mut roster = Self::default();
        for id in ids {
            roster.recruit(&id);
        }
        roster
    }

    /// Returns `false` when `id` was already recruited.
    pub(crate) fn recruit(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub(crate) fn ids(&self) -> &[String] {
        &self.ids
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Notice {
    message: String,
    remaining_seconds: f32,
}

impl Notice {
    pub(crate) fn message(&self) -> &str {
        &self.message
    }
}

/// Player state shared by the hub and exploration scenes.
#[derive(Debug)]
pub(crate) struct GameSession {
    profile: PlayerProfile,
    inventory: Vec<Item>,
    roster: TeammateRoster,
    points: u32,
    notice: Option<Notice>,
    forwarded_actions: Vec<String>,
    save_store: SaveStore,
    save_meta: Option<SaveMeta>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadOutcome {
    Loaded,
    NoSave,
    Failed,
}

impl GameSession {
    pub(crate) fn new(profile: PlayerProfile, inventory: Vec<Item>, save_store: SaveStore) -> Self {
        Self {
            profile,
            inventory,
            roster: TeammateRoster::default(),
            points: 0,
            notice: None,
            forwarded_actions: Vec::new(),
            save_store,
            save_meta: None,
        }
    }

    /// Re-reads the slot header from disk. An unreadable slot shows as
    /// empty.
    pub(crate) fn refresh_save_meta(&mut self) {
        self.save_meta = match self.save_store.peek_meta() {
            Ok(meta) => meta,
            Err(error) => {
                warn!(error = %error, "save_meta_unreadable");
                None
            }
        };
    }

    pub(crate) fn save_meta(&self) -> Option<&SaveMeta> {
        self.save_meta.as_ref()
    }

    pub(crate) fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub(crate) fn inventory(&self) -> &[Item] {
        &self.inventory
    }

    pub(crate) fn roster(&self) -> &TeammateRoster {
        &self.roster
    }

    pub(crate) fn points(&self) -> u32 {
        self.points
    }

    /// Action strings nothing in the game consumes, oldest first.
    #[cfg(test)]
    pub(crate) fn forwarded_actions(&self) -> &[String] {
        &self.forwarded_actions
    }

    pub(crate) fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub(crate) fn notify(&mut self, message: &str) {
        info!(message, "notice_shown");
        self.notice = Some(Notice {
            message: message.to_string(),
            remaining_seconds: NOTICE_SECONDS,
        });
    }

    /// Ages the current notice and drops it once its time is up.
    pub(crate) fn tick(&mut self, dt_seconds: f32) {
        let Some(notice) = &mut self.notice else {
            return;
        };
        notice.remaining_seconds -= dt_seconds;
        if notice.remaining_seconds <= 0.0 {
            self.notice = None;
        }
    }

    pub(crate) fn recruit(&mut self, id: &str) -> bool {
        if !self.roster.recruit(id) {
            debug!(teammate = id, "recruit_ignored_duplicate");
            return false;
        }
        info!(teammate = id, teammate_count = self.roster.len(), "teammate_recruited");
        self.notify(RECRUITED_NOTICE);
        true
    }

    pub(crate) fn to_save_data(&self, timestamp_ms: u64) -> SaveData {
        SaveData::new(
            self.profile.clone(),
            self.inventory.clone(),
            self.roster.ids().to_vec(),
            self.points,
            timestamp_ms,
        )
    }

    pub(crate) fn apply_save_data(&mut self, data: SaveData) {
        self.profile = data.player;
        self.inventory = data.inventory;
        self.roster = TeammateRoster::from_ids(data.teammates);
        self.points = data.points;
    }

    pub(crate) fn save_game(&mut self) -> Result<(), SaveError> {
        let data = self.to_save_data(super::save::now_timestamp_ms());
        match self.save_store.save_with_meta(&data) {
            Ok(meta) => {
                info!(path = %self.save_store.path().display(), "game_saved");
                self.save_meta = Some(meta);
                self.notify(SAVED_NOTICE);
                Ok(())
            }
            Err(error) => {
                warn!(error = %error, "game_save_failed");
                self.notify(SAVE_FAILED_NOTICE);
                Err(error)
            }
        }
    }

    pub(crate) fn load_game(&mut self) -> LoadOutcome {
        match self.save_store.load() {
            Ok(Some(data)) => {
                self.save_meta = Some(SaveMeta::of(&data));
                self.apply_save_data(data);
                info!(
                    path = %self.save_store.path().display(),
                    teammate_count = self.roster.len(),
                    "game_loaded"
                );
                self.notify(LOADED_NOTICE);
                LoadOutcome::Loaded
            }
            Ok(None) => {
                info!(path = %self.save_store.path().display(), "game_load_no_save");
                self.save_meta = None;
                self.notify(NO_SAVE_NOTICE);
                LoadOutcome::NoSave
            }
            Err(error) => {
                warn!(error = %error, "game_load_failed");
                self.notify(LOAD_CORRUPT_NOTICE);
                LoadOutcome::Failed
            }
        }
    }

    /// Empties the save slot. In-memory state is untouched.
    pub(crate) fn delete_save(&mut self) -> Result<bool, SaveError> {
        match self.save_store.delete() {
            Ok(true) => {
                self.save_meta = None;
                self.notify(DELETED_NOTICE);
                Ok(true)
            }
            Ok(false) => {
                self.save_meta = None;
                self.notify(NO_SAVE_NOTICE);
                Ok(false)
            }
            Err(error) => {
                warn!(error = %error, "game_delete_failed");
                self.notify(DELETE_FAILED_NOTICE);
                Err(error)
            }
        }
    }
}

impl DialogueActionSink for GameSession {
    fn dispatch(&mut self, action: DialogueAction) {
        match action {
            DialogueAction::RecruitRequested(id) => {
                self.recruit(&id);
            }
            DialogueAction::Unhandled(raw) => {
                info!(action = %raw, "dialogue_action_forwarded");
                self.forwarded_actions.push(raw);
            }
        }
    }
}
