use std::cell::RefCell;

use engine::InputSnapshot;
use tracing::{debug, info};

use crate::app::session::{GameSession, LoadOutcome};

/// What the settings keys asked the active scene to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SettingsOutcome {
    Stay,
    Loaded,
    Quit,
}

/// Applies save, delete, load and quit keys while the settings overlay is
/// open. Save and delete failures have already been shown as notices.
pub(crate) fn apply_settings_input(
    input: &InputSnapshot,
    session: &RefCell<GameSession>,
) -> SettingsOutcome {
    let mut session = session.borrow_mut();
    if input.save_pressed() {
        if let Err(error) = session.save_game() {
            debug!(error = %error, "settings_save_not_written");
        }
    }
    if input.delete_pressed() {
        if let Err(error) = session.delete_save() {
            debug!(error = %error, "settings_delete_not_applied");
        }
    }
    if input.load_pressed() && session.load_game() == LoadOutcome::Loaded {
        return SettingsOutcome::Loaded;
    }
    if input.quit_pressed() {
        info!("settings_quit");
        return SettingsOutcome::Quit;
    }
    SettingsOutcome::Stay
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::save::SaveStore;
    use crate::app::session::{PlayerProfile, PlayerStats, DELETED_NOTICE, SAVED_NOTICE};

    fn session_in(dir: &std::path::Path) -> RefCell<GameSession> {
        let profile = PlayerProfile {
            name: "Ada".to_string(),
            gender: "female".to_string(),
            stats: PlayerStats::default(),
            traits: Vec::new(),
        };
        RefCell::new(GameSession::new(profile, Vec::new(), SaveStore::in_dir(dir)))
    }

    fn notice(session: &RefCell<GameSession>) -> Option<String> {
        session
            .borrow()
            .notice()
            .map(|notice| notice.message().to_string())
    }

    #[test]
    fn quiet_tick_stays() {
        let temp = tempfile::tempdir().expect("tempdir");
        let session = session_in(temp.path());
        assert_eq!(
            apply_settings_input(&InputSnapshot::empty(), &session),
            SettingsOutcome::Stay
        );
        assert!(notice(&session).is_none());
    }

    #[test]
    fn save_then_delete_updates_slot() {
        let temp = tempfile::tempdir().expect("tempdir");
        let session = session_in(temp.path());

        let save = InputSnapshot::empty().with_save_pressed(true);
        assert_eq!(apply_settings_input(&save, &session), SettingsOutcome::Stay);
        assert_eq!(notice(&session).as_deref(), Some(SAVED_NOTICE));
        assert!(session.borrow().save_meta().is_some());

        let delete = InputSnapshot::empty().with_delete_pressed(true);
        assert_eq!(apply_settings_input(&delete, &session), SettingsOutcome::Stay);
        assert_eq!(notice(&session).as_deref(), Some(DELETED_NOTICE));
        assert!(session.borrow().save_meta().is_none());
    }

    #[test]
    fn load_wins_over_quit_in_the_same_tick() {
        let temp = tempfile::tempdir().expect("tempdir");
        let session = session_in(temp.path());
        session.borrow_mut().save_game().expect("save");

        let input = InputSnapshot::empty()
            .with_load_pressed(true)
            .with_quit_pressed(true);
        assert_eq!(apply_settings_input(&input, &session), SettingsOutcome::Loaded);

        let quit = InputSnapshot::empty().with_quit_pressed(true);
        assert_eq!(apply_settings_input(&quit, &session), SettingsOutcome::Quit);
    }
}
