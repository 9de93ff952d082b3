use tracing::info;

use super::dialogue::DialogueWalker;

/// Modal panels layered over a scene. Either one blocks movement and
/// interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Overlays {
    status_open: bool,
    settings_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CancelOutcome {
    ClosedSettings,
    ClosedStatus,
    ClosedDialogue,
    OpenedSettings,
}

impl Overlays {
    pub(crate) fn is_status_open(&self) -> bool {
        self.status_open
    }

    pub(crate) fn is_settings_open(&self) -> bool {
        self.settings_open
    }

    pub(crate) fn any_open(&self) -> bool {
        self.status_open || self.settings_open
    }

    pub(crate) fn toggle_status(&mut self) {
        self.status_open = !self.status_open;
        info!(status_open = self.status_open, "status_overlay_toggled");
    }

    pub(crate) fn close_all(&mut self) {
        self.status_open = false;
        self.settings_open = false;
    }

    /// Closes the topmost open layer: settings, then status, then the
    /// dialogue. With nothing open, opens settings.
    pub(crate) fn cancel(&mut self, walker: &mut DialogueWalker) -> CancelOutcome {
        if self.settings_open {
            self.settings_open = false;
            CancelOutcome::ClosedSettings
        } else if self.status_open {
            self.status_open = false;
            CancelOutcome::ClosedStatus
        } else if walker.is_open() {
            walker.close();
            CancelOutcome::ClosedDialogue
        } else {
            self.settings_open = true;
            CancelOutcome::OpenedSettings
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::dialogue::{DialogueGraph, DialogueNode};

    fn open_walker() -> DialogueWalker {
        let graph = DialogueGraph::from_nodes(vec![DialogueNode {
            id: "a".to_string(),
            speaker_name: "s".to_string(),
            text: "t".to_string(),
            avatar_ref: None,
            options: Vec::new(),
        }])
        .expect("graph");
        let mut walker = DialogueWalker::default();
        assert!(walker.open(&graph, "a"));
        walker
    }

    #[test]
    fn cancel_cascades_settings_status_dialogue() {
        let mut overlays = Overlays::default();
        let mut walker = open_walker();
        overlays.toggle_status();

        assert_eq!(overlays.cancel(&mut walker), CancelOutcome::ClosedStatus);
        assert!(walker.is_open());
        assert_eq!(overlays.cancel(&mut walker), CancelOutcome::ClosedDialogue);
        assert!(!walker.is_open());
        assert_eq!(overlays.cancel(&mut walker), CancelOutcome::OpenedSettings);
        assert!(overlays.is_settings_open());

        overlays.toggle_status();
        assert_eq!(overlays.cancel(&mut walker), CancelOutcome::ClosedSettings);
        assert!(overlays.is_status_open());
        assert_eq!(overlays.cancel(&mut walker), CancelOutcome::ClosedStatus);
        assert!(!overlays.any_open());
    }

    #[test]
    fn close_all_clears_both_panels() {
        let mut overlays = Overlays::default();
        let mut walker = DialogueWalker::default();
        overlays.cancel(&mut walker);
        overlays.toggle_status();
        assert!(overlays.is_settings_open() && overlays.is_status_open());
        overlays.close_all();
        assert_eq!(overlays, Overlays::default());
    }
}
