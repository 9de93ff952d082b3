use engine::Vec2;

use super::dialogue::DialogueNode;
use super::hub::HubNpc;
use super::world::{EntityKind, WorldEntity};
use crate::app::save::SaveMeta;
use crate::app::session::{GameSession, TeammateRoster};

const SETTINGS_KEYS: &str = "F5: save  F9: load  Del: delete  Q: quit  Esc: close";

pub(crate) fn with_notice(session: &GameSession, body: String) -> String {
    match session.notice() {
        Some(notice) => format!("[{}] {body}", notice.message().to_uppercase()),
        None => body,
    }
}

/// Settings panel text with the save slot summary. `now_ms` is the
/// wall clock used for the slot age.
pub(crate) fn settings_line(meta: Option<&SaveMeta>, now_ms: u64) -> String {
    let slot = match meta {
        Some(meta) => format!(
            "slot: {}, saved {}",
            meta.player_name,
            save_age(meta.timestamp_ms, now_ms)
        ),
        None => "slot: empty".to_string(),
    };
    format!("Settings | {slot} | {SETTINGS_KEYS}")
}

fn save_age(saved_ms: u64, now_ms: u64) -> String {
    let seconds = now_ms.saturating_sub(saved_ms) / 1000;
    match seconds {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{}m ago", seconds / 60),
        3600..=86_399 => format!("{}h ago", seconds / 3600),
        _ => format!("{}d ago", seconds / 86_400),
    }
}

pub(crate) fn dialogue_line(node: &DialogueNode) -> String {
    let options = node
        .options
        .iter()
        .enumerate()
        .map(|(index, option)| format!("{}) {}", index + 1, option.label))
        .collect::<Vec<_>>()
        .join("  ");
    let speaker = match &node.avatar_ref {
        Some(avatar) => format!("{} <{avatar}>", node.speaker_name),
        None => node.speaker_name.clone(),
    };
    format!("{speaker}: {} | {options} | Esc: close", node.text)
}

pub(crate) fn status_line(session: &GameSession) -> String {
    let profile = session.profile();
    let stats = &profile.stats;
    let traits = profile
        .traits
        .iter()
        .map(|item| item.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Status | {} ({}) HP {}/{} STA {}/{} SPI {}/{} | STR {} AGI {} RES {} INT {} LUK {} | traits: {} | items: {} | teammates: {} | points: {} | Tab: close",
        profile.name,
        profile.gender,
        stats.hp,
        stats.max_hp,
        stats.stamina,
        stats.max_stamina,
        stats.spirit,
        stats.max_spirit,
        stats.strength,
        stats.agility,
        stats.resilience,
        stats.intuition,
        stats.luck,
        if traits.is_empty() { "-" } else { traits.as_str() },
        session.inventory().len(),
        session.roster().len(),
        session.points(),
    )
}

pub(crate) fn exploration_line<'a>(
    world_name: &str,
    position: Vec2,
    nearby: impl Iterator<Item = &'a WorldEntity>,
    target: Option<&WorldEntity>,
) -> String {
    let mut line = format!("{world_name} ({:.0}, {:.0})", position.x, position.y);
    let nearby = nearby
        .map(|entity| entity.name.as_str())
        .collect::<Vec<_>>();
    if !nearby.is_empty() {
        line.push_str(&format!(" | nearby: {}", nearby.join(", ")));
    }
    if let Some(target) = target {
        let verb = match target.kind {
            EntityKind::Exit => "enter",
            EntityKind::Item => "inspect",
            EntityKind::Npc | EntityKind::Enemy => "talk to",
        };
        line.push_str(&format!(" | E: {verb} {}", target.name));
    }
    line.push_str(" | Tab: status  Esc: settings");
    line
}

/// One-line profile card for the NPC being talked to.
pub(crate) fn npc_card(npc: &HubNpc) -> String {
    let mut card = format!("{} [{}] {}", npc.name, npc.role, npc.personality);
    if !npc.description.is_empty() {
        card.push_str(&format!(": {}", npc.description));
    }
    if !npc.stats.is_empty() {
        let stats = npc
            .stats
            .iter()
            .map(|(name, value)| format!("{name} {value}"))
            .collect::<Vec<_>>()
            .join(", ");
        card.push_str(&format!(" ({stats})"));
    }
    card
}

pub(crate) fn hub_line(npcs: &[HubNpc], roster: &TeammateRoster) -> String {
    let entries = npcs
        .iter()
        .enumerate()
        .map(|(index, npc)| {
            let marker = if roster.contains(&npc.id) { " *" } else { "" };
            format!("{}) {} [{}]{marker}", index + 1, npc.name, npc.role)
        })
        .collect::<Vec<_>>()
        .join("  ");
    format!("Hub | {entries} | Enter: enter map  Tab: status  Esc: settings")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::dialogue::DialogueOption;

    fn entity(name: &str, kind: EntityKind) -> WorldEntity {
        WorldEntity {
            id: name.to_string(),
            name: name.to_string(),
            kind,
            position: Vec2::new(0.0, 0.0),
            color: [0, 0, 0, 255],
            radius: 10.0,
            dialogue_id: None,
            interactable: true,
        }
    }

    #[test]
    fn dialogue_line_numbers_options_from_one() {
        let node = DialogueNode {
            id: "a".to_string(),
            speaker_name: "雷虎".to_string(),
            text: "过来帮忙！".to_string(),
            avatar_ref: None,
            options: vec![
                DialogueOption {
                    label: "我来帮你！".to_string(),
                    next_id: None,
                    action: None,
                },
                DialogueOption {
                    label: "你自己保重。".to_string(),
                    next_id: None,
                    action: None,
                },
            ],
        };
        assert_eq!(
            dialogue_line(&node),
            "雷虎: 过来帮忙！ | 1) 我来帮你！  2) 你自己保重。 | Esc: close"
        );
    }

    #[test]
    fn dialogue_line_tags_speaker_with_avatar() {
        let node = DialogueNode {
            id: "a".to_string(),
            speaker_name: "雷虎".to_string(),
            text: "...".to_string(),
            avatar_ref: Some("npc_avatar_1".to_string()),
            options: vec![DialogueOption {
                label: "走".to_string(),
                next_id: None,
                action: None,
            }],
        };
        assert_eq!(dialogue_line(&node), "雷虎 <npc_avatar_1>: ... | 1) 走 | Esc: close");
    }

    #[test]
    fn settings_line_shows_slot_owner_and_age() {
        let meta = SaveMeta {
            player_name: "林".to_string(),
            timestamp_ms: 1_000_000,
        };
        assert_eq!(
            settings_line(Some(&meta), 1_000_000 + 5 * 60_000 + 30_000),
            "Settings | slot: 林, saved 5m ago | F5: save  F9: load  Del: delete  Q: quit  Esc: close"
        );
        assert!(settings_line(Some(&meta), 1_000_500).contains("saved just now"));
        assert!(settings_line(Some(&meta), 1_000_000 + 2 * 86_400_000).contains("saved 2d ago"));
        assert!(settings_line(None, 0).starts_with("Settings | slot: empty |"));
    }

    #[test]
    fn exploration_line_prompts_for_target() {
        let exit = entity("传送光柱", EntityKind::Exit);
        let enemy = entity("丧尸", EntityKind::Enemy);
        let line = exploration_line(
            "Dark Alley",
            Vec2::new(1000.0, 1000.0),
            [&enemy, &exit].into_iter(),
            Some(&exit),
        );
        assert_eq!(
            line,
            "Dark Alley (1000, 1000) | nearby: 丧尸, 传送光柱 | E: enter 传送光柱 | Tab: status  Esc: settings"
        );
    }

    #[test]
    fn npc_card_lists_stats_in_name_order() {
        let npc = HubNpc {
            id: "npc_veteran".to_string(),
            name: "雷虎".to_string(),
            role: "强攻手".to_string(),
            description: "满脸伤疤".to_string(),
            personality: "Aggressive".to_string(),
            color: [0, 0, 0, 255],
            dialogue_id: "a".to_string(),
            recruited_dialogue_id: None,
            stats: [("strength".to_string(), 12), ("physical".to_string(), 40)]
                .into_iter()
                .collect(),
        };
        assert_eq!(
            npc_card(&npc),
            "雷虎 [强攻手] Aggressive: 满脸伤疤 (physical 40, strength 12)"
        );
    }

    #[test]
    fn exploration_line_without_neighbors_has_no_prompt() {
        let line = exploration_line("Dark Alley", Vec2::new(60.4, 70.6), std::iter::empty(), None);
        assert_eq!(line, "Dark Alley (60, 71) | Tab: status  Esc: settings");
    }
}
