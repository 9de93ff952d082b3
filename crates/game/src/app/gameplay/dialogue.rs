use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, info};

const RECRUIT_ACTION_PREFIX: &str = "recruit_";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct DialogueOption {
    pub(crate) label: String,
    #[serde(default)]
    pub(crate) next_id: Option<String>,
    #[serde(default)]
    pub(crate) action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct DialogueNode {
    pub(crate) id: String,
    pub(crate) speaker_name: String,
    pub(crate) text: String,
    #[serde(default)]
    pub(crate) avatar_ref: Option<String>,
    #[serde(default)]
    pub(crate) options: Vec<DialogueOption>,
}

/// Node id to node table. Assembled once at load time and never mutated.
#[derive(Debug, Clone, Default)]
pub(crate) struct DialogueGraph {
    nodes: HashMap<String, DialogueNode>,
}

impl DialogueGraph {
    /// Fails with the first repeated node id.
    pub(crate) fn from_nodes(nodes: Vec<DialogueNode>) -> Result<Self, String> {
        let mut by_id = HashMap::with_capacity(nodes.len());
        for node in nodes {
            if by_id.contains_key(&node.id) {
                return Err(node.id);
            }
            by_id.insert(node.id.clone(), node);
        }
        Ok(Self { nodes: by_id })
    }

    pub(crate) fn get(&self, id: &str) -> Option<&DialogueNode> {
        self.nodes.get(id)
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `(node_id, next_id)` pairs whose target is missing, sorted for stable logs.
    pub(crate) fn dangling_links(&self) -> Vec<(String, String)> {
        let mut dangling = self
            .nodes
            .values()
            .flat_map(|node| {
                node.options.iter().filter_map(move |option| {
                    let next_id = option.next_id.as_deref()?;
                    (!self.contains(next_id)).then(|| (node.id.clone(), next_id.to_string()))
                })
            })
            .collect::<Vec<_>>();
        dangling.sort();
        dangling
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DialogueAction {
    RecruitRequested(String),
    Unhandled(String),
}

impl DialogueAction {
    pub(crate) fn parse(raw: &str) -> Self {
        match raw.strip_prefix(RECRUIT_ACTION_PREFIX) {
            Some(entity_id) if !entity_id.is_empty() => {
                Self::RecruitRequested(entity_id.to_string())
            }
            _ => Self::Unhandled(raw.to_string()),
        }
    }
}

pub(crate) trait DialogueActionSink {
    fn dispatch(&mut self, action: DialogueAction);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum DialogueCursor {
    #[default]
    Closed,
    Open(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectOutcome {
    Ignored,
    Advanced(String),
    Closed,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DialogueWalker {
    cursor: DialogueCursor,
}

impl DialogueWalker {
    #[cfg(test)]
    pub(crate) fn cursor(&self) -> &DialogueCursor {
        &self.cursor
    }

    pub(crate) fn is_open(&self) -> bool {
        matches!(self.cursor, DialogueCursor::Open(_))
    }

    pub(crate) fn current_node<'g>(&self, graph: &'g DialogueGraph) -> Option<&'g DialogueNode> {
        match &self.cursor {
            DialogueCursor::Open(node_id) => graph.get(node_id),
            DialogueCursor::Closed => None,
        }
    }

    /// Opens `node_id` if the graph has it. A missing node leaves the cursor
    /// untouched and returns `false`.
    pub(crate) fn open(&mut self, graph: &DialogueGraph, node_id: &str) -> bool {
        let Some(node) = graph.get(node_id) else {
            return false;
        };
        info!(node = %node.id, speaker = %node.speaker_name, "dialogue_opened");
        self.cursor = DialogueCursor::Open(node.id.clone());
        true
    }

    pub(crate) fn close(&mut self) {
        if let DialogueCursor::Open(node_id) = &self.cursor {
            info!(node = %node_id, "dialogue_closed");
        }
        self.cursor = DialogueCursor::Closed;
    }

    /// Applies option `index` of the open node. The option's action reaches
    /// `sink` before the cursor moves.
    pub(crate) fn select_option(
        &mut self,
        graph: &DialogueGraph,
        index: usize,
        sink: &mut dyn DialogueActionSink,
    ) -> SelectOutcome {
        let Some(node) = self.current_node(graph) else {
            return SelectOutcome::Ignored;
        };
        let Some(option) = node.options.get(index) else {
            debug!(
                node = %node.id,
                index,
                option_count = node.options.len(),
                "dialogue_option_out_of_range"
            );
            return SelectOutcome::Ignored;
        };

        if let Some(raw_action) = option.action.as_deref() {
            sink.dispatch(DialogueAction::parse(raw_action));
        }

        match option.next_id.as_deref().and_then(|next_id| graph.get(next_id)) {
            Some(next) => {
                self.cursor = DialogueCursor::Open(next.id.clone());
                SelectOutcome::Advanced(next.id.clone())
            }
            None => {
                self.close();
                SelectOutcome::Closed
            }
        }
    }
}
