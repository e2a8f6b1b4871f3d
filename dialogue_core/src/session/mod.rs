//! Dialogue session - drives one conversation through a graph.
//!
//! ```text
//! Idle --start--> Displaying(talk) --advance--> Displaying(talk) | Choices(end)
//! Choices(end) --choose--> Idle
//! any --abandon--> Idle
//! ```
//!
//! Every operation runs to completion before returning. A session borrows
//! its graph and ambient state for the conversation; the host owns both,
//! along with the shared [`EventRegistry`].

mod state;

pub use state::*;

use npc_state::AmbientState;
use std::sync::Arc;

use crate::config::DialogueConfig;
use crate::dispatch::EventRegistry;
use crate::error::{DialogueError, Result};
use crate::graph::{Choice, DialogueGraph, DialogueNode, NodeType};
use crate::resolver::resolve_next;

type Listener = Box<dyn Fn() + Send + Sync>;

/// One conversation with one NPC.
pub struct DialogueSession<'g> {
    registry: Arc<EventRegistry>,
    config: DialogueConfig,
    graph: Option<&'g DialogueGraph>,
    ambient: Option<&'g AmbientState>,
    state: SessionState<'g>,
    started_listeners: Vec<Listener>,
    ended_listeners: Vec<Listener>,
}

impl<'g> DialogueSession<'g> {
    /// Create an idle session publishing into `registry`.
    pub fn new(registry: Arc<EventRegistry>, config: DialogueConfig) -> Self {
        Self {
            registry,
            config,
            graph: None,
            ambient: None,
            state: SessionState::Idle,
            started_listeners: Vec::new(),
            ended_listeners: Vec::new(),
        }
    }

    /// Create an idle session with the default config.
    pub fn with_defaults(registry: Arc<EventRegistry>) -> Self {
        Self::new(registry, DialogueConfig::default())
    }

    /// Register a listener for "dialogue started".
    pub fn on_started(&mut self, listener: impl Fn() + Send + Sync + 'static) {
        self.started_listeners.push(Box::new(listener));
    }

    /// Register a listener for "dialogue ended".
    pub fn on_ended(&mut self, listener: impl Fn() + Send + Sync + 'static) {
        self.ended_listeners.push(Box::new(listener));
    }

    /// Begin a conversation at the graph's entry node.
    ///
    /// The entry node is found through the configured entry convention.
    /// Fails with `NodeNotFound` if it does not exist, with `NoChoices` if it
    /// is an end node offering nothing, with `GraphBusy` if another session
    /// holds the graph, and with `InvalidTransition` if this session is
    /// already running.
    pub fn start(
        &mut self,
        graph: &'g DialogueGraph,
        ambient: &'g AmbientState,
    ) -> Result<&'g DialogueNode> {
        if !self.state.is_idle() {
            return Err(self.reject("start"));
        }
        if !graph.try_occupy() {
            tracing::warn!("dialogue graph already has an active session");
            return Err(DialogueError::GraphBusy);
        }

        let entry_id = self.config.entry.entry_id(ambient);
        let entry = match graph.get(&entry_id).and_then(playable) {
            Ok(node) => node,
            Err(err) => {
                graph.release();
                tracing::warn!(entry = %entry_id, error = %err, "dialogue entry unusable");
                return Err(err);
            }
        };

        self.graph = Some(graph);
        self.ambient = Some(ambient);
        tracing::info!(entry = %entry.id, stage = %ambient.speaker_stage, "dialogue started");
        for listener in &self.started_listeners {
            listener();
        }

        self.enter(entry);
        Ok(entry)
    }

    /// Move from the current talk node to its resolved successor.
    ///
    /// Only valid while displaying a talk node. A missing successor, an end
    /// node without choices, or an unset condition under the fail-fast
    /// policy ends the session and returns the error.
    pub fn advance(&mut self) -> Result<&'g DialogueNode> {
        let (node, talk) = match self.state {
            SessionState::Displaying(node) => match node.as_talk() {
                Some(talk) => (node, talk),
                None => return Err(self.reject("advance")),
            },
            _ => return Err(self.reject("advance")),
        };
        let (Some(graph), Some(ambient)) = (self.graph, self.ambient) else {
            return Err(self.reject("advance"));
        };

        let next = resolve_next(&node.id, talk, ambient, self.config.missing_condition)
            .and_then(|next_id| graph.get(next_id))
            .and_then(playable);

        match next {
            Ok(next) => {
                tracing::debug!(from = %node.id, to = %next.id, "dialogue advanced");
                self.enter(next);
                Ok(next)
            }
            Err(err) => {
                tracing::warn!(node = %node.id, error = %err, "dialogue terminated");
                self.finish();
                Err(err)
            }
        }
    }

    /// Pick a choice at the current end node.
    ///
    /// Publishes the choice's payload, ends the conversation, and returns
    /// the number of handlers that received the payload.
    pub fn choose(&mut self, index: usize) -> Result<usize> {
        let SessionState::Choices(node) = self.state else {
            return Err(self.reject("choose"));
        };
        let choices = self.state.choices();
        let Some(choice) = choices.get(index) else {
            let available = choices.len();
            tracing::warn!(node = %node.id, index, available, "choice out of range");
            return Err(DialogueError::ChoiceOutOfRange { index, available });
        };

        tracing::debug!(node = %node.id, index, event = %choice.event_kind, "choice selected");
        let delivered = self.registry.publish_choice(choice);
        self.finish();
        Ok(delivered)
    }

    /// Force the session back to idle. Safe from any state; a no-op when
    /// already idle.
    pub fn abandon(&mut self) {
        if self.state.is_idle() {
            return;
        }
        tracing::debug!(state = %self.state, "dialogue abandoned");
        self.finish();
    }

    pub fn state(&self) -> SessionState<'g> {
        self.state
    }

    pub fn current_node(&self) -> Option<&'g DialogueNode> {
        self.state.node()
    }

    /// Choices on offer. Empty unless the session is at an end node.
    pub fn choices(&self) -> &'g [Choice] {
        self.state.choices()
    }

    /// The graph being traversed, if a conversation is running.
    pub fn graph(&self) -> Option<&'g DialogueGraph> {
        self.graph
    }

    pub fn is_active(&self) -> bool {
        !self.state.is_idle()
    }

    pub fn config(&self) -> &DialogueConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<EventRegistry> {
        &self.registry
    }

    fn enter(&mut self, node: &'g DialogueNode) {
        self.state = match node.node_type() {
            NodeType::Talk => SessionState::Displaying(node),
            NodeType::End => SessionState::Choices(node),
        };
    }

    fn reject(&self, action: &'static str) -> DialogueError {
        tracing::warn!(action, state = %self.state, "invalid dialogue transition");
        DialogueError::InvalidTransition {
            action,
            state: self.state.to_string(),
        }
    }

    fn finish(&mut self) {
        if let Some(graph) = self.graph.take() {
            graph.release();
        }
        self.ambient = None;
        self.state = SessionState::Idle;

        tracing::info!("dialogue ended");
        for listener in &self.ended_listeners {
            listener();
        }
    }
}

/// Reject end nodes a session could never leave.
fn playable(node: &DialogueNode) -> Result<&DialogueNode> {
    if node.as_end().is_some_and(|end| end.choices.is_empty()) {
        return Err(DialogueError::NoChoices {
            node: node.id.clone(),
        });
    }
    Ok(node)
}

impl Drop for DialogueSession<'_> {
    fn drop(&mut self) {
        if let Some(graph) = self.graph.take() {
            graph.release();
        }
    }
}

impl std::fmt::Debug for DialogueSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueSession")
            .field("state", &self.state.to_string())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionKind;
    use crate::config::{EntryConvention, MissingConditionPolicy};
    use crate::dispatch::{DialogueEventKind, Handler};
    use crate::graph::Transition;
    use npc_state::{DialogueStage, Item};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn quest_graph() -> DialogueGraph {
        let done = ConditionKind::stage_is(DialogueStage::QuestComplete);
        let met = ConditionKind::stage_is(DialogueStage::HasMet);
        let accept = Choice::new("I'll find it.", DialogueEventKind::AcceptQuest)
            .with_parameter("lost_ring");
        let reward = Choice::new("Thank you.", DialogueEventKind::GiveItem)
            .with_object(Item::new("Silver Ring"));

        DialogueGraph::from_nodes([
            DialogueNode::talk("Default", "Ah, you again.", "Stranger")
                .with_transition(done, "Thanks")
                .with_transition(met, "Offer"),
            DialogueNode::talk("Stranger", "Who are you?", "Offer"),
            DialogueNode::end("Offer", "Will you find my ring?")
                .with_choice(accept)
                .with_choice(Choice::new("No.", DialogueEventKind::RejectQuest)),
            DialogueNode::end("Thanks", "Take this as thanks.").with_choice(reward),
        ])
        .unwrap()
    }

    fn session<'g>() -> DialogueSession<'g> {
        DialogueSession::with_defaults(Arc::new(EventRegistry::new()))
    }

    fn action_of(err: DialogueError) -> Option<&'static str> {
        match err {
            DialogueError::InvalidTransition { action, .. } => Some(action),
            _ => None,
        }
    }

    fn counted(session: &mut DialogueSession<'_>) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let started = Arc::new(AtomicUsize::new(0));
        let ended = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&started);
        let e = Arc::clone(&ended);
        session.on_started(move || {
            s.fetch_add(1, Ordering::SeqCst);
        });
        session.on_ended(move || {
            e.fetch_add(1, Ordering::SeqCst);
        });
        (started, ended)
    }

    #[test]
    fn test_start_enters_default_node() {
        let graph = quest_graph();
        let ambient = AmbientState::new(DialogueStage::HasNotMet);
        let mut session = DialogueSession::with_defaults(Arc::new(EventRegistry::new()));
        let (started, _) = counted(&mut session);

        let node = session.start(&graph, &ambient).unwrap();

        assert_eq!(node.id, "Default");
        assert!(matches!(session.state(), SessionState::Displaying(n) if n.id == "Default"));
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert!(graph.is_occupied());
    }

    #[test]
    fn test_advance_follows_condition() {
        let graph = quest_graph();
        let ambient = AmbientState::new(DialogueStage::HasMet);
        let mut session = session();

        session.start(&graph, &ambient).unwrap();
        let node = session.advance().unwrap();

        assert_eq!(node.id, "Offer");
        assert_eq!(session.choices().len(), 2);
        assert!(matches!(session.state(), SessionState::Choices(_)));
    }

    #[test]
    fn test_choose_publishes_and_ends() {
        let graph = quest_graph();
        let ambient = AmbientState::new(DialogueStage::HasMet);
        let registry = Arc::new(EventRegistry::new());
        let accepted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&accepted);
        registry.on(DialogueEventKind::AcceptQuest, move |quest: &String| {
            sink.lock().push(quest.clone());
        });

        let mut session = DialogueSession::with_defaults(Arc::clone(&registry));
        let (_, ended) = counted(&mut session);
        session.start(&graph, &ambient).unwrap();
        session.advance().unwrap();

        assert_eq!(session.choose(0).unwrap(), 1);
        assert_eq!(*accepted.lock(), vec!["lost_ring".to_string()]);
        assert!(session.state().is_idle());
        assert!(session.current_node().is_none());
        assert!(session.graph().is_none());
        assert_eq!(ended.load(Ordering::SeqCst), 1);
        assert!(!graph.is_occupied());
    }

    #[test]
    fn test_choose_object_payload() {
        let graph = quest_graph();
        let ambient = AmbientState::new(DialogueStage::QuestComplete);
        let registry = Arc::new(EventRegistry::new());
        let rewards = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&rewards);
        registry.on(DialogueEventKind::GiveItem, move |item: &Item| {
            sink.lock().push(item.name.clone());
        });
        let strings = Handler::new(|_: &String| panic!("string payload not expected"));
        registry.subscribe(DialogueEventKind::GiveItem, &strings);

        let mut session = DialogueSession::with_defaults(registry);
        session.start(&graph, &ambient).unwrap();
        assert_eq!(session.advance().unwrap().id, "Thanks");
        session.choose(0).unwrap();

        assert_eq!(*rewards.lock(), vec!["Silver Ring".to_string()]);
    }

    #[test]
    fn test_advance_on_end_node_is_rejected() {
        let graph = quest_graph();
        let ambient = AmbientState::new(DialogueStage::HasMet);
        let mut session = session();
        session.start(&graph, &ambient).unwrap();
        session.advance().unwrap();

        let err = session.advance().unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(action_of(err), Some("advance"));
        assert!(matches!(session.state(), SessionState::Choices(n) if n.id == "Offer"));
    }

    #[test]
    fn test_choose_outside_choices_is_rejected() {
        let graph = quest_graph();
        let ambient = AmbientState::default();
        let mut session = session();

        assert_eq!(action_of(session.choose(0).unwrap_err()), Some("choose"));

        session.start(&graph, &ambient).unwrap();
        assert_eq!(action_of(session.choose(0).unwrap_err()), Some("choose"));
        assert!(session.is_active());
    }

    #[test]
    fn test_choice_out_of_range_keeps_state() {
        let graph = quest_graph();
        let ambient = AmbientState::new(DialogueStage::HasMet);
        let mut session = session();
        session.start(&graph, &ambient).unwrap();
        session.advance().unwrap();

        let err = session.choose(5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "choice index 5 out of range (2 choices available)"
        );
        assert!(matches!(session.state(), SessionState::Choices(_)));
        assert!(session.choose(1).is_ok());
    }

    #[test]
    fn test_advance_while_idle_is_rejected() {
        let mut session = session();
        assert_eq!(action_of(session.advance().unwrap_err()), Some("advance"));
    }

    #[test]
    fn test_missing_entry_is_lookup_error() {
        let graph = DialogueGraph::from_nodes([DialogueNode::end("Only", "...")]).unwrap();
        let ambient = AmbientState::default();
        let mut session = session();
        let (started, ended) = counted(&mut session);

        let err = session.start(&graph, &ambient).unwrap_err();

        assert!(matches!(err, DialogueError::NodeNotFound { ref id } if id == "Default"));
        assert!(session.state().is_idle());
        assert!(!graph.is_occupied());
        assert_eq!(started.load(Ordering::SeqCst), 0);
        assert_eq!(ended.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dangling_target_terminates_session() {
        let dangling = DialogueNode::talk("Default", "Hm.", "Gone");
        let graph = DialogueGraph::from_nodes([dangling]).unwrap();
        let ambient = AmbientState::default();
        let mut session = session();
        let (_, ended) = counted(&mut session);
        session.start(&graph, &ambient).unwrap();

        let err = session.advance().unwrap_err();

        assert!(err.is_fatal());
        assert!(matches!(err, DialogueError::NodeNotFound { ref id } if id == "Gone"));
        assert!(session.state().is_idle());
        assert_eq!(ended.load(Ordering::SeqCst), 1);
        assert!(!graph.is_occupied());
    }

    #[test]
    fn test_advance_into_end_without_choices_terminates() {
        let graph = DialogueGraph::from_nodes([
            DialogueNode::talk("Default", "Hm.", "Silence"),
            DialogueNode::end("Silence", "..."),
        ])
        .unwrap();
        let ambient = AmbientState::default();
        let mut session = session();
        let (_, ended) = counted(&mut session);
        session.start(&graph, &ambient).unwrap();

        let err = session.advance().unwrap_err();

        assert!(err.is_fatal());
        assert!(matches!(err, DialogueError::NoChoices { ref node } if node == "Silence"));
        assert!(session.state().is_idle());
        assert!(session.choose(0).is_err());
        assert_eq!(ended.load(Ordering::SeqCst), 1);
        assert!(!graph.is_occupied());
    }

    #[test]
    fn test_entry_end_without_choices_fails_start() {
        let graph = DialogueGraph::from_nodes([DialogueNode::end("Default", "...")]).unwrap();
        let ambient = AmbientState::default();
        let mut session = session();
        let (started, ended) = counted(&mut session);

        let err = session.start(&graph, &ambient).unwrap_err();

        assert!(matches!(err, DialogueError::NoChoices { ref node } if node == "Default"));
        assert!(session.state().is_idle());
        assert!(!graph.is_occupied());
        assert_eq!(started.load(Ordering::SeqCst), 0);
        assert_eq!(ended.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_condition_fail_fast_terminates() {
        let mut gate = DialogueNode::talk("Default", "Hm.", "Bye");
        if let crate::graph::NodeKind::Talk(talk) = &mut gate.kind {
            talk.transitions.push(Transition::unconditioned("Bye"));
        }
        let graph = DialogueGraph::from_nodes([gate, DialogueNode::end("Bye", "...")]).unwrap();
        let ambient = AmbientState::default();
        let config =
            DialogueConfig::default().with_missing_condition(MissingConditionPolicy::FailFast);
        let mut session = DialogueSession::new(Arc::new(EventRegistry::new()), config);

        session.start(&graph, &ambient).unwrap();
        let err = session.advance().unwrap_err();

        assert!(matches!(err, DialogueError::MissingCondition { index: 0, .. }));
        assert!(session.state().is_idle());
    }

    #[test]
    fn test_entry_by_stage() {
        let graph = DialogueGraph::from_nodes([
            DialogueNode::talk("2", "Have we met?", "Bye"),
            DialogueNode::talk("3", "Good to see you again.", "Bye"),
            DialogueNode::end("Bye", "..."),
        ])
        .unwrap();
        let ambient = AmbientState::new(DialogueStage::HasMet);
        let config = DialogueConfig::default().with_entry(EntryConvention::ByStage);
        let mut session = DialogueSession::new(Arc::new(EventRegistry::new()), config);

        assert_eq!(session.start(&graph, &ambient).unwrap().id, "3");
    }

    #[test]
    fn test_end_entry_goes_straight_to_choices() {
        let shop = DialogueNode::end("Default", "Buy something?")
            .with_choice(Choice::new("Trade", DialogueEventKind::StartTrade));
        let graph = DialogueGraph::from_nodes([shop]).unwrap();
        let ambient = AmbientState::default();
        let mut session = session();

        session.start(&graph, &ambient).unwrap();
        assert_eq!(session.choices().len(), 1);
    }

    #[test]
    fn test_second_session_on_same_graph_is_busy() {
        let graph = quest_graph();
        let ambient = AmbientState::default();
        let mut first = session();
        let mut second = session();

        first.start(&graph, &ambient).unwrap();
        let err = second.start(&graph, &ambient).unwrap_err();
        assert!(matches!(err, DialogueError::GraphBusy));

        first.abandon();
        assert!(second.start(&graph, &ambient).is_ok());
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let graph = quest_graph();
        let other = quest_graph();
        let ambient = AmbientState::default();
        let mut session = session();

        session.start(&graph, &ambient).unwrap();
        let err = session.start(&other, &ambient).unwrap_err();
        assert_eq!(action_of(err), Some("start"));
        assert!(!other.is_occupied());
    }

    #[test]
    fn test_abandon_is_idempotent() {
        let graph = quest_graph();
        let ambient = AmbientState::default();
        let mut session = session();
        let (_, ended) = counted(&mut session);

        session.abandon();
        assert_eq!(ended.load(Ordering::SeqCst), 0);

        session.start(&graph, &ambient).unwrap();
        session.abandon();
        session.abandon();

        assert!(session.state().is_idle());
        assert_eq!(ended.load(Ordering::SeqCst), 1);
        assert!(!graph.is_occupied());
    }

    #[test]
    fn test_drop_releases_graph() {
        let graph = quest_graph();
        let ambient = AmbientState::default();
        {
            let mut session = session();
            session.start(&graph, &ambient).unwrap();
            assert!(graph.is_occupied());
        }
        assert!(!graph.is_occupied());
    }
}
