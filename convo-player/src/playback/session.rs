//! Conversation playback session
//!
//! Binds one conversation to its part grouping, variation selection, active
//! sequence and a `Sequencer` over that sequence. Changing the selection
//! rebuilds the active sequence and, if it actually changed, stops playback
//! and rebinds the players.
//!
//! Exports of the active sequence should run under `export_token()`. The
//! token is cancelled whenever the sequence it was issued for goes away
//! (a different conversation is loaded or a variation change alters the
//! sequence).

use super::grouping::{
    active_sequence, default_selection, group_by_part, LineGroups, VariationSelection,
};
use super::media::MediaBackend;
use super::sequencer::Sequencer;
use crate::audio::AudioLocator;
use convo_common::{characters, Conversation, ConversationLine, EventBus};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

type BackendFactory<B> = Box<dyn FnMut() -> B>;
type DisplayName = Box<dyn Fn(&str) -> String>;

/// Presentation data for one line of the active sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineView {
    /// Position in the active sequence
    pub index: usize,
    pub part: u32,
    pub variation: u32,

    /// Variations available for this part, first-seen order
    pub variations: Vec<u32>,

    /// Speaker display name
    pub speaker: String,

    /// Present only when the line has a transcription
    pub transcription: Option<String>,

    /// Resolved audio URL or path
    pub source: String,
    pub is_playing: bool,
}

pub struct ConversationSession<B> {
    conversation: Conversation,
    groups: LineGroups,
    selection: VariationSelection,
    active: Vec<ConversationLine>,
    sequencer: Sequencer<B>,
    locator: AudioLocator,
    factory: BackendFactory<B>,
    display_name: DisplayName,
    export_cancel: CancellationToken,
}

impl<B: MediaBackend> ConversationSession<B> {
    /// Open a conversation with its default selection.
    ///
    /// `factory` builds one media backend per line player.
    pub fn new<F>(conversation: Conversation, locator: AudioLocator, factory: F) -> Self
    where
        F: FnMut() -> B + 'static,
    {
        let mut factory: BackendFactory<B> = Box::new(factory);

        let groups = group_by_part(&conversation.lines);
        let selection = default_selection(&groups);
        let active = active_sequence(&conversation.lines, &selection);

        let mut sequencer = Sequencer::new(Vec::new());
        sequencer.set_sources(sources_for(&locator, &active), &mut factory);

        Self {
            conversation,
            groups,
            selection,
            active,
            sequencer,
            locator,
            factory,
            display_name: Box::new(characters::display_name),
            export_cancel: CancellationToken::new(),
        }
    }

    /// Use a custom speaker display-name lookup
    pub fn with_display_name<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> String + 'static,
    {
        self.display_name = Box::new(lookup);
        self
    }

    /// Publish playback events on `bus`
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.sequencer.set_events(bus);
        self
    }

    /// Switch to another conversation, discarding the current selection
    pub fn load(&mut self, conversation: Conversation) {
        info!("Loading conversation {}", conversation.conversation_id);

        self.groups = group_by_part(&conversation.lines);
        self.selection = default_selection(&self.groups);
        self.active = active_sequence(&conversation.lines, &self.selection);
        self.conversation = conversation;
        self.rebind_players();
    }

    /// Select a variation for a part.
    ///
    /// Unknown `(part, variation)` pairs are ignored and return false.
    pub fn set_variation(&mut self, part: u32, variation: u32) -> bool {
        if !self
            .selection
            .set_variation(&self.groups, part, variation)
        {
            return false;
        }

        let next = active_sequence(&self.conversation.lines, &self.selection);
        if next != self.active {
            info!(
                "Part {} now uses variation {}; playback stopped",
                part, variation
            );
            self.active = next;
            self.rebind_players();
        }
        true
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn groups(&self) -> &LineGroups {
        &self.groups
    }

    pub fn selection(&self) -> &VariationSelection {
        &self.selection
    }

    /// The active line sequence, ascending by part
    pub fn active_lines(&self) -> &[ConversationLine] {
        &self.active
    }

    /// Resolved audio sources of the active sequence
    pub fn sources(&self) -> Vec<String> {
        sources_for(&self.locator, &self.active)
    }

    pub fn line_views(&self) -> Vec<LineView> {
        self.active
            .iter()
            .enumerate()
            .map(|(index, line)| LineView {
                index,
                part: line.part,
                variation: line.variation,
                variations: self.groups.variations_for(line.part),
                speaker: (self.display_name)(&line.speaker),
                transcription: line
                    .has_transcription
                    .then(|| line.transcription.clone()),
                source: self.locator.resolve(&line.filename),
                is_playing: self
                    .sequencer
                    .player(index)
                    .is_some_and(|p| p.is_playing()),
            })
            .collect()
    }

    /// Cancellation token for exporting the current active sequence
    pub fn export_token(&self) -> CancellationToken {
        self.export_cancel.clone()
    }

    pub fn sequencer(&self) -> &Sequencer<B> {
        &self.sequencer
    }

    pub fn sequencer_mut(&mut self) -> &mut Sequencer<B> {
        &mut self.sequencer
    }

    fn rebind_players(&mut self) {
        if !self.export_cancel.is_cancelled() {
            debug!("Active sequence replaced; cancelling exports of the old one");
        }
        self.export_cancel.cancel();
        self.export_cancel = CancellationToken::new();

        let sources = sources_for(&self.locator, &self.active);
        self.sequencer.set_sources(sources, &mut self.factory);
    }
}

fn sources_for(locator: &AudioLocator, lines: &[ConversationLine]) -> Vec<String> {
    lines
        .iter()
        .map(|line| locator.resolve(&line.filename))
        .collect()
}
