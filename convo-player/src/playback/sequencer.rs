//! Sequential playback controller
//!
//! Owns one `LinePlayer` per line of the active sequence and drives them
//! through a single `PlaybackMode`:
//!
//! - `Idle` → `PlayingSingle`: one line played on request
//! - `Idle` → `PlayingAll`: every player rewound, index 0 started
//! - `PlayingAll(i)` + ended: advance to `i + 1`, or `Idle` after the last line
//! - any → `Idle`: explicit stop; playing lines are paused, not rewound
//!
//! At most one player is playing at any time: every start first pauses the
//! others. A line that fails to start during `PlayingAll` counts as ended and
//! is skipped.

use super::line_player::{LinePlayer, PlayerNotice};
use super::media::{MediaBackend, MediaEvent};
use crate::error::{Error, Result};
use convo_common::events::PlaybackMode;
use convo_common::{ConvoEvent, EventBus};
use tracing::{debug, info, warn};

pub struct Sequencer<B> {
    players: Vec<LinePlayer<B>>,
    mode: PlaybackMode,
    events: Option<EventBus>,
}

impl<B: MediaBackend> Sequencer<B> {
    pub fn new(players: Vec<LinePlayer<B>>) -> Self {
        Self {
            players,
            mode: PlaybackMode::Idle,
            events: None,
        }
    }

    /// Publish play-state and mode changes on `bus`
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn set_events(&mut self, bus: EventBus) {
        self.events = Some(bus);
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn players(&self) -> &[LinePlayer<B>] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Option<&LinePlayer<B>> {
        self.players.get(index)
    }

    pub fn player_mut(&mut self, index: usize) -> Option<&mut LinePlayer<B>> {
        self.players.get_mut(index)
    }

    /// Indices of players currently playing
    pub fn playing_indices(&self) -> Vec<usize> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_playing())
            .map(|(i, _)| i)
            .collect()
    }

    /// Play one line.
    ///
    /// While playing all, this jumps the sequence to `index` and carries on
    /// from there. Otherwise the line plays on its own.
    pub fn play_line(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;

        if self.mode.is_playing_all() {
            info!("Play all: jumping to line {}", index);
            self.start_all_from(index);
            return Ok(());
        }

        self.pause_others(index);
        match self.players[index].play() {
            Ok(_) => {
                self.emit_play_state(index, true);
                self.set_mode(PlaybackMode::PlayingSingle { index });
                Ok(())
            }
            Err(e) => {
                self.emit_play_state(index, false);
                self.set_mode(PlaybackMode::Idle);
                Err(e)
            }
        }
    }

    /// Pause one line. Pausing the line the mode is playing ends the mode.
    pub fn pause_line(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;

        if self.players[index].is_playing() {
            self.players[index].pause();
            self.emit_play_state(index, false);
        }

        if self.mode.current_index() == Some(index) {
            self.set_mode(PlaybackMode::Idle);
        }
        Ok(())
    }

    /// Play the line if it is paused, pause it if it is playing
    pub fn toggle_line(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;

        if self.players[index].is_playing() {
            self.pause_line(index)
        } else {
            self.play_line(index)
        }
    }

    /// Start "play all" from the top, or stop it if it is already running
    pub fn toggle_play_all(&mut self) {
        if self.mode.is_playing_all() {
            info!("Play all stopped");
            self.stop();
            return;
        }

        if self.players.is_empty() {
            debug!("Play all requested with no lines");
            return;
        }

        for index in 0..self.players.len() {
            if self.players[index].is_playing() {
                self.players[index].pause();
                self.emit_play_state(index, false);
            }
            self.players[index].reset();
        }

        info!("Play all started ({} lines)", self.players.len());
        self.start_all_from(0);
    }

    /// Stop everything and return to `Idle`
    pub fn stop(&mut self) {
        for index in 0..self.players.len() {
            if self.players[index].is_playing() {
                self.players[index].pause();
                self.emit_play_state(index, false);
            }
        }
        self.set_mode(PlaybackMode::Idle);
    }

    /// Feed a backend notification for line `index` into the state machine
    pub fn handle_media_event(&mut self, index: usize, event: MediaEvent) {
        let Some(player) = self.players.get_mut(index) else {
            warn!("Media event for unknown line {}: {:?}", index, event);
            return;
        };

        if let PlayerNotice::Ended(_) = player.handle_media_event(event) {
            self.emit_play_state(index, false);

            match self.mode {
                PlaybackMode::PlayingAll { index: current } if current == index => {
                    self.start_all_from(index + 1);
                }
                PlaybackMode::PlayingSingle { index: current } if current == index => {
                    self.set_mode(PlaybackMode::Idle);
                }
                _ => {}
            }
        }
    }

    /// Collect pending events from every backend, then dispatch them in order
    pub fn pump_media_events<F>(&mut self, mut poll: F)
    where
        F: FnMut(usize, &mut B) -> Vec<MediaEvent>,
    {
        let pending: Vec<(usize, Vec<MediaEvent>)> = self
            .players
            .iter_mut()
            .enumerate()
            .map(|(index, player)| (index, poll(index, player.backend_mut())))
            .collect();

        for (index, events) in pending {
            for event in events {
                self.handle_media_event(index, event);
            }
        }
    }

    /// Replace the bound sources, stopping playback first.
    ///
    /// Existing players are rebound in place; extra ones are built with
    /// `factory`, surplus ones dropped.
    pub fn set_sources<F>(&mut self, sources: Vec<String>, mut factory: F)
    where
        F: FnMut() -> B,
    {
        self.stop();

        let count = sources.len();
        for (index, source) in sources.into_iter().enumerate() {
            match self.players.get_mut(index) {
                Some(player) => {
                    player.rebind(source);
                }
                None => self.players.push(LinePlayer::new(factory(), source)),
            }
        }
        self.players.truncate(count);
    }

    /// Play-all from `index`, skipping lines that fail to start
    fn start_all_from(&mut self, mut index: usize) {
        loop {
            if index >= self.players.len() {
                info!("Play all finished");
                self.set_mode(PlaybackMode::Idle);
                return;
            }

            self.pause_others(index);
            self.set_mode(PlaybackMode::PlayingAll { index });

            match self.players[index].play() {
                Ok(_) => {
                    self.emit_play_state(index, true);
                    return;
                }
                Err(e) => {
                    warn!("Skipping line {}: {}", index, e);
                    self.emit_play_state(index, false);
                    index += 1;
                }
            }
        }
    }

    fn pause_others(&mut self, keep: usize) {
        for index in 0..self.players.len() {
            if index != keep && self.players[index].is_playing() {
                self.players[index].pause();
                self.emit_play_state(index, false);
            }
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.players.len() {
            Ok(())
        } else {
            Err(Error::Playback(format!(
                "line {} out of range ({} lines)",
                index,
                self.players.len()
            )))
        }
    }

    fn set_mode(&mut self, new_mode: PlaybackMode) {
        if new_mode == self.mode {
            return;
        }

        let old_mode = self.mode;
        self.mode = new_mode;
        debug!("Playback mode: {} -> {}", old_mode, new_mode);

        if let Some(bus) = &self.events {
            bus.emit_lossy(ConvoEvent::PlaybackModeChanged {
                mode: new_mode,
                current_index: new_mode.current_index(),
                timestamp: chrono::Utc::now(),
            });
        }
    }

    fn emit_play_state(&self, line_index: usize, is_playing: bool) {
        if let Some(bus) = &self.events {
            bus.emit_lossy(ConvoEvent::PlayStateChanged {
                line_index,
                is_playing,
                timestamp: chrono::Utc::now(),
            });
        }
    }
}
