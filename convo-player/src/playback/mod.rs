//! Interactive playback: line players, part grouping and "play all" sequencing

pub mod clock;
pub mod grouping;
pub mod line_player;
pub mod media;
pub mod sequencer;
pub mod session;

pub use clock::ClockBackend;
pub use grouping::{active_sequence, default_selection, group_by_part, LineGroups, VariationSelection};
pub use line_player::{LinePlayer, PlayerNotice, PlayerStatus};
pub use media::{MediaBackend, MediaEvent};
pub use sequencer::Sequencer;
pub use session::{ConversationSession, LineView};
