//! Conversation session tests: variation selection driving the active
//! sequence and the players bound to it

mod helpers;

use convo_common::events::PlaybackMode;
use convo_player::audio::AudioLocator;
use convo_player::{ConversationSession, Error, Exporter, MediaEvent};
use helpers::{conversation, line, FakeBackend, HangingFetcher, PlayLog};

fn session_for(
    lines: Vec<convo_common::ConversationLine>,
    log: &PlayLog,
) -> ConversationSession<FakeBackend> {
    let log = log.clone();
    ConversationSession::new(
        conversation("inferno_hornet_01", lines),
        AudioLocator::new("https://cdn.example.com/audioFiles/"),
        move || FakeBackend::new(log.clone()),
    )
}

fn three_parts() -> Vec<convo_common::ConversationLine> {
    vec![
        line(1, 1, "inferno", "p1v1.mp3"),
        line(2, 1, "hornet", "p2v1.mp3"),
        line(2, 2, "hornet", "p2v2.mp3"),
        line(3, 1, "inferno", "p3v1.mp3"),
    ]
}

fn active_files(session: &ConversationSession<FakeBackend>) -> Vec<String> {
    session
        .active_lines()
        .iter()
        .map(|l| l.filename.clone())
        .collect()
}

#[test]
fn test_single_variation_parts_play_in_order() {
    let log = PlayLog::default();
    let mut session = session_for(
        vec![
            line(3, 1, "inferno", "c.mp3"),
            line(1, 1, "inferno", "a.mp3"),
            line(2, 1, "hornet", "b.mp3"),
        ],
        &log,
    );

    assert_eq!(active_files(&session), vec!["a.mp3", "b.mp3", "c.mp3"]);

    let sequencer = session.sequencer_mut();
    sequencer.toggle_play_all();
    for index in 0..3 {
        assert_eq!(sequencer.mode(), PlaybackMode::PlayingAll { index });
        sequencer.handle_media_event(index, MediaEvent::Ended);
    }
    assert_eq!(sequencer.mode(), PlaybackMode::Idle);

    assert_eq!(
        log.entries(),
        vec![
            "https://cdn.example.com/audioFiles/a.mp3",
            "https://cdn.example.com/audioFiles/b.mp3",
            "https://cdn.example.com/audioFiles/c.mp3",
        ]
    );
}

#[test]
fn test_selecting_second_variation() {
    let log = PlayLog::default();
    let mut session = session_for(three_parts(), &log);

    assert_eq!(active_files(&session), vec!["p1v1.mp3", "p2v1.mp3", "p3v1.mp3"]);

    assert!(session.set_variation(2, 2));
    assert_eq!(active_files(&session), vec!["p1v1.mp3", "p2v2.mp3", "p3v1.mp3"]);
    assert_eq!(
        session.sequencer().player(1).unwrap().source(),
        "https://cdn.example.com/audioFiles/p2v2.mp3"
    );
}

#[test]
fn test_unknown_variation_ignored() {
    let log = PlayLog::default();
    let mut session = session_for(three_parts(), &log);
    session.sequencer_mut().toggle_play_all();

    assert!(!session.set_variation(2, 5));
    assert!(!session.set_variation(8, 1));

    assert_eq!(active_files(&session), vec!["p1v1.mp3", "p2v1.mp3", "p3v1.mp3"]);
    assert_eq!(
        session.sequencer().mode(),
        PlaybackMode::PlayingAll { index: 0 }
    );
}

#[test]
fn test_variation_change_during_play_all_stops_playback() {
    let log = PlayLog::default();
    let mut session = session_for(three_parts(), &log);

    session.sequencer_mut().toggle_play_all();
    session
        .sequencer_mut()
        .handle_media_event(0, MediaEvent::Ended);
    assert_eq!(
        session.sequencer().mode(),
        PlaybackMode::PlayingAll { index: 1 }
    );

    assert!(session.set_variation(2, 2));

    assert_eq!(session.sequencer().mode(), PlaybackMode::Idle);
    assert!(session.sequencer().playing_indices().is_empty());
}

#[test]
fn test_reselecting_current_variation_keeps_playing() {
    let log = PlayLog::default();
    let mut session = session_for(three_parts(), &log);
    session.sequencer_mut().toggle_play_all();

    assert!(session.set_variation(2, 1));
    assert_eq!(
        session.sequencer().mode(),
        PlaybackMode::PlayingAll { index: 0 }
    );
}

#[test]
fn test_line_views() {
    let log = PlayLog::default();
    let mut session = session_for(three_parts(), &log)
        .with_display_name(|name| format!("<{}>", name.to_uppercase()));
    session.sequencer_mut().play_line(1).unwrap();

    let views = session.line_views();
    assert_eq!(views.len(), 3);

    let second = &views[1];
    assert_eq!(second.index, 1);
    assert_eq!(second.part, 2);
    assert_eq!(second.variation, 1);
    assert_eq!(second.variations, vec![1, 2]);
    assert_eq!(second.speaker, "<HORNET>");
    assert_eq!(second.transcription.as_deref(), Some("hornet says part 2"));
    assert_eq!(second.source, "https://cdn.example.com/audioFiles/p2v1.mp3");
    assert!(second.is_playing);

    assert!(!views[0].is_playing);
    assert_eq!(views[0].variations, vec![1]);
}

#[test]
fn test_load_discards_selection() {
    let log = PlayLog::default();
    let mut session = session_for(three_parts(), &log);
    session.set_variation(2, 2);
    session.sequencer_mut().toggle_play_all();

    session.load(conversation(
        "haze_inferno_01",
        vec![line(1, 1, "haze", "h1.mp3"), line(2, 1, "inferno", "h2.mp3")],
    ));

    assert_eq!(session.conversation().conversation_id, "haze_inferno_01");
    assert_eq!(session.selection().get(2), Some(1));
    assert_eq!(active_files(&session), vec!["h1.mp3", "h2.mp3"]);
    assert_eq!(session.sequencer().len(), 2);
    assert_eq!(session.sequencer().mode(), PlaybackMode::Idle);
}

#[test]
fn test_sequence_change_cancels_export_token() {
    let log = PlayLog::default();
    let mut session = session_for(three_parts(), &log);

    let before = session.export_token();
    assert!(!before.is_cancelled());

    assert!(session.set_variation(2, 2));

    assert!(before.is_cancelled());
    assert!(!session.export_token().is_cancelled());
}

#[test]
fn test_unchanged_sequence_keeps_export_token() {
    let log = PlayLog::default();
    let mut session = session_for(three_parts(), &log);
    let token = session.export_token();

    assert!(session.set_variation(2, 1));
    assert!(!session.set_variation(9, 1));

    assert!(!token.is_cancelled());
}

#[test]
fn test_load_cancels_export_token() {
    let log = PlayLog::default();
    let mut session = session_for(three_parts(), &log);
    let token = session.export_token();

    session.load(conversation(
        "haze_inferno_01",
        vec![line(1, 1, "haze", "h1.mp3")],
    ));

    assert!(token.is_cancelled());
    assert!(!session.export_token().is_cancelled());
}

#[tokio::test]
async fn test_variation_change_aborts_running_export() {
    let log = PlayLog::default();
    let mut session = session_for(three_parts(), &log);

    let convo = session.conversation().clone();
    let lines = session.active_lines().to_vec();
    let token = session.export_token();
    let exporter = Exporter::new(
        HangingFetcher,
        AudioLocator::new("https://cdn.example.com/audioFiles/"),
    );

    let (result, _) = tokio::join!(exporter.export(&convo, &lines, &token), async {
        tokio::task::yield_now().await;
        session.set_variation(2, 2);
    });

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(!exporter.is_running());
}
