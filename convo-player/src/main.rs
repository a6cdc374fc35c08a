//! Conversation Player (convo-player) - Main entry point
//!
//! Command-line shell over the conversation dataset: list and inspect
//! conversations, play one back headlessly ("play all"), export it as a
//! single WAV file, and manage viewed-conversation state.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use convo_common::config::{CliOverrides, Settings, TomlConfig};
use convo_common::dataset::{self, Completeness, ConversationFilter};
use convo_common::events::PlaybackMode;
use convo_common::storage::SqliteStore;
use convo_common::viewed::ViewedConversations;
use convo_common::{characters, Conversation, ConversationData, ConversationLine, ConvoEvent, EventBus};
use convo_player::audio::AudioLocator;
use convo_player::export::SourceFetcher;
use convo_player::playback::{
    active_sequence, default_selection, group_by_part, ClockBackend, ConversationSession,
};
use convo_player::{ExportOutcome, Exporter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for convo-player
#[derive(Parser, Debug)]
#[command(name = "convo-player")]
#[command(about = "Browse, play and export character voice-line conversations")]
#[command(version)]
struct Args {
    /// Config file (default: <config dir>/convo/config.toml)
    #[arg(short, long, env = "CONVO_CONFIG")]
    config: Option<PathBuf>,

    /// Dataset JSON file
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Audio asset base: http(s) URL prefix or directory
    #[arg(long)]
    audio_base: Option<String>,

    /// State database (viewed conversations)
    #[arg(long)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List conversations
    List {
        /// Match transcriptions, summaries and character names
        #[arg(short, long)]
        search: Option<String>,

        /// Only conversations involving this character (internal name)
        #[arg(short, long)]
        character: Option<String>,

        #[arg(long, conflicts_with = "incomplete")]
        complete: bool,

        #[arg(long)]
        incomplete: bool,
    },

    /// List characters and their conversation partners
    Characters,

    /// Show a conversation's active lines
    Show {
        id: String,

        /// Select a variation, as PART=VARIATION (repeatable)
        #[arg(long = "variation", value_parser = parse_variation)]
        variations: Vec<(u32, u32)>,

        /// Print the active lines as JSON
        #[arg(long)]
        json: bool,
    },

    /// Play every active line in order
    Play {
        id: String,

        #[arg(long = "variation", value_parser = parse_variation)]
        variations: Vec<(u32, u32)>,
    },

    /// Export the active lines as one WAV file
    Export {
        id: String,

        #[arg(long = "variation", value_parser = parse_variation)]
        variations: Vec<(u32, u32)>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List or reset viewed conversations
    Viewed {
        #[arg(long)]
        reset: bool,

        /// With --reset, only forget this character's conversations
        #[arg(long, requires = "reset")]
        character: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    let cli = CliOverrides {
        dataset_path: args.dataset.clone(),
        audio_base: args.audio_base.clone(),
        database_path: args.database.clone(),
        output_dir: match &args.command {
            Command::Export { output, .. } => output.clone(),
            _ => None,
        },
    };
    let settings = Settings::resolve(&cli, &toml);

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!("Settings: {:?}", settings);

    let data = dataset::load_from_path(&settings.dataset_path).with_context(|| {
        format!(
            "Failed to load dataset {}",
            settings.dataset_path.display()
        )
    })?;

    match args.command {
        Command::List {
            search,
            character,
            complete,
            incomplete,
        } => {
            let completeness = if complete {
                Completeness::Complete
            } else if incomplete {
                Completeness::Incomplete
            } else {
                Completeness::All
            };
            list(&data, ConversationFilter {
                search,
                character,
                completeness,
            });
        }
        Command::Characters => list_characters(&data),
        Command::Show {
            id,
            variations,
            json,
        } => {
            let convo = find(&data, &id)?;
            if json {
                show_json(convo, &variations, &settings)?;
            } else {
                show(convo, &variations, &settings);
            }
            mark_viewed(&settings, &id).await?;
        }
        Command::Play { id, variations } => {
            let convo = find(&data, &id)?;
            mark_viewed(&settings, &id).await?;
            play(convo, &variations, &settings).await?;
        }
        Command::Export { id, variations, .. } => {
            let convo = find(&data, &id)?;
            export(convo, &variations, &settings).await?;
        }
        Command::Viewed { reset, character } => {
            viewed(&data, reset, character.as_deref(), &settings).await?;
        }
    }

    Ok(())
}

fn parse_variation(arg: &str) -> std::result::Result<(u32, u32), String> {
    let (part, variation) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected PART=VARIATION, got '{}'", arg))?;
    let part = part
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid part '{}': {}", part, e))?;
    let variation = variation
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid variation '{}': {}", variation, e))?;
    Ok((part, variation))
}

fn find<'a>(data: &'a ConversationData, id: &str) -> Result<&'a Conversation> {
    match dataset::find_by_id(data, id) {
        Some(convo) => Ok(convo),
        None => bail!("No conversation with id '{}'", id),
    }
}

/// Active sequence of `convo` with the requested variations applied
fn select_lines(convo: &Conversation, variations: &[(u32, u32)]) -> Vec<ConversationLine> {
    let groups = group_by_part(&convo.lines);
    let mut selection = default_selection(&groups);
    for &(part, variation) in variations {
        if !selection.set_variation(&groups, part, variation) {
            warn!("Part {} has no variation {}, ignored", part, variation);
        }
    }
    active_sequence(&convo.lines, &selection)
}

fn list(data: &ConversationData, filter: ConversationFilter) {
    let matches = filter.apply(data);
    for convo in &matches {
        println!(
            "{:<40} {} & {}{}",
            convo.conversation_id,
            characters::display_name(&convo.character1),
            characters::display_name(&convo.character2),
            if convo.is_complete { "" } else { " (incomplete)" }
        );
    }
    info!("{} of {} conversations", matches.len(), data.conversations.len());
}

fn list_characters(data: &ConversationData) {
    for character in dataset::all_characters(data) {
        let partners: Vec<String> = character
            .conversation_partners
            .iter()
            .map(|p| characters::display_name(p))
            .collect();
        println!(
            "{:<16} {}",
            characters::display_name(&character.name),
            partners.join(", ")
        );
    }
}

fn show(convo: &Conversation, variations: &[(u32, u32)], settings: &Settings) {
    let locator = AudioLocator::new(settings.audio_base.clone());
    let groups = group_by_part(&convo.lines);

    println!(
        "{} & {}",
        characters::display_name(&convo.character1),
        characters::display_name(&convo.character2)
    );
    if !convo.summary.is_empty() {
        println!("{}", convo.summary);
    }
    if !convo.missing_parts.is_empty() {
        println!("Missing parts: {:?}", convo.missing_parts);
    }
    println!();

    for line in select_lines(convo, variations) {
        let available = groups.variations_for(line.part);
        let choice = if available.len() > 1 {
            format!(" [variation {} of {:?}]", line.variation, available)
        } else {
            String::new()
        };
        println!(
            "{:>3}. {}{}",
            line.part,
            characters::display_name(&line.speaker),
            choice
        );
        if line.has_transcription {
            println!("     {}", line.transcription);
        }
        println!("     {}", locator.resolve(&line.filename));
    }
}

fn show_json(convo: &Conversation, variations: &[(u32, u32)], settings: &Settings) -> Result<()> {
    let locator = AudioLocator::new(settings.audio_base.clone());
    let mut session = ConversationSession::new(convo.clone(), locator, || {
        ClockBackend::new(Arc::default())
    });
    for &(part, variation) in variations {
        if !session.set_variation(part, variation) {
            warn!("Part {} has no variation {}, ignored", part, variation);
        }
    }
    println!("{}", serde_json::to_string_pretty(&session.line_views())?);
    Ok(())
}

async fn mark_viewed(settings: &Settings, id: &str) -> Result<()> {
    let store = SqliteStore::open(&settings.database_path)
        .await
        .context("Failed to open state database")?;
    ViewedConversations::new(store).mark_viewed(id).await?;
    Ok(())
}

async fn play(convo: &Conversation, variations: &[(u32, u32)], settings: &Settings) -> Result<()> {
    let locator = AudioLocator::new(settings.audio_base.clone());
    let fetcher = SourceFetcher::new(settings.fetch_timeout)?;
    let probe = Exporter::new(fetcher, locator.clone()).with_fetch_timeout(settings.fetch_timeout);
    let cancel = CancellationToken::new();

    // Durations for every line, so any variation can be selected
    let mut durations = HashMap::new();
    for line in &convo.lines {
        let source = locator.resolve(&line.filename);
        if durations.contains_key(&source) {
            continue;
        }
        match probe.fetch_and_decode(line, &cancel).await {
            Ok(buffer) => {
                durations.insert(source, buffer.duration_seconds());
            }
            Err(e) => warn!("{} will be skipped: {}", line.filename, e),
        }
    }
    let durations = Arc::new(durations);

    let bus = EventBus::new(settings.event_capacity);
    let mut rx = bus.subscribe();

    let mut session = ConversationSession::new(convo.clone(), locator, move || {
        ClockBackend::new(Arc::clone(&durations))
    })
    .with_events(bus.clone());
    for &(part, variation) in variations {
        if !session.set_variation(part, variation) {
            warn!("Part {} has no variation {}, ignored", part, variation);
        }
    }

    let views = session.line_views();
    if views.is_empty() {
        bail!("Conversation {} has no lines", convo.conversation_id);
    }

    session.sequencer_mut().toggle_play_all();

    let mut ticker = tokio::time::interval(Duration::from_millis(50));
    let mut last_tick = Instant::now();

    loop {
        while let Ok(event) = rx.try_recv() {
            if let ConvoEvent::PlayStateChanged {
                line_index,
                is_playing: true,
                ..
            } = event
            {
                if let Some(view) = views.get(line_index) {
                    println!(
                        "[{}/{}] {}: {}",
                        line_index + 1,
                        views.len(),
                        view.speaker,
                        view.transcription.as_deref().unwrap_or("")
                    );
                }
            }
        }

        if session.sequencer().mode() == PlaybackMode::Idle {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                let elapsed = now - last_tick;
                last_tick = now;
                session
                    .sequencer_mut()
                    .pump_media_events(|_, backend| backend.advance(elapsed));
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                session.sequencer_mut().stop();
            }
        }
    }

    Ok(())
}

async fn export(convo: &Conversation, variations: &[(u32, u32)], settings: &Settings) -> Result<()> {
    let lines = select_lines(convo, variations);

    let bus = EventBus::new(settings.event_capacity);
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            if let ConvoEvent::ExportProgress { percent, .. } = event {
                info!("Export progress: {}%", percent);
            }
        }
    });

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling export");
            on_interrupt.cancel();
        }
    });

    let fetcher = SourceFetcher::new(settings.fetch_timeout)?;
    let exporter = Exporter::new(fetcher, AudioLocator::new(settings.audio_base.clone()))
        .with_fetch_timeout(settings.fetch_timeout)
        .with_events(bus);

    match exporter
        .export(convo, &lines, &cancel)
        .await
        .with_context(|| format!("Export of {} failed", convo.conversation_id))?
    {
        ExportOutcome::Completed(file) => {
            let path = file
                .save_to(&settings.output_dir)
                .await
                .context("Failed to write exported file")?;
            println!("{}", path.display());
        }
        ExportOutcome::AlreadyRunning => warn!("An export is already running"),
    }

    Ok(())
}

async fn viewed(
    data: &ConversationData,
    reset: bool,
    character: Option<&str>,
    settings: &Settings,
) -> Result<()> {
    let store = SqliteStore::open(&settings.database_path)
        .await
        .context("Failed to open state database")?;
    let viewed = ViewedConversations::new(store);

    match (reset, character) {
        (true, Some(name)) => {
            let removed = viewed.reset_for_character(name, &data.conversations).await?;
            info!("Forgot {} viewed conversations of {}", removed, name);
        }
        (true, None) => {
            viewed.reset_all().await?;
            info!("Forgot all viewed conversations");
        }
        (false, _) => {
            for id in viewed.all().await? {
                println!("{}", id);
            }
        }
    }
    Ok(())
}
