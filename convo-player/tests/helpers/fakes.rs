//! Test doubles for media backends and audio fetchers

use convo_player::export::AudioFetcher;
use convo_player::{Error, MediaBackend, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Shared record of every source a `FakeBackend` started
#[derive(Clone, Default)]
pub struct PlayLog(Arc<Mutex<Vec<String>>>);

impl PlayLog {
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, source: &str) {
        self.0.lock().unwrap().push(source.to_string());
    }
}

/// Media backend that plays nothing and can be told to reject sources
pub struct FakeBackend {
    log: PlayLog,
    failing: Vec<String>,
    source: String,
    playing: bool,
    position: f64,
    duration: Option<f64>,
}

impl FakeBackend {
    pub fn new(log: PlayLog) -> Self {
        Self {
            log,
            failing: Vec::new(),
            source: String::new(),
            playing: false,
            position: 0.0,
            duration: Some(5.0),
        }
    }

    /// Reject `play()` for these sources
    pub fn failing(mut self, sources: &[&str]) -> Self {
        self.failing = sources.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl MediaBackend for FakeBackend {
    fn load(&mut self, source: &str) {
        self.source = source.to_string();
        self.playing = false;
        self.position = 0.0;
    }

    fn play(&mut self) -> Result<()> {
        if self.failing.contains(&self.source) {
            return Err(Error::Playback(format!("{} rejected", self.source)));
        }
        self.playing = true;
        self.log.push(&self.source);
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_position(&mut self, seconds: f64) {
        self.position = seconds;
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }
}

/// Serves fixed bytes per URL; unknown URLs fail like a 404
#[derive(Default)]
pub struct MapFetcher {
    files: HashMap<String, Vec<u8>>,
    calls: AtomicUsize,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(url.to_string(), bytes);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AudioFetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.files.get(url).cloned().ok_or_else(|| Error::Fetch {
            url: url.to_string(),
            reason: "HTTP 404 Not Found".to_string(),
        })
    }
}

/// Holds every fetch until `open()` is called
pub struct GatedFetcher {
    inner: MapFetcher,
    gate: Semaphore,
}

impl GatedFetcher {
    pub fn new(inner: MapFetcher) -> Self {
        Self {
            inner,
            gate: Semaphore::new(0),
        }
    }

    pub fn open(&self) {
        self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
    }
}

impl AudioFetcher for GatedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        self.inner.fetch(url).await
    }
}

/// Never answers
pub struct HangingFetcher;

impl AudioFetcher for HangingFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
        std::future::pending().await
    }
}
