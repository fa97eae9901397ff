//! Text-to-speech rendering with an on-disk cache.
//!
//! Synthesis is best effort: every failure is logged and surfaces as `None`,
//! never as an error, so a missing voice never interrupts a conversation.

use async_trait::async_trait;
use relance_core::util::content_hash;
use reqwest::{Client, Url};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// The translate TTS endpoint rejects longer inputs.
const MAX_CHUNK_CHARS: usize = 100;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// MP3 bytes for `text`, or `None` when rendering failed.
    async fn synthesize(&self, text: &str, language: &str) -> Option<Vec<u8>>;
}

/// Google Translate speech endpoint (the one gTTS uses).
pub struct GoogleTranslateTts {
    client: Client,
    endpoint: String,
}

impl GoogleTranslateTts {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client for speech: {e}");
                Client::new()
            });
        Self {
            client,
            endpoint: "https://translate.google.com/translate_tts".to_string(),
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>, String> {
        let idx = idx.to_string();
        let total = total.to_string();
        let textlen = chunk.chars().count().to_string();
        let url = Url::parse_with_params(
            &self.endpoint,
            &[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", chunk),
                ("idx", idx.as_str()),
                ("total", total.as_str()),
                ("textlen", textlen.as_str()),
            ],
        )
        .map_err(|e| e.to_string())?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTranslateTts {
    async fn synthesize(&self, text: &str, language: &str) -> Option<Vec<u8>> {
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return None;
        }

        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            match self.fetch_chunk(chunk, language, idx, chunks.len()).await {
                Ok(bytes) => audio.extend_from_slice(&bytes),
                Err(e) => {
                    warn!("TTS error on chunk {}/{}: {e}", idx + 1, chunks.len());
                    return None;
                }
            }
        }
        Some(audio)
    }
}

/// Split on whitespace into chunks of at most `max_chars` characters.
/// Words longer than the limit are cut.
fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let cut = word
                .char_indices()
                .nth(max_chars)
                .map_or(word.len(), |(i, _)| i);
            let rest = word.split_off(cut);
            chunks.push(word);
            word = rest;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Stores rendered audio as `<sha256(text)>.<language>.mp3` and reuses it on
/// later calls.
pub struct CachedSynthesizer<S> {
    inner: S,
    cache_dir: PathBuf,
}

impl<S: SpeechSynthesizer> CachedSynthesizer<S> {
    pub fn new(inner: S, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            cache_dir: cache_dir.into(),
        }
    }

    /// Characters outside `[A-Za-z0-9-]` in `language` are dropped.
    #[must_use]
    pub fn cache_path(&self, text: &str, language: &str) -> PathBuf {
        let language: String = language
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        self.cache_dir
            .join(format!("{}.{language}.mp3", content_hash(text)))
    }

    /// Path of the cached audio for `text`, rendering it first if needed.
    pub async fn synthesize_to_file(&self, text: &str, language: &str) -> Option<PathBuf> {
        let path = self.cache_path(text, language);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!("Audio cache hit: {}", path.display());
            return Some(path);
        }

        let audio = self.inner.synthesize(text, language).await?;

        if let Err(e) = tokio::fs::create_dir_all(&self.cache_dir).await {
            warn!(
                "Cannot create audio cache {}: {e}",
                self.cache_dir.display()
            );
            return None;
        }
        if let Err(e) = tokio::fs::write(&path, &audio).await {
            warn!("Cannot write audio file {}: {e}", path.display());
            return None;
        }
        debug!("Audio cached: {}", path.display());
        Some(path)
    }
}

#[async_trait]
impl<S: SpeechSynthesizer> SpeechSynthesizer for CachedSynthesizer<S> {
    async fn synthesize(&self, text: &str, language: &str) -> Option<Vec<u8>> {
        let path = self.synthesize_to_file(text, language).await?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Cannot read audio file {}: {e}", path.display());
                None
            }
        }
    }
}
