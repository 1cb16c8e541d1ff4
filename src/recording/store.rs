use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use flate2::{Compression, bufread::GzDecoder, write::GzEncoder};
use log::{debug, info};
use url::Url;

use super::types::{PlaybackLog, RecordedEvent, RecordingArtifact};

/// Abstraction over where playback logs come from and where recordings go.
#[async_trait(?Send)]
pub trait PlaybackStore {
    /// Fetches and parses the log addressed by `resource`.
    async fn load(&self, resource: &str) -> Result<Vec<RecordedEvent>>;

    /// Persists a finished recording. Returns the location written, if any.
    fn save(&self, artifact: &RecordingArtifact) -> Result<Option<PathBuf>>;
}

/// Store for hosts without persistence: loads fail, saves are dropped.
#[derive(Debug, Default)]
pub struct NullStore;

#[async_trait(?Send)]
impl PlaybackStore for NullStore {
    async fn load(&self, resource: &str) -> Result<Vec<RecordedEvent>> {
        Err(anyhow!("no playback store configured for {resource}"))
    }

    fn save(&self, _artifact: &RecordingArtifact) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}

/// Filesystem-backed store reading plain or gzip JSON logs.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Relative playback resources resolve against this directory.
    pub base_dir: PathBuf,
    /// Recording artifacts are written here.
    pub output_dir: PathBuf,
    /// Write artifacts gzip-compressed.
    pub compress: bool,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            output_dir: output_dir.into(),
            compress: false,
        }
    }

    /// Maps a resource (path or `file://` URL) to a filesystem path.
    pub fn resolve(&self, resource: &str) -> Result<PathBuf> {
        match Url::parse(resource) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map_err(|_| anyhow!("invalid file URL {resource}")),
            Ok(url) => Err(anyhow!(
                "unsupported playback resource scheme '{}'",
                url.scheme()
            )),
            Err(_) => {
                let path = PathBuf::from(resource);
                if path.is_absolute() {
                    Ok(path)
                } else {
                    Ok(self.base_dir.join(path))
                }
            }
        }
    }

    fn artifact_path(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        let extension = if self.compress { "json.gz" } else { "json" };
        self.output_dir
            .join(format!("input-recording-{stamp}.{extension}"))
    }
}

#[async_trait(?Send)]
impl PlaybackStore for FileStore {
    async fn load(&self, resource: &str) -> Result<Vec<RecordedEvent>> {
        let path = self.resolve(resource)?;
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read playback log {}", path.display()))?;
        let events = decode_log(&bytes)
            .with_context(|| format!("failed to parse playback log {}", path.display()))?;
        info!(
            "Loaded {} playback events from {}",
            events.len(),
            path.display()
        );
        Ok(events)
    }

    fn save(&self, artifact: &RecordingArtifact) -> Result<Option<PathBuf>> {
        let path = self.artifact_path();
        write_artifact(artifact, &path, self.compress)?;
        Ok(Some(path))
    }
}

/// Reads a playback log synchronously from `path`.
pub fn read_log(path: &Path) -> Result<Vec<RecordedEvent>> {
    let mut bytes = Vec::new();
    File::open(path)
        .with_context(|| format!("failed to open playback log {}", path.display()))?
        .read_to_end(&mut bytes)
        .context("failed to read playback log")?;
    decode_log(&bytes).with_context(|| format!("failed to parse playback log {}", path.display()))
}

/// Parses log bytes, transparently inflating gzip input.
pub fn decode_log(bytes: &[u8]) -> Result<Vec<RecordedEvent>> {
    let decompressed;
    let json = if is_gzip(bytes) {
        let mut decoder = GzDecoder::new(bytes);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .context("failed to decompress playback log")?;
        decompressed = out;
        &decompressed[..]
    } else {
        bytes
    };

    let log: PlaybackLog = serde_json::from_slice(json).context("failed to parse playback json")?;
    debug!(
        "Decoded playback log (version {}) with {} events",
        log.version.as_deref().unwrap_or("unversioned"),
        log.events.len()
    );
    Ok(log.events)
}

/// Writes an artifact through a temporary file, then renames it into place.
pub fn write_artifact(artifact: &RecordingArtifact, path: &Path, compress: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create recording directory {}", parent.display())
        })?;
    }

    let mut bytes =
        serde_json::to_vec_pretty(artifact).context("failed to serialise recording artifact")?;
    if compress {
        bytes = compress_bytes(&bytes)?;
    }

    let tmp_path = temp_path(path);
    {
        let mut tmp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .with_context(|| {
                format!(
                    "failed to open temporary recording file {}",
                    tmp_path.display()
                )
            })?;
        tmp_file
            .write_all(&bytes)
            .context("failed to write recording artifact")?;
        tmp_file
            .sync_all()
            .context("failed to sync temporary recording file")?;
    }

    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "failed to move temporary recording file {} -> {}",
            tmp_path.display(),
            path.display()
        )
    })?;

    info!(
        "Recording saved to {} ({} events, {} bytes, compression={})",
        path.display(),
        artifact.events.len(),
        bytes.len(),
        compress
    );
    Ok(())
}

fn compress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .context("failed to compress recording artifact")?;
    encoder
        .finish()
        .context("failed to finalise compressed recording artifact")
}

fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() > 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

fn temp_path(target: &Path) -> PathBuf {
    let mut candidate = target.with_extension("tmp");
    let mut counter = 0u32;
    while candidate.exists() {
        counter += 1;
        candidate = target.with_extension(format!("tmp{counter}"));
    }
    candidate
}
