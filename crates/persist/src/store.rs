//! File-backed recording store.
//!
//! Layout inside the store directory:
//! ```text
//! store.meta.json              - metadata and schema version
//! recordings/
//!   <name>.rec.cbor.zst        - CBOR+zstd compressed recordings
//! integrity/
//!   manifest.json              - hash chain manifest
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use treeline_common::ConfigError;
use treeline_terrain::TerrainError;

use crate::recording::{Recording, RECORDING_SCHEMA_VERSION};

const STORE_SCHEMA_VERSION: u32 = 1;
const RECORDING_SUFFIX: &str = ".rec.cbor.zst";

/// Errors from recording persistence and replay verification.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CBOR serialization error: {0}")]
    CborEncode(String),
    #[error("CBOR deserialization error: {0}")]
    CborDecode(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("recording '{0}' not found")]
    NotFound(String),
    #[error("recording '{0}' already exists")]
    AlreadyExists(String),
    #[error("invalid recording name '{0}'")]
    InvalidName(String),
    #[error("controller config: {0}")]
    Config(#[from] ConfigError),
    #[error("scene: {0}")]
    Terrain(#[from] TerrainError),
    #[error("replay diverged: expected hash {expected:016x}, got {actual:016x}")]
    ReplayDiverged { expected: u64, actual: u64 },
}

/// Metadata stored in store.meta.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMeta {
    pub store_schema_version: u32,
    pub recording_schema_version: u32,
    pub recording_count: u32,
}

/// A single entry in the integrity manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub sha256: String,
    pub prev_hash: Option<String>,
}

/// Integrity manifest chaining every stored file's hash.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrityManifest {
    pub entries: Vec<ManifestEntry>,
}

impl IntegrityManifest {
    fn find(&self, filename: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.filename == filename)
    }
}

/// Directory of named recordings with schema versioning and integrity checks.
#[derive(Debug)]
pub struct RecordingStore {
    root: PathBuf,
    meta: StoreMeta,
    manifest: IntegrityManifest,
}

impl RecordingStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join("recordings"))?;
        std::fs::create_dir_all(root.join("integrity"))?;

        let meta_path = root.join("store.meta.json");
        let manifest_path = root.join("integrity").join("manifest.json");

        let (meta, manifest) = if meta_path.exists() {
            let meta: StoreMeta = serde_json::from_reader(std::fs::File::open(&meta_path)?)?;
            if meta.store_schema_version != STORE_SCHEMA_VERSION {
                return Err(StoreError::SchemaMismatch {
                    file_version: meta.store_schema_version,
                    expected_version: STORE_SCHEMA_VERSION,
                });
            }
            if meta.recording_schema_version != RECORDING_SCHEMA_VERSION {
                return Err(StoreError::SchemaMismatch {
                    file_version: meta.recording_schema_version,
                    expected_version: RECORDING_SCHEMA_VERSION,
                });
            }
            let manifest: IntegrityManifest = if manifest_path.exists() {
                serde_json::from_reader(std::fs::File::open(&manifest_path)?)?
            } else {
                IntegrityManifest::default()
            };
            (meta, manifest)
        } else {
            let meta = StoreMeta {
                store_schema_version: STORE_SCHEMA_VERSION,
                recording_schema_version: RECORDING_SCHEMA_VERSION,
                recording_count: 0,
            };
            let manifest = IntegrityManifest::default();
            serde_json::to_writer_pretty(std::fs::File::create(&meta_path)?, &meta)?;
            serde_json::to_writer_pretty(std::fs::File::create(&manifest_path)?, &manifest)?;
            (meta, manifest)
        };

        tracing::debug!(root = %root.display(), recordings = meta.recording_count, "store opened");
        Ok(Self {
            root,
            meta,
            manifest,
        })
    }

    /// Write `recording` under `name`. Names are never overwritten.
    pub fn save(&mut self, name: &str, recording: &Recording) -> Result<(), StoreError> {
        check_name(name)?;
        let filename = format!("{name}{RECORDING_SUFFIX}");
        let path = self.root.join("recordings").join(&filename);
        if self.manifest.find(&filename).is_some() || path.exists() {
            return Err(StoreError::AlreadyExists(name.to_owned()));
        }

        let cbor_bytes = cbor_serialize(recording)?;
        let compressed = zstd_compress(&cbor_bytes)?;

        let hash = sha256_hex(&compressed);
        let prev_hash = self.manifest.entries.last().map(|e| e.sha256.clone());

        std::fs::write(&path, &compressed)?;

        self.manifest.entries.push(ManifestEntry {
            filename,
            sha256: hash,
            prev_hash,
        });
        self.meta.recording_count += 1;

        self.save_meta()?;
        self.save_manifest()?;
        tracing::info!(
            name,
            frames = recording.frames.len(),
            ticks = recording.ticks,
            bytes = compressed.len(),
            "recording saved"
        );
        Ok(())
    }

    /// Read a recording back. Fails closed on anything the manifest does
    /// not vouch for.
    pub fn load(&self, name: &str) -> Result<Recording, StoreError> {
        check_name(name)?;
        let filename = format!("{name}{RECORDING_SUFFIX}");
        let entry = self
            .manifest
            .find(&filename)
            .ok_or_else(|| StoreError::NotFound(name.to_owned()))?;
        let compressed = std::fs::read(self.root.join("recordings").join(&filename))?;

        let actual = sha256_hex(&compressed);
        if actual != entry.sha256 {
            return Err(StoreError::IntegrityMismatch {
                expected: entry.sha256.clone(),
                actual,
            });
        }

        let cbor_bytes = zstd_decompress(&compressed)?;
        let recording: Recording = cbor_deserialize(&cbor_bytes)?;
        if recording.schema_version != RECORDING_SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                file_version: recording.schema_version,
                expected_version: RECORDING_SCHEMA_VERSION,
            });
        }
        Ok(recording)
    }

    /// Stored recording names, in save order.
    pub fn list(&self) -> Vec<String> {
        self.manifest
            .entries
            .iter()
            .filter_map(|e| e.filename.strip_suffix(RECORDING_SUFFIX))
            .map(str::to_owned)
            .collect()
    }

    /// Verify the hash chain and every file it names.
    pub fn verify_integrity(&self) -> Result<(), StoreError> {
        let mut prev_hash: Option<String> = None;
        for entry in &self.manifest.entries {
            if entry.prev_hash != prev_hash {
                return Err(StoreError::IntegrityMismatch {
                    expected: prev_hash.unwrap_or_else(|| "None".into()),
                    actual: entry.prev_hash.clone().unwrap_or_else(|| "None".into()),
                });
            }

            let data = std::fs::read(self.root.join("recordings").join(&entry.filename))?;
            let actual_hash = sha256_hex(&data);
            if actual_hash != entry.sha256 {
                return Err(StoreError::IntegrityMismatch {
                    expected: entry.sha256.clone(),
                    actual: actual_hash,
                });
            }

            prev_hash = Some(entry.sha256.clone());
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta(&self) -> &StoreMeta {
        &self.meta
    }

    fn save_meta(&self) -> Result<(), StoreError> {
        let path = self.root.join("store.meta.json");
        serde_json::to_writer_pretty(std::fs::File::create(path)?, &self.meta)?;
        Ok(())
    }

    fn save_manifest(&self) -> Result<(), StoreError> {
        let path = self.root.join("integrity").join("manifest.json");
        serde_json::to_writer_pretty(std::fs::File::create(path)?, &self.manifest)?;
        Ok(())
    }
}

/// Names become file stems: ASCII letters, digits, `-` and `_` only.
fn check_name(name: &str) -> Result<(), StoreError> {
    let ok = !name.is_empty()
        && name.len() <= 64
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_owned()))
    }
}

fn cbor_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| StoreError::CborEncode(e.to_string()))?;
    Ok(buf)
}

fn cbor_deserialize<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, StoreError> {
    ciborium::from_reader(data).map_err(|e| StoreError::CborDecode(e.to_string()))
}

fn zstd_compress(data: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut encoder = zstd::Encoder::new(Vec::new(), 3)?;
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn zstd_decompress(data: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut decoder = zstd::Decoder::new(data)?;
    let mut buf = Vec::new();
    decoder.read_to_end(&mut buf)?;
    Ok(buf)
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordedFrame;
    use glam::Vec2;
    use treeline_common::{ControllerConfig, MovementIntent};
    use treeline_terrain::{ForestConfig, SceneConfig};

    fn sample_recording() -> Recording {
        let scene = SceneConfig {
            forest: Some(ForestConfig {
                seed: 7,
                trees: 12,
                rocks: 4,
                extent: 16.0,
                ..ForestConfig::default()
            }),
            ..SceneConfig::default()
        };
        let frames = (0..120)
            .map(|i| {
                let intent = MovementIntent::new(Vec2::new(0.0, -1.0), i == 20, false);
                RecordedFrame::new(1.0 / 60.0, intent).with_look(Vec2::new(1.5, -0.5))
            })
            .collect();
        Recording::capture(ControllerConfig::default(), scene, frames).unwrap()
    }

    #[test]
    fn store_open_creates_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let store = RecordingStore::open(tmp.path().join("recs")).unwrap();
        assert_eq!(store.meta().recording_count, 0);
        assert!(store.root().join("recordings").is_dir());
        assert!(store.root().join("integrity").is_dir());
        assert!(store.list().is_empty());
    }

    #[test]
    fn round_trip_reproduces_final_hash() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("recs");
        let rec = sample_recording();
        {
            let mut store = RecordingStore::open(&path).unwrap();
            store.save("forest-walk", &rec).unwrap();
            store.verify_integrity().unwrap();
        }

        let store = RecordingStore::open(&path).unwrap();
        assert_eq!(store.meta().recording_count, 1);
        assert_eq!(store.list(), vec!["forest-walk".to_owned()]);
        let loaded = store.load("forest-walk").unwrap();
        assert_eq!(loaded, rec);
        let sim = loaded.verify().unwrap();
        assert_eq!(sim.state_hash(), rec.final_hash);
    }

    #[test]
    fn duplicate_and_bad_names_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = RecordingStore::open(tmp.path()).unwrap();
        let rec = sample_recording();
        store.save("a", &rec).unwrap();
        assert!(matches!(store.save("a", &rec), Err(StoreError::AlreadyExists(_))));
        for bad in ["", "../escape", "with space", "dots.bad"] {
            assert!(matches!(store.save(bad, &rec), Err(StoreError::InvalidName(_))));
        }
        assert!(matches!(store.load("missing"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn chain_links_successive_saves() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = RecordingStore::open(tmp.path()).unwrap();
        let rec = sample_recording();
        store.save("one", &rec).unwrap();
        store.save("two", &rec).unwrap();
        let entries = &store.manifest.entries;
        assert_eq!(entries[0].prev_hash, None);
        assert_eq!(entries[1].prev_hash.as_deref(), Some(entries[0].sha256.as_str()));
        store.verify_integrity().unwrap();
    }

    #[test]
    fn corruption_fails_closed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("recs");
        let mut store = RecordingStore::open(&path).unwrap();
        store.save("run", &sample_recording()).unwrap();

        let file = path.join("recordings").join("run.rec.cbor.zst");
        let mut data = std::fs::read(&file).unwrap();
        if let Some(byte) = data.last_mut() {
            *byte ^= 0xff;
        }
        std::fs::write(&file, &data).unwrap();

        let store = RecordingStore::open(&path).unwrap();
        assert!(store.verify_integrity().is_err());
        assert!(matches!(
            store.load("run"),
            Err(StoreError::IntegrityMismatch { .. })
        ));
    }

    #[test]
    fn unlisted_file_is_not_loaded() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("recs");
        let store = RecordingStore::open(&path).unwrap();
        std::fs::write(path.join("recordings").join("stray.rec.cbor.zst"), b"junk").unwrap();
        assert!(matches!(store.load("stray"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn schema_mismatch_fail_closed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("recs");
        let _store = RecordingStore::open(&path).unwrap();

        let meta_path = path.join("store.meta.json");
        let mut meta: StoreMeta =
            serde_json::from_reader(std::fs::File::open(&meta_path).unwrap()).unwrap();
        meta.store_schema_version = 999;
        serde_json::to_writer_pretty(std::fs::File::create(&meta_path).unwrap(), &meta).unwrap();

        match RecordingStore::open(&path) {
            Err(StoreError::SchemaMismatch {
                file_version,
                expected_version,
            }) => {
                assert_eq!(file_version, 999);
                assert_eq!(expected_version, STORE_SCHEMA_VERSION);
            }
            Err(e) => panic!("expected SchemaMismatch, got: {e}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }
}
