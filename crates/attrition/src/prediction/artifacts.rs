use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use super::classifier::{Classifier, ClassifierArtifact};
use super::encoder::{FEATURE_COUNT, NUMERIC_FEATURES};
use super::scaler::{FeatureScaler, ScalerArtifact};
use crate::config::ArtifactConfig;

/// Which of the two fitted artifacts an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Classifier,
    Scaler,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Classifier => f.write_str("classifier"),
            ArtifactKind::Scaler => f.write_str("scaler"),
        }
    }
}

/// Missing, unreadable, or malformed artifact. Predictions cannot proceed.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("unable to read {kind} artifact at {}: {source}", .path.display())]
    Read {
        kind: ArtifactKind,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unable to decode {kind} artifact at {}: {source}", .path.display())]
    Decode {
        kind: ArtifactKind,
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{kind} artifact at {} is invalid: {reason}", .path.display())]
    Invalid {
        kind: ArtifactKind,
        path: PathBuf,
        reason: String,
    },
}

impl ArtifactLoadError {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactLoadError::Read { kind, .. }
            | ArtifactLoadError::Decode { kind, .. }
            | ArtifactLoadError::Invalid { kind, .. } => *kind,
        }
    }
}

/// Fitted classifier and scaler, immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedArtifacts {
    pub model: ClassifierArtifact,
    pub scaler: ScalerArtifact,
}

impl LoadedArtifacts {
    /// Checks both artifacts against the encoder's column layout.
    pub fn new(
        model: ClassifierArtifact,
        scaler: ScalerArtifact,
        config: &ArtifactConfig,
    ) -> Result<Self, ArtifactLoadError> {
        scaler
            .validate()
            .and_then(|()| expect_width(scaler.n_features(), NUMERIC_FEATURES))
            .map_err(|reason| ArtifactLoadError::Invalid {
                kind: ArtifactKind::Scaler,
                path: config.scaler_path.clone(),
                reason,
            })?;
        model
            .validate()
            .and_then(|()| expect_width(model.n_features(), FEATURE_COUNT))
            .map_err(|reason| ArtifactLoadError::Invalid {
                kind: ArtifactKind::Classifier,
                path: config.model_path.clone(),
                reason,
            })?;
        Ok(Self { model, scaler })
    }
}

fn expect_width(found: usize, expected: usize) -> Result<(), String> {
    if found != expected {
        return Err(format!("fitted on {found} features, expected {expected}"));
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(kind: ArtifactKind, path: &Path) -> Result<T, ArtifactLoadError> {
    let bytes = fs::read(path).map_err(|source| ArtifactLoadError::Read {
        kind,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactLoadError::Decode {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and validates both artifacts without touching any cache.
pub fn load_artifacts(config: &ArtifactConfig) -> Result<LoadedArtifacts, ArtifactLoadError> {
    let model = read_json::<ClassifierArtifact>(ArtifactKind::Classifier, &config.model_path)?;
    let scaler = read_json::<ScalerArtifact>(ArtifactKind::Scaler, &config.scaler_path)?;
    LoadedArtifacts::new(model, scaler, config)
}

/// Loads the artifact pair on first use and hands out the cached copy afterwards.
///
/// The cache is only populated by a successful load, so a failure leaves the
/// loader empty and the next call reads the files again.
#[derive(Debug)]
pub struct ArtifactLoader {
    config: ArtifactConfig,
    cache: Mutex<Option<Arc<LoadedArtifacts>>>,
}

impl ArtifactLoader {
    pub fn new(config: ArtifactConfig) -> Self {
        Self {
            config,
            cache: Mutex::new(None),
        }
    }

    /// Loader seeded with artifacts obtained elsewhere; never reads the disk.
    pub fn preloaded(config: ArtifactConfig, artifacts: LoadedArtifacts) -> Self {
        Self {
            config,
            cache: Mutex::new(Some(Arc::new(artifacts))),
        }
    }

    pub fn config(&self) -> &ArtifactConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn load(&self) -> Result<Arc<LoadedArtifacts>, ArtifactLoadError> {
        // Held across the read so concurrent first callers deserialize once.
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(artifacts) = cache.as_ref() {
            return Ok(Arc::clone(artifacts));
        }

        match load_artifacts(&self.config) {
            Ok(artifacts) => {
                info!(
                    model = %artifacts.model.describe(),
                    scaler = %artifacts.scaler.describe(),
                    "attrition artifacts loaded"
                );
                let artifacts = Arc::new(artifacts);
                *cache = Some(Arc::clone(&artifacts));
                Ok(artifacts)
            }
            Err(err) => {
                warn!(error = %err, kind = %err.kind(), "attrition artifacts failed to load");
                Err(err)
            }
        }
    }
}
