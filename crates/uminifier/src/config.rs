//! config.rs — Configuration du compilateur externe (`mpy-cross`).
//!
//! Defaults sûrs (`CompilerConfig::default()`) ; désérialisable depuis la table
//! `[compiler]` d'un fichier TOML côté CLI. Aucune variable d'environnement lue.

use std::time::Duration;

use camino::Utf8PathBuf;
use serde::Deserialize;

/// Extension de l'artefact bytecode MicroPython.
pub const BYTECODE_EXTENSION: &str = "mpy";

/// Programme lancé par défaut (résolu via le PATH).
pub const DEFAULT_PROGRAM: &str = "mpy-cross";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Binaire du cross-compilateur (nom dans le PATH ou chemin explicite)
    pub program: Utf8PathBuf,
    /// Arguments ajoutés avant `-o` (ex: `-march=armv7m`, `-O2`)
    pub args: Vec<String>,
    /// Délai max d'une compilation ; absent = attente sans limite
    pub timeout_secs: Option<u64>,
}

impl CompilerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: Utf8PathBuf::from(DEFAULT_PROGRAM),
            args: Vec::new(),
            timeout_secs: None,
        }
    }
}
