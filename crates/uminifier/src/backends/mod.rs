//! backends — Frontière avec le cross-compilateur externe.
//!
//! `Compile` est le seul point où le pipeline attend un autre programme.
//! Un code de sortie non nul n'est pas une erreur : c'est une donnée du
//! `CompileOutcome`. Seuls le lancement et l'attente peuvent échouer.

pub mod mpy_cross;

use std::io;
use std::path::Path;

use thiserror::Error;

pub use mpy_cross::MpyCross;

/// Fin d'exécution du compilateur.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutcome {
    /// `None` si le processus a été tué par un signal.
    pub exit_code: Option<i32>,
    /// Sortie d'erreur capturée (vide si rien n'a été écrit).
    pub stderr: String,
    pub timed_out: bool,
}

impl CompileOutcome {
    pub fn exited(code: i32) -> Self {
        Self { exit_code: Some(code), ..Self::default() }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out
    }

    /// Diagnostic du compilateur, s'il a écrit quelque chose.
    pub fn diagnostic(&self) -> Option<&str> {
        Some(self.stderr.trim()).filter(|s| !s.is_empty())
    }
}

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("cannot launch `{program}`")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("waiting for `{program}` failed")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Cross-compilateur : `input` (source minifiée) → `output` (bytecode).
pub trait Compile {
    /// Nom lisible pour les logs.
    fn name(&self) -> &str;

    /// Bloque jusqu'à la fin du compilateur.
    fn compile(&self, input: &Path, output: &Path) -> Result<CompileOutcome, CompileError>;
}

impl<C: Compile + ?Sized> Compile for &C {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn compile(&self, input: &Path, output: &Path) -> Result<CompileOutcome, CompileError> {
        (**self).compile(input, output)
    }
}
