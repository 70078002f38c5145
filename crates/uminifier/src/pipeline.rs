//! pipeline.rs — Conversion complète d'un fichier `.py` en `.mpy`.
//!
//! Étapes (séquentielles, une seule fois par requête) :
//!   validate → sizes → minify → write intermediate → output dir → compile → cleanup
//!
//! Le fichier intermédiaire n'est supprimé qu'après une compilation réussie
//! (et sans `keep_intermediate`) ; sur échec il reste sur disque pour inspection.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::backends::{Compile, CompileError, CompileOutcome, MpyCross};
use crate::config::CompilerConfig;
use crate::minify::{Minifier, MinifyError};
use crate::util::fs::{absolute, ensure_dir, file_size, intermediate_path, SizeError};

/* ───────────────────────── Requête ───────────────────────── */

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub keep_intermediate: bool,
    pub verbose: bool,
}

impl ConversionRequest {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self { input: input.into(), output: output.into(), keep_intermediate: false, verbose: false }
    }

    pub fn keep(mut self, keep: bool) -> Self {
        self.keep_intermediate = keep;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/* ───────────────────────── Résultat ───────────────────────── */

/// Sort du fichier intermédiaire après l'étape de nettoyage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntermediateFate {
    Deleted,
    /// Conservé à la demande (`keep_intermediate`).
    Kept,
    /// Conservé parce que la compilation a échoué.
    RetainedAfterFailure,
    /// Disparu avant le nettoyage (supprimé par un tiers).
    Missing,
    /// La suppression a échoué ; le message d'E/S est conservé.
    CleanupFailed(String),
}

impl IntermediateFate {
    pub fn on_disk(&self) -> bool {
        matches!(self, Self::Kept | Self::RetainedAfterFailure | Self::CleanupFailed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub input_path: PathBuf,
    pub intermediate_path: PathBuf,
    pub output_path: PathBuf,
    pub input_size: u64,
    pub intermediate_size: u64,
    /// `None` si aucun artefact n'a été trouvé après compilation.
    pub output_size: Option<u64>,
    pub output_dir_created: bool,
    pub compile: CompileOutcome,
    pub intermediate: IntermediateFate,
}

impl ConversionResult {
    /// Compilation terminée avec succès *et* artefact présent.
    pub fn is_success(&self) -> bool {
        self.compile.success() && self.output_size.is_some()
    }

    /// `input_size - output_size` (négatif si le bytecode est plus gros).
    pub fn bytes_reduced(&self) -> Option<i64> {
        let signed = |n: u64| i64::try_from(n).unwrap_or(i64::MAX);
        self.output_size.map(|out| signed(self.input_size) - signed(out))
    }
}

/* ───────────────────────── Erreurs ───────────────────────── */

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Seems like the path {} does not exist.", .path.display())]
    InputNotFound { path: PathBuf },
    #[error("cannot resolve {}", .path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot read {}", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot minify {}", .path.display())]
    Minify {
        path: PathBuf,
        #[source]
        source: MinifyError,
    },
    #[error("cannot write {}", .path.display())]
    WriteIntermediate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot create directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Size(#[from] SizeError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

/* ───────────────────────── Pipeline ───────────────────────── */

#[derive(Debug, Clone)]
pub struct Pipeline<C> {
    minifier: Minifier,
    compiler: C,
}

impl Pipeline<MpyCross> {
    /// Minifieur par défaut + `mpy-cross` configuré.
    pub fn from_config(cfg: &CompilerConfig) -> Self {
        Self::new(Minifier::default(), MpyCross::new(cfg))
    }
}

impl<C: Compile> Pipeline<C> {
    pub fn new(minifier: Minifier, compiler: C) -> Self {
        Self { minifier, compiler }
    }

    pub fn run(&self, request: &ConversionRequest) -> Result<ConversionResult, PipelineError> {
        let stage = Stage { verbose: request.verbose };

        let input = resolve(&request.input)?;
        if !input.exists() {
            return Err(PipelineError::InputNotFound { path: request.input.clone() });
        }
        let output = resolve(&request.output)?;
        let intermediate = intermediate_path(&input);

        let input_size = file_size(&input)?;
        stage.report(format_args!("{}: {input_size} B", input.display()));

        let source = fs::read_to_string(&input)
            .map_err(|source| PipelineError::ReadInput { path: input.clone(), source })?;
        let minified = self
            .minifier
            .minify_text(&source)
            .map_err(|source| PipelineError::Minify { path: input.clone(), source })?;

        fs::write(&intermediate, &minified)
            .map_err(|source| PipelineError::WriteIntermediate { path: intermediate.clone(), source })?;
        let intermediate_size = file_size(&intermediate)?;
        stage.report(format_args!("{}: {intermediate_size} B", intermediate.display()));

        let output_dir_created = match output.parent() {
            Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => {
                stage.report(format_args!("Creating {} directory.", dir.display()));
                ensure_dir(dir)
                    .map_err(|source| PipelineError::CreateDir { path: dir.to_path_buf(), source })?
            }
            _ => false,
        };

        debug!("compiling {} with {}", intermediate.display(), self.compiler.name());
        let compile = self.compiler.compile(&intermediate, &output)?;
        if !compile.success() {
            warn!(
                "{} failed on {} (exit code {:?}{})",
                self.compiler.name(),
                intermediate.display(),
                compile.exit_code,
                if compile.timed_out { ", timed out" } else { "" },
            );
        }

        let output_size = match file_size(&output) {
            Ok(size) => {
                stage.report(format_args!("{}: {size} B", output.display()));
                Some(size)
            }
            Err(e) if !compile.success() => {
                debug!("{e}: {}", e.source);
                None
            }
            Err(e) if e.is_not_found() => {
                warn!("no bytecode produced at {}", output.display());
                None
            }
            Err(e) => {
                warn!("{e}: {}", e.source);
                None
            }
        };

        let succeeded = compile.success() && output_size.is_some();
        let fate = cleanup(&intermediate, succeeded, request.keep_intermediate, &stage);

        Ok(ConversionResult {
            input_path: input,
            intermediate_path: intermediate,
            output_path: output,
            input_size,
            intermediate_size,
            output_size,
            output_dir_created,
            compile,
            intermediate: fate,
        })
    }
}

fn resolve(path: &Path) -> Result<PathBuf, PipelineError> {
    absolute(path).map_err(|source| PipelineError::Resolve { path: path.to_path_buf(), source })
}

fn cleanup(intermediate: &Path, succeeded: bool, keep: bool, stage: &Stage) -> IntermediateFate {
    if !succeeded {
        return IntermediateFate::RetainedAfterFailure;
    }
    if keep {
        return IntermediateFate::Kept;
    }
    if !intermediate.exists() {
        return IntermediateFate::Missing;
    }
    stage.report(format_args!("Deleting {}", intermediate.display()));
    match fs::remove_file(intermediate) {
        Ok(()) => IntermediateFate::Deleted,
        Err(e) => {
            warn!("cannot delete {}: {e}", intermediate.display());
            IntermediateFate::CleanupFailed(e.to_string())
        }
    }
}

/// Lignes de progression : `info` en mode verbeux, `debug` sinon.
struct Stage {
    verbose: bool,
}

impl Stage {
    fn report(&self, line: fmt::Arguments<'_>) {
        if self.verbose {
            info!("{line}");
        } else {
            debug!("{line}");
        }
    }
}
