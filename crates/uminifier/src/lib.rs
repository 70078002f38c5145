//! uminifier — Conversion de scripts Python en bytecode MicroPython (`.mpy`).
//! - Minifie la source (commentaires, docstrings, indentation, espaces)
//! - Écrit une copie intermédiaire `i<nom>.py` à côté de l'entrée
//! - Délègue la compilation au binaire externe `mpy-cross`
//! - Rapporte les tailles à chaque étape

pub mod backends;
pub mod config;
pub mod minify;
pub mod pipeline;
pub mod util;

pub use backends::{Compile, CompileError, CompileOutcome, MpyCross};
pub use config::{CompilerConfig, BYTECODE_EXTENSION};
pub use minify::{Minifier, MinifierOptions, MinifyError};
pub use pipeline::{ConversionRequest, ConversionResult, IntermediateFate, Pipeline, PipelineError};
pub use util::fs::{file_size, SizeError};
