//! uminifier-cli/src/lib.rs — Front-end ligne de commande.
//!
//! Arguments (clap) → config compilateur (TOML optionnel) → pipeline.
//! La traduction résultat → message + code de sortie vit dans `main.rs`.

pub mod colors;
pub mod logging;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use serde::Deserialize;
use uminifier::{CompilerConfig, ConversionRequest, ConversionResult, Pipeline, BYTECODE_EXTENSION};

pub const ABOUT: &str = "Convert python files into .mpy (Micropython) files.";
pub const EPILOG: &str = "Report any bug at https://github.com/yeyeto2788/uminifier/issues";

/// Code de sortie des erreurs fatales (`exit(-1)` côté shell).
pub const FATAL_EXIT: u8 = 255;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "uminifier", version, about = ABOUT, after_help = EPILOG)]
pub struct Cli {
    /// Python file to convert
    pub filename: PathBuf,

    /// Output file [default: FILENAME with the .mpy extension]
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Keep the intermediate minified file
    #[arg(short, long)]
    pub keep: bool,

    /// Print size and status of every stage
    #[arg(short, long)]
    pub verbose: bool,

    /// mpy-cross executable to use (overrides the config file)
    #[arg(long = "mpy-cross", value_name = "PATH")]
    pub mpy_cross: Option<Utf8PathBuf>,

    /// TOML file with a [compiler] table
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| default_output(&self.filename))
    }

    pub fn request(&self) -> ConversionRequest {
        ConversionRequest::new(&self.filename, self.output_path())
            .keep(self.keep)
            .verbose(self.verbose)
    }

    /// Config fichier (si `--config`) puis surcharge `--mpy-cross`.
    pub fn compiler_config(&self) -> Result<CompilerConfig> {
        let mut cfg = match &self.config {
            Some(path) => load_settings(path)?.compiler,
            None => CompilerConfig::default(),
        };
        if let Some(program) = &self.mpy_cross {
            cfg.program = program.clone();
        }
        Ok(cfg)
    }
}

/// Fichier `--config` :
///
/// ```toml
/// [compiler]
/// program = "/opt/micropython/mpy-cross"
/// args = ["-march=xtensawin"]
/// timeout_secs = 60
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub compiler: CompilerConfig,
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid TOML in {}", path.display()))
}

/// `main.py` → `main.mpy`, `script` → `script.mpy`.
pub fn default_output(filename: &Path) -> PathBuf {
    filename.with_extension(BYTECODE_EXTENSION)
}

pub fn run(cli: &Cli) -> Result<ConversionResult> {
    let cfg = cli.compiler_config()?;
    log::debug!("compiler: {cfg:?}");
    let result = Pipeline::from_config(&cfg).run(&cli.request())?;
    Ok(result)
}
