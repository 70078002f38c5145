//! logging.rs — Branchement `env_logger` pour les logs de la lib.
//!
//! `-v` → niveau Info (lignes d'étape), sinon Warn. Pas de `RUST_LOG`.
//! Info s'écrit tel quel sur stdout ; warn/error sont préfixés d'un tag coloré.

use std::io::Write;

use env_logger::{Builder, Target};
use log::{Level, LevelFilter};
use yansi::Paint;

pub fn level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    }
}

pub fn init(verbose: bool) {
    Builder::new()
        .filter_level(level(verbose))
        .target(Target::Stdout)
        .format(|buf, record| match record.level() {
            Level::Error => writeln!(buf, "{} {}", "error:".red().bold(), record.args()),
            Level::Warn => writeln!(buf, "{} {}", "warning:".yellow().bold(), record.args()),
            _ => writeln!(buf, "{}", record.args()),
        })
        .init();
}
