//! colors.rs — Mise en forme terminal (présentation uniquement).

use std::fmt::Display;
use std::io::{self, IsTerminal};

use yansi::{Paint, Painted};

/// Couleurs seulement vers un terminal (sorties redirigées restent brutes).
pub fn init() {
    if !io::stdout().is_terminal() || !io::stderr().is_terminal() {
        yansi::disable();
    }
}

pub fn success<T: Display>(msg: &T) -> Painted<&T> {
    msg.green()
}

pub fn highlight<T: Display>(msg: &T) -> Painted<&T> {
    msg.green().bold()
}

pub fn failure<T: Display>(msg: &T) -> Painted<&T> {
    msg.red()
}

pub fn warning<T: Display>(msg: &T) -> Painted<&T> {
    msg.yellow()
}
