//! util/fs.rs — Petits helpers fichiers : taille, dossiers, chemins dérivés.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Préfixe du fichier intermédiaire minifié (`main.py` → `imain.py`).
pub const INTERMEDIATE_MARKER: char = 'i';

#[derive(Error, Debug)]
#[error("cannot read size of {}", .path.display())]
pub struct SizeError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl SizeError {
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == io::ErrorKind::NotFound
    }
}

/// Taille en octets d'un fichier sur disque.
pub fn file_size(path: impl AsRef<Path>) -> Result<u64, SizeError> {
    let path = path.as_ref();
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|source| SizeError { path: path.to_path_buf(), source })
}

/// Crée `dir` (récursivement) s'il manque. Renvoie `true` si quelque chose a été créé.
pub fn ensure_dir(dir: &Path) -> io::Result<bool> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir)?;
    Ok(true)
}

/// Chemin du fichier intermédiaire : même dossier que `input`, nom préfixé.
pub fn intermediate_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(INTERMEDIATE_MARKER.to_string());
    if let Some(file) = input.file_name() {
        name.push(file);
    }
    input.with_file_name(name)
}

/// Chemin absolu sans toucher au disque (ni résolution de liens).
pub fn absolute(path: &Path) -> io::Result<PathBuf> {
    std::path::absolute(path)
}
