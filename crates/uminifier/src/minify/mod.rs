//! minify — Réduction d'une source Python sans changer son comportement.
//!
//! Chaîne : tokenize → transform (commentaires, docstrings, lignes vides)
//! → compact (indentation minimale, espaces utiles) → re-tokenize → untokenize.
//! La re-tokenisation valide la sortie : un texte compacté illisible remonte
//! en `MinifyError::Revalidate` au lieu de partir vers le compilateur.

pub mod emit;
pub mod lexer;
pub mod token;
pub mod transform;

use thiserror::Error;

pub use lexer::{tokenize, TokenizeError, TokenizeErrorKind};
pub use token::{Pos, Token, TokenKind};

#[derive(Error, Debug)]
pub enum MinifyError {
    #[error("tokenization failed")]
    Tokenize(#[from] TokenizeError),
    #[error("minified output does not tokenize again")]
    Revalidate(#[source] TokenizeError),
    #[error("unsupported minifier option `{0}` (identifier obfuscation is not available)")]
    UnsupportedOption(&'static str),
}

/// Options de minification (mêmes champs que le jeu d'options pyminifier).
///
/// Valeur immuable passée explicitement au [`Minifier`] ; seule la
/// configuration [`MinifierOptions::FIXED`] est exposée côté CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinifierOptions {
    /// Indenter avec des tabulations plutôt qu'une espace par niveau.
    pub tabs: bool,
    pub obfuscate_all: bool,
    pub obfuscate_classes: bool,
    pub obfuscate_functions: bool,
    pub obfuscate_variables: bool,
    pub obfuscate_builtins: bool,
    pub obfuscate_imports: bool,
    /// Ne rien réduire : la source ressort telle que re-tokenisée.
    pub skip_minification: bool,
    /// Longueur des noms de remplacement (obfuscation uniquement).
    pub replacement_length: usize,
    pub use_non_latin: bool,
}

impl MinifierOptions {
    pub const FIXED: Self = Self {
        tabs: false,
        obfuscate_all: false,
        obfuscate_classes: false,
        obfuscate_functions: false,
        obfuscate_variables: false,
        obfuscate_builtins: false,
        obfuscate_imports: false,
        skip_minification: false,
        replacement_length: 1,
        use_non_latin: false,
    };

    /// Premier drapeau d'obfuscation activé, s'il y en a un.
    fn requested_obfuscation(&self) -> Option<&'static str> {
        [
            (self.obfuscate_all, "obfuscate_all"),
            (self.obfuscate_classes, "obfuscate_classes"),
            (self.obfuscate_functions, "obfuscate_functions"),
            (self.obfuscate_variables, "obfuscate_variables"),
            (self.obfuscate_builtins, "obfuscate_builtins"),
            (self.obfuscate_imports, "obfuscate_imports"),
            (self.use_non_latin, "use_non_latin"),
        ]
        .into_iter()
        .find_map(|(on, name)| on.then_some(name))
    }
}

impl Default for MinifierOptions {
    fn default() -> Self {
        Self::FIXED
    }
}

#[derive(Debug, Clone)]
pub struct Minifier {
    options: MinifierOptions,
}

impl Minifier {
    pub fn new(options: MinifierOptions) -> Result<Self, MinifyError> {
        if let Some(flag) = options.requested_obfuscation() {
            return Err(MinifyError::UnsupportedOption(flag));
        }
        Ok(Self { options })
    }

    pub fn minify_text(&self, source: &str) -> Result<String, MinifyError> {
        let tokens = tokenize(source)?;
        if self.options.skip_minification {
            return Ok(emit::untokenize(&tokens));
        }
        let stripped = transform::strip(tokens);
        let compacted = emit::compact(&stripped, &self.options);
        let tokens = tokenize(&compacted).map_err(MinifyError::Revalidate)?;
        Ok(emit::untokenize(&tokens))
    }
}

impl Default for Minifier {
    fn default() -> Self {
        Self { options: MinifierOptions::FIXED }
    }
}
