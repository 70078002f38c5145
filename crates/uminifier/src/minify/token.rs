//! token.rs — Flux de tokens Python (modèle calqué sur le module `tokenize`).
//!
//! Chaque token garde sa lexème brute (`text`) et ses positions début/fin,
//! ce qui permet de reconstruire la source (`emit::untokenize`).

use std::fmt;

/// Position : ligne 1-based, colonne 0-based (comptée en `char`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Pos {
    pub line: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifiant ou mot-clé (`def`, `x`, `print`…)
    Name,
    Number,
    /// Littéral chaîne, préfixe et guillemets compris.
    String,
    /// Opérateur ou ponctuation.
    Op,
    /// `# ...` jusqu'à la fin de ligne (sans le saut).
    Comment,
    /// Fin de ligne logique.
    Newline,
    /// Saut de ligne non logique (ligne vide, commentaire seul, intérieur de parenthèses).
    Nl,
    /// Le texte est l'indentation complète de la ligne.
    Indent,
    Dedent,
    EndMarker,
}

impl TokenKind {
    /// Tokens sans contenu exécutable (ignorés par l'émetteur compact).
    pub const fn is_trivia(self) -> bool {
        matches!(self, Self::Comment | Self::Nl)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: Pos,
    pub end: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, start: Pos, end: Pos) -> Self {
        Self { kind, text: text.into(), start, end }
    }

    /// Token synthétique (positions nulles) produit par les passes de transformation.
    pub fn synthetic(kind: TokenKind, text: impl Into<String>) -> Self {
        Self::new(kind, text, Pos::default(), Pos::default())
    }

    /// Chaîne "f-string" : évalue des expressions, donc jamais une chaîne morte.
    pub fn is_fstring(&self) -> bool {
        self.kind == TokenKind::String
            && self
                .text
                .chars()
                .take_while(|c| c.is_ascii_alphabetic())
                .any(|c| c.eq_ignore_ascii_case(&'f'))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} @{}", self.kind, self.text, self.start)
    }
}

/* ───────────────────────── Opérateurs ───────────────────────── */

/// Opérateurs Python 3, du plus long au plus court (longest match).
pub const OPERATORS: &[&str] = &[
    "**=", "//=", ">>=", "<<=", "...",
    "**", "//", ">>", "<<", "<=", ">=", "==", "!=", "->",
    "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "@=", ":=",
    "+", "-", "*", "/", "%", "@", "&", "|", "^", "~", "<", ">",
    "(", ")", "[", "]", "{", "}", ",", ":", ";", ".", "=",
];

/// Plus long opérateur préfixe de `s`.
pub fn match_operator(s: &str) -> Option<&'static str> {
    OPERATORS.iter().copied().find(|op| s.starts_with(op))
}

/// Caractère d'identifiant (ASCII ou Unicode), chiffres compris.
pub fn is_word_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

pub fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}
