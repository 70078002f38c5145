//! transform.rs — Passe de réduction sur le flux de tokens.
//!
//! - supprime commentaires et lignes non logiques (`Nl`) ;
//! - conserve le shebang (ligne 1) et le cookie d'encodage PEP 263 (lignes 1-2) ;
//! - supprime les instructions « chaîne seule » (docstrings & co), sauf f-strings ;
//! - insère `pass` dans tout bloc vidé par la suppression.

use super::token::{Pos, Token, TokenKind};

/// Résultat de la passe : lignes d'en-tête conservées + tokens utiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stripped {
    pub header: Vec<String>,
    pub tokens: Vec<Token>,
}

pub fn strip(tokens: Vec<Token>) -> Stripped {
    let header = header_comments(&tokens);
    let tokens: Vec<Token> = tokens.into_iter().filter(|t| !t.kind.is_trivia()).collect();
    let tokens = drop_bare_strings(tokens);
    Stripped { header, tokens: fill_empty_blocks(tokens) }
}

fn header_comments(tokens: &[Token]) -> Vec<String> {
    tokens
        .iter()
        .enumerate()
        .filter(|(i, t)| {
            t.kind == TokenKind::Comment
                && t.start.line <= 2
                // Seul token de sa ligne (pas un commentaire de fin de ligne).
                && (*i == 0 || matches!(tokens[i - 1].kind, TokenKind::Nl | TokenKind::Newline))
                && (is_shebang(t) || is_coding_cookie(&t.text))
        })
        .map(|(_, t)| t.text.clone())
        .collect()
}

fn is_shebang(tok: &Token) -> bool {
    tok.start == Pos::new(1, 0) && tok.text.starts_with("#!")
}

fn is_coding_cookie(comment: &str) -> bool {
    comment.match_indices("coding").any(|(i, m)| {
        matches!(comment[i + m.len()..].chars().next(), Some(':' | '='))
    })
}

/// Une instruction commence en début de flux ou après `Newline`/`Indent`/`Dedent`.
fn drop_bare_strings(tokens: Vec<Token>) -> Vec<Token> {
    let mut keep = vec![true; tokens.len()];
    let mut stmt_start = true;
    let mut i = 0;
    while i < tokens.len() {
        if stmt_start {
            if let Some(end) = bare_string_statement(&tokens, i) {
                keep[i..=end].fill(false);
                i = end + 1;
                continue;
            }
        }
        stmt_start = matches!(tokens[i].kind, TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent);
        i += 1;
    }
    tokens.into_iter().zip(keep).filter_map(|(t, k)| k.then_some(t)).collect()
}

/// Index du `Newline` qui termine une instruction faite uniquement de chaînes.
fn bare_string_statement(tokens: &[Token], start: usize) -> Option<usize> {
    let strings = tokens[start..]
        .iter()
        .take_while(|t| t.kind == TokenKind::String && !t.is_fstring())
        .count();
    let end = start + strings;
    (strings > 0 && tokens.get(end).is_some_and(|t| t.kind == TokenKind::Newline)).then_some(end)
}

fn fill_empty_blocks(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for tok in tokens {
        if tok.kind == TokenKind::Dedent && out.last().is_some_and(|t| t.kind == TokenKind::Indent) {
            out.push(Token::synthetic(TokenKind::Name, "pass"));
            out.push(Token::synthetic(TokenKind::Newline, "\n"));
        }
        out.push(tok);
    }
    out
}
