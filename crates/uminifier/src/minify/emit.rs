//! emit.rs — Sérialisation des tokens.
//!
//! - `compact` : sortie minimale (une unité d'indentation par niveau, espaces
//!   seulement là où la re-tokenisation en a besoin) ;
//! - `untokenize` : reconstruction fidèle depuis les positions source.

use super::token::{is_word_char, match_operator, Pos, Token, TokenKind};
use super::transform::Stripped;
use super::MinifierOptions;

pub fn compact(stripped: &Stripped, options: &MinifierOptions) -> String {
    let unit = if options.tabs { "\t" } else { " " };
    let mut out = String::new();
    for line in &stripped.header {
        out.push_str(line);
        out.push('\n');
    }

    let mut depth = 0usize;
    let mut line_start = true;
    let mut prev: Option<&Token> = None;
    for tok in &stripped.tokens {
        match tok.kind {
            TokenKind::Indent => depth += 1,
            TokenKind::Dedent => depth = depth.saturating_sub(1),
            TokenKind::Newline => {
                out.push('\n');
                line_start = true;
                prev = None;
            }
            TokenKind::Comment | TokenKind::Nl | TokenKind::EndMarker => {}
            TokenKind::Name | TokenKind::Number | TokenKind::String | TokenKind::Op => {
                if line_start {
                    out.push_str(&unit.repeat(depth));
                    line_start = false;
                } else if prev.is_some_and(|p| needs_space(p, tok)) {
                    out.push(' ');
                }
                out.push_str(&tok.text);
                prev = Some(tok);
            }
        }
    }
    out
}

/// Vrai si coller `next` à `prev` changerait la re-tokenisation.
fn needs_space(prev: &Token, next: &Token) -> bool {
    let (Some(last), Some(first)) = (prev.text.chars().last(), next.text.chars().next()) else {
        return false;
    };
    match (prev.kind, next.kind) {
        // `1 .real`, `1 if`, `0x1 or` : le nombre absorberait la suite.
        (TokenKind::Number, _) => is_word_char(first) || first == '.',
        // `"" "a"` deviendrait une triple quote.
        (TokenKind::String, TokenKind::String) => true,
        (TokenKind::Op, TokenKind::Op) => operators_fuse(&prev.text, &next.text),
        _ => is_word_char(last) && is_word_char(first),
    }
}

fn operators_fuse(prev: &str, next: &str) -> bool {
    if prev == "." && next.starts_with('.') {
        return true;
    }
    let joined = format!("{prev}{next}");
    match_operator(&joined).is_some_and(|op| op.len() > prev.len())
}

/// Reconstruit le texte à partir des positions (même contrat que
/// `tokenize.untokenize` côté CPython) : écarts sur une ligne → espaces,
/// écarts de lignes → continuations `\`, indentation reprise de la pile `Indent`.
pub fn untokenize(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut cur = Pos::new(1, 0);
    let mut indents: Vec<&str> = Vec::new();
    let mut line_start = true;

    for tok in tokens {
        match tok.kind {
            TokenKind::EndMarker => break,
            TokenKind::Indent => {
                indents.push(&tok.text);
                continue;
            }
            TokenKind::Dedent => {
                indents.pop();
                cur = tok.end;
                continue;
            }
            TokenKind::Newline | TokenKind::Nl => line_start = true,
            _ if line_start => {
                if let Some(indent) = indents.last() {
                    let width = indent.chars().count();
                    if tok.start.col >= width {
                        out.push_str(indent);
                        cur.col = width;
                    }
                }
                line_start = false;
            }
            _ => {}
        }

        if tok.start.line > cur.line {
            out.push_str(&"\\\n".repeat(tok.start.line - cur.line));
            cur.col = 0;
        }
        if tok.start.col > cur.col {
            out.push_str(&" ".repeat(tok.start.col - cur.col));
        }
        out.push_str(&tok.text);
        cur = tok.end;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minify::lexer::tokenize;
    use crate::minify::transform::strip;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn compact_src(src: &str, options: &MinifierOptions) -> String {
        compact(&strip(tokenize(src).unwrap()), options)
    }

    #[test]
    fn untokenize_round_trips_regular_source() {
        let src = indoc! {r#"
            # -*- coding: utf-8 -*-
            import os

            def f(a, b=2):
                """Doc."""
                total = [
                    a,  # first
                    b,
                ]

                if total:
                    return '''multi
            line'''
                return None
            x = f(1)
        "#};
        assert_eq!(untokenize(&tokenize(src).unwrap()), src);
    }

    #[test]
    fn untokenize_keeps_tab_indentation() {
        let src = "if x:\n\ty = 1\n\tz = 2\nw = 3\n";
        assert_eq!(untokenize(&tokenize(src).unwrap()), src);
    }

    #[test]
    fn untokenize_rewrites_continuations() {
        let src = "x = 1 + \\\n    2\n";
        assert_eq!(untokenize(&tokenize(src).unwrap()), "x = 1 +\\\n    2\n");
    }

    #[test]
    fn compact_spacing() {
        let src = indoc! {"
            def add(a, b = 1) -> int:
                return a + b if a is not None else - b
            x = 1 .real
            y = 0x1f or 2
            z = '' 'a'
            w = a [1 : 3] ** -1
        "};
        assert_eq!(compact_src(src, &MinifierOptions::FIXED), indoc! {"
            def add(a,b=1)->int:
             return a+b if a is not None else-b
            x=1 .real
            y=0x1f or 2
            z='' 'a'
            w=a[1:3]**-1
        "});
    }

    #[test]
    fn compact_nested_blocks_and_tabs() {
        let src = "class A:\n    def f(self):\n        if self:\n            return 1\n        return 2\n";
        let mut options = MinifierOptions::FIXED;
        assert_eq!(
            compact_src(src, &options),
            "class A:\n def f(self):\n  if self:\n   return 1\n  return 2\n"
        );
        options.tabs = true;
        assert_eq!(
            compact_src(src, &options),
            "class A:\n\tdef f(self):\n\t\tif self:\n\t\t\treturn 1\n\t\treturn 2\n"
        );
    }

    #[test]
    fn operators_that_would_fuse_are_separated() {
        assert!(operators_fuse("*", "*"));
        assert!(operators_fuse("*", "*="));
        assert!(operators_fuse("=", "="));
        assert!(operators_fuse(".", "."));
        assert!(!operators_fuse("(", ")"));
        assert!(!operators_fuse("=", "-"));
        assert!(!operators_fuse(")", "."));
    }
}
