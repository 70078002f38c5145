//! lexer.rs — Analyse lexicale Python 3 (sous-ensemble MicroPython).
//!
//! Produit le même découpage que `tokenize` côté CPython :
//! - lignes logiques (`Newline`) vs physiques (`Nl`) ;
//! - `Indent`/`Dedent` via une pile d'indentation (tabulations alignées sur 8) ;
//! - jonction implicite entre parenthèses, continuation par `\` ;
//! - chaînes avec préfixes (`r`, `b`, `u`, `f` et combinaisons), simples ou triples ;
//! - nombres dec/hex/oct/bin, flottants, exposants, imaginaires, `_` autorisés.
//!
//! API :
//!   let toks = tokenize(src)?;

use thiserror::Error;

use super::token::{is_ident_start, is_word_char, match_operator, Pos, Token, TokenKind};

/* ───────────────────────── Erreurs ───────────────────────── */

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}, column {col}: {kind}")]
pub struct TokenizeError {
    pub line: usize,
    pub col: usize,
    pub kind: TokenizeErrorKind,
}

impl TokenizeError {
    fn at(pos: Pos, kind: TokenizeErrorKind) -> Self {
        Self { line: pos.line, col: pos.col, kind }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated triple-quoted string literal")]
    UnterminatedTripleString,
    #[error("unindent does not match any outer indentation level")]
    InconsistentDedent,
    #[error("inconsistent use of tabs and spaces in indentation")]
    InconsistentTabs,
    #[error("unmatched '{0}'")]
    UnmatchedBracket(char),
    #[error("closing parenthesis '{close}' does not match opening parenthesis '{open}'")]
    MismatchedBracket { open: char, close: char },
    #[error("unexpected EOF in multi-line statement")]
    EofInMultiLineStatement,
    #[error("unexpected character after line continuation character")]
    BadContinuation,
    #[error("unexpected EOF after line continuation character")]
    EofAfterContinuation,
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
}

/// Tokenise intégralement une source Python.
pub fn tokenize(src: &str) -> Result<Vec<Token>, TokenizeError> {
    Lexer::new(src).run()
}

/* ───────────────────────── Lexer ───────────────────────── */

const TAB_SIZE: usize = 8;

struct Lexer {
    chars: Vec<char>,
    i: usize,
    pos: Pos,
    tokens: Vec<Token>,
    /// Largeurs d'indentation ouvertes `(tab = 8, tab = 1)` ; la base reste toujours présente.
    /// Les deux mesures doivent donner le même ordre, sinon tabs et espaces sont mélangés.
    indents: Vec<(usize, usize)>,
    /// Parenthèses ouvertes (caractère + position) pour la jonction implicite.
    brackets: Vec<(char, Pos)>,
    /// Début d'une ligne physique.
    line_start: bool,
    /// La ligne précédente s'est terminée par `\`.
    continued: bool,
    /// La ligne logique courante contient au moins un token significatif.
    line_has_tokens: bool,
}

impl Lexer {
    fn new(src: &str) -> Self {
        let src = src.strip_prefix('\u{feff}').unwrap_or(src);
        Self {
            chars: src.chars().collect(),
            i: 0,
            pos: Pos::new(1, 0),
            tokens: Vec::new(),
            indents: vec![(0, 0)],
            brackets: Vec::new(),
            line_start: true,
            continued: false,
            line_has_tokens: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.i).copied()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.i + n).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.i += 1;
        match c {
            '\n' => self.newline_pos(),
            '\r' if self.peek() != Some('\n') => self.newline_pos(),
            _ => self.pos.col += 1,
        }
        Some(c)
    }

    fn newline_pos(&mut self) {
        self.pos.line += 1;
        self.pos.col = 0;
    }

    fn text_from(&self, begin: usize) -> String {
        self.chars[begin..self.i].iter().collect()
    }

    fn push(&mut self, kind: TokenKind, begin: usize, start: Pos) {
        let text = self.text_from(begin);
        if matches!(kind, TokenKind::Name | TokenKind::Number | TokenKind::String | TokenKind::Op) {
            self.line_has_tokens = true;
        }
        self.tokens.push(Token::new(kind, text, start, self.pos));
    }

    fn run(mut self) -> Result<Vec<Token>, TokenizeError> {
        while self.peek().is_some() {
            if self.line_start {
                self.line_start = false;
                if self.continued {
                    self.continued = false;
                } else if self.brackets.is_empty() {
                    self.indentation()?;
                    continue;
                }
            }
            self.step()?;
        }
        self.finish()
    }

    fn step(&mut self) -> Result<(), TokenizeError> {
        let Some(c) = self.peek() else { return Ok(()) };
        let start = self.pos;
        let begin = self.i;
        match c {
            ' ' | '\t' | '\x0c' => {
                self.bump();
            }
            '#' => {
                while !matches!(self.peek(), None | Some('\n' | '\r')) {
                    self.bump();
                }
                self.push(TokenKind::Comment, begin, start);
            }
            '\n' | '\r' => self.line_end(begin, start),
            '\\' => self.continuation(start)?,
            '"' | '\'' => self.string(begin, start)?,
            c if c.is_ascii_digit() => self.number(begin, start),
            '.' if self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => self.number(begin, start),
            c if is_ident_start(c) => self.name_or_string(begin, start)?,
            _ => self.operator(c, begin, start)?,
        }
        Ok(())
    }

    /// Mesure l'indentation d'une ligne physique et émet `Indent`/`Dedent`.
    /// Les lignes vides ou en commentaire seul ne touchent pas la pile.
    fn indentation(&mut self) -> Result<(), TokenizeError> {
        let begin = self.i;
        let start = self.pos;
        let (mut width, mut alt) = (0, 0);
        while let Some(c @ (' ' | '\t' | '\x0c')) = self.peek() {
            (width, alt) = match c {
                ' ' => (width + 1, alt + 1),
                '\t' => ((width / TAB_SIZE + 1) * TAB_SIZE, alt + 1),
                _ => (0, 0),
            };
            self.bump();
        }
        if matches!(self.peek(), None | Some('#' | '\n' | '\r')) {
            return Ok(());
        }

        let (top, top_alt) = self.indents.last().copied().unwrap_or((0, 0));
        if width > top {
            if alt <= top_alt {
                return Err(TokenizeError::at(self.pos, TokenizeErrorKind::InconsistentTabs));
            }
            self.indents.push((width, alt));
            self.push(TokenKind::Indent, begin, start);
            return Ok(());
        }
        while self.indents.last().is_some_and(|&(w, _)| w > width) {
            self.indents.pop();
            self.tokens.push(Token::new(TokenKind::Dedent, "", self.pos, self.pos));
        }
        match self.indents.last() {
            Some(&(w, _)) if w != width => {
                Err(TokenizeError::at(self.pos, TokenizeErrorKind::InconsistentDedent))
            }
            Some(&(_, a)) if a != alt => {
                Err(TokenizeError::at(self.pos, TokenizeErrorKind::InconsistentTabs))
            }
            _ => Ok(()),
        }
    }

    fn line_end(&mut self, begin: usize, start: Pos) {
        if self.peek() == Some('\r') && self.peek_at(1) == Some('\n') {
            self.bump();
        }
        self.bump();
        let kind = if self.brackets.is_empty() && self.line_has_tokens {
            self.line_has_tokens = false;
            TokenKind::Newline
        } else {
            TokenKind::Nl
        };
        self.push(kind, begin, start);
        self.line_start = true;
    }

    fn continuation(&mut self, start: Pos) -> Result<(), TokenizeError> {
        self.bump();
        match self.peek() {
            Some('\r') => {
                self.bump();
                if self.peek() == Some('\n') {
                    self.bump();
                }
            }
            Some('\n') => {
                self.bump();
            }
            _ => return Err(TokenizeError::at(start, TokenizeErrorKind::BadContinuation)),
        }
        if self.peek().is_none() {
            return Err(TokenizeError::at(self.pos, TokenizeErrorKind::EofAfterContinuation));
        }
        self.line_start = true;
        self.continued = true;
        Ok(())
    }

    fn name_or_string(&mut self, begin: usize, start: Pos) -> Result<(), TokenizeError> {
        let len = self.chars[self.i..].iter().take_while(|&&c| is_word_char(c)).count();
        let word: String = self.chars[self.i..self.i + len].iter().collect();
        if is_string_prefix(&word) && matches!(self.peek_at(len), Some('"' | '\'')) {
            return self.string(begin, start);
        }
        for _ in 0..len {
            self.bump();
        }
        self.push(TokenKind::Name, begin, start);
        Ok(())
    }

    fn string(&mut self, begin: usize, start: Pos) -> Result<(), TokenizeError> {
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.bump();
        }
        let Some(quote) = self.bump() else {
            return Err(TokenizeError::at(start, TokenizeErrorKind::UnterminatedString));
        };
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.bump();
            self.bump();
        }
        let unterminated = if triple {
            TokenizeErrorKind::UnterminatedTripleString
        } else {
            TokenizeErrorKind::UnterminatedString
        };

        loop {
            match self.bump() {
                None => return Err(TokenizeError::at(start, unterminated)),
                // Un `\` protège toujours le caractère suivant, même en mode brut.
                Some('\\') => {
                    let escaped = self.bump();
                    if escaped == Some('\r') && self.peek() == Some('\n') {
                        self.bump();
                    }
                    if escaped.is_none() {
                        return Err(TokenizeError::at(start, unterminated));
                    }
                }
                Some(c) if c == quote => {
                    if !triple {
                        break;
                    }
                    if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                        self.bump();
                        self.bump();
                        break;
                    }
                }
                Some('\n' | '\r') if !triple => {
                    return Err(TokenizeError::at(start, unterminated));
                }
                Some(_) => {}
            }
        }
        self.push(TokenKind::String, begin, start);
        Ok(())
    }

    fn number(&mut self, begin: usize, start: Pos) {
        let digits = |lx: &mut Self| {
            while lx.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
                lx.bump();
            }
        };

        if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B')) {
            self.bump();
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit() || c == '_') {
                self.bump();
            }
        } else {
            digits(self);
            if self.peek() == Some('.') {
                self.bump();
                digits(self);
            }
            let exponent = match (self.peek(), self.peek_at(1), self.peek_at(2)) {
                (Some('e' | 'E'), Some(d), _) if d.is_ascii_digit() => true,
                (Some('e' | 'E'), Some('+' | '-'), Some(d)) => d.is_ascii_digit(),
                _ => false,
            };
            if exponent {
                self.bump();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.bump();
                }
                digits(self);
            }
            if matches!(self.peek(), Some('j' | 'J')) {
                self.bump();
            }
        }
        self.push(TokenKind::Number, begin, start);
    }

    fn operator(&mut self, c: char, begin: usize, start: Pos) -> Result<(), TokenizeError> {
        let window: String = self.chars[self.i..].iter().take(3).collect();
        let Some(op) = match_operator(&window) else {
            return Err(TokenizeError::at(start, TokenizeErrorKind::InvalidCharacter(c)));
        };
        for _ in 0..op.chars().count() {
            self.bump();
        }
        match c {
            '(' | '[' | '{' => self.brackets.push((c, start)),
            ')' | ']' | '}' => match self.brackets.pop() {
                None => return Err(TokenizeError::at(start, TokenizeErrorKind::UnmatchedBracket(c))),
                Some((open, _)) if closing_for(open) != c => {
                    return Err(TokenizeError::at(
                        start,
                        TokenizeErrorKind::MismatchedBracket { open, close: c },
                    ));
                }
                Some(_) => {}
            },
            _ => {}
        }
        self.push(TokenKind::Op, begin, start);
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Token>, TokenizeError> {
        if let Some(&(_, open_pos)) = self.brackets.first() {
            return Err(TokenizeError::at(open_pos, TokenizeErrorKind::EofInMultiLineStatement));
        }
        if self.line_has_tokens {
            self.tokens.push(Token::new(TokenKind::Newline, "", self.pos, self.pos));
        }
        for _ in 1..self.indents.len() {
            self.tokens.push(Token::new(TokenKind::Dedent, "", self.pos, self.pos));
        }
        self.tokens.push(Token::new(TokenKind::EndMarker, "", self.pos, self.pos));
        Ok(self.tokens)
    }
}

fn closing_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

fn is_string_prefix(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "r" | "u" | "b" | "f" | "br" | "rb" | "fr" | "rf"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use TokenKind::{Comment, Dedent, EndMarker, Indent, Name, Newline, Nl, Number, Op};

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn texts(src: &str) -> Vec<String> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .filter(|t| !matches!(t.kind, Newline | Nl | Indent | Dedent | EndMarker))
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn simple_statement() {
        assert_eq!(kinds("x = 1\n"), vec![Name, Op, Number, Newline, EndMarker]);
    }

    #[test]
    fn missing_trailing_newline_still_closes_line() {
        let toks = tokenize("x").unwrap();
        assert_eq!(toks[1].kind, Newline);
        assert_eq!(toks[1].text, "");
    }

    #[test]
    fn indent_and_dedent() {
        let src = indoc! {"
            def f():
                if x:
                    return 1
                return 2
            y = 3
        "};
        let k = kinds(src);
        assert_eq!(k.iter().filter(|&&k| k == Indent).count(), 2);
        assert_eq!(k.iter().filter(|&&k| k == Dedent).count(), 2);
        let toks = tokenize(src).unwrap();
        let first_indent = toks.iter().find(|t| t.kind == Indent).unwrap();
        assert_eq!(first_indent.text, "    ");
        assert_eq!(first_indent.start, Pos::new(2, 0));
    }

    #[test]
    fn blank_and_comment_lines_are_nl() {
        let src = "x = 1\n\n# note\n    # indented note\ny = 2\n";
        assert_eq!(kinds(src), vec![
            Name, Op, Number, Newline,
            Nl,
            Comment, Nl,
            Comment, Nl,
            Name, Op, Number, Newline,
            EndMarker,
        ]);
    }

    #[test]
    fn brackets_join_lines() {
        let src = "x = [\n    1,\n    2,\n]\n";
        let k = kinds(src);
        assert!(!k.contains(&Indent));
        assert_eq!(k.iter().filter(|&&k| k == Newline).count(), 1);
        assert_eq!(k.iter().filter(|&&k| k == Nl).count(), 3);
    }

    #[test]
    fn backslash_continuation() {
        let src = "x = 1 + \\\n        2\n";
        assert_eq!(kinds(src), vec![Name, Op, Number, Op, Number, Newline, EndMarker]);
    }

    #[test]
    fn string_prefixes_and_quotes() {
        let src = "a = rb'\\'' + f\"{x}\" + '''multi\nline''' + u\"\"\n";
        assert_eq!(texts(src), vec!["a", "=", "rb'\\''", "+", "f\"{x}\"", "+", "'''multi\nline'''", "+", "u\"\""]);
    }

    #[test]
    fn prefix_like_names_stay_names() {
        assert_eq!(kinds("rb = br\n"), vec![Name, Op, Name, Newline, EndMarker]);
    }

    #[test]
    fn multiline_string_positions() {
        let toks = tokenize("s = '''a\nbc'''\n").unwrap();
        let s = &toks[2];
        assert_eq!(s.start, Pos::new(1, 4));
        assert_eq!(s.end, Pos::new(2, 5));
    }

    #[test]
    fn numbers() {
        let src = "n = 0x_FF + 0o17 + 0b1 + 1_000 + 1. + .5 + 1e-3 + 2.5E+10 + 3j + 1.real\n";
        assert_eq!(texts(src), vec![
            "n", "=", "0x_FF", "+", "0o17", "+", "0b1", "+", "1_000", "+", "1.", "+", ".5", "+",
            "1e-3", "+", "2.5E+10", "+", "3j", "+", "1.", "real",
        ]);
    }

    #[test]
    fn operators_longest_match() {
        assert_eq!(texts("a **= b // c -> d ... e := f != g\n"), vec![
            "a", "**=", "b", "//", "c", "->", "d", "...", "e", ":=", "f", "!=", "g",
        ]);
    }

    #[test]
    fn crlf_newlines() {
        let toks = tokenize("x = 1\r\ny = 2\r\n").unwrap();
        assert_eq!(toks[3].text, "\r\n");
        assert_eq!(toks[4].start, Pos::new(2, 0));
    }

    #[test]
    fn errors_carry_positions() {
        let err = tokenize("x = 'abc\n").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::UnterminatedString);
        assert_eq!((err.line, err.col), (1, 4));

        let err = tokenize("s = '''abc\n").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::UnterminatedTripleString);

        let err = tokenize("if x:\n        a\n    b\n").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::InconsistentDedent);
        assert_eq!(err.line, 3);

        let err = tokenize("x = (1, 2]\n").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::MismatchedBracket { open: '(', close: ']' });

        let err = tokenize("x = 1)\n").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::UnmatchedBracket(')'));

        let err = tokenize("x = (1,\n").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::EofInMultiLineStatement);

        let err = tokenize("x = 1 \\ 2\n").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::BadContinuation);

        let err = tokenize("x = $\n").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::InvalidCharacter('$'));
        assert_eq!(err.to_string(), "line 1, column 4: invalid character '$'");
    }

    #[test]
    fn mixed_tabs_and_spaces_are_rejected() {
        let err = tokenize("if a:\n\tb = 1\n        c = 2\n").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::InconsistentTabs);
        assert_eq!(err.line, 3);

        let err = tokenize("if a:\n        b = 1\n        if c:\n\t\td = 2\n").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::InconsistentTabs);
    }

    #[test]
    fn consistent_tab_blocks_are_accepted() {
        let k = kinds("if a:\n\tif b:\n\t\tc = 1\n\td = 2\ne = 3\n");
        assert_eq!(k.iter().filter(|&&k| k == Indent).count(), 2);
        assert_eq!(k.iter().filter(|&&k| k == Dedent).count(), 2);
    }

    #[test]
    fn eof_dedents_are_emitted() {
        let k = kinds("if x:\n    y\n");
        assert_eq!(k, vec![Name, Name, Op, Newline, Indent, Name, Newline, Dedent, EndMarker]);
    }
}
