//! Tokenizer for BIF network descriptions.

use super::BifError;
use logos::Logos;

/// Token kinds. Anything that is not punctuation, a quoted string or a
/// comment is a [`TokenKind::Word`]: keywords, names, value labels and
/// numbers are all told apart by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Logos)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum TokenKind {
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token("|")]
    Pipe,
    #[regex(r#""[^"]*""#)]
    Str,
    #[regex(r#"[^ \t\r\n\f{}()\[\],;|"/]+"#)]
    Word,
    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Semi => "';'",
            TokenKind::Pipe => "'|'",
            TokenKind::Str => "string",
            TokenKind::Word => "word",
            TokenKind::Eof => "end of input",
        };
        f.write_str(s)
    }
}

/// A token with its text and 1-based source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

/// Tracks line starts so byte offsets can be reported as line/column.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn position(&self, source: &str, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&s| s <= offset).max(1);
        let start = self.starts[line - 1];
        let column = source[start..offset].chars().count() + 1;
        (line, column)
    }
}

/// Split `source` into tokens, ending with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, BifError> {
    let index = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let (line, column) = index.position(source, span.start);
        let kind = result.map_err(|_| BifError::Syntax {
            line,
            column,
            message: format!("unexpected input {:?}", lexer.slice()),
        })?;
        let text = match kind {
            TokenKind::Str => lexer.slice().trim_matches('"').to_string(),
            _ => lexer.slice().to_string(),
        };
        tokens.push(Token {
            kind,
            text,
            line,
            column,
        });
    }

    let (line, column) = index.position(source, source.len());
    tokens.push(Token {
        kind: TokenKind::Eof,
        text: String::new(),
        line,
        column,
    });
    Ok(tokens)
}
