//! Recursive-descent parser for the BIF subset:
//!
//! ```text
//! network "NAME" { property ...; }
//! variable NAME { type discrete [ K ] { v1, v2, ... }; property ...; }
//! probability ( TARGET | P1, P2, ... ) {
//!     table p, p, ...;              // root, or every row with the last parent fastest
//!     ( l1, l2, ... ) p, p, ...;    // one row per parent configuration
//!     default p, p, ...;            // rows not given explicitly
//!     property ...;
//! }
//! ```
//!
//! Commas between probabilities are optional.

use super::lexer::{Token, TokenKind};
use super::BifError;
use crate::network::{Network, NetworkBuilder};
use bn_math::{checked_product, row_index};
use std::collections::BTreeMap;

/// Largest CPT a `default` entry may expand into.
const MAX_DEFAULT_ROWS: usize = 1 << 24;

struct VariableDecl {
    name: String,
    values: Vec<String>,
    line: usize,
}

struct ConfiguredRow {
    labels: Vec<String>,
    probabilities: Vec<f64>,
    line: usize,
}

struct ProbabilityDecl {
    target: String,
    parents: Vec<String>,
    table: Option<Vec<f64>>,
    rows: Vec<ConfiguredRow>,
    default: Option<Vec<f64>>,
    line: usize,
}

pub(super) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub(super) fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        // tokenize always ends with Eof and we never advance past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn error_at(token: &Token, message: impl Into<String>) -> BifError {
        BifError::Syntax {
            line: token.line,
            column: token.column,
            message: message.into(),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, BifError> {
        let token = self.advance();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(Self::error_at(
                &token,
                format!("expected {kind}, found {}", describe(&token)),
            ))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<Token, BifError> {
        let token = self.advance();
        if token.kind == TokenKind::Word && token.text == keyword {
            Ok(token)
        } else {
            Err(Self::error_at(
                &token,
                format!("expected '{keyword}', found {}", describe(&token)),
            ))
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn name(&mut self) -> Result<String, BifError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Word | TokenKind::Str => Ok(token.text),
            _ => Err(Self::error_at(
                &token,
                format!("expected a name, found {}", describe(&token)),
            )),
        }
    }

    fn number(&mut self) -> Result<f64, BifError> {
        let token = self.advance();
        if token.kind == TokenKind::Word {
            if let Ok(value) = token.text.parse::<f64>() {
                return Ok(value);
            }
        }
        Err(Self::error_at(
            &token,
            format!("expected a probability, found {}", describe(&token)),
        ))
    }

    /// `name (, name)*` up to (not including) `close`.
    fn name_list(&mut self, close: TokenKind) -> Result<Vec<String>, BifError> {
        let mut names = vec![self.name()?];
        while self.eat(TokenKind::Comma) {
            names.push(self.name()?);
        }
        if self.peek().kind != close {
            let token = self.peek().clone();
            return Err(Self::error_at(
                &token,
                format!("expected ',' or {close}, found {}", describe(&token)),
            ));
        }
        Ok(names)
    }

    /// Probabilities up to and including the terminating `;`.
    fn number_list(&mut self) -> Result<Vec<f64>, BifError> {
        let mut values = Vec::new();
        loop {
            if self.eat(TokenKind::Semi) {
                return Ok(values);
            }
            if !values.is_empty() {
                self.eat(TokenKind::Comma);
            }
            values.push(self.number()?);
        }
    }

    /// Skip a `property ...;` statement.
    fn property(&mut self) -> Result<(), BifError> {
        self.expect_keyword("property")?;
        loop {
            let token = self.advance();
            match token.kind {
                TokenKind::Semi => return Ok(()),
                TokenKind::Eof | TokenKind::RBrace => {
                    return Err(Self::error_at(&token, "unterminated property"));
                }
                _ => {}
            }
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Word && token.text == keyword
    }

    fn network_block(&mut self) -> Result<String, BifError> {
        self.expect_keyword("network")?;
        let name = self.name()?;
        self.expect(TokenKind::LBrace)?;
        while !self.eat(TokenKind::RBrace) {
            self.property()?;
        }
        Ok(name)
    }

    fn variable_block(&mut self) -> Result<VariableDecl, BifError> {
        let keyword = self.expect_keyword("variable")?;
        let name = self.name()?;
        self.expect(TokenKind::LBrace)?;
        let mut values = None;

        while !self.eat(TokenKind::RBrace) {
            if self.at_keyword("property") {
                self.property()?;
                continue;
            }
            let type_token = self.expect_keyword("type")?;
            self.expect_keyword("discrete")?;
            self.expect(TokenKind::LBracket)?;
            let count_token = self.advance();
            let count: usize = count_token.text.parse().map_err(|_| {
                Self::error_at(
                    &count_token,
                    format!("expected a value count, found {}", describe(&count_token)),
                )
            })?;
            self.expect(TokenKind::RBracket)?;
            self.expect(TokenKind::LBrace)?;
            let labels = self.name_list(TokenKind::RBrace)?;
            self.expect(TokenKind::RBrace)?;
            self.expect(TokenKind::Semi)?;

            if labels.len() != count {
                return Err(BifError::Invalid {
                    line: type_token.line,
                    message: format!(
                        "variable '{name}' declares {count} values but lists {}",
                        labels.len()
                    ),
                });
            }
            if values.replace(labels).is_some() {
                return Err(BifError::Invalid {
                    line: type_token.line,
                    message: format!("variable '{name}' has more than one type"),
                });
            }
        }

        let values = values.ok_or_else(|| BifError::Invalid {
            line: keyword.line,
            message: format!("variable '{name}' has no type declaration"),
        })?;
        Ok(VariableDecl {
            name,
            values,
            line: keyword.line,
        })
    }

    fn probability_block(&mut self) -> Result<ProbabilityDecl, BifError> {
        let keyword = self.expect_keyword("probability")?;
        self.expect(TokenKind::LParen)?;
        let target = self.name()?;
        let parents = if self.eat(TokenKind::Pipe) {
            self.name_list(TokenKind::RParen)?
        } else {
            Vec::new()
        };
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::LBrace)?;

        let mut decl = ProbabilityDecl {
            target,
            parents,
            table: None,
            rows: Vec::new(),
            default: None,
            line: keyword.line,
        };

        while !self.eat(TokenKind::RBrace) {
            let token = self.peek().clone();
            match token.kind {
                TokenKind::LParen => {
                    self.advance();
                    let labels = self.name_list(TokenKind::RParen)?;
                    self.expect(TokenKind::RParen)?;
                    let probabilities = self.number_list()?;
                    decl.rows.push(ConfiguredRow {
                        labels,
                        probabilities,
                        line: token.line,
                    });
                }
                TokenKind::Word if token.text == "table" => {
                    self.advance();
                    let values = self.number_list()?;
                    if decl.table.replace(values).is_some() {
                        return Err(Self::error_at(&token, "duplicate 'table' entry"));
                    }
                }
                TokenKind::Word if token.text == "default" => {
                    self.advance();
                    let values = self.number_list()?;
                    if decl.default.replace(values).is_some() {
                        return Err(Self::error_at(&token, "duplicate 'default' entry"));
                    }
                }
                TokenKind::Word if token.text == "property" => self.property()?,
                _ => {
                    return Err(Self::error_at(
                        &token,
                        format!(
                            "expected 'table', 'default' or a parent configuration, found {}",
                            describe(&token)
                        ),
                    ));
                }
            }
        }

        Ok(decl)
    }

    /// Parse the whole token stream into a network.
    pub(super) fn parse_network(mut self) -> Result<Network, BifError> {
        let mut name = None;
        let mut variables = Vec::new();
        let mut probabilities = Vec::new();

        loop {
            let token = self.peek().clone();
            match (token.kind, token.text.as_str()) {
                (TokenKind::Eof, _) => break,
                (TokenKind::Word, "network") => {
                    let parsed = self.network_block()?;
                    if name.replace(parsed).is_some() {
                        return Err(Self::error_at(&token, "more than one network block"));
                    }
                }
                (TokenKind::Word, "variable") => variables.push(self.variable_block()?),
                (TokenKind::Word, "probability") => probabilities.push(self.probability_block()?),
                _ => {
                    return Err(Self::error_at(
                        &token,
                        format!(
                            "expected 'network', 'variable' or 'probability', found {}",
                            describe(&token)
                        ),
                    ));
                }
            }
        }

        assemble(name, variables, probabilities)
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Word => format!("'{}'", token.text),
        TokenKind::Str => format!("\"{}\"", token.text),
        kind => kind.to_string(),
    }
}

fn assemble(
    name: Option<String>,
    variables: Vec<VariableDecl>,
    probabilities: Vec<ProbabilityDecl>,
) -> Result<Network, BifError> {
    let mut builder = NetworkBuilder::new(name);
    for decl in variables {
        builder
            .add_variable(decl.name, decl.values)
            .map_err(|e| BifError::Invalid {
                line: decl.line,
                message: e.to_string(),
            })?;
    }

    for decl in probabilities {
        let rows = table_rows(&builder, &decl)?;
        builder
            .set_distribution(&decl.target, decl.parents, rows)
            .map_err(|e| BifError::Invalid {
                line: decl.line,
                message: e.to_string(),
            })?;
    }

    Ok(builder.build()?)
}

/// Lay out the CPT rows of one probability block.
///
/// Explicit `(labels)` rows land at the row index of their label tuple, so
/// their order in the file does not matter.
fn table_rows(builder: &NetworkBuilder, decl: &ProbabilityDecl) -> Result<Vec<Vec<f64>>, BifError> {
    let invalid = |line: usize, message: String| BifError::Invalid { line, message };
    let target = &decl.target;

    let cardinality = builder
        .values_of(target)
        .ok_or_else(|| invalid(decl.line, format!("probability block for undeclared variable '{target}'")))?
        .len();
    let mut parent_domains = Vec::with_capacity(decl.parents.len());
    for parent in &decl.parents {
        let values = builder.values_of(parent).ok_or_else(|| {
            invalid(
                decl.line,
                format!("variable '{target}' has undeclared parent '{parent}'"),
            )
        })?;
        parent_domains.push(values);
    }
    let radices: Vec<usize> = parent_domains.iter().map(|d| d.len()).collect();
    let row_count = checked_product(radices.iter().copied())
        .ok_or_else(|| invalid(decl.line, format!("'{target}' has too many parent configurations")))?;

    if decl.parents.is_empty() {
        if !decl.rows.is_empty() {
            return Err(invalid(
                decl.rows[0].line,
                format!("'{target}' has no parents but lists a parent configuration"),
            ));
        }
        let row = decl
            .table
            .clone()
            .or_else(|| decl.default.clone())
            .ok_or_else(|| invalid(decl.line, format!("'{target}' has no table")))?;
        return Ok(vec![row]);
    }

    if let Some(table) = &decl.table {
        if !decl.rows.is_empty() {
            return Err(invalid(
                decl.line,
                format!("'{target}' mixes 'table' with parent configurations"),
            ));
        }
        if row_count.checked_mul(cardinality) != Some(table.len()) {
            return Err(invalid(
                decl.line,
                format!(
                    "'{target}' table has {} entries, expected {} rows of {}",
                    table.len(),
                    row_count,
                    cardinality
                ),
            ));
        }
        return Ok(table.chunks(cardinality).map(<[f64]>::to_vec).collect());
    }

    // Keyed by row index; only rows present in the file are stored.
    let mut listed: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
    for row in &decl.rows {
        if row.labels.len() != decl.parents.len() {
            return Err(invalid(
                row.line,
                format!(
                    "'{target}' has {} parents but the configuration lists {} values",
                    decl.parents.len(),
                    row.labels.len()
                ),
            ));
        }
        let mut digits = Vec::with_capacity(row.labels.len());
        for ((label, parent), domain) in row.labels.iter().zip(&decl.parents).zip(&parent_domains) {
            let digit = domain.iter().position(|v| v == label).ok_or_else(|| {
                invalid(
                    row.line,
                    format!("'{label}' is not a value of parent '{parent}'"),
                )
            })?;
            digits.push(digit);
        }
        let index = row_index(&digits, &radices)
            .ok_or_else(|| invalid(row.line, format!("'{target}' row index overflows")))?;
        if listed.insert(index, row.probabilities.clone()).is_some() {
            return Err(invalid(
                row.line,
                format!("'{target}' lists ({}) twice", row.labels.join(", ")),
            ));
        }
    }

    let Some(default) = &decl.default else {
        // Every configuration must be listed; the first gap is at or below `listed.len()`.
        if let Some(missing) = (0..row_count).find(|index| !listed.contains_key(index)) {
            let digits = bn_math::row_digits(missing, &radices).unwrap_or_default();
            let labels: Vec<&str> = digits
                .iter()
                .zip(&parent_domains)
                .map(|(&d, domain)| domain[d].as_str())
                .collect();
            return Err(invalid(
                decl.line,
                format!("'{target}' has no row for ({})", labels.join(", ")),
            ));
        }
        return Ok(listed.into_values().collect());
    };

    if row_count > MAX_DEFAULT_ROWS {
        return Err(invalid(
            decl.line,
            format!(
                "'{target}' has {row_count} parent configurations, more than the {MAX_DEFAULT_ROWS} a 'default' row may fill"
            ),
        ));
    }
    Ok((0..row_count)
        .map(|index| listed.remove(&index).unwrap_or_else(|| default.clone()))
        .collect())
}
