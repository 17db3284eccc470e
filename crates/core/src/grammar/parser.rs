use super::{
    diag::{self, Diagnostic, Span, codes},
    lexer::{Token, Tokens, tokenize},
};
use odontogram_tables::{STANDARD_MAX_FINDING, ToothId};
use serde::{Deserialize, Serialize};

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// How the digits of a status token are split into finding and tooth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenGrammar {
    /// `^(\d{3,4})([A-Za-z]*)$`: the last two digits are the tooth, the
    /// leading one or two digits are the finding.
    #[default]
    TrailingTooth,
    /// Greedy finding-first split: try a two-digit finding in
    /// `1..=max_finding` followed by a tooth in `11..=85`, else a one-digit
    /// finding. Everything after the tooth is the face string.
    LegacyFindingFirst,
}

impl TokenGrammar {
    /// Stable snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenGrammar::TrailingTooth => "trailing_tooth",
            TokenGrammar::LegacyFindingFirst => "legacy_finding_first",
        }
    }
}

impl std::fmt::Display for TokenGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded, not yet validated, status token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Finding code (leading digits).
    pub finding: u8,
    /// Tooth identifier (two digits).
    pub tooth: ToothId,
    /// Upper-cased candidate face letters (may be empty).
    pub faces: String,
    /// Byte span of the source token.
    pub span: Span,
}

/// Result of parsing a status string.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseResult {
    /// Decoded records, in token order.
    pub records: Vec<RawRecord>,
    /// Diagnostics for dropped tokens.
    pub diagnostics: Vec<Diagnostic>,
}

/// Lazy stream of decoded tokens. See [`tokens`].
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    inner: Tokens<'a>,
    grammar: TokenGrammar,
    max_finding: u8,
}

/// Decode the tokens of `raw` lazily against the standard finding range.
///
/// Each non-empty token yields `Ok(RawRecord)` or, when it does not match
/// `grammar`, `Err` with a [`codes::MALFORMED_TOKEN`] diagnostic. Empty
/// tokens yield nothing. The stream never panics.
pub fn tokens(raw: &str, grammar: TokenGrammar) -> TokenStream<'_> {
    tokens_with(raw, grammar, STANDARD_MAX_FINDING)
}

/// [`tokens`] with an explicit upper finding bound, normally
/// `ReferenceTables::max_finding`.
pub fn tokens_with(raw: &str, grammar: TokenGrammar, max_finding: u8) -> TokenStream<'_> {
    TokenStream {
        inner: tokenize(raw),
        grammar,
        max_finding,
    }
}

impl Iterator for TokenStream<'_> {
    type Item = Result<RawRecord, Diagnostic>;

    fn next(&mut self) -> Option<Self::Item> {
        let tok = self.inner.next()?;
        Some(decode(tok, self.grammar, self.max_finding))
    }
}

impl std::iter::FusedIterator for TokenStream<'_> {}

/// Parse a status string with the canonical grammar.
pub fn parse_status(raw: &str) -> ParseResult {
    parse_status_with(raw, TokenGrammar::default(), STANDARD_MAX_FINDING)
}

/// Parse a status string with an explicit grammar.
///
/// `max_finding` bounds the two-digit attempt of
/// [`TokenGrammar::LegacyFindingFirst`]; the canonical grammar ignores it.
pub fn parse_status_with(raw: &str, grammar: TokenGrammar, max_finding: u8) -> ParseResult {
    let mut result = ParseResult::default();
    let mut seen = 0usize;
    for item in tokens_with(raw, grammar, max_finding) {
        seen += 1;
        match item {
            Ok(rec) => result.records.push(rec),
            Err(d) => diag::report(&mut result.diagnostics, d),
        }
    }
    if seen == 0 {
        diag::report(
            &mut result.diagnostics,
            Diagnostic::for_code(codes::NO_FINDINGS, "status string contains no findings", None),
        );
    }
    tracing::debug!(
        %grammar,
        tokens = seen,
        records = result.records.len(),
        dropped = seen - result.records.len(),
        "parsed status string"
    );
    result
}

fn decode(tok: Token<'_>, grammar: TokenGrammar, max_finding: u8) -> Result<RawRecord, Diagnostic> {
    let span = Span::new(tok.start, tok.end);
    let split = match grammar {
        TokenGrammar::TrailingTooth => split_trailing(tok.text),
        TokenGrammar::LegacyFindingFirst => split_legacy(tok.text, max_finding),
    };
    match split {
        Some((finding, tooth, faces)) => Ok(RawRecord {
            finding,
            tooth: ToothId(tooth),
            faces: faces.to_ascii_uppercase(),
            span,
        }),
        None => Err(Diagnostic::for_code(
            codes::MALFORMED_TOKEN,
            format!("cannot read status token `{}`", tok.text),
            Some(span),
        )
        .with_context(ctx!("token" => tok.text, "grammar" => grammar.as_str()))),
    }
}

fn split_trailing(text: &str) -> Option<(u8, u8, &str)> {
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    if !(3..=4).contains(&digits) {
        return None;
    }
    let faces = &text[digits..];
    if !faces.bytes().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let finding = text[..digits - 2].parse().ok()?;
    let tooth = text[digits - 2..digits].parse().ok()?;
    Some((finding, tooth, faces))
}

fn split_legacy(text: &str, max_finding: u8) -> Option<(u8, u8, &str)> {
    [2usize, 1].into_iter().find_map(|width| {
        let finding = digits_at(text, 0, width)?;
        let tooth = digits_at(text, width, 2)?;
        if !(1..=max_finding).contains(&finding) || !(11..=85).contains(&tooth) {
            return None;
        }
        Some((finding, tooth, &text[width + 2..]))
    })
}

fn digits_at(text: &str, at: usize, len: usize) -> Option<u8> {
    let s = text.get(at..at + len)?;
    if s.bytes().all(|c| c.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}
