/// A status token that borrows its text directly from the source input.
///
/// `text` is always exactly `&input[start..end]`, with surrounding
/// whitespace already trimmed. Tokens are never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Borrowed slice of the source input for this token.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

/// Lazy iterator over the non-empty, comma-separated tokens of a status string.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    input: &'a str,
    pos: usize,
}

/// Split `input` on commas, trimming Unicode whitespace and skipping empty tokens.
///
/// No allocation is made; every token borrows from `input`.
pub fn tokenize(input: &str) -> Tokens<'_> {
    Tokens { input, pos: 0 }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        while self.pos <= self.input.len() {
            let rest = &self.input[self.pos..];
            let field_start = self.pos;
            let field = match rest.find(',') {
                Some(i) => &rest[..i],
                None => rest,
            };
            // One past the comma; past the end for the final field.
            self.pos = field_start + field.len() + 1;

            let lead = field.trim_start();
            let text = lead.trim_end();
            if !text.is_empty() {
                let start = field_start + (field.len() - lead.len());
                return Some(Token {
                    text,
                    start,
                    end: start + text.len(),
                });
            }
        }
        None
    }
}

impl std::iter::FusedIterator for Tokens<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<&str> {
        tokenize(input).map(|t| t.text).collect()
    }

    #[test]
    fn splits_and_trims() {
        assert_eq!(texts("1155, 117OV ,1418M"), vec!["1155", "117OV", "1418M"]);
    }

    #[test]
    fn skips_empty_fields() {
        assert_eq!(texts(",,1155,, ,\t,"), vec!["1155"]);
        assert!(texts("").is_empty());
        assert!(texts("   ").is_empty());
    }

    #[test]
    fn spans_point_into_source() {
        let input = " 117OV , 1418M";
        for tok in tokenize(input) {
            assert_eq!(&input[tok.start..tok.end], tok.text);
        }
        let first = tokenize(input).next().unwrap();
        assert_eq!((first.start, first.end), (1, 6));
    }

    #[test]
    fn trims_unicode_whitespace() {
        let input = "1155,\u{a0}117OV\u{a0},\u{3000}1418M";
        assert_eq!(texts(input), vec!["1155", "117OV", "1418M"]);
        for tok in tokenize(input) {
            assert_eq!(&input[tok.start..tok.end], tok.text);
        }
        assert!(texts("\u{a0},\u{3000}\u{2003}").is_empty());
    }

    #[test]
    fn non_ascii_text_stays_intact() {
        assert_eq!(texts("11é5,1155"), vec!["11é5", "1155"]);
    }
}
