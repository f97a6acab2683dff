//! Single-pass scanner for generation rules.
//!
//! Grammar:
//! - `[a,b]` or `[a;b]`: inclusive integer range, optional sign on each bound.
//! - `{{name}}`: reference to another datasource. A lone `}` inside the name
//!   is kept as content; only `}}` closes the reference.
//! - anything else: literal text, coalesced into as few tokens as possible.
//!
//! Offsets count characters, not bytes.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{Error, Result};
use crate::expression::token::{Location, Token};

/// Compiles `raw` into tokens owned by the datasource `owner`.
///
/// Fails on the first malformed construct; no partial output is returned.
pub fn tokenize(raw: &str, owner: &str, index: usize) -> Result<Vec<Token>> {
    Tokenizer::new(raw, owner, index).run()
}

struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
    offset: usize,
    owner: &'a str,
    index: usize,
    literal: String,
    literal_start: usize,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    fn new(raw: &'a str, owner: &'a str, index: usize) -> Self {
        Self {
            chars: raw.chars().peekable(),
            offset: 0,
            owner,
            index,
            literal: String::new(),
            literal_start: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while let Some(ch) = self.bump() {
            let start = self.offset - 1;
            match ch {
                '[' => {
                    self.flush_literal();
                    let (min, max) = self.scan_range(start)?;
                    let location = self.location(start);
                    self.tokens.push(Token::range(min, max, location));
                }
                '{' if self.chars.peek() == Some(&'{') => {
                    self.bump();
                    self.flush_literal();
                    let target = self.scan_reference(start)?;
                    let location = self.location(start);
                    self.tokens.push(Token::reference(target, location));
                }
                _ => {
                    if self.literal.is_empty() {
                        self.literal_start = start;
                    }
                    self.literal.push(ch);
                }
            }
        }
        self.flush_literal();
        Ok(self.tokens)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.offset += 1;
        Some(ch)
    }

    fn flush_literal(&mut self) {
        if self.literal.is_empty() {
            return;
        }
        let value = std::mem::take(&mut self.literal);
        let location = self.location(self.literal_start);
        self.tokens.push(Token::text(value, location));
    }

    fn scan_range(&mut self, start: usize) -> Result<(i64, i64)> {
        let min = self.scan_integer(start)?;
        match self.bump() {
            Some(',' | ';') => {}
            Some(other) => {
                return Err(self.error(
                    self.offset - 1,
                    format!("expected ',' or ';' in range, found '{other}'"),
                ));
            }
            None => return Err(self.error(start, "unterminated range")),
        }
        let max = self.scan_integer(start)?;
        match self.bump() {
            Some(']') => Ok((min, max)),
            Some(other) => Err(self.error(
                self.offset - 1,
                format!("expected ']' to close range, found '{other}'"),
            )),
            None => Err(self.error(start, "unterminated range")),
        }
    }

    fn scan_integer(&mut self, start: usize) -> Result<i64> {
        let number_start = self.offset;
        let mut number = String::new();
        if let Some(sign @ ('+' | '-')) = self.chars.peek().copied() {
            self.bump();
            number.push(sign);
        }

        let mut digits = 0;
        while let Some(digit) = self.chars.peek().copied().filter(char::is_ascii_digit) {
            self.bump();
            number.push(digit);
            digits += 1;
        }

        if digits == 0 {
            return match self.chars.peek().copied() {
                Some(other) => Err(self.error(
                    self.offset,
                    format!("expected digit in range, found '{other}'"),
                )),
                None => Err(self.error(start, "unterminated range")),
            };
        }

        number.parse::<i64>().map_err(|_| {
            self.error(
                number_start,
                format!("range bound '{number}' does not fit in a 64-bit integer"),
            )
        })
    }

    fn scan_reference(&mut self, start: usize) -> Result<String> {
        let mut target = String::new();
        loop {
            match self.bump() {
                Some('}') if self.chars.peek() == Some(&'}') => {
                    self.bump();
                    break;
                }
                Some(ch) => target.push(ch),
                None => return Err(self.error(start, "unterminated reference, expected '}}'")),
            }
        }
        if target.is_empty() {
            return Err(self.error(start, "empty datasource reference"));
        }
        Ok(target)
    }

    fn location(&self, offset: usize) -> Location {
        Location {
            datasource: self.owner.to_string(),
            expression: self.index,
            offset,
        }
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> Error {
        Error::Parse {
            datasource: self.owner.to_string(),
            expression: self.index,
            offset,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::token::TokenKind;

    fn kinds(raw: &str) -> Vec<TokenKind> {
        tokenize(raw, "test", 0)
            .expect("tokenize")
            .into_iter()
            .map(|token| token.kind().clone())
            .collect()
    }

    fn text(value: &str) -> TokenKind {
        TokenKind::Text(value.to_string())
    }

    fn reference(target: &str) -> TokenKind {
        TokenKind::Reference(target.to_string())
    }

    fn parse_error(raw: &str) -> (usize, String) {
        match tokenize(raw, "test", 3) {
            Err(Error::Parse {
                datasource,
                expression,
                offset,
                message,
            }) => {
                assert_eq!(datasource, "test");
                assert_eq!(expression, 3);
                (offset, message)
            }
            other => panic!("expected parse error for {raw:?}, got {other:?}"),
        }
    }

    #[test]
    fn parses_signed_ranges_with_either_separator() {
        assert_eq!(kinds("[-5;+734]"), vec![TokenKind::Range { min: -5, max: 734 }]);
        assert_eq!(kinds("[5;-14]"), vec![TokenKind::Range { min: -14, max: 5 }]);
        assert_eq!(kinds("[12,134]"), vec![TokenKind::Range { min: 12, max: 134 }]);
    }

    #[test]
    fn literal_then_reference() {
        let tokens = tokenize("Fetched: {{foo}}", "test", 0).expect("tokenize");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind(), &text("Fetched: "));
        assert_eq!(tokens[1].kind(), &reference("foo"));
        assert_eq!(tokens[1].location().offset, 9);
    }

    #[test]
    fn no_empty_text_between_references() {
        assert_eq!(
            kinds("{{foo}} is {{bar}}"),
            vec![reference("foo"), text(" is "), reference("bar")]
        );
    }

    #[test]
    fn mixed_constructs_in_source_order() {
        assert_eq!(
            kinds("[12,134]{{foo}} -> {{bar}}@[1,2] {{bla}}"),
            vec![
                TokenKind::Range { min: 12, max: 134 },
                reference("foo"),
                text(" -> "),
                reference("bar"),
                text("@"),
                TokenKind::Range { min: 1, max: 2 },
                text(" "),
                reference("bla"),
            ]
        );
    }

    #[test]
    fn single_braces_are_literal() {
        assert_eq!(kinds("{a} ]x}"), vec![text("{a} ]x}")]);
    }

    #[test]
    fn lone_closing_brace_is_part_of_reference_name() {
        assert_eq!(kinds("{{a}b}}"), vec![reference("a}b")]);
        assert_eq!(kinds("{{a}}}"), vec![reference("a"), text("}")]);
    }

    #[test]
    fn reference_names_are_kept_verbatim() {
        assert_eq!(kinds("{{pack.name:column}}"), vec![reference("pack.name:column")]);
    }

    #[test]
    fn text_offsets_track_characters() {
        let tokens = tokenize("é[1,2]ü", "test", 0).expect("tokenize");
        assert_eq!(tokens[1].location().offset, 1);
        assert_eq!(tokens[2].location().offset, 6);
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(kinds("").is_empty());
    }

    #[test]
    fn unterminated_range_reports_construct_start() {
        let (offset, message) = parse_error("abc [1,2");
        assert_eq!(offset, 4);
        assert!(message.contains("unterminated range"));
    }

    #[test]
    fn unterminated_reference_reports_construct_start() {
        let (offset, message) = parse_error("ab {{foo}");
        assert_eq!(offset, 3);
        assert!(message.contains("unterminated reference"));
    }

    #[test]
    fn invalid_range_characters_fail() {
        let (offset, _) = parse_error("[1-2]");
        assert_eq!(offset, 2);
        let (offset, _) = parse_error("[a,2]");
        assert_eq!(offset, 1);
        let (offset, _) = parse_error("[1,2)");
        assert_eq!(offset, 4);
        let (offset, _) = parse_error("[ 1,2]");
        assert_eq!(offset, 1);
    }

    #[test]
    fn overflowing_range_bound_fails() {
        let (offset, message) = parse_error("[1,99999999999999999999]");
        assert_eq!(offset, 3);
        assert!(message.contains("64-bit"));
    }

    #[test]
    fn empty_reference_fails() {
        let (offset, message) = parse_error("x{{}}");
        assert_eq!(offset, 1);
        assert!(message.contains("empty"));
    }

    #[test]
    fn parsing_is_deterministic() {
        let raw = "[12,134]{{foo}} -> {{bar}}@[1,2] {{bla}}";
        assert_eq!(
            tokenize(raw, "test", 0).expect("tokenize"),
            tokenize(raw, "test", 0).expect("tokenize")
        );
    }
}
