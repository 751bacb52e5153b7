//! Lexical analysis: Jack source text to a token stream.
//!
//! Strips `//`, `/* ... */` and `/** ... */` comments (block comments do not
//! nest). Comment openers inside string constants are ordinary content, which
//! falls out of only recognizing strings at the top of the scanner loop.

use crate::error::{CompileError, Result};
use crate::token::{Keyword, Span, SpannedToken, Token, is_symbol};

/// Largest value a Jack integer constant may take.
const MAX_INT: u32 = 32767;

/// Jack tokenizer over a single source file.
pub struct Tokenizer<'a> {
    rest: &'a str,
    line: usize,
    column: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            rest: source,
            line: 1,
            column: 1,
        }
    }

    /// Consume the whole input, producing the token sequence or the first error.
    pub fn tokenize(mut self) -> Result<Vec<SpannedToken>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some(_) => tokens.push(self.next_token()?),
                None => break,
            }
        }
        Ok(tokens)
    }

    fn span(&self) -> Span {
        Span::new(self.line, self.column)
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest.chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.rest = &self.rest[c.len_utf8()..];
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Skip whitespace and all three comment forms.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            }
            if self.peek() != Some('/') {
                return Ok(());
            }
            match self.peek_second() {
                Some('/') => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                Some('*') => {
                    let open = self.span();
                    self.bump();
                    self.bump();
                    // `/** ... */` is handled identically; comments do not nest.
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(CompileError::lexical(open, "unterminated comment"));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> Result<SpannedToken> {
        let span = self.span();
        let c = match self.peek() {
            Some(c) => c,
            None => return Err(CompileError::lexical(span, "unexpected end of input")),
        };

        if is_symbol(c) {
            self.bump();
            return Ok(SpannedToken::new(Token::Symbol(c), span));
        }
        if c.is_ascii_digit() {
            return self.read_integer(span);
        }
        if c == '"' {
            return self.read_string(span);
        }
        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.read_word(span));
        }

        Err(CompileError::lexical(
            span,
            format!("unexpected character '{}'", c),
        ))
    }

    fn read_integer(&mut self, span: Span) -> Result<SpannedToken> {
        let mut value: u32 = 0;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            self.bump();
            value = value.saturating_mul(10).saturating_add(d);
            if value > MAX_INT {
                return Err(CompileError::lexical(
                    span,
                    format!("integer constant exceeds {}", MAX_INT),
                ));
            }
        }
        Ok(SpannedToken::new(Token::IntConst(value as u16), span))
    }

    fn read_string(&mut self, span: Span) -> Result<SpannedToken> {
        self.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                Some('"') => {
                    self.bump();
                    return Ok(SpannedToken::new(Token::StrConst(value), span));
                }
                Some('\n') | None => {
                    return Err(CompileError::lexical(span, "unterminated string constant"));
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
    }

    fn read_word(&mut self, span: Span) -> SpannedToken {
        let mut lexeme = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                lexeme.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let token = match Keyword::lookup(&lexeme) {
            Some(kw) => Token::Keyword(kw),
            None => Token::Identifier(lexeme),
        };
        SpannedToken::new(token, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        Tokenizer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(tokenize("class"), vec![Token::Keyword(Keyword::Class)]);
        assert_eq!(
            tokenize("className"),
            vec![Token::Identifier("className".to_string())]
        );
        assert_eq!(
            tokenize("_x x9"),
            vec![
                Token::Identifier("_x".to_string()),
                Token::Identifier("x9".to_string()),
            ]
        );
    }

    #[test]
    fn symbols_split_words() {
        assert_eq!(
            tokenize("a.b(c)"),
            vec![
                Token::Identifier("a".to_string()),
                Token::Symbol('.'),
                Token::Identifier("b".to_string()),
                Token::Symbol('('),
                Token::Identifier("c".to_string()),
                Token::Symbol(')'),
            ]
        );
    }

    #[test]
    fn integer_constants() {
        assert_eq!(tokenize("0 32767"), vec![
            Token::IntConst(0),
            Token::IntConst(32767),
        ]);
    }

    #[test]
    fn integer_overflow_is_an_error() {
        assert!(Tokenizer::new("32768").tokenize().is_err());
        assert!(Tokenizer::new("999999").tokenize().is_err());
    }

    #[test]
    fn string_constants_drop_quotes() {
        assert_eq!(
            tokenize("\"hello world\""),
            vec![Token::StrConst("hello world".to_string())]
        );
        assert_eq!(tokenize("\"\""), vec![Token::StrConst(String::new())]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(Tokenizer::new("\"abc").tokenize().is_err());
        assert!(Tokenizer::new("\"abc\ndef\"").tokenize().is_err());
    }

    #[test]
    fn comments_are_stripped() {
        assert_eq!(
            tokenize("// line\nclass /* block */ Foo /** doc */ {"),
            vec![
                Token::Keyword(Keyword::Class),
                Token::Identifier("Foo".to_string()),
                Token::Symbol('{'),
            ]
        );
    }

    #[test]
    fn block_comments_do_not_nest() {
        // The first `*/` closes the comment; the rest is code again.
        assert_eq!(
            tokenize("/* a /* b */ x"),
            vec![Token::Identifier("x".to_string())]
        );
    }

    #[test]
    fn comment_openers_inside_strings_are_content() {
        assert_eq!(
            tokenize("\"// not a comment\" \"/* nor this */\""),
            vec![
                Token::StrConst("// not a comment".to_string()),
                Token::StrConst("/* nor this */".to_string()),
            ]
        );
    }

    #[test]
    fn unterminated_comment_is_an_error() {
        assert!(Tokenizer::new("/* never closed").tokenize().is_err());
    }

    #[test]
    fn spans_track_lines_and_columns() {
        let tokens = Tokenizer::new("class\n  Foo").tokenize().unwrap();
        assert_eq!(tokens[0].span, Span::new(1, 1));
        assert_eq!(tokens[1].span, Span::new(2, 3));
    }

    #[test]
    fn whole_statement() {
        let tokens = tokenize("let x = arr[i] + 1;");
        assert_eq!(tokens.len(), 10);
        assert_eq!(tokens[0], Token::Keyword(Keyword::Let));
        assert_eq!(tokens[9], Token::Symbol(';'));
    }
}
