use std::str::Chars;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    /// 1-based source line
    pub line: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    Newline,
    Comment,
    Eof,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    pos: usize,
    line: usize,
    current: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            pos: 0,
            line: 1,
            current,
        }
    }

    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current;
        self.current = self.chars.next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        c
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\r' || c == ',' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(
            kind,
            Span::new(start, self.pos, self.line),
            &self.source[start..self.pos],
        )
    }

    fn skip_line_comment(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        self.token(TokenKind::Comment, start)
    }

    fn eat_digits(&mut self) -> usize {
        let mut count = 0;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
                count += 1;
            } else {
                break;
            }
        }
        count
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos;

        if matches!(self.peek(), Some('-' | '+')) {
            self.advance();
        }

        self.eat_digits();

        if self.peek() == Some('.') {
            self.advance();
            self.eat_digits();
        }

        // Exponent only when digits follow, so "2e" stays malformed
        if matches!(self.peek(), Some('e' | 'E')) {
            let mut ahead = self.chars.clone();
            let next = match ahead.next() {
                Some('-' | '+') => ahead.next(),
                other => other,
            };
            if next.is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
                if matches!(self.peek(), Some('-' | '+')) {
                    self.advance();
                }
                self.eat_digits();
            }
        }

        // Glued trailing characters make the whole word an error
        let mut kind = TokenKind::Number;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '.' || c == '_' {
                self.advance();
                kind = TokenKind::Error;
            } else {
                break;
            }
        }

        self.token(kind, start)
    }

    fn read_word(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ',' {
                break;
            }
            self.advance();
        }
        self.token(TokenKind::Error, start)
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;

        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, Span::new(start, start, self.line), "");
        };

        match c {
            '\n' => {
                let token = Token::new(TokenKind::Newline, Span::new(start, start + 1, self.line), "\n");
                self.advance();
                self.line += 1;
                token
            }
            '/' if self.peek_next() == Some('/') => self.skip_line_comment(),
            '#' => self.skip_line_comment(),
            '-' | '+' | '.' => {
                if self.peek_next().is_some_and(|n| n.is_ascii_digit() || n == '.') {
                    self.read_number()
                } else {
                    self.read_word()
                }
            }
            c if c.is_ascii_digit() => self.read_number(),
            _ => self.read_word(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::tokenize("100 8.5 -20 0.005 +3 1e-3 2.5E2 .5");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["100", "8.5", "-20", "0.005", "+3", "1e-3", "2.5E2", ".5", ""]);
        assert!(tokens[..8].iter().all(|t| t.kind == TokenKind::Number));
    }

    #[test]
    fn test_commas_separate() {
        let tokens = Lexer::tokenize("1,2, 3");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["1", "2", "3", ""]);
    }

    #[test]
    fn test_malformed_numbers() {
        assert_eq!(kinds("12abc"), vec![TokenKind::Error, TokenKind::Eof]);
        assert_eq!(kinds("2e"), vec![TokenKind::Error, TokenKind::Eof]);
        assert_eq!(kinds("x 1"), vec![TokenKind::Error, TokenKind::Number, TokenKind::Eof]);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("1 // cost\n# rows\n2"),
            vec![
                TokenKind::Number,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_line_numbers() {
        let tokens = Lexer::tokenize("1\n\n-2 3\n");
        let lines: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Number)
            .map(|t| t.span.line)
            .collect();
        assert_eq!(lines, vec![1, 3, 3]);
    }
}
