//! Hand-written raw scanner producing `(RawTag, len)` pairs.
//!
//! The scanner does not resolve keywords, validate escapes, or decode
//! literal values. It reports trivia as tokens. Identifier tokens record
//! the offsets of any `\uXXXX` escapes they contain, which the cursor-aware
//! tokenizer needs to refuse completion inside an escape.

use crate::cursor::Cursor;
use crate::tag::{RawTag, RawToken};

pub struct RawScanner<'a> {
    cursor: Cursor<'a>,
    /// `(start, len)` of unicode escapes inside the last identifier.
    escapes: Vec<(u32, u32)>,
}

impl<'a> RawScanner<'a> {
    pub fn new(cursor: Cursor<'a>) -> Self {
        Self {
            cursor,
            escapes: Vec::new(),
        }
    }

    #[inline]
    pub fn pos(&self) -> u32 {
        self.cursor.pos()
    }

    #[inline]
    pub fn set_pos(&mut self, pos: u32) {
        self.cursor.set_pos(pos);
    }

    #[inline]
    pub fn cursor(&self) -> Cursor<'a> {
        self.cursor
    }

    /// Unicode escapes `(start, len)` found in the most recent identifier.
    pub fn unicode_escapes(&self) -> &[(u32, u32)] {
        &self.escapes
    }

    /// Produce the next raw token. Returns `Eof` forever once exhausted.
    pub fn next_token(&mut self) -> RawToken {
        self.escapes.clear();
        let start = self.cursor.pos();
        match self.cursor.current() {
            0 if self.cursor.is_eof() => RawToken {
                tag: RawTag::Eof,
                len: 0,
            },
            b' ' | b'\t' | b'\n' | b'\r' | 0x0C => self.whitespace(start),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => self.identifier(start),
            b'\\' => {
                if self.escape_len(start).is_some() {
                    self.identifier(start)
                } else {
                    self.invalid(start)
                }
            }
            b'0'..=b'9' => self.number(start),
            b'.' => self.dot(start),
            b'"' => self.string(start),
            b'\'' => self.char_literal(start),
            b'/' => self.slash(start),
            b'(' => self.op(start, 1, RawTag::LParen),
            b')' => self.op(start, 1, RawTag::RParen),
            b'{' => self.op(start, 1, RawTag::LBrace),
            b'}' => self.op(start, 1, RawTag::RBrace),
            b'[' => self.op(start, 1, RawTag::LBracket),
            b']' => self.op(start, 1, RawTag::RBracket),
            b';' => self.op(start, 1, RawTag::Semicolon),
            b',' => self.op(start, 1, RawTag::Comma),
            b'@' => self.op(start, 1, RawTag::At),
            b'~' => self.op(start, 1, RawTag::Tilde),
            b'?' => self.op(start, 1, RawTag::Question),
            b'>' => self.op(start, 1, RawTag::Gt),
            b':' => self.pair(start, b':', RawTag::ColonColon, RawTag::Colon),
            b'=' => self.pair(start, b'=', RawTag::EqEq, RawTag::Eq),
            b'!' => self.pair(start, b'=', RawTag::NotEq, RawTag::Bang),
            b'*' => self.pair(start, b'=', RawTag::StarEq, RawTag::Star),
            b'^' => self.pair(start, b'=', RawTag::CaretEq, RawTag::Caret),
            b'%' => self.pair(start, b'=', RawTag::PercentEq, RawTag::Percent),
            b'<' => self.less(start),
            b'&' => self.doubled(start, b'&', RawTag::AndAnd, RawTag::AmpEq, RawTag::Amp),
            b'|' => self.doubled(start, b'|', RawTag::OrOr, RawTag::PipeEq, RawTag::Pipe),
            b'+' => self.doubled(
                start,
                b'+',
                RawTag::PlusPlus,
                RawTag::PlusEq,
                RawTag::Plus,
            ),
            b'-' => self.minus(start),
            0x80..=0xFF => self.non_ascii(start),
            _ => self.invalid(start),
        }
    }

    #[inline]
    fn finish(&self, start: u32, tag: RawTag) -> RawToken {
        RawToken {
            tag,
            len: self.cursor.pos() - start,
        }
    }

    #[inline]
    fn op(&mut self, start: u32, n: u32, tag: RawTag) -> RawToken {
        self.cursor.advance_n(n);
        self.finish(start, tag)
    }

    /// `x` or `x<second>`.
    fn pair(&mut self, start: u32, second: u8, two: RawTag, one: RawTag) -> RawToken {
        if self.cursor.peek() == second {
            self.op(start, 2, two)
        } else {
            self.op(start, 1, one)
        }
    }

    /// `xx`, `x=` or `x`.
    fn doubled(
        &mut self,
        start: u32,
        byte: u8,
        twice: RawTag,
        assign: RawTag,
        once: RawTag,
    ) -> RawToken {
        match self.cursor.peek() {
            b if b == byte => self.op(start, 2, twice),
            b'=' => self.op(start, 2, assign),
            _ => self.op(start, 1, once),
        }
    }

    fn minus(&mut self, start: u32) -> RawToken {
        match self.cursor.peek() {
            b'-' => self.op(start, 2, RawTag::MinusMinus),
            b'=' => self.op(start, 2, RawTag::MinusEq),
            b'>' => self.op(start, 2, RawTag::Arrow),
            _ => self.op(start, 1, RawTag::Minus),
        }
    }

    fn less(&mut self, start: u32) -> RawToken {
        match (self.cursor.peek(), self.cursor.peek2()) {
            (b'<', b'=') => self.op(start, 3, RawTag::ShlEq),
            (b'<', _) => self.op(start, 2, RawTag::Shl),
            (b'=', _) => self.op(start, 2, RawTag::LtEq),
            _ => self.op(start, 1, RawTag::Lt),
        }
    }

    fn invalid(&mut self, start: u32) -> RawToken {
        self.cursor.advance_char();
        self.finish(start, RawTag::InvalidByte)
    }

    // ─── Trivia ─────────────────────────────────────────────────────

    fn whitespace(&mut self, start: u32) -> RawToken {
        loop {
            match self.cursor.current() {
                b' ' | b'\t' | b'\n' | b'\r' | 0x0C => self.cursor.advance(),
                0x80..=0xFF if self.cursor.current_char().is_some_and(char::is_whitespace) => {
                    self.cursor.advance_char();
                }
                _ => break,
            }
        }
        self.finish(start, RawTag::Whitespace)
    }

    fn slash(&mut self, start: u32) -> RawToken {
        match self.cursor.peek() {
            b'/' => {
                self.cursor.advance_n(2);
                self.cursor.eat_to_line_end();
                self.finish(start, RawTag::LineComment)
            }
            b'*' => {
                self.cursor.advance_n(2);
                if self.cursor.eat_block_comment_body() {
                    self.finish(start, RawTag::BlockComment)
                } else {
                    self.finish(start, RawTag::UnterminatedBlockComment)
                }
            }
            b'=' => self.op(start, 2, RawTag::SlashEq),
            _ => self.op(start, 1, RawTag::Slash),
        }
    }

    // ─── Identifiers ────────────────────────────────────────────────

    /// Length of a unicode escape at `at`, if one starts there.
    fn escape_len(&self, at: u32) -> Option<u32> {
        if self.cursor.byte_at(at) != b'\\' || self.cursor.byte_at(at + 1) != b'u' {
            return None;
        }
        let mut p = at + 1;
        while self.cursor.byte_at(p) == b'u' {
            p += 1;
        }
        for i in 0..4 {
            if !self.cursor.byte_at(p + i).is_ascii_hexdigit() {
                return None;
            }
        }
        Some(p + 4 - at)
    }

    fn identifier(&mut self, start: u32) -> RawToken {
        loop {
            match self.cursor.current() {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'$' => self.cursor.advance(),
                b'\\' => {
                    let at = self.cursor.pos();
                    let Some(len) = self.escape_len(at) else {
                        break;
                    };
                    self.escapes.push((at, len));
                    self.cursor.advance_n(len);
                }
                0x80..=0xFF
                    if self
                        .cursor
                        .current_char()
                        .is_some_and(|c| c.is_alphanumeric()) =>
                {
                    self.cursor.advance_char();
                }
                _ => break,
            }
        }
        self.finish(start, RawTag::Ident)
    }

    fn non_ascii(&mut self, start: u32) -> RawToken {
        match self.cursor.current_char() {
            Some(c) if c.is_alphabetic() => self.identifier(start),
            Some(c) if c.is_whitespace() => self.whitespace(start),
            _ => self.invalid(start),
        }
    }

    // ─── Numbers ────────────────────────────────────────────────────

    fn eat_digits(&mut self, radix_hex: bool) {
        if radix_hex {
            self.cursor.eat_while(|b| b == b'_' || b.is_ascii_hexdigit());
        } else {
            self.cursor.eat_while(|b| b == b'_' || b.is_ascii_digit());
        }
    }

    fn number(&mut self, start: u32) -> RawToken {
        if self.cursor.current() == b'0' && matches!(self.cursor.peek(), b'x' | b'X') {
            self.cursor.advance_n(2);
            self.eat_digits(true);
            let mut is_float = false;
            if self.cursor.current() == b'.' {
                self.cursor.advance();
                self.eat_digits(true);
                is_float = true;
            }
            if matches!(self.cursor.current(), b'p' | b'P') {
                self.exponent();
                is_float = true;
            }
            return self.number_suffix(start, is_float);
        }
        if self.cursor.current() == b'0' && matches!(self.cursor.peek(), b'b' | b'B') {
            self.cursor.advance_n(2);
            self.cursor.eat_while(|b| matches!(b, b'0' | b'1' | b'_'));
            return self.number_suffix(start, false);
        }

        self.eat_digits(false);
        let mut is_float = false;
        if self.cursor.current() == b'.' {
            let next = self.cursor.peek();
            let fraction = next.is_ascii_digit()
                || matches!(next, b'e' | b'E' | b'f' | b'F' | b'd' | b'D')
                || !(next.is_ascii_alphabetic() || matches!(next, b'_' | b'$' | b'.'));
            if fraction {
                self.cursor.advance();
                self.eat_digits(false);
                is_float = true;
            }
        }
        if matches!(self.cursor.current(), b'e' | b'E') {
            self.exponent();
            is_float = true;
        }
        self.number_suffix(start, is_float)
    }

    /// `[eEpP][+-]digits`
    fn exponent(&mut self) {
        self.cursor.advance();
        if matches!(self.cursor.current(), b'+' | b'-') {
            self.cursor.advance();
        }
        self.eat_digits(false);
    }

    fn number_suffix(&mut self, start: u32, is_float: bool) -> RawToken {
        let tag = match self.cursor.current() {
            b'f' | b'F' => {
                self.cursor.advance();
                RawTag::FloatLit
            }
            b'd' | b'D' => {
                self.cursor.advance();
                RawTag::DoubleLit
            }
            b'l' | b'L' if !is_float => {
                self.cursor.advance();
                RawTag::LongLit
            }
            _ if is_float => RawTag::DoubleLit,
            _ => RawTag::IntLit,
        };
        self.finish(start, tag)
    }

    fn dot(&mut self, start: u32) -> RawToken {
        if self.cursor.peek().is_ascii_digit() {
            self.cursor.advance();
            self.eat_digits(false);
            if matches!(self.cursor.current(), b'e' | b'E') {
                self.exponent();
            }
            return self.number_suffix(start, true);
        }
        if self.cursor.peek() == b'.' && self.cursor.peek2() == b'.' {
            return self.op(start, 3, RawTag::Ellipsis);
        }
        self.op(start, 1, RawTag::Dot)
    }

    // ─── Quoted literals ────────────────────────────────────────────

    fn string(&mut self, start: u32) -> RawToken {
        if self.cursor.peek() == b'"' && self.cursor.peek2() == b'"' {
            return self.text_block(start);
        }
        self.cursor.advance();
        self.quoted(start, b'"', RawTag::StringLit, RawTag::UnterminatedString)
    }

    fn char_literal(&mut self, start: u32) -> RawToken {
        self.cursor.advance();
        self.quoted(start, b'\'', RawTag::CharLit, RawTag::UnterminatedChar)
    }

    fn quoted(&mut self, start: u32, quote: u8, done: RawTag, open: RawTag) -> RawToken {
        loop {
            match self.cursor.skip_literal_body(quote) {
                b'\\' => {
                    self.cursor.advance();
                    if matches!(self.cursor.current(), b'\n' | b'\r') || self.cursor.is_eof() {
                        return self.finish(start, open);
                    }
                    self.cursor.advance_char();
                }
                b if b == quote => {
                    self.cursor.advance();
                    return self.finish(start, done);
                }
                _ => return self.finish(start, open),
            }
        }
    }

    fn text_block(&mut self, start: u32) -> RawToken {
        self.cursor.advance_n(3);
        loop {
            match self.cursor.current() {
                _ if self.cursor.is_eof() => {
                    return self.finish(start, RawTag::UnterminatedTextBlock);
                }
                b'\\' => {
                    self.cursor.advance();
                    if !self.cursor.is_eof() {
                        self.cursor.advance_char();
                    }
                }
                b'"' if self.cursor.peek() == b'"' && self.cursor.peek2() == b'"' => {
                    self.cursor.advance_n(3);
                    return self.finish(start, RawTag::TextBlock);
                }
                _ => self.cursor.advance_char(),
            }
        }
    }
}
