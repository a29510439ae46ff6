//! Code point cursors.
//!
//! A cursor walks a text front to back yielding [`Token`]s: plain code points
//! or parsed control directives. Directives are zero width and are never
//! handed to measurement, which only sees code points through
//! [`CodePointCursor::next_code_point`].
//!
//! [`Cursor`] is a cheap `Copy` window over units. Peeking is done by copying
//! the cursor, and the window can also be consumed from the back, which is
//! what double ended truncation does.

use std::marker::PhantomData;

use crate::{
  CodePoint,
  directive::{
    ControlDirective,
    FormatState,
  },
  encoding::{
    Encoding,
    Latin1,
    Ucs4,
    Utf8,
    Utf16,
  },
};

const OPEN_BRACE: CodePoint = '{' as CodePoint;
const CLOSE_BRACE: CodePoint = '}' as CodePoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
  CodePoint(CodePoint),
  Directive(ControlDirective),
}

pub trait CodePointCursor {
  /// Advances past the next code point or directive.
  fn next_token(&mut self) -> Option<Token>;

  /// Offset of the cursor in units from the start of the text.
  fn position(&self) -> usize;

  /// Consumes the next code point only if it equals `expected`. Directives
  /// are not interpreted.
  fn eat(&mut self, expected: CodePoint) -> bool;

  /// Returns the next code point, folding any directives on the way into
  /// `format`.
  fn next_code_point(&mut self, format: &mut FormatState) -> Option<CodePoint> {
    loop {
      match self.next_token()? {
        Token::CodePoint(cp) => return Some(cp),
        Token::Directive(directive) => format.apply(directive),
      }
    }
  }
}

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a, E: Encoding> {
  units:    &'a [E::Unit],
  start:    usize,
  end:      usize,
  encoding: PhantomData<E>,
}

pub type Utf8Cursor<'a> = Cursor<'a, Utf8>;
pub type Latin1Cursor<'a> = Cursor<'a, Latin1>;
pub type Utf16Cursor<'a> = Cursor<'a, Utf16>;
pub type Ucs4Cursor<'a> = Cursor<'a, Ucs4>;

impl<'a, E: Encoding> Cursor<'a, E> {
  pub fn new(units: &'a [E::Unit]) -> Self {
    Self::between(units, 0, units.len())
  }

  /// A cursor over `units[start..end]` that still reports positions
  /// relative to the whole of `units`.
  pub fn between(units: &'a [E::Unit], start: usize, end: usize) -> Self {
    debug_assert!(start <= end && end <= units.len());
    Cursor {
      units,
      start,
      end,
      encoding: PhantomData,
    }
  }

  /// Offset in units where the back of the window currently is.
  #[inline]
  pub fn end(&self) -> usize {
    self.end
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.start >= self.end
  }

  /// The units not consumed from either end.
  #[inline]
  pub fn remaining(&self) -> &'a [E::Unit] {
    &self.units[self.start..self.end]
  }

  /// Returns the next token without consuming it.
  pub fn peek_token(&self) -> Option<Token> {
    let mut copy = *self;
    copy.next_token()
  }

  /// Advances past the last code point or directive of the window.
  pub fn next_back_token(&mut self) -> Option<Token> {
    let rest = self.remaining();
    let (cp, len) = E::decode_last(rest)?;
    if cp == CLOSE_BRACE {
      if let Some((directive, len)) = ControlDirective::parse_ending_at::<E>(rest) {
        self.end -= len;
        return Some(Token::Directive(directive));
      }
    }
    self.end -= len;
    Some(Token::CodePoint(cp))
  }
}

impl<E: Encoding> CodePointCursor for Cursor<'_, E> {
  fn next_token(&mut self) -> Option<Token> {
    let rest = self.remaining();
    let (cp, len) = E::decode(rest)?;
    if cp == OPEN_BRACE {
      if let Some((directive, len)) = ControlDirective::parse::<E>(rest) {
        self.start += len;
        return Some(Token::Directive(directive));
      }
    }
    self.start += len;
    Some(Token::CodePoint(cp))
  }

  #[inline]
  fn position(&self) -> usize {
    self.start
  }

  fn eat(&mut self, expected: CodePoint) -> bool {
    match E::decode(self.remaining()) {
      Some((cp, len)) if cp == expected => {
        self.start += len;
        true
      },
      _ => false,
    }
  }
}

impl<E: Encoding> Iterator for Cursor<'_, E> {
  type Item = Token;

  fn next(&mut self) -> Option<Token> {
    self.next_token()
  }
}
