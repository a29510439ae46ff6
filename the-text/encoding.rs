//! Source text encodings.
//!
//! Overlay strings arrive as UTF-8, as single byte Latin-1, as UTF-16 or as
//! raw UCS-4 units. Each encoding is a zero-sized marker implementing
//! [`Encoding`], which decodes units into canonical [`CodePoint`] values; the
//! layout algorithms never look at units directly except to copy them.

use std::{
  fmt::Debug,
  marker::PhantomData,
  ops::Range,
};

use crate::{
  CodePoint,
  cursor::Cursor,
};

/// Value produced for ill-formed unit sequences.
pub const REPLACEMENT: CodePoint = 0xFFFD;

pub trait Encoding: Copy + Debug + 'static {
  /// A single storage unit of this encoding.
  type Unit: Copy + Eq + Default + Debug;

  /// Decodes the code point at the front of `units`, returning it together
  /// with the number of units it occupies. Ill-formed input decodes to a
  /// one-unit code point so callers always make progress.
  fn decode(units: &[Self::Unit]) -> Option<(CodePoint, usize)>;

  /// Decodes the code point ending at the back of `units`.
  fn decode_last(units: &[Self::Unit]) -> Option<(CodePoint, usize)>;

  /// The unit encoding an ASCII byte.
  fn ascii(byte: u8) -> Self::Unit;

  /// The ASCII byte a unit encodes, if any.
  fn as_ascii(unit: Self::Unit) -> Option<u8>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latin1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ucs4;

#[inline]
fn utf8_sequence_len(lead: u8) -> usize {
  match lead {
    0x00..=0x7F => 1,
    0xC2..=0xDF => 2,
    0xE0..=0xEF => 3,
    0xF0..=0xF4 => 4,
    _ => 0,
  }
}

#[inline]
fn is_utf8_continuation(byte: u8) -> bool {
  byte & 0xC0 == 0x80
}

impl Encoding for Utf8 {
  type Unit = u8;

  #[inline]
  fn decode(units: &[u8]) -> Option<(CodePoint, usize)> {
    let &lead = units.first()?;
    if lead.is_ascii() {
      return Some((lead as CodePoint, 1));
    }
    let len = utf8_sequence_len(lead);
    match units.get(..len).map(std::str::from_utf8) {
      Some(Ok(s)) if len > 0 => s.chars().next().map(|ch| (ch as CodePoint, len)),
      _ => Some((REPLACEMENT, 1)),
    }
  }

  fn decode_last(units: &[u8]) -> Option<(CodePoint, usize)> {
    let &last = units.last()?;
    if last.is_ascii() {
      return Some((last as CodePoint, 1));
    }
    let floor = units.len().saturating_sub(4);
    for start in (floor..units.len()).rev() {
      if !is_utf8_continuation(units[start]) {
        return match Self::decode(&units[start..]) {
          Some((cp, len)) if start + len == units.len() => Some((cp, len)),
          _ => Some((REPLACEMENT, 1)),
        };
      }
    }
    Some((REPLACEMENT, 1))
  }

  #[inline]
  fn ascii(byte: u8) -> u8 {
    byte
  }

  #[inline]
  fn as_ascii(unit: u8) -> Option<u8> {
    unit.is_ascii().then_some(unit)
  }
}

impl Encoding for Latin1 {
  type Unit = u8;

  #[inline]
  fn decode(units: &[u8]) -> Option<(CodePoint, usize)> {
    units.first().map(|&b| (b as CodePoint, 1))
  }

  #[inline]
  fn decode_last(units: &[u8]) -> Option<(CodePoint, usize)> {
    units.last().map(|&b| (b as CodePoint, 1))
  }

  #[inline]
  fn ascii(byte: u8) -> u8 {
    byte
  }

  #[inline]
  fn as_ascii(unit: u8) -> Option<u8> {
    unit.is_ascii().then_some(unit)
  }
}

impl Encoding for Utf16 {
  type Unit = u16;

  #[inline]
  fn decode(units: &[u16]) -> Option<(CodePoint, usize)> {
    let window = &units[..units.len().min(2)];
    match char::decode_utf16(window.iter().copied()).next()? {
      Ok(ch) => Some((ch as CodePoint, ch.len_utf16())),
      Err(err) => Some((err.unpaired_surrogate() as CodePoint, 1)),
    }
  }

  fn decode_last(units: &[u16]) -> Option<(CodePoint, usize)> {
    let &last = units.last()?;
    if units.len() >= 2 && (0xDC00..=0xDFFF).contains(&last) {
      if let Some((cp, 2)) = Self::decode(&units[units.len() - 2..]) {
        return Some((cp, 2));
      }
    }
    Some((last as CodePoint, 1))
  }

  #[inline]
  fn ascii(byte: u8) -> u16 {
    byte as u16
  }

  #[inline]
  fn as_ascii(unit: u16) -> Option<u8> {
    u8::try_from(unit).ok().filter(u8::is_ascii)
  }
}

impl Encoding for Ucs4 {
  type Unit = u32;

  #[inline]
  fn decode(units: &[u32]) -> Option<(CodePoint, usize)> {
    units.first().map(|&cp| (cp, 1))
  }

  #[inline]
  fn decode_last(units: &[u32]) -> Option<(CodePoint, usize)> {
    units.last().map(|&cp| (cp, 1))
  }

  #[inline]
  fn ascii(byte: u8) -> u32 {
    byte as u32
  }

  #[inline]
  fn as_ascii(unit: u32) -> Option<u8> {
    u8::try_from(unit).ok().filter(u8::is_ascii)
  }
}

/// Borrowed text in a known encoding.
#[derive(Debug, Clone, Copy)]
pub struct Text<'a, E: Encoding> {
  units:    &'a [E::Unit],
  encoding: PhantomData<E>,
}

impl<'a, E: Encoding> Text<'a, E> {
  pub fn new(units: &'a [E::Unit]) -> Self {
    Text {
      units,
      encoding: PhantomData,
    }
  }

  #[inline]
  pub fn units(&self) -> &'a [E::Unit] {
    self.units
  }

  /// Length in units, not code points.
  #[inline]
  pub fn len(&self) -> usize {
    self.units.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.units.is_empty()
  }

  /// Sub-range in units. Both ends must fall on code point boundaries.
  pub fn slice(&self, range: Range<usize>) -> Self {
    Text::new(&self.units[range])
  }

  pub fn cursor(&self) -> Cursor<'a, E> {
    Cursor::new(self.units)
  }

  /// A cursor starting `pos` units into the text.
  pub fn cursor_at(&self, pos: usize) -> Cursor<'a, E> {
    Cursor::between(self.units, pos.min(self.units.len()), self.units.len())
  }
}

impl<'a> Text<'a, Utf8> {
  pub fn utf8(text: &'a str) -> Self {
    Text::new(text.as_bytes())
  }
}

impl<'a> Text<'a, Latin1> {
  pub fn latin1(bytes: &'a [u8]) -> Self {
    Text::new(bytes)
  }
}

impl<'a> Text<'a, Utf16> {
  pub fn utf16(units: &'a [u16]) -> Self {
    Text::new(units)
  }
}

impl<'a> Text<'a, Ucs4> {
  pub fn ucs4(units: &'a [u32]) -> Self {
    Text::new(units)
  }
}

impl<'a> From<&'a str> for Text<'a, Utf8> {
  fn from(text: &'a str) -> Self {
    Text::utf8(text)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn decode_all<E: Encoding>(units: &[E::Unit]) -> Vec<CodePoint> {
    let mut out = Vec::new();
    let mut rest = units;
    while let Some((cp, len)) = E::decode(rest) {
      out.push(cp);
      rest = &rest[len..];
    }
    out
  }

  fn decode_all_back<E: Encoding>(units: &[E::Unit]) -> Vec<CodePoint> {
    let mut out = Vec::new();
    let mut rest = units;
    while let Some((cp, len)) = E::decode_last(rest) {
      out.push(cp);
      rest = &rest[..rest.len() - len];
    }
    out.reverse();
    out
  }

  fn code_points(s: &str) -> Vec<CodePoint> {
    s.chars().map(|ch| ch as CodePoint).collect()
  }

  #[test]
  fn utf8_decodes_multibyte_sequences() {
    let s = "aé€😀";
    assert_eq!(decode_all::<Utf8>(s.as_bytes()), code_points(s));
    assert_eq!(decode_all_back::<Utf8>(s.as_bytes()), code_points(s));
  }

  #[test]
  fn utf8_ill_formed_bytes_make_progress() {
    let bytes = [b'a', 0xFF, 0xE2, 0x82, b'b'];
    assert_eq!(decode_all::<Utf8>(&bytes), vec![
      'a' as CodePoint,
      REPLACEMENT,
      REPLACEMENT,
      REPLACEMENT,
      'b' as CodePoint
    ]);
    assert_eq!(decode_all_back::<Utf8>(&bytes).len(), 5);
  }

  #[test]
  fn utf16_decodes_surrogate_pairs() {
    let s = "x😀y";
    let units: Vec<u16> = s.encode_utf16().collect();
    assert_eq!(decode_all::<Utf16>(&units), code_points(s));
    assert_eq!(decode_all_back::<Utf16>(&units), code_points(s));
  }

  #[test]
  fn utf16_unpaired_surrogate_is_passed_through() {
    let units = [0xD800u16, 'a' as u16];
    assert_eq!(decode_all::<Utf16>(&units), vec![0xD800, 'a' as CodePoint]);
    assert_eq!(decode_all_back::<Utf16>(&units), vec![0xD800, 'a' as CodePoint]);
  }

  #[test]
  fn latin1_and_ucs4_are_one_unit_per_code_point() {
    assert_eq!(decode_all::<Latin1>(&[0xE9, b'a']), vec![0xE9, 'a' as CodePoint]);
    assert_eq!(decode_all::<Ucs4>(&[0x1F600, 0x41]), vec![0x1F600, 0x41]);
  }

  #[test]
  fn ascii_round_trips_through_units() {
    assert_eq!(Utf16::as_ascii(Utf16::ascii(b'{')), Some(b'{'));
    assert_eq!(Ucs4::as_ascii(0x263A), None);
    assert_eq!(Utf8::as_ascii(0xC3), None);
  }

  #[test]
  fn text_slices_by_units() {
    let text = Text::utf8("hello world");
    assert_eq!(text.slice(6..11).units(), b"world");
    assert_eq!(text.len(), 11);
    assert!(Text::utf8("").is_empty());
  }
}
