//! Ellipsis truncation.
//!
//! Results are written into a caller owned unit buffer of the text's own
//! encoding followed by a zero terminator, so a buffer of `n` units holds at
//! most `n - 1` units of text. The returned width is always a fresh
//! measurement of what was written.

use the_text::{
  CodePointCursor,
  Cursor,
  Encoding,
  FormatState,
  GlyphMetrics,
  Separators,
  Text,
  Token,
  chars::FULL_STOP,
};
use tracing::debug;

use crate::measure::{
  Pen,
  Spacing,
  measure,
};

const ELLIPSIS_LEN: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Truncated {
  /// Units written to the output buffer, excluding the terminator.
  pub len:       usize,
  pub width:     f32,
  /// Whether an ellipsis was inserted.
  pub truncated: bool,
}

fn usable_capacity(out_len: usize, width: f32) -> Option<usize> {
  if !(width > 0.0) || out_len <= 1 {
    return None;
  }
  Some(out_len - 1)
}

fn ellipsis_units<E: Encoding>() -> [E::Unit; ELLIPSIS_LEN] {
  [E::ascii(b'.'); ELLIPSIS_LEN]
}

/// Copies `parts` back to back and terminates the buffer.
fn write_parts<E: Encoding>(out: &mut [E::Unit], parts: &[&[E::Unit]]) -> usize {
  let mut len = 0;
  for part in parts {
    out[len..len + part.len()].copy_from_slice(part);
    len += part.len();
  }
  if let Some(terminator) = out.get_mut(len) {
    *terminator = E::Unit::default();
  }
  len
}

fn empty<E: Encoding>(out: &mut [E::Unit]) -> Truncated {
  write_parts::<E>(out, &[]);
  Truncated::default()
}

fn finish<E, M>(out: &mut [E::Unit], metrics: &M, parts: &[&[E::Unit]], spacing: Spacing, truncated: bool) -> Truncated
where
  E: Encoding,
  M: GlyphMetrics + ?Sized,
{
  let len = write_parts::<E>(out, parts);
  let width = measure(metrics, Text::<E>::new(&out[..len]).cursor(), spacing).width;
  Truncated {
    len,
    width,
    truncated,
  }
}

/// Width of `parts` laid end to end on one line.
fn joined_width<E, M>(metrics: &M, parts: &[&[E::Unit]], spacing: Spacing) -> f32
where
  E: Encoding,
  M: GlyphMetrics + ?Sized,
{
  let mut pen = Pen::default();
  let mut format = FormatState::default();
  for part in parts {
    let mut cursor = Cursor::<E>::new(part);
    while let Some(cp) = cursor.next_code_point(&mut format) {
      pen.advance(metrics, cp, spacing);
    }
  }
  pen.x
}

/// Truncates `text` at the end so that it and a trailing `...` fit both
/// `width` and `out`.
///
/// Text that already fits is copied unchanged. If not even the ellipsis fits
/// the result is empty.
pub fn ellipsis<E, M>(
  out: &mut [E::Unit],
  metrics: &M,
  text: Text<'_, E>,
  width: f32,
  spacing: Spacing,
) -> Truncated
where
  E: Encoding,
  M: GlyphMetrics + ?Sized,
{
  let Some(capacity) = usable_capacity(out.len(), width) else {
    return empty::<E>(out);
  };

  let measured = measure(metrics, text.cursor(), spacing);
  debug_assert_eq!(measured.newlines, 0, "ellipsis expects a single line");
  if measured.width <= width && text.len() <= capacity {
    return finish::<E, M>(out, metrics, &[text.units()], spacing, false);
  }

  match single_ended_cut(metrics, text, width, capacity, spacing) {
    Some(end) => {
      let dots = ellipsis_units::<E>();
      finish::<E, M>(out, metrics, &[&text.units()[..end], &dots], spacing, true)
    },
    None => empty::<E>(out),
  }
}

/// Longest prefix, in units, that still fits with an ellipsis appended.
fn single_ended_cut<E, M>(
  metrics: &M,
  text: Text<'_, E>,
  width: f32,
  capacity: usize,
  spacing: Spacing,
) -> Option<usize>
where
  E: Encoding,
  M: GlyphMetrics + ?Sized,
{
  let mut cursor = text.cursor();
  let mut pen = Pen::default();
  let mut best = None;

  loop {
    let end = cursor.position();
    if end + ELLIPSIS_LEN > capacity || pen.x > width {
      break;
    }
    let mut with_ellipsis = pen;
    for _ in 0..ELLIPSIS_LEN {
      with_ellipsis.advance(metrics, FULL_STOP, spacing);
    }
    if with_ellipsis.x <= width {
      best = Some(end);
    }

    match cursor.next_token() {
      None => break,
      Some(Token::Directive(_)) => {},
      Some(Token::CodePoint(cp)) => {
        pen.advance(metrics, cp, spacing);
      },
    }
  }
  best
}

/// End of the token starting at `start`, including its trailing separator.
fn front_token_end<E: Encoding>(units: &[E::Unit], start: usize, end: usize, separators: &Separators) -> usize {
  let mut cursor = Cursor::<E>::between(units, start, end);
  while let Some(token) = cursor.next_token() {
    if matches!(token, Token::CodePoint(cp) if separators.contains(cp)) {
      break;
    }
  }
  cursor.position()
}

/// Start of the token ending at `end`, including its leading separator.
fn back_token_start<E: Encoding>(units: &[E::Unit], start: usize, end: usize, separators: &Separators) -> usize {
  let mut cursor = Cursor::<E>::between(units, start, end);
  while let Some(token) = cursor.next_back_token() {
    if matches!(token, Token::CodePoint(cp) if separators.contains(cp)) {
      break;
    }
  }
  cursor.end()
}

/// The last directive in `units[start..end]`, as a unit range.
fn last_directive<E: Encoding>(units: &[E::Unit], start: usize, end: usize) -> Option<(usize, usize)> {
  let mut cursor = Cursor::<E>::between(units, start, end);
  loop {
    let directive_end = cursor.end();
    if let Token::Directive(_) = cursor.next_back_token()? {
      return Some((cursor.end(), directive_end));
    }
  }
}

/// Truncates `text` in the middle, keeping whole tokens from both ends.
///
/// Tokens are taken alternately from the back and the front, starting with
/// the back so the last token survives whenever anything does. A front token
/// carries its trailing separator and a back token its leading one. When no
/// token fits at all this falls back to [`ellipsis`]. The last color
/// directive cut out of the middle is kept right after the `...` when the
/// buffer has room for it.
pub fn ellipsis_double_ended<E, M>(
  out: &mut [E::Unit],
  metrics: &M,
  text: Text<'_, E>,
  separators: &Separators,
  width: f32,
  spacing: Spacing,
) -> Truncated
where
  E: Encoding,
  M: GlyphMetrics + ?Sized,
{
  let Some(capacity) = usable_capacity(out.len(), width) else {
    return empty::<E>(out);
  };

  let measured = measure(metrics, text.cursor(), spacing);
  debug_assert_eq!(measured.newlines, 0, "ellipsis expects a single line");
  if measured.width <= width && text.len() <= capacity {
    return finish::<E, M>(out, metrics, &[text.units()], spacing, false);
  }

  let units = text.units();
  let dots = ellipsis_units::<E>();
  let mut front_end = 0;
  let mut back_start = units.len();
  let mut front_blocked = false;
  let mut back_blocked = false;
  let mut from_back = true;
  let mut accepted = false;

  while !(front_blocked && back_blocked) && front_end < back_start {
    let take_back = !back_blocked && (from_back || front_blocked);
    from_back = !from_back;

    let (front, back) = if take_back {
      (front_end, back_token_start::<E>(units, front_end, back_start, separators))
    } else {
      (front_token_end::<E>(units, front_end, back_start, separators), back_start)
    };
    let remaining = front < back;
    let needed = front + (units.len() - back) + if remaining { ELLIPSIS_LEN } else { 0 };
    let middle: &[E::Unit] = if remaining { &dots } else { &[] };

    let fits = needed <= capacity
      && joined_width::<E, M>(metrics, &[&units[..front], middle, &units[back..]], spacing) <= width;
    if fits {
      front_end = front;
      back_start = back;
      accepted = true;
    } else if take_back {
      back_blocked = true;
    } else {
      front_blocked = true;
    }
  }

  if front_end >= back_start {
    return finish::<E, M>(out, metrics, &[units], spacing, false);
  }
  if !accepted {
    debug!(
      len = units.len(),
      width, "no whole token fits, truncating at the end instead"
    );
    return ellipsis(out, metrics, text, width, spacing);
  }

  let back_len = units.len() - back_start;
  let carried = last_directive::<E>(units, front_end, back_start)
    .filter(|(start, end)| front_end + ELLIPSIS_LEN + (end - start) + back_len <= capacity)
    .map_or(&[][..], |(start, end)| &units[start..end]);

  finish::<E, M>(
    out,
    metrics,
    &[&units[..front_end], &dots, carried, &units[back_start..]],
    spacing,
    true,
  )
}
