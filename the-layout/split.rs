//! Greedy line splitting.

use the_text::{
  CodePointCursor,
  Cursor,
  Encoding,
  GlyphMetrics,
  Separators,
  Text,
  Token,
  chars::{
    CARRIAGE_RETURN,
    CodePointCategory,
    LINE_FEED,
    categorize,
  },
};

use crate::measure::{
  Pen,
  Spacing,
};

/// A wrapped line as a half open unit range of the source text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
  pub start: usize,
  pub end:   usize,
  pub width: f32,
}

impl Line {
  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitLines {
  pub lines:          Vec<Line>,
  /// Exceeds the requested width when some token could not be split.
  pub max_line_width: f32,
}

impl SplitLines {
  pub fn line_count(&self) -> usize {
    self.lines.len()
  }

  pub fn height(&self, line_height: f32) -> f32 {
    self.lines.len() as f32 * line_height
  }

  /// The text of each line.
  pub fn texts<'a, E: Encoding>(&'a self, text: Text<'a, E>) -> impl Iterator<Item = Text<'a, E>> + 'a {
    self.lines.iter().map(move |line| text.slice(line.start..line.end))
  }

  fn push(&mut self, line: Line) {
    self.max_line_width = self.max_line_width.max(line.width);
    self.lines.push(line);
  }

  /// Rebuilds the wrapped text with a line feed between lines.
  pub fn concatenate<E: Encoding>(&self, text: Text<'_, E>) -> Vec<E::Unit> {
    let mut out = Vec::with_capacity(text.len() + self.lines.len());
    for (i, line) in self.lines.iter().enumerate() {
      if i > 0 {
        out.push(E::ascii(b'\n'));
      }
      out.extend_from_slice(&text.units()[line.start..line.end]);
    }
    out
  }
}

struct Splitter<'a, E: Encoding, M: ?Sized> {
  metrics:          &'a M,
  cursor:           Cursor<'a, E>,
  whitespace:       &'a Separators,
  token_separators: &'a Separators,
  spacing:          Spacing,
}

impl<E: Encoding, M: GlyphMetrics + ?Sized> Splitter<'_, E, M> {
  fn category(&self, token: Option<Token>) -> Option<CodePointCategory> {
    match token? {
      Token::CodePoint(cp) => Some(categorize(cp, self.whitespace, self.token_separators)),
      Token::Directive(_) => Some(CodePointCategory::Token),
    }
  }

  /// Consumes whitespace, advancing `pen` through it.
  fn skip_whitespace(&mut self, pen: &mut Pen) {
    loop {
      let mut probe = self.cursor;
      match probe.next_token() {
        Some(Token::CodePoint(cp))
          if categorize(cp, self.whitespace, self.token_separators)
            == CodePointCategory::Whitespace =>
        {
          pen.advance(self.metrics, cp, self.spacing);
          self.cursor = probe;
        },
        _ => return,
      }
    }
  }

  /// Consumes a line break if one is next.
  fn eat_line_break(&mut self) -> bool {
    if self.cursor.eat(LINE_FEED) {
      return true;
    }
    if self.cursor.eat(CARRIAGE_RETURN) {
      self.cursor.eat(LINE_FEED);
      return true;
    }
    false
  }

  /// Consumes the next token, advancing both pens through it.
  fn take_token(&mut self, chained: &mut Pen, fresh: &mut Pen) {
    let mut first = true;
    loop {
      let mut probe = self.cursor;
      let token = probe.next_token();
      let category = self.category(token);
      let take = match category {
        Some(CodePointCategory::Token) => true,
        Some(CodePointCategory::TokenSeparator) => first,
        _ => false,
      };
      if !take {
        return;
      }
      if let Some(Token::CodePoint(cp)) = token {
        chained.advance(self.metrics, cp, self.spacing);
        fresh.advance(self.metrics, cp, self.spacing);
        first = false;
      }
      self.cursor = probe;
      if category == Some(CodePointCategory::TokenSeparator) {
        return;
      }
    }
  }
}

/// Splits `text` into lines no wider than `max_width`.
///
/// Tokens are runs of code points outside both separator sets, or a single
/// token separator. Whitespace between tokens on the same line is kept,
/// whitespace at a wrap point or at the end of the text is dropped. A token
/// wider than `max_width` gets a line of its own.
pub fn split<E, M>(
  metrics: &M,
  text: Text<'_, E>,
  max_width: f32,
  whitespace: &Separators,
  token_separators: &Separators,
  spacing: Spacing,
) -> SplitLines
where
  E: Encoding,
  M: GlyphMetrics + ?Sized,
{
  let mut splitter = Splitter {
    metrics,
    cursor: text.cursor(),
    whitespace,
    token_separators,
    spacing,
  };
  let mut result = SplitLines::default();
  let mut current: Option<Line> = None;
  let mut line_pen = Pen::default();

  loop {
    let mut chained = line_pen;
    splitter.skip_whitespace(&mut chained);

    let break_at = splitter.cursor.position();
    if splitter.eat_line_break() {
      let line = current.take().unwrap_or(Line {
        start: break_at,
        end:   break_at,
        width: 0.0,
      });
      result.push(line);
      line_pen = Pen::default();
      continue;
    }

    let token_start = splitter.cursor.position();
    let mut fresh = Pen::default();
    splitter.take_token(&mut chained, &mut fresh);
    let token_end = splitter.cursor.position();
    if token_end == token_start {
      break;
    }

    match current {
      Some(ref mut line) if chained.x <= max_width => {
        line.end = token_end;
        line.width = chained.x;
        line_pen = chained;
      },
      open => {
        if let Some(line) = open {
          result.push(line);
        }
        current = Some(Line {
          start: token_start,
          end:   token_end,
          width: fresh.x,
        });
        line_pen = fresh;
      },
    }
  }

  if let Some(line) = current {
    result.push(line);
  }
  result
}

#[cfg(test)]
mod tests {
  use the_text::{
    FixedMetrics,
    Utf8,
  };

  use super::*;
  use crate::measure::string_width;

  fn lines_of(s: &str, max_width: f32, tokens: &str) -> (Vec<String>, SplitLines) {
    let text = Text::utf8(s);
    let lines = split(
      &FixedMetrics::default(),
      text,
      max_width,
      &Separators::from(" "),
      &Separators::from(tokens),
      Spacing::NONE,
    );
    let strings = lines
      .texts(text)
      .map(|line| String::from_utf8_lossy(line.units()).into_owned())
      .collect();
    (strings, lines)
  }

  #[test]
  fn greedy_packing() {
    let (lines, result) = lines_of("the quick fox", 65.0, "");
    assert_eq!(lines, ["the", "quick", "fox"]);
    assert!(result.lines.iter().all(|line| line.width <= 65.0));
    assert_eq!(result.max_line_width, 50.0);

    let (lines, _) = lines_of("the quick fox", 90.0, "");
    assert_eq!(lines, ["the quick", "fox"]);
  }

  #[test]
  fn line_width_includes_inner_whitespace() {
    let (lines, result) = lines_of("ab  cd", 100.0, "");
    assert_eq!(lines, ["ab  cd"]);
    assert_eq!(result.lines[0].width, 60.0);
  }

  #[test]
  fn whitespace_at_edges_is_dropped() {
    let (lines, _) = lines_of("   lead and trail   ", 1000.0, "");
    assert_eq!(lines, ["lead and trail"]);
    let (lines, _) = lines_of("    ", 1000.0, "");
    assert!(lines.is_empty());
  }

  #[test]
  fn explicit_breaks_force_lines() {
    let (lines, result) = lines_of("a\r\nb\n\nc\n", 1000.0, "");
    assert_eq!(lines, ["a", "b", "", "c"]);
    assert!(result.lines[2].is_empty());
  }

  #[test]
  fn oversized_token_gets_its_own_line() {
    let (lines, result) = lines_of("a abcdefgh b", 50.0, "");
    assert_eq!(lines, ["a", "abcdefgh", "b"]);
    assert_eq!(result.max_line_width, 80.0);
    assert!(result.max_line_width > 50.0);
  }

  #[test]
  fn token_separators_are_single_tokens() {
    let (lines, _) = lines_of("aaaa/bbbb/cccc", 50.0, "/");
    assert_eq!(lines, ["aaaa/", "bbbb/", "cccc"]);
  }

  #[test]
  fn directives_travel_with_tokens() {
    let (lines, result) = lines_of("red {Color:FF0000}blue", 50.0, "");
    assert_eq!(lines, ["red", "{Color:FF0000}blue"]);
    assert_eq!(result.lines[1].width, 40.0);
  }

  #[test]
  fn concatenate_joins_with_line_feeds() {
    let text = Text::utf8("one two three four");
    let lines = split(
      &FixedMetrics::default(),
      text,
      90.0,
      &Separators::whitespace(),
      &Separators::new(),
      Spacing::NONE,
    );
    let joined = lines.concatenate(text);
    assert_eq!(String::from_utf8_lossy(&joined), "one two\nthree\nfour");
    assert_eq!(lines.line_count(), 3);
    assert_eq!(lines.height(20.0), 60.0);
  }

  fn words(s: String) -> String {
    s.chars()
      .map(|ch| if ch.is_whitespace() || ch == '{' { ' ' } else { ch })
      .collect()
  }

  quickcheck::quickcheck! {
    fn lines_fit_unless_single_token(s: String, w: u8) -> bool {
      let s = words(s);
      let max_width = w as f32;
      let (lines, result) = lines_of(&s, max_width, "");
      let fits = lines.iter().zip(&result.lines).all(|(line, range)| {
        (range.width <= max_width || !line.contains(' '))
          && range.width == string_width(&FixedMetrics::default(), line, Spacing::NONE)
      });
      let overflow_flagged = result.lines.iter().all(|l| l.width <= max_width)
        || result.max_line_width > max_width;
      fits && overflow_flagged
    }

    fn concatenation_preserves_tokens(s: String, w: u8) -> bool {
      let s = words(s);
      let text = Text::<Utf8>::utf8(&s);
      let lines = split(
        &FixedMetrics::default(),
        text,
        w as f32,
        &Separators::from(" "),
        &Separators::new(),
        Spacing::NONE,
      );
      let joined = String::from_utf8_lossy(&lines.concatenate(text)).into_owned();
      joined.split([' ', '\n']).filter(|t| !t.is_empty()).eq(s.split(' ').filter(|t| !t.is_empty()))
    }
  }
}
