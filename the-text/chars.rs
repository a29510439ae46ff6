use smallvec::SmallVec;

use crate::CodePoint;

pub const LINE_FEED: CodePoint = '\n' as CodePoint;
pub const CARRIAGE_RETURN: CodePoint = '\r' as CodePoint;
pub const SPACE: CodePoint = ' ' as CodePoint;
pub const TAB: CodePoint = '\t' as CodePoint;
pub const FULL_STOP: CodePoint = '.' as CodePoint;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CodePointCategory {
  LineBreak,
  Whitespace,
  TokenSeparator,
  Token,
}

/// Classifies `cp` for word wrapping. Line breaks win over the separator
/// sets, and whitespace wins over token separators.
pub fn categorize(
  cp: CodePoint,
  whitespace: &Separators,
  token_separators: &Separators,
) -> CodePointCategory {
  match cp {
    cp if is_line_break(cp) => CodePointCategory::LineBreak,
    cp if whitespace.contains(cp) => CodePointCategory::Whitespace,
    cp if token_separators.contains(cp) => CodePointCategory::TokenSeparator,
    _ => CodePointCategory::Token,
  }
}

#[inline]
pub fn is_line_break(cp: CodePoint) -> bool {
  cp == LINE_FEED || cp == CARRIAGE_RETURN
}

/// The plain space, the only code point that receives extra spacing.
#[inline]
pub fn is_space(cp: CodePoint) -> bool {
  cp == SPACE
}

#[inline]
pub fn is_whitespace(cp: CodePoint) -> bool {
  match cp {
    0x0009 | // Character Tabulation
    0x0020 | // Space
    0x00A0 | // No-break Space
    0x180E | // Mongolian Vowel Separator
    0x202F | // Narrow No-break Space
    0x205F | // Medium Mathematical Space
    0x3000 | // Ideographic Space
    0xFEFF   // Zero Width No-break Space
    => true,

    // En Quad through Zero Width Space.
    cp if (0x2000..=0x200B).contains(&cp) => true,

    _ => false,
  }
}

/// A small set of code points that terminate tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Separators(SmallVec<[CodePoint; 4]>);

impl Separators {
  pub fn new() -> Self {
    Self::default()
  }

  /// Space and tab.
  pub fn whitespace() -> Self {
    Self::from(" \t")
  }

  /// Forward and back slash.
  pub fn path() -> Self {
    Self::from("/\\")
  }

  #[inline]
  pub fn contains(&self, cp: CodePoint) -> bool {
    self.0.contains(&cp)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = CodePoint> + '_ {
    self.0.iter().copied()
  }
}

impl From<&str> for Separators {
  fn from(s: &str) -> Self {
    s.chars().map(|ch| ch as CodePoint).collect()
  }
}

impl FromIterator<CodePoint> for Separators {
  fn from_iter<I: IntoIterator<Item = CodePoint>>(iter: I) -> Self {
    let mut set = SmallVec::new();
    for cp in iter {
      if !set.contains(&cp) {
        set.push(cp);
      }
    }
    Separators(set)
  }
}
