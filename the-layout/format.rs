use serde::{
  Deserialize,
  Serialize,
};
use the_text::{
  Color,
  Separators,
};
use thiserror::Error;
use tracing::warn;

use crate::{
  measure::Spacing,
  span::DrawTextFlags,
};

#[derive(Debug, Error)]
pub enum FormatError {
  #[error("invalid text format: {0}")]
  Parse(#[from] toml::de::Error),
}

/// Formatting options shared by measurement, truncation and span building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct TextFormat {
  pub space_extra:      f32,
  pub outline:          bool,
  pub shadow:           bool,
  pub snap:             bool,
  pub color:            Color,
  /// One separator per character.
  pub whitespace:       String,
  pub token_separators: String,
  pub path_separators:  String,
  /// Zero means unlimited.
  pub max_width:        f32,
  /// Zero means unlimited.
  pub max_height:       f32,
}

impl Default for TextFormat {
  fn default() -> Self {
    TextFormat {
      space_extra:      0.0,
      outline:          false,
      shadow:           false,
      snap:             false,
      color:            Color::WHITE,
      whitespace:       " \t".into(),
      token_separators: String::new(),
      path_separators:  "/\\".into(),
      max_width:        0.0,
      max_height:       0.0,
    }
  }
}

impl TextFormat {
  pub fn from_toml(source: &str) -> Result<Self, FormatError> {
    let mut format: TextFormat = toml::from_str(source)?;
    format.clamp();
    Ok(format)
  }

  fn clamp(&mut self) {
    for (key, value) in [
      ("max-width", &mut self.max_width),
      ("max-height", &mut self.max_height),
    ] {
      if !value.is_finite() || *value < 0.0 {
        warn!(key, value = *value, "text format size out of range, using unlimited");
        *value = 0.0;
      }
    }
    if !self.space_extra.is_finite() {
      warn!(value = self.space_extra, "text format space-extra is not finite, using 0");
      self.space_extra = 0.0;
    }
  }

  pub fn spacing(&self) -> Spacing {
    Spacing {
      space_extra: self.space_extra,
      outline:     self.outline,
    }
  }

  pub fn flags(&self) -> DrawTextFlags {
    let mut flags = DrawTextFlags::empty();
    flags.set(DrawTextFlags::OUTLINE, self.outline);
    flags.set(DrawTextFlags::SHADOW, self.shadow);
    flags.set(DrawTextFlags::SNAP, self.snap);
    flags
  }

  pub fn whitespace_set(&self) -> Separators {
    Separators::from(self.whitespace.as_str())
  }

  pub fn token_separator_set(&self) -> Separators {
    Separators::from(self.token_separators.as_str())
  }

  pub fn path_separator_set(&self) -> Separators {
    Separators::from(self.path_separators.as_str())
  }

  /// Box size with unlimited dimensions as infinity.
  pub fn max_size(&self) -> [f32; 2] {
    [self.max_width, self.max_height].map(|v| if v > 0.0 { v } else { f32::INFINITY })
  }
}
