use the_layout::Spacing;
use the_text::{
  FixedMetrics,
  Separators,
};

const MAX_TEXT_BYTES: usize = 4 * 1024;
const MAX_OUT_UNITS: usize = 512;

pub struct Scenario {
  pub metrics:    FixedMetrics,
  pub spacing:    Spacing,
  pub separators: Separators,
  pub width:      f32,
  pub height:     f32,
  pub out_len:    usize,
  pub text:       Vec<u8>,
}

pub fn scenario_from_bytes(data: &[u8]) -> Scenario {
  let mut cursor = ByteCursor::new(data);
  let advance = 1.0 + (cursor.next_u8() % 32) as f32;
  let kerning = -((cursor.next_u8() % 8) as f32) * 0.5;
  let flags = cursor.next_u8();
  let spacing = Spacing {
    space_extra: (flags >> 1) as f32 * 0.25,
    outline:     flags & 1 != 0,
  };
  let separators = match cursor.next_u8() % 3 {
    0 => Separators::path(),
    1 => Separators::whitespace(),
    _ => Separators::from("/.-"),
  };
  let width = cursor.next_u16() as f32 * 0.25;
  let height = cursor.next_u16() as f32 * 0.25;
  let out_len = cursor.next_usize(MAX_OUT_UNITS);
  let text_len = cursor.next_usize(MAX_TEXT_BYTES);
  let text = cursor.next_bytes(text_len).to_vec();

  Scenario {
    metrics: FixedMetrics::new(advance, advance * 2.0)
      .with_kerning('A', 'V', kerning)
      .with_kerning('/', '.', kerning)
      .with_advance('.', advance * 0.5),
    spacing,
    separators,
    width,
    height,
    out_len,
    text,
  }
}

struct ByteCursor<'a> {
  data: &'a [u8],
  pos:  usize,
}

impl<'a> ByteCursor<'a> {
  fn new(data: &'a [u8]) -> Self {
    Self { data, pos: 0 }
  }

  fn next_u8(&mut self) -> u8 {
    let value = self.data.get(self.pos).copied().unwrap_or(0);
    self.pos = self.pos.saturating_add(1);
    value
  }

  fn next_u16(&mut self) -> u16 {
    let lo = self.next_u8() as u16;
    let hi = self.next_u8() as u16;
    lo | (hi << 8)
  }

  fn next_usize(&mut self, max: usize) -> usize {
    if max == 0 {
      return 0;
    }
    (self.next_u16() as usize) % (max + 1)
  }

  /// A zero `len` takes the rest of the input.
  fn next_bytes(&mut self, len: usize) -> &'a [u8] {
    let start = self.pos.min(self.data.len());
    let end = if len == 0 {
      self.data.len()
    } else {
      start.saturating_add(len).min(self.data.len())
    };
    self.pos = end;
    &self.data[start..end]
  }
}
