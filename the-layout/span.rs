//! Glyph span batching.
//!
//! A [`Span`] is one draw submission: the distinct glyphs it uses and every
//! placed instance of each, grouped by glyph so the consumer can issue one
//! instanced draw per glyph. [`SpanBuilder`] fills spans from text while
//! word wrapping inside a box. It works in fixed-capacity buffers only: a
//! batch of up to `N` code points is staged, their glyph properties are
//! fetched in one sorted bulk query, and the batch is then placed word by
//! word.
//!
//! Running out of room is never an error. [`SpanBuilder::build_span`] reports
//! why it stopped and leaves a [`SpanState`] from which the next call
//! continues.

use arrayvec::ArrayVec;
use bitflags::bitflags;
use the_text::{
  CodePoint,
  CodePointCursor,
  Color,
  Encoding,
  FontProperties,
  FormatState,
  GlyphMetrics,
  GlyphProperties,
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
use thiserror::Error;
use tracing::{
  trace,
  warn,
};

use crate::{
  format::TextFormat,
  measure::{
    Pen,
    Spacing,
  },
};

/// Default number of instances per span.
pub const SPAN_CAPACITY: usize = 128;

bitflags! {
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
  pub struct DrawTextFlags: u8 {
    /// Widens every advance by the outline thickness.
    const OUTLINE = 1 << 0;
    const SHADOW  = 1 << 1;
    /// Rounds instance positions to whole pixels.
    const SNAP    = 1 << 2;
  }
}

/// One placed occurrence of a glyph. `x` and `y` are the top left corner of
/// its bitmap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphInstance {
  pub x:     f32,
  pub y:     f32,
  pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
  pub instance:   GlyphInstance,
  pub word_index: u16,
  pub line_index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("span holds at most {capacity} glyph instances")]
pub struct CapacityError {
  pub capacity: usize,
}

/// `word_index` and `line_index` run parallel to `instances`. Line indices
/// never decrease within one glyph's instances, but they do between glyphs
/// since instances are ordered by glyph rather than by position.
#[derive(Debug, Clone, PartialEq)]
pub struct Span<const N: usize = SPAN_CAPACITY> {
  glyphs:                   ArrayVec<CodePoint, N>,
  instance_count_per_glyph: ArrayVec<u16, N>,
  instances:                ArrayVec<GlyphInstance, N>,
  word_index:               ArrayVec<u16, N>,
  line_index:               ArrayVec<u16, N>,
  max_xy:                   [f32; 2],
  flags:                    DrawTextFlags,
}

impl<const N: usize> Default for Span<N> {
  fn default() -> Self {
    Self::new(DrawTextFlags::empty())
  }
}

impl<const N: usize> Span<N> {
  pub fn new(flags: DrawTextFlags) -> Self {
    Span {
      glyphs: ArrayVec::new(),
      instance_count_per_glyph: ArrayVec::new(),
      instances: ArrayVec::new(),
      word_index: ArrayVec::new(),
      line_index: ArrayVec::new(),
      max_xy: [0.0; 2],
      flags,
    }
  }

  pub fn clear(&mut self) {
    self.glyphs.clear();
    self.instance_count_per_glyph.clear();
    self.instances.clear();
    self.word_index.clear();
    self.line_index.clear();
    self.max_xy = [0.0; 2];
  }

  /// Distinct code points, in ascending order when built by [`SpanBuilder`].
  pub fn glyphs(&self) -> &[CodePoint] {
    &self.glyphs
  }

  pub fn instance_count_per_glyph(&self) -> &[u16] {
    &self.instance_count_per_glyph
  }

  /// All instances, grouped by glyph.
  pub fn instances(&self) -> &[GlyphInstance] {
    &self.instances
  }

  pub fn word_index(&self) -> &[u16] {
    &self.word_index
  }

  pub fn line_index(&self) -> &[u16] {
    &self.line_index
  }

  /// Bottom right corner of the bounding box of every instance.
  pub fn max_xy(&self) -> [f32; 2] {
    self.max_xy
  }

  pub fn flags(&self) -> DrawTextFlags {
    self.flags
  }

  pub fn instance_count(&self) -> usize {
    self.instances.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instances.is_empty()
  }

  pub fn is_full(&self) -> bool {
    self.instances.is_full() || self.glyphs.is_full()
  }

  /// Each glyph with the slice of its instances.
  pub fn iter_glyphs(&self) -> impl Iterator<Item = (CodePoint, &[GlyphInstance])> + '_ {
    let mut offset = 0;
    self
      .glyphs
      .iter()
      .zip(&self.instance_count_per_glyph)
      .map(move |(&cp, &count)| {
        let instances = &self.instances[offset..offset + count as usize];
        offset += count as usize;
        (cp, instances)
      })
  }

  /// Appends a glyph entry with its instances. Nothing is written unless
  /// all of them fit.
  pub fn try_push_glyph(&mut self, cp: CodePoint, placements: &[Placement]) -> Result<(), CapacityError> {
    if placements.is_empty() {
      return Ok(());
    }
    let full = CapacityError { capacity: N };
    let count = u16::try_from(placements.len()).map_err(|_| full)?;
    if self.glyphs.is_full() || self.instances.remaining_capacity() < placements.len() {
      return Err(full);
    }
    debug_assert!(!self.glyphs.contains(&cp), "glyph {cp:#x} pushed twice");

    self.glyphs.push(cp);
    self.instance_count_per_glyph.push(count);
    for placement in placements {
      self.instances.push(placement.instance);
      self.word_index.push(placement.word_index);
      self.line_index.push(placement.line_index);
    }
    Ok(())
  }

  pub fn extend_bounds(&mut self, max: [f32; 2]) {
    self.max_xy = [self.max_xy[0].max(max[0]), self.max_xy[1].max(max[1])];
  }
}

/// Accepts finished spans for drawing.
pub trait SpanConsumer {
  fn consume(&mut self, spans: &[Span]);
}

impl<F: FnMut(&[Span])> SpanConsumer for F {
  fn consume(&mut self, spans: &[Span]) {
    self(spans)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
  /// All input was laid out.
  Finished,
  /// The span filled up; continue into a new span.
  Capacity,
  /// A word did not fit on an empty line; continue into a new span, which
  /// places it anyway.
  Width,
  /// No further line fits in the box.
  Height,
}

impl StopReason {
  pub fn can_continue(self) -> bool {
    matches!(self, StopReason::Capacity | StopReason::Width)
  }
}

/// Where a span build left off.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpanState {
  /// Unit offset of the first code point not yet laid out.
  pub position:     usize,
  pub format:       FormatState,
  pub pen:          Pen,
  /// Top of the current line relative to the box.
  pub line_top:     f32,
  pub line_index:   u16,
  pub word_index:   u16,
  line_has_content: bool,
  /// Whitespace overflowed the line; the next word starts a new one.
  pending_break:    bool,
}

impl SpanState {
  fn break_line(&mut self, line_height: f32) {
    self.pen.line_break();
    self.line_top += line_height;
    self.line_index = self.line_index.saturating_add(1);
    self.line_has_content = false;
  }
}

#[derive(Debug, Clone, Copy)]
struct Staged {
  cp:       CodePoint,
  start:    usize,
  end:      usize,
  format:   FormatState,
  category: CodePointCategory,
}

struct Stop {
  reason:   StopReason,
  position: usize,
  format:   FormatState,
}

impl Stop {
  fn before(reason: StopReason, entry: &Staged) -> Self {
    Stop {
      reason,
      position: entry.start,
      format: entry.format,
    }
  }
}

pub struct SpanBuilder<'a, M: GlyphMetrics + ?Sized> {
  metrics:          &'a M,
  origin:           [f32; 2],
  max_width:        f32,
  max_height:       f32,
  color:            Color,
  flags:            DrawTextFlags,
  space_extra:      f32,
  whitespace:       Separators,
  token_separators: Separators,
}

impl<'a, M: GlyphMetrics + ?Sized> SpanBuilder<'a, M> {
  /// A builder for an unbounded box at the origin.
  pub fn new(metrics: &'a M) -> Self {
    SpanBuilder {
      metrics,
      origin: [0.0; 2],
      max_width: f32::INFINITY,
      max_height: f32::INFINITY,
      color: Color::WHITE,
      flags: DrawTextFlags::empty(),
      space_extra: 0.0,
      whitespace: Separators::whitespace(),
      token_separators: Separators::new(),
    }
  }

  pub fn from_format(metrics: &'a M, format: &TextFormat) -> Self {
    let [max_width, max_height] = format.max_size();
    Self::new(metrics)
      .max_size(max_width, max_height)
      .color(format.color)
      .flags(format.flags())
      .space_extra(format.space_extra)
      .separators(format.whitespace_set(), format.token_separator_set())
  }

  /// Top left corner of the box.
  pub fn origin(mut self, x: f32, y: f32) -> Self {
    self.origin = [x, y];
    self
  }

  pub fn max_size(mut self, width: f32, height: f32) -> Self {
    self.max_width = width;
    self.max_height = height;
    self
  }

  /// Color used where no directive overrides it.
  pub fn color(mut self, color: Color) -> Self {
    self.color = color;
    self
  }

  pub fn flags(mut self, flags: DrawTextFlags) -> Self {
    self.flags = flags;
    self
  }

  pub fn space_extra(mut self, space_extra: f32) -> Self {
    self.space_extra = space_extra;
    self
  }

  pub fn separators(mut self, whitespace: Separators, token_separators: Separators) -> Self {
    self.whitespace = whitespace;
    self.token_separators = token_separators;
    self
  }

  pub fn spacing(&self) -> Spacing {
    Spacing {
      space_extra: self.space_extra,
      outline:     self.flags.contains(DrawTextFlags::OUTLINE),
    }
  }

  fn line_fits(&self, line_top: f32, line_height: f32) -> bool {
    line_top + line_height <= self.max_height
  }

  /// Lays out one span starting at `state.position` and updates `state` to
  /// continue from where it stopped.
  pub fn build_span<E: Encoding, const N: usize>(
    &self,
    text: Text<'_, E>,
    state: &mut SpanState,
    span: &mut Span<N>,
  ) -> StopReason {
    span.clear();
    span.flags = self.flags;
    span.max_xy = self.origin;

    let reason = self.layout(text, state, span);
    trace!(
      ?reason,
      position = state.position,
      instances = span.instance_count(),
      glyphs = span.glyphs().len(),
      "span build stopped"
    );
    reason
  }

  fn layout<E: Encoding, const N: usize>(
    &self,
    text: Text<'_, E>,
    state: &mut SpanState,
    span: &mut Span<N>,
  ) -> StopReason {
    let font = self.metrics.font_properties();
    if !self.line_fits(state.line_top, font.line_height) {
      return StopReason::Height;
    }

    // Stage up to N code points. Directives only update the format.
    let mut staged: ArrayVec<Staged, N> = ArrayVec::new();
    let mut cursor = text.cursor_at(state.position);
    let mut format = state.format;
    while !staged.is_full() {
      let start = cursor.position();
      match cursor.next_token() {
        None => break,
        Some(Token::Directive(directive)) => format.apply(directive),
        Some(Token::CodePoint(cp)) => {
          if cp == CARRIAGE_RETURN {
            cursor.eat(LINE_FEED);
          }
          staged.push(Staged {
            cp,
            start,
            end: cursor.position(),
            format,
            category: categorize(cp, &self.whitespace, &self.token_separators),
          });
        },
      }
    }

    let mut resume = (cursor.position(), format);
    let next = {
      let mut probe = cursor;
      let mut probe_format = format;
      probe.next_code_point(&mut probe_format)
    };

    // Keep a word that straddles the end of the batch for the next span.
    let splits_word = next
      .map(|cp| categorize(cp, &self.whitespace, &self.token_separators))
      .zip(staged.last().map(|entry| entry.category))
      == Some((CodePointCategory::Token, CodePointCategory::Token));
    if splits_word {
      let word_start = staged
        .iter()
        .rposition(|entry| entry.category != CodePointCategory::Token)
        .map_or(0, |i| i + 1);
      if word_start == 0 {
        warn!(
          capacity = N,
          position = state.position,
          "word longer than a span, splitting it"
        );
      } else {
        resume = (staged[word_start].start, staged[word_start].format);
        staged.truncate(word_start);
      }
    }

    // Resolve glyph properties once per distinct code point.
    let mut order: ArrayVec<usize, N> = (0..staged.len())
      .filter(|&i| staged[i].category != CodePointCategory::LineBreak)
      .collect();
    order.sort_unstable_by_key(|&i| (staged[i].cp, i));

    let mut unique: ArrayVec<CodePoint, N> = ArrayVec::new();
    let mut slot: ArrayVec<usize, N> = staged.iter().map(|_| 0).collect();
    for &i in &order {
      if unique.last() != Some(&staged[i].cp) {
        unique.push(staged[i].cp);
      }
      slot[i] = unique.len() - 1;
    }
    let mut props: ArrayVec<GlyphProperties, N> =
      unique.iter().map(|_| GlyphProperties::default()).collect();
    self.metrics.glyph_properties_sorted(&unique, &mut props);

    let mut placer: Placer<'_, '_, M, N> = Placer {
      builder: self,
      font: &font,
      staged: &staged,
      slot: &slot,
      props: &props,
      placed: staged.iter().map(|_| None).collect(),
      bounds: self.origin,
    };
    let stop = placer.place_all(state);
    let Placer { placed, bounds, .. } = placer;

    // Emit instances grouped by glyph, in placement order within a glyph.
    let mut group: ArrayVec<Placement, N> = ArrayVec::new();
    let mut k = 0;
    while k < order.len() {
      let cp = staged[order[k]].cp;
      group.clear();
      while k < order.len() && staged[order[k]].cp == cp {
        if let Some(placement) = placed[order[k]] {
          group.push(placement);
        }
        k += 1;
      }
      let pushed = span.try_push_glyph(cp, &group);
      debug_assert!(pushed.is_ok(), "staging is bounded by span capacity");
    }
    if !span.is_empty() {
      span.extend_bounds(bounds);
    }

    let stop = stop.unwrap_or(Stop {
      reason:   if next.is_some() {
        StopReason::Capacity
      } else {
        StopReason::Finished
      },
      position: resume.0,
      format:   resume.1,
    });
    state.position = stop.position;
    state.format = stop.format;
    stop.reason
  }

  /// Lays out `text` into as many spans as it takes, starting a fresh
  /// layout at the top of the box.
  pub fn build_spans<E: Encoding>(&self, text: Text<'_, E>) -> (Vec<Span>, StopReason) {
    let mut state = SpanState::default();
    let mut spans = Vec::new();
    loop {
      let before = state.position;
      let mut span = Span::new(self.flags);
      let reason = self.build_span(text, &mut state, &mut span);
      if !span.is_empty() {
        spans.push(span);
      }
      if !reason.can_continue() || state.position == before {
        return (spans, reason);
      }
    }
  }

  /// Builds every span for `text` and hands them to `consumer`.
  pub fn submit<E, C>(&self, text: Text<'_, E>, consumer: &mut C) -> StopReason
  where
    E: Encoding,
    C: SpanConsumer + ?Sized,
  {
    let (spans, reason) = self.build_spans(text);
    consumer.consume(&spans);
    reason
  }
}

/// Word wrap placement over one staged batch.
struct Placer<'b, 'a, M: GlyphMetrics + ?Sized, const N: usize> {
  builder: &'b SpanBuilder<'a, M>,
  font:    &'b FontProperties,
  staged:  &'b [Staged],
  slot:    &'b [usize],
  props:   &'b [GlyphProperties],
  placed:  ArrayVec<Option<Placement>, N>,
  bounds:  [f32; 2],
}

impl<M: GlyphMetrics + ?Sized, const N: usize> Placer<'_, '_, M, N> {
  fn place_all(&mut self, state: &mut SpanState) -> Option<Stop> {
    let builder = self.builder;
    let spacing = builder.spacing();
    let line_height = self.font.line_height;
    let mut i = 0;

    while i < self.staged.len() {
      let entry = self.staged[i];
      match entry.category {
        CodePointCategory::LineBreak => {
          state.break_line(line_height);
          state.pending_break = false;
          if !builder.line_fits(state.line_top, line_height) {
            return Some(Stop {
              reason:   StopReason::Height,
              position: entry.end,
              format:   entry.format,
            });
          }
          i += 1;
        },
        CodePointCategory::Whitespace => {
          let mut pen = state.pen;
          pen.place(builder.metrics, entry.cp, self.props[self.slot[i]].advance, spacing);
          if state.pending_break || pen.x > builder.max_width {
            // Collapsed into the wrap that follows.
            state.pending_break = true;
          } else {
            let word_index = state.word_index;
            self.commit(state, i..i + 1, word_index, spacing);
          }
          i += 1;
        },
        CodePointCategory::Token | CodePointCategory::TokenSeparator => {
          let end = if entry.category == CodePointCategory::Token {
            i + self.staged[i..]
              .iter()
              .take_while(|s| s.category == CodePointCategory::Token)
              .count()
          } else {
            i + 1
          };

          if state.pending_break || !self.fits(state.pen, i..end, spacing) {
            if state.line_has_content {
              state.break_line(line_height);
              if !builder.line_fits(state.line_top, line_height) {
                return Some(Stop::before(StopReason::Height, &entry));
              }
            }
            state.pending_break = false;
            if !self.fits(state.pen, i..end, spacing) && i != 0 {
              return Some(Stop::before(StopReason::Width, &entry));
            }
          }

          let word_index = state.word_index;
          self.commit(state, i..end, word_index, spacing);
          if entry.category == CodePointCategory::Token {
            state.word_index = state.word_index.saturating_add(1);
          }
          i = end;
        },
      }
    }
    None
  }

  fn fits(&self, mut pen: Pen, range: std::ops::Range<usize>, spacing: Spacing) -> bool {
    for i in range {
      let entry = &self.staged[i];
      pen.place(self.builder.metrics, entry.cp, self.props[self.slot[i]].advance, spacing);
    }
    pen.x <= self.builder.max_width
  }

  /// Advances the pen through `range`, recording an instance for every
  /// glyph that has a bitmap and lies inside the box.
  fn commit(&mut self, state: &mut SpanState, range: std::ops::Range<usize>, word_index: u16, spacing: Spacing) {
    let builder = self.builder;
    let [origin_x, origin_y] = builder.origin;
    let baseline = origin_y + state.line_top + self.font.ascender;

    for i in range {
      let entry = self.staged[i];
      let props = self.props[self.slot[i]];
      let (pen_x, pen_y) = state.pen.place(builder.metrics, entry.cp, props.advance, spacing);
      state.line_has_content = true;
      if !props.has_bitmap() {
        continue;
      }

      let mut x = origin_x + pen_x + props.bitmap_offset_x as f32;
      let mut y = baseline + pen_y + props.bitmap_offset_y as f32;
      if builder.flags.contains(DrawTextFlags::SNAP) {
        x = x.round();
        y = y.round();
      }
      let right = x + props.width as f32;
      let bottom = y + props.height as f32;
      if right > origin_x + builder.max_width || bottom > origin_y + builder.max_height {
        continue;
      }

      self.bounds = [self.bounds[0].max(right), self.bounds[1].max(bottom)];
      self.placed[i] = Some(Placement {
        instance: GlyphInstance {
          x,
          y,
          color: entry.format.color(builder.color),
        },
        word_index,
        line_index: state.line_index,
      });
    }
  }
}
