//! Benchmarks for measurement, truncation, wrapping and span building.
//!
//! Run with: `cargo bench -p the-layout --bench layout`

use divan::{
  Bencher,
  black_box,
};
use the_layout::{
  Spacing,
  SpanBuilder,
  ellipsis,
  ellipsis_double_ended,
  measure,
  split,
};
use the_text::{
  FixedMetrics,
  Separators,
  Text,
};

fn main() {
  divan::main();
}

const PROSE: &str = "The quick brown fox jumps over the lazy dog. ";
const COLORED: &str = "{Color:FF8000}The quick{Color:} brown {Color:80FF0000}fox{Color:} jumps ";
const PATH: &str = "c:/projects/overlay/render/fonts/cache/glyphs/atlas/page_0001/bitmap.png";

fn metrics() -> FixedMetrics {
  FixedMetrics::default()
    .with_kerning('T', 'h', -1.5)
    .with_kerning('f', 'o', -0.5)
}

mod width {
  use super::*;

  #[divan::bench(args = [1, 16, 256])]
  fn prose(bencher: Bencher, times: usize) {
    let metrics = metrics();
    let s = PROSE.repeat(times);
    bencher.bench(|| measure(&metrics, black_box(Text::utf8(&s)).cursor(), Spacing::NONE));
  }

  #[divan::bench(args = [1, 16, 256])]
  fn directives(bencher: Bencher, times: usize) {
    let metrics = metrics();
    let s = COLORED.repeat(times);
    bencher.bench(|| measure(&metrics, black_box(Text::utf8(&s)).cursor(), Spacing::NONE));
  }
}

mod truncate {
  use super::*;

  #[divan::bench(args = [100.0, 400.0])]
  fn single_ended(bencher: Bencher, width: f32) {
    let metrics = metrics();
    let mut out = [0u8; 256];
    bencher.bench_local(|| {
      ellipsis(
        &mut out,
        &metrics,
        black_box(Text::utf8(PATH)),
        width,
        Spacing::NONE,
      )
    });
  }

  #[divan::bench(args = [100.0, 400.0])]
  fn double_ended(bencher: Bencher, width: f32) {
    let metrics = metrics();
    let separators = Separators::path();
    let mut out = [0u8; 256];
    bencher.bench_local(|| {
      ellipsis_double_ended(
        &mut out,
        &metrics,
        black_box(Text::utf8(PATH)),
        &separators,
        width,
        Spacing::NONE,
      )
    });
  }
}

mod wrap {
  use super::*;

  #[divan::bench(args = [1, 16, 256])]
  fn prose(bencher: Bencher, times: usize) {
    let metrics = metrics();
    let s = PROSE.repeat(times);
    let whitespace = Separators::whitespace();
    let tokens = Separators::new();
    bencher.bench(|| {
      split(
        &metrics,
        black_box(Text::utf8(&s)),
        300.0,
        &whitespace,
        &tokens,
        Spacing::NONE,
      )
    });
  }
}

mod spans {
  use super::*;

  #[divan::bench(args = [1, 16, 256])]
  fn prose(bencher: Bencher, times: usize) {
    let metrics = metrics();
    let s = PROSE.repeat(times);
    let builder = SpanBuilder::new(&metrics).max_size(300.0, f32::INFINITY);
    bencher.bench(|| builder.build_spans(black_box(Text::utf8(&s))));
  }

  #[divan::bench(args = [1, 16, 256])]
  fn directives(bencher: Bencher, times: usize) {
    let metrics = metrics();
    let s = COLORED.repeat(times);
    let builder = SpanBuilder::new(&metrics).max_size(300.0, f32::INFINITY);
    bencher.bench(|| builder.build_spans(black_box(Text::utf8(&s))));
  }
}
