#![no_main]

mod common;

use libfuzzer_sys::fuzz_target;
use the_layout::{
  Span,
  SpanBuilder,
  StopReason,
};
use the_text::{
  Separators,
  Text,
  Utf8,
};

use crate::common::scenario_from_bytes;

fn assert_well_formed(span: &Span) {
  assert!(span.glyphs().windows(2).all(|pair| pair[0] < pair[1]));

  let mut offset = 0;
  for &count in span.instance_count_per_glyph() {
    let lines = &span.line_index()[offset..offset + count as usize];
    assert!(lines.windows(2).all(|pair| pair[0] <= pair[1]));
    offset += count as usize;
  }
  assert_eq!(offset, span.instance_count());
  assert_eq!(span.word_index().len(), span.instance_count());
}

fuzz_target!(|data: &[u8]| {
  let scenario = scenario_from_bytes(data);
  let unlimited = |v: f32| if v > 0.0 { v } else { f32::INFINITY };
  let builder = SpanBuilder::new(&scenario.metrics)
    .max_size(unlimited(scenario.width), unlimited(scenario.height))
    .space_extra(scenario.spacing.space_extra)
    .separators(Separators::whitespace(), scenario.separators.clone());

  let (spans, reason) = builder.build_spans(Text::<Utf8>::new(&scenario.text));
  spans.iter().for_each(assert_well_formed);
  if scenario.height == 0.0 && scenario.width == 0.0 {
    assert_eq!(reason, StopReason::Finished);
  }
});
