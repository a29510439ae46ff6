#![no_main]

mod common;

use libfuzzer_sys::fuzz_target;
use the_layout::{
  Truncated,
  ellipsis,
  ellipsis_double_ended,
  measure,
};
use the_text::{
  Text,
  Utf8,
};

use crate::common::{
  Scenario,
  scenario_from_bytes,
};

fn check(scenario: &Scenario, out: &[u8], result: Truncated) {
  assert!(result.width <= scenario.width || result.len == 0);
  assert!(result.len < out.len() || result.len == 0);

  let written = Text::<Utf8>::new(&out[..result.len]);
  let remeasured = measure(&scenario.metrics, written.cursor(), scenario.spacing);
  assert_eq!(remeasured.width, result.width);

  let mut again = vec![0u8; out.len()];
  let repeated = ellipsis(
    &mut again,
    &scenario.metrics,
    written,
    scenario.width,
    scenario.spacing,
  );
  if result.len > 0 {
    assert!(!repeated.truncated);
    assert_eq!(&again[..repeated.len], written.units());
  }
}

fuzz_target!(|data: &[u8]| {
  let mut scenario = scenario_from_bytes(data);
  for byte in &mut scenario.text {
    if matches!(*byte, b'\n' | b'\r') {
      *byte = b' ';
    }
  }
  let text = Text::<Utf8>::new(&scenario.text);
  let mut out = vec![0u8; scenario.out_len];

  let single = ellipsis(
    &mut out,
    &scenario.metrics,
    text,
    scenario.width,
    scenario.spacing,
  );
  check(&scenario, &out, single);

  let double = ellipsis_double_ended(
    &mut out,
    &scenario.metrics,
    text,
    &scenario.separators,
    scenario.width,
    scenario.spacing,
  );
  check(&scenario, &out, double);
});
