#![no_main]

use colgrid_layout::{MIN_WIDTH, WIDTH_SUM_TOLERANCE, clamp_pair, normalize, widths_sum_ok};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte picks the column count (2..=10), the rest are raw f64 widths.
    let Some((&head, payload)) = data.split_first() else {
        return;
    };
    let count = usize::from(head % 9) + 2;
    let raw: Vec<f64> = payload
        .chunks_exact(8)
        .take(count)
        .map(|chunk| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            f64::from_le_bytes(bytes)
        })
        .collect();
    if raw.len() != count {
        return;
    }

    let out = normalize(&raw, MIN_WIDTH);
    assert_eq!(out.len(), count);
    for (i, w) in out.iter().enumerate() {
        assert!(w.is_finite(), "column {i} not finite: {raw:?} -> {out:?}");
        assert!(*w >= MIN_WIDTH - 0.005, "column {i} below minimum: {raw:?} -> {out:?}");
    }
    assert!(widths_sum_ok(&out, WIDTH_SUM_TOLERANCE), "bad sum: {raw:?} -> {out:?}");

    // Pairwise clamping keeps the pair total and both floors.
    let delta = raw[0];
    let (a, b) = clamp_pair(out[0], out[1], delta, MIN_WIDTH);
    assert!(a >= MIN_WIDTH - 0.005 && b >= MIN_WIDTH - 0.005);
    assert!(((a + b) - (out[0] + out[1])).abs() <= 0.02);
});
