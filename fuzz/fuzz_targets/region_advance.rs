#![no_main]

use chunkspace::{ConstIterator, CoordinateOrder, MAX_COORDINATE, RegionCoordinatesIterator, coordinates_compare};
use libfuzzer_sys::fuzz_target;

// Fuzz target for region skip-ahead.
// Jumping to a target must land on the same point as stepping one lattice
// point at a time, including for boxes pressed against MAX_COORDINATE.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let dims = (data[0] % 3 + 1) as usize;
    let base = if data[1] & 1 == 1 { MAX_COORDINATE - 200 } else { 0 };
    let data = &data[2..];
    if data.len() < dims * 4 {
        return;
    }

    let mut low = Vec::with_capacity(dims);
    let mut high = Vec::with_capacity(dims);
    let mut intervals = Vec::with_capacity(dims);
    let mut target = Vec::with_capacity(dims);
    for chunk in data.chunks_exact(4).take(dims) {
        let l = base + chunk[0] as i8 as i64;
        low.push(l);
        high.push(l + (chunk[1] % 16) as i64);
        intervals.push((chunk[2] % 4 + 1) as u64);
        target.push(base + chunk[3] as i8 as i64);
    }

    let mut stepped = RegionCoordinatesIterator::new(&low, &high, &intervals);
    while !stepped.end() && coordinates_compare(stepped.position(), &target, CoordinateOrder::RowMajor).is_lt() {
        stepped.next();
    }

    let mut jumped = RegionCoordinatesIterator::new(&low, &high, &intervals);
    jumped.advance_to_at_least(&target);

    assert_eq!(jumped.end(), stepped.end(), "low={low:?} high={high:?} target={target:?}");
    if !jumped.end() {
        assert_eq!(jumped.position(), stepped.position());
    }

    // Both continue identically from there.
    while !stepped.end() {
        assert!(!jumped.end());
        assert_eq!(jumped.position(), stepped.position());
        stepped.next();
        jumped.next();
    }
    assert!(jumped.end());
});
