#![no_main]

use std::sync::Arc;

use chunkspace::{
    ArrayDesc, ConstIterator, DimensionDesc, RegionCoordinatesIterator, SpatialRange, SpatialRanges,
    SpatialRangesChunkPosIterator,
};
use libfuzzer_sys::fuzz_target;

// Fuzz target for chunk scans over range sets.
// The iterator must report exactly the chunks that some valid range
// intersects, once each and ascending.
fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    let dims: Vec<DimensionDesc> = data[..8]
        .chunks_exact(4)
        .enumerate()
        .map(|(i, b)| {
            let start = b[0] as i8 as i64;
            let len = (b[1] % 64) as i64 + 1;
            DimensionDesc::new(format!("d{i}"), start, start + len - 1, (b[2] % 16 + 1) as u64, (b[3] % 4) as u64)
        })
        .collect();
    let desc = match ArrayDesc::new("fuzz", dims) {
        Ok(desc) => desc,
        Err(_) => return,
    };

    // Each range is 4 bytes: a corner offset and a signed extent per dim.
    let mut ranges = SpatialRanges::new(2);
    for b in data[8..].chunks_exact(4).take(8) {
        let mut low = Vec::with_capacity(2);
        let mut high = Vec::with_capacity(2);
        for (d, dim) in desc.dimensions().iter().enumerate() {
            let len = dim.end_max - dim.start_min + 1;
            let l = dim.start_min + b[d * 2] as i64 % len;
            let h = (l + (b[d * 2 + 1] as i8 as i64) / 4).clamp(dim.start_min, dim.end_max);
            low.push(l);
            high.push(h);
        }
        ranges.add_one(SpatialRange::new(low, high));
    }
    let ranges = Arc::new(ranges);

    let array_low: Vec<i64> = desc.dimensions().iter().map(|d| d.start_min).collect();
    let array_high: Vec<i64> = desc.dimensions().iter().map(|d| d.end_max).collect();
    let expected: Vec<_> = RegionCoordinatesIterator::new(&array_low, &array_high, &desc.chunk_intervals())
        .positions()
        .filter(|chunk_pos| {
            let (low, high) = desc.chunk_boundaries(chunk_pos, false);
            let chunk = SpatialRange::new(low, high);
            ranges.iter().any(|r| r.valid() && r.intersects(&chunk))
        })
        .collect();

    let actual: Vec<_> = SpatialRangesChunkPosIterator::new(ranges, &desc).positions().collect();
    assert_eq!(actual, expected);
});
