//! Histogram of sellers by how many articles they offered or sold.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Width of every non-zero bucket (`1-10`, `11-20`, ...).
pub const BUCKET_WIDTH: u32 = 10;

/// Inclusive range of per-seller article counts.
///
/// Ordered numerically, so `1-10` sorts before `11-20`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CountBucket {
    pub from: u32,
    pub to: u32,
}

impl CountBucket {
    pub const EMPTY: CountBucket = CountBucket { from: 0, to: 0 };

    /// Bucket a count falls into.
    pub fn for_count(count: u32) -> Self {
        if count == 0 {
            return Self::EMPTY;
        }
        let from = (count - 1) / BUCKET_WIDTH * BUCKET_WIDTH + 1;
        Self {
            from,
            to: from + BUCKET_WIDTH - 1,
        }
    }

    pub fn contains(&self, count: u32) -> bool {
        (self.from..=self.to).contains(&count)
    }
}

impl core::fmt::Display for CountBucket {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.from == self.to {
            write!(f, "{}", self.from)
        } else {
            write!(f, "{}-{}", self.from, self.to)
        }
    }
}

/// All buckets needed to cover counts `0..=capacity`.
pub fn buckets(capacity: u32) -> Vec<CountBucket> {
    let mut out = vec![CountBucket::EMPTY];
    let mut from = 1;
    while from <= capacity {
        out.push(CountBucket::for_count(from));
        from += BUCKET_WIDTH;
    }
    out
}

/// Count how many sellers fall into each bucket.
///
/// Every bucket up to `capacity` is present, empty ones with zero sellers.
/// Counts beyond the capacity still get their own bucket.
pub fn histogram<I>(counts: I, capacity: u32) -> BTreeMap<CountBucket, usize>
where
    I: IntoIterator<Item = u32>,
{
    let mut map: BTreeMap<CountBucket, usize> = buckets(capacity).into_iter().map(|b| (b, 0)).collect();
    for count in counts {
        *map.entry(CountBucket::for_count(count)).or_insert(0) += 1;
    }
    map
}
