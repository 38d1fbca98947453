//! Log-scale magnitude buckets.

/// `round(log10(value))`, or `None` when the value is not positive or
/// not finite
pub fn magnitude(value: f64) -> Option<i32> {
    if value <= 0.0 || !value.is_finite() {
        return None;
    }
    let bucket = value.log10().round();
    bucket.is_finite().then_some(bucket as i32)
}

/// Smallest element of a sequence
pub fn min_of(values: impl IntoIterator<Item = i32>) -> Option<i32> {
    values.into_iter().min()
}

/// Largest element of a sequence
pub fn max_of(values: impl IntoIterator<Item = i32>) -> Option<i32> {
    values.into_iter().max()
}

/// Inclusive range of observed buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub min: i32,
    pub max: i32,
}

impl Extent {
    /// Extent of the valid buckets. `None` when no bucket was observed.
    pub fn of(buckets: impl IntoIterator<Item = Option<i32>>) -> Option<Self> {
        let valid: Vec<i32> = buckets.into_iter().flatten().collect();
        Some(Self {
            min: min_of(valid.iter().copied())?,
            max: max_of(valid.iter().copied())?,
        })
    }

    /// Bucket used for features without a valid bucket
    pub fn fallback(extent: Option<Self>) -> i32 {
        extent.map(|e| e.min).unwrap_or(0)
    }
}
