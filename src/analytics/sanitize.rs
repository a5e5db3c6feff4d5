//! Last pass before a result leaves the crate: every missing or non-finite
//! number becomes `None`, which serializes as JSON `null`.

use std::collections::BTreeMap;

/// Recursively replace undefined numbers with `None`.
///
/// Implementations must be idempotent and must not reorder anything or touch
/// present, finite values.
pub trait Sanitize {
    fn sanitize(&mut self);

    fn sanitized(mut self) -> Self
    where
        Self: Sized,
    {
        self.sanitize();
        self
    }
}

impl Sanitize for Option<f64> {
    fn sanitize(&mut self) {
        if matches!(self, Some(v) if !v.is_finite()) {
            *self = None;
        }
    }
}

impl<T: Sanitize> Sanitize for Vec<T> {
    fn sanitize(&mut self) {
        self.iter_mut().for_each(Sanitize::sanitize);
    }
}

impl<K, V: Sanitize> Sanitize for BTreeMap<K, V> {
    fn sanitize(&mut self) {
        self.values_mut().for_each(Sanitize::sanitize);
    }
}
