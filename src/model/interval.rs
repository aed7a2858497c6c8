//! Bounds paired with an opaque payload.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::bounds::Bounds;

/// A box in space-time carrying a payload.
///
/// Equality and ordering only look at the bounds. Callers that care about
/// payloads compare them explicitly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Interval<P> {
    #[serde(flatten)]
    pub bounds: Bounds,
    pub payload: P,
}

impl<P> Interval<P> {
    #[inline]
    pub fn new(bounds: Bounds, payload: P) -> Self {
        Self { bounds, payload }
    }

    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    #[inline]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    #[inline]
    pub fn into_payload(self) -> P {
        self.payload
    }

    #[inline]
    pub fn into_parts(self) -> (Bounds, P) {
        (self.bounds, self.payload)
    }

    #[inline]
    pub fn t1(&self) -> f64 {
        self.bounds.t1()
    }

    #[inline]
    pub fn t2(&self) -> f64 {
        self.bounds.t2()
    }

    #[inline]
    pub fn x1(&self) -> f64 {
        self.bounds.x1()
    }

    #[inline]
    pub fn x2(&self) -> f64 {
        self.bounds.x2()
    }

    #[inline]
    pub fn y1(&self) -> f64 {
        self.bounds.y1()
    }

    #[inline]
    pub fn y2(&self) -> f64 {
        self.bounds.y2()
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.bounds.length()
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.bounds.width()
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bounds.height()
    }

    /// Same bounds, transformed payload.
    pub fn map_payload<Q, F>(self, f: F) -> Interval<Q>
    where
        F: FnOnce(P) -> Q,
    {
        Interval::new(self.bounds, f(self.payload))
    }

    /// Same payload, replaced bounds.
    pub fn with_bounds(self, bounds: Bounds) -> Self {
        Interval::new(bounds, self.payload)
    }

    /// Full-frame spatial extent, same time range and payload.
    pub fn expand_to_frame(self) -> Self {
        let bounds = self.bounds.expand_to_frame();
        self.with_bounds(bounds)
    }

    /// The default comparator used by every sort in the crate.
    #[inline]
    pub fn cmp_bounds<Q>(&self, other: &Interval<Q>) -> Ordering {
        self.bounds.total_cmp(&other.bounds)
    }

    /// Merges two intervals into their spanning box, combining payloads
    /// with `payload_fn`.
    pub fn span_merge<Q, R, F>(&self, other: &Interval<Q>, payload_fn: F) -> Interval<R>
    where
        F: FnOnce(&P, &Q) -> R,
    {
        Interval::new(
            self.bounds.span(&other.bounds),
            payload_fn(&self.payload, &other.payload),
        )
    }

    /// Intersects the time ranges and spans the spatial ones.
    ///
    /// Returns `None` when the two intervals do not overlap in time.
    pub fn overlap_time_span_space<Q, R, F>(
        &self,
        other: &Interval<Q>,
        payload_fn: F,
    ) -> Option<Interval<R>>
    where
        F: FnOnce(&P, &Q) -> R,
    {
        let t = self.bounds.t.intersection(&other.bounds.t)?;
        let bounds = Bounds::from_ranges(
            t,
            self.bounds.x.span(&other.bounds.x),
            self.bounds.y.span(&other.bounds.y),
        );
        Some(Interval::new(
            bounds,
            payload_fn(&self.payload, &other.payload),
        ))
    }
}

impl<P, Q> PartialEq<Interval<Q>> for Interval<P> {
    fn eq(&self, other: &Interval<Q>) -> bool {
        self.bounds == other.bounds
    }
}
