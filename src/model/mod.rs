//! Data model for the interval algebra.
//!
//! Everything here is a plain value: [`Bounds`] is a `Copy` box over the
//! declared [`Axis`] list, and an [`Interval`] pairs one with an arbitrary
//! payload. Loaded data uses [`Detection`] as its payload.
//!
//! # Design Principles
//!
//! 1. **Typed axes**: axis names are parsed once into [`Axis`]; predicates
//!    and accessors take the enum.
//!
//! 2. **Permissive construction**: `Bounds::new` accepts malformed ranges so
//!    that loaders can represent them and validation can report them.
//!    `Bounds::try_new` is the strict alternative.
//!
//! 3. **Payload-blind geometry**: ordering and equality never inspect the
//!    payload.
//!
//! # Example
//!
//! ```
//! use stalgebra::model::{Bounds, Detection, Interval};
//!
//! let person = Interval::new(
//!     Bounds::new(0.0, 1.5, 0.1, 0.4, 0.2, 0.9),
//!     Detection::new("person").with_score(0.92),
//! );
//! assert_eq!(person.length(), 1.5);
//! assert_eq!(person.bounds.axis("x").unwrap(), (0.1, 0.4));
//! ```

mod axis;
mod bounds;
mod interval;
pub mod io_csv;
pub mod io_json;
mod payload;
mod range;

// Re-export core types for convenient access
pub use axis::Axis;
pub use bounds::Bounds;
pub use interval::Interval;
pub use payload::Detection;
pub use range::AxisRange;

/// Detections loaded from a file, keyed by source (e.g. video id).
pub type DetectionMapping = crate::mapping::IntervalSetMapping<String, Detection>;
