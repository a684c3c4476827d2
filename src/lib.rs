#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

/// Bit-packed single/dual type encoding.
pub mod type_encoding;

/// Damage/resistance multiplier and the `(type, multiplier)` record.
pub mod resistance;

/// Flat, rank-ordered solution-set container.
pub mod ranked_set;

/// The core library's checked-error type.
pub mod error;

/// The dancing-links matrix: construction, cover/uncover, hide/unhide.
pub mod links;

/// Exact and overlapping cover search drivers.
pub mod solver;

/// Plain-text region and JSON interaction/gym file parsers.
#[cfg(feature = "formats")]
pub mod formats;

pub use crate::error::{CoverError, HiddenStackKind};
pub use crate::links::{CoverageLinks, CoverageMode};
pub use crate::ranked_set::RankedSet;
pub use crate::resistance::{Multiplier, Resistance};
pub use crate::type_encoding::TypeEncoding;
