//! # lumtiff-icc
//!
//! Color management for the lumtiff TIFF codec.
//!
//! The codec converts embedded-profile pixels to an sRGB reference one
//! scanline at a time. This crate provides the seam it uses for that and a
//! Little CMS 2 backend behind it.
//!
//! # Features
//!
//! - [`ColorEngine`] / [`PixelTransform`] traits used by the decoder
//! - [`LcmsEngine`], the lcms2-backed production engine
//! - [`fake::FakeEngine`], a deterministic engine for tests
//! - RGB profiles synthesized from TIFF colorimetry ([`Colorimetry`])
//!
//! # Example
//!
//! ```rust
//! use lumtiff_icc::{ColorEngine, Intent, LcmsEngine, PixelLayout, PixelTransform};
//!
//! let engine = LcmsEngine;
//! let icc = engine.serialize(&engine.reference_profile()).unwrap();
//! let embedded = engine.open_profile(&icc).unwrap();
//!
//! let transform = engine
//!     .create_transform(
//!         &embedded,
//!         PixelLayout::Rgb8,
//!         &engine.reference_profile(),
//!         PixelLayout::Rgba8,
//!         Intent::Perceptual,
//!     )
//!     .unwrap();
//!
//! let mut out = [0u8; 4];
//! transform.apply(&[255, 128, 0], &mut out, 1).unwrap();
//! ```
//!
//! # Thread Safety
//!
//! Transforms are built per read or write call and are not shared between
//! threads.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod engine;
mod error;
pub mod fake;
mod layout;
mod profile;
mod transform;

pub use engine::{ColorEngine, LcmsEngine, PixelTransform};
pub use error::{IccError, IccResult};
pub use layout::PixelLayout;
pub use profile::{Colorimetry, DEFAULT_GAMMA, Profile, ProfileSpace};
pub use transform::Transform;

/// Rendering intent for color transformations.
///
/// Determines how out-of-gamut colors are handled during conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Intent {
    /// Compresses the source gamut to fit the destination.
    ///
    /// Used for every decode-side conversion.
    #[default]
    Perceptual,

    /// Maps in-gamut colors exactly and clips the rest.
    RelativeColorimetric,

    /// Maintains saturation at the expense of accuracy.
    Saturation,

    /// Like relative colorimetric but without white point adaptation.
    AbsoluteColorimetric,
}

impl From<Intent> for lcms2::Intent {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::Perceptual => lcms2::Intent::Perceptual,
            Intent::RelativeColorimetric => lcms2::Intent::RelativeColorimetric,
            Intent::Saturation => lcms2::Intent::Saturation,
            Intent::AbsoluteColorimetric => lcms2::Intent::AbsoluteColorimetric,
        }
    }
}
