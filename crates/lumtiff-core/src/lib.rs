//! # lumtiff-core
//!
//! In-memory image containers shared by the lumtiff crates.
//!
//! - [`Frame`] - three planar `f32` channels (linear RGB or CIE XYZ)
//! - [`Rgba8Image`] - interleaved 8-bit RGBA for display and LDR output
//! - [`Rgb16Pixels`] - interleaved 16-bit RGB handed over by tone mappers
//! - [`Progress`] - progress sink used by the decoder and encoder
//!
//! ## Crate Structure
//!
//! ```text
//! lumtiff-core (this crate)
//!    ^
//!    |
//!    +-- lumtiff-io (TIFF container, classifier, decoder, encoder)
//! ```
//!
//! Every constructor validates its dimensions and allocates fallibly, so a
//! huge header never aborts the process:
//!
//! ```rust
//! use lumtiff_core::{CoreError, Frame};
//!
//! assert!(matches!(Frame::new(0, 4), Err(CoreError::InvalidDimensions { .. })));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod frame;
pub mod ldr;
pub mod progress;

pub use error::{CoreError, CoreResult};
pub use frame::{Channel, Frame};
pub use ldr::{DISPLAY_GAMMA, Rgb16Pixels, Rgba8Image, encode_gamma8};
pub use progress::{NoProgress, Progress, ProgressEvent};

/// Prelude module for convenient imports.
///
/// ```
/// use lumtiff_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Channel, CoreError, CoreResult, Frame, NoProgress, Progress, Rgb16Pixels, Rgba8Image};
}
