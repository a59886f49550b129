//! Planar floating-point HDR frame.
//!
//! A [`Frame`] owns three same-sized `f32` planes named X, Y and Z. The
//! codec stores linear RGB in them for integer and float TIFFs and CIE XYZ
//! for LogLuv TIFFs; the frame itself does not interpret the values.
//!
//! # Layout
//!
//! Each plane is a flat, row-major buffer of `width * height` samples:
//!
//! ```text
//! index(x, y) = y * width + x
//! ```
//!
//! # Example
//!
//! ```rust
//! use lumtiff_core::Frame;
//!
//! let mut frame = Frame::new(4, 2).unwrap();
//! let (x, y, z) = frame.xyz_mut();
//! x[0] = 1.0;
//! y[0] = 0.5;
//! z[0] = 0.25;
//!
//! assert_eq!(frame.sample(0, 0), [1.0, 0.5, 0.25]);
//! ```

use crate::error::{CoreError, CoreResult, pixel_count, try_zeroed};

/// One of the three planes of a [`Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// First plane (red, or CIE X).
    X,
    /// Second plane (green, or CIE Y).
    Y,
    /// Third plane (blue, or CIE Z).
    Z,
}

/// Three equally sized planes of 32-bit float samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    x: Vec<f32>,
    y: Vec<f32>,
    z: Vec<f32>,
}

impl Frame {
    /// Creates a frame with three zero-filled planes.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidDimensions`] if either side is zero
    /// - [`CoreError::AllocationFailed`] if the planes cannot be allocated
    pub fn new(width: u32, height: u32) -> CoreResult<Self> {
        let len = pixel_count(width, height)?;
        let x = try_zeroed(len)?;
        let y = try_zeroed(len)?;
        let z = try_zeroed(len)?;
        Ok(Self { width, height, x, y, z })
    }

    /// Creates a frame from existing planes.
    ///
    /// All three planes must hold exactly `width * height` samples.
    pub fn from_planes(
        width: u32,
        height: u32,
        x: Vec<f32>,
        y: Vec<f32>,
        z: Vec<f32>,
    ) -> CoreResult<Self> {
        let len = pixel_count(width, height)?;
        for (what, plane) in [("X plane", &x), ("Y plane", &y), ("Z plane", &z)] {
            if plane.len() != len {
                return Err(CoreError::PlaneLength {
                    what,
                    expected: len,
                    actual: plane.len(),
                });
            }
        }
        Ok(Self { width, height, x, y, z })
    }

    /// Creates a frame where every pixel holds the same sample triple.
    pub fn filled(width: u32, height: u32, value: [f32; 3]) -> CoreResult<Self> {
        let mut frame = Self::new(width, height)?;
        frame.x.fill(value[0]);
        frame.y.fill(value[1]);
        frame.z.fill(value[2]);
        Ok(frame)
    }

    /// Frame width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of samples in each plane.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.x.len()
    }

    /// Returns the raw buffer of one plane.
    #[inline]
    pub fn channel(&self, channel: Channel) -> &[f32] {
        match channel {
            Channel::X => &self.x,
            Channel::Y => &self.y,
            Channel::Z => &self.z,
        }
    }

    /// Returns the mutable raw buffer of one plane.
    #[inline]
    pub fn channel_mut(&mut self, channel: Channel) -> &mut [f32] {
        match channel {
            Channel::X => &mut self.x,
            Channel::Y => &mut self.y,
            Channel::Z => &mut self.z,
        }
    }

    /// Borrows all three planes at once.
    #[inline]
    pub fn xyz(&self) -> (&[f32], &[f32], &[f32]) {
        (&self.x, &self.y, &self.z)
    }

    /// Mutably borrows all three planes at once.
    #[inline]
    pub fn xyz_mut(&mut self) -> (&mut [f32], &mut [f32], &mut [f32]) {
        (&mut self.x, &mut self.y, &mut self.z)
    }

    /// Returns the sample triple at `(col, row)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the frame.
    pub fn sample(&self, col: u32, row: u32) -> [f32; 3] {
        assert!(col < self.width && row < self.height, "sample out of bounds");
        let i = row as usize * self.width as usize + col as usize;
        [self.x[i], self.y[i], self.z[i]]
    }

    /// Returns one row of each plane.
    pub fn row(&self, row: u32) -> (&[f32], &[f32], &[f32]) {
        let w = self.width as usize;
        let start = row as usize * w;
        (
            &self.x[start..start + w],
            &self.y[start..start + w],
            &self.z[start..start + w],
        )
    }

    /// Consumes the frame and returns its planes.
    pub fn into_planes(self) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
        (self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_frame_is_zeroed() {
        let frame = Frame::new(3, 2).unwrap();
        assert_eq!(frame.pixel_count(), 6);
        assert!(frame.channel(Channel::Y).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn from_planes_checks_lengths() {
        let ok = Frame::from_planes(2, 1, vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]).unwrap();
        assert_eq!(ok.sample(1, 0), [2.0, 4.0, 6.0]);

        let err = Frame::from_planes(2, 1, vec![1.0, 2.0], vec![3.0], vec![5.0, 6.0]).unwrap_err();
        match err {
            CoreError::PlaneLength { what, expected, actual } => {
                assert_eq!(what, "Y plane");
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rows_are_row_major() {
        let mut frame = Frame::new(2, 2).unwrap();
        frame.channel_mut(Channel::Z)[3] = 7.0;
        let (_, _, z) = frame.row(1);
        assert_eq!(z, &[0.0, 7.0]);
    }
}
