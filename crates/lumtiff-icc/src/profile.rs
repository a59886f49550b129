//! ICC profile wrapper.

use crate::{IccError, IccResult};
use lcms2::{CIExyY, CIExyYTRIPLE, ColorSpaceSignature, Profile as LcmsProfile, ToneCurve};

/// Gamma of the tone curve used when a colorimetric description has no
/// transfer function.
pub const DEFAULT_GAMMA: f64 = 2.2;

/// Broad color space of a profile's device side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileSpace {
    /// Three-channel RGB.
    Rgb,
    /// Four-ink CMYK.
    Cmyk,
    /// Anything else (gray, Lab, ...).
    Other,
}

/// Colorimetric description of an RGB device.
///
/// This is what a TIFF carries in its WhitePoint, PrimaryChromaticities and
/// TransferFunction tags when it has no embedded ICC profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Colorimetry {
    /// CIE xy chromaticity of the white point.
    pub white_point: [f64; 2],
    /// CIE xy chromaticities of the red, green and blue primaries.
    pub primaries: [[f64; 2]; 3],
    /// Tabulated per-channel transfer curves (red, green, blue).
    pub transfer: Option<[Vec<u16>; 3]>,
}

impl Colorimetry {
    /// sRGB / Rec.709 primaries with a D65 white point and no curves.
    pub fn rec709() -> Self {
        Self {
            white_point: [0.3127, 0.3290],
            primaries: [[0.64, 0.33], [0.30, 0.60], [0.15, 0.06]],
            transfer: None,
        }
    }
}

/// An ICC color profile.
///
/// Profiles come from embedded ICC data, from a colorimetric description,
/// or are the built-in sRGB reference.
///
/// # Example
///
/// ```rust
/// use lumtiff_icc::Profile;
///
/// let srgb = Profile::srgb();
/// let data = srgb.to_icc().unwrap();
/// let reloaded = Profile::from_icc(&data).unwrap();
/// assert!(reloaded.is_rgb());
/// ```
pub struct Profile {
    /// Internal lcms2 profile handle.
    pub(crate) inner: LcmsProfile,
}

impl Profile {
    /// Creates a profile from raw ICC data.
    pub fn from_icc(data: &[u8]) -> IccResult<Self> {
        let inner = LcmsProfile::new_icc(data)
            .map_err(|e| IccError::InvalidProfile(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Creates an sRGB profile.
    ///
    /// The standard IEC 61966-2-1 sRGB color space.
    pub fn srgb() -> Self {
        Self {
            inner: LcmsProfile::new_srgb(),
        }
    }

    /// Builds an RGB profile from white point, primaries and transfer curves.
    ///
    /// Without tabulated curves every channel gets a pure
    /// [`DEFAULT_GAMMA`] curve.
    pub fn from_colorimetry(colorimetry: &Colorimetry) -> IccResult<Self> {
        let [wx, wy] = colorimetry.white_point;
        if wy <= 0.0 {
            return Err(IccError::CreateFailed(format!("white point y must be positive, got {wy}")));
        }
        let white = CIExyY { x: wx, y: wy, Y: 1.0 };
        let [r, g, b] = colorimetry.primaries;
        let primaries = CIExyYTRIPLE {
            Red: CIExyY { x: r[0], y: r[1], Y: 1.0 },
            Green: CIExyY { x: g[0], y: g[1], Y: 1.0 },
            Blue: CIExyY { x: b[0], y: b[1], Y: 1.0 },
        };

        let inner = match &colorimetry.transfer {
            Some(tables) => {
                if tables.iter().any(|t| t.len() < 2) {
                    return Err(IccError::CreateFailed("transfer table needs at least 2 entries".into()));
                }
                let curves: Vec<ToneCurve> = tables.iter().map(|t| ToneCurve::new_tabulated(t)).collect();
                let refs = [&curves[0], &curves[1], &curves[2]];
                LcmsProfile::new_rgb(&white, &primaries, &refs)
            }
            None => {
                let curve = ToneCurve::new(DEFAULT_GAMMA);
                LcmsProfile::new_rgb(&white, &primaries, &[&curve, &curve, &curve])
            }
        }
        .map_err(|e| IccError::CreateFailed(e.to_string()))?;

        Ok(Self { inner })
    }

    /// Returns the profile description.
    pub fn description(&self) -> String {
        self.inner
            .info(lcms2::InfoType::Description, lcms2::Locale::none())
            .unwrap_or_default()
    }

    /// Returns the device color space.
    pub fn space(&self) -> ProfileSpace {
        match self.inner.color_space() {
            ColorSpaceSignature::RgbData => ProfileSpace::Rgb,
            ColorSpaceSignature::CmykData => ProfileSpace::Cmyk,
            _ => ProfileSpace::Other,
        }
    }

    /// Returns true if this is an RGB profile.
    pub fn is_rgb(&self) -> bool {
        self.space() == ProfileSpace::Rgb
    }

    /// Returns true if this is a CMYK profile.
    pub fn is_cmyk(&self) -> bool {
        self.space() == ProfileSpace::Cmyk
    }

    /// Exports the profile as ICC data.
    pub fn to_icc(&self) -> IccResult<Vec<u8>> {
        self.inner
            .icc()
            .map_err(|e| IccError::CreateFailed(e.to_string()))
    }
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("description", &self.description())
            .field("space", &self.space())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_round_trips_through_icc() {
        let profile = Profile::srgb();
        assert!(profile.is_rgb());
        let data = profile.to_icc().unwrap();
        assert!(data.len() > 128);

        let reloaded = Profile::from_icc(&data).unwrap();
        assert!(reloaded.is_rgb());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            Profile::from_icc(b"definitely not an icc profile"),
            Err(IccError::InvalidProfile(_))
        ));
    }

    #[test]
    fn colorimetric_profile_with_gamma() {
        let profile = Profile::from_colorimetry(&Colorimetry::rec709()).unwrap();
        assert!(profile.is_rgb());
        assert!(!profile.is_cmyk());
    }

    #[test]
    fn colorimetric_profile_with_tables() {
        let ramp: Vec<u16> = (0..256u32).map(|i| (i * 257) as u16).collect();
        let colorimetry = Colorimetry {
            transfer: Some([ramp.clone(), ramp.clone(), ramp]),
            ..Colorimetry::rec709()
        };
        assert!(Profile::from_colorimetry(&colorimetry).unwrap().is_rgb());
    }

    #[test]
    fn degenerate_white_point_fails() {
        let colorimetry = Colorimetry {
            white_point: [0.3, 0.0],
            ..Colorimetry::rec709()
        };
        assert!(Profile::from_colorimetry(&colorimetry).is_err());
    }
}
