use approx::assert_abs_diff_eq;
use lumtiff_core::{NoProgress, encode_gamma8};
use lumtiff_icc::fake::FakeEngine;
use lumtiff_icc::{ColorEngine, LcmsEngine, ProfileSpace};
use lumtiff_io::container::tags::{extra_samples, photometric, tag};
use lumtiff_io::container::{Directory, TiffEncoder, Value};
use lumtiff_io::resolve::resolve;
use lumtiff_io::{EmbeddedProfile, HdrReader, ReadOptions};
use std::io::Cursor;

/// Writes uncompressed single-strip 8-bit pixels with extra tags.
fn tiff8(photo: u16, spp: u16, width: u32, pixels: &[u8], extra: impl FnOnce(&mut Directory)) -> Vec<u8> {
    let height = (pixels.len() / (width as usize * spp as usize)) as u32;
    let mut enc = TiffEncoder::new(Cursor::new(Vec::new())).unwrap();
    let dir = enc.directory_mut();
    dir.insert(tag::IMAGE_WIDTH, Value::Long(vec![width]));
    dir.insert(tag::IMAGE_LENGTH, Value::Long(vec![height]));
    dir.insert(tag::BITS_PER_SAMPLE, Value::Short(vec![8; spp as usize]));
    dir.insert(tag::PHOTOMETRIC, Value::Short(vec![photo]));
    dir.insert(tag::SAMPLES_PER_PIXEL, Value::Short(vec![spp]));
    extra(dir);
    enc.write_encoded_strip(0, pixels).unwrap();
    enc.finish().unwrap().into_inner()
}

fn read_with<E: ColorEngine>(bytes: Vec<u8>, engine: &E, options: ReadOptions) -> lumtiff_core::Frame {
    HdrReader::with_options(Cursor::new(bytes), options)
        .unwrap()
        .read_frame(engine, &mut NoProgress)
        .unwrap()
}

#[test]
fn blank_cmyk_without_profile_is_white() {
    let bytes = tiff8(photometric::SEPARATED, 4, 2, &[0; 8], |_| {});
    let frame = read_with(bytes, &LcmsEngine, ReadOptions::default());
    assert_eq!(frame.sample(0, 0), [1.0, 1.0, 1.0]);
    assert_eq!(frame.sample(1, 0), [1.0, 1.0, 1.0]);
}

#[test]
fn full_cyan_has_no_red_whatever_the_black() {
    let pixels: Vec<u8> = [0u8, 64, 200, 255].iter().flat_map(|&k| [255, 0, 0, k]).collect();
    let bytes = tiff8(photometric::SEPARATED, 4, 4, &pixels, |_| {});
    let frame = read_with(bytes, &LcmsEngine, ReadOptions::default());
    for col in 0..4 {
        assert_eq!(frame.sample(col, 0)[0], 0.0);
    }
}

#[test]
fn malformed_profile_falls_back_to_arithmetic() {
    let pixels = [0, 0, 0, 0, 255, 0, 0, 0, 0, 0, 0, 255];
    let plain = tiff8(photometric::SEPARATED, 4, 3, &pixels, |_| {});
    let junk = tiff8(photometric::SEPARATED, 4, 3, &pixels, |dir| {
        dir.insert(tag::ICC_PROFILE, Value::Undefined(b"not an icc profile".to_vec()));
    });

    let reader = HdrReader::new(Cursor::new(junk.clone())).unwrap();
    assert!(matches!(reader.embedded_profile(), Some(EmbeddedProfile::Icc(_))));
    assert!(resolve(&LcmsEngine, reader.embedded_profile(), reader.format()).is_none());

    let expected = read_with(plain, &LcmsEngine, ReadOptions::default());
    let got = read_with(junk, &LcmsEngine, ReadOptions::default());
    assert_eq!(got.xyz(), expected.xyz());
    assert_eq!(got.sample(2, 0), [0.0, 0.0, 0.0]);
}

#[test]
fn cmyk_profile_goes_through_transform() {
    let icc = FakeEngine::profile_bytes(ProfileSpace::Cmyk);
    let bytes = tiff8(photometric::SEPARATED, 4, 1, &[0, 0, 0, 255], |dir| {
        dir.insert(tag::ICC_PROFILE, Value::Undefined(icc));
    });
    // The fake ignores K, the arithmetic fallback would give black.
    let frame = read_with(bytes.clone(), &FakeEngine::identity(), ReadOptions::default());
    assert_eq!(frame.sample(0, 0), [1.0, 1.0, 1.0]);

    let refused = read_with(bytes, &FakeEngine::refusing(), ReadOptions::default());
    assert_eq!(refused.sample(0, 0), [0.0, 0.0, 0.0]);
}

#[test]
fn color_management_can_be_disabled() {
    let icc = FakeEngine::profile_bytes(ProfileSpace::Rgb);
    let bytes = tiff8(photometric::RGB, 3, 1, &[255, 0, 0], |dir| {
        dir.insert(tag::ICC_PROFILE, Value::Undefined(icc));
    });
    let swapped = read_with(bytes.clone(), &FakeEngine::swap_red_blue(), ReadOptions::default());
    assert_eq!(swapped.sample(0, 0), [0.0, 0.0, 1.0]);

    let off = ReadOptions {
        color_management: false,
        ..Default::default()
    };
    let raw = read_with(bytes, &FakeEngine::swap_red_blue(), off);
    assert_eq!(raw.sample(0, 0), [1.0, 0.0, 0.0]);
}

#[test]
fn srgb_profile_is_near_identity() {
    let icc = LcmsEngine.serialize(&LcmsEngine.reference_profile()).unwrap();
    let pixels: Vec<u8> = (0..16u8).flat_map(|i| [i * 16, 255 - i * 16, 128]).collect();
    let bytes = tiff8(photometric::RGB, 3, 16, &pixels, |dir| {
        dir.insert(tag::ICC_PROFILE, Value::Undefined(icc));
    });
    let frame = read_with(bytes, &LcmsEngine, ReadOptions::default());
    let (r, g, b) = frame.xyz();
    for (i, px) in pixels.chunks_exact(3).enumerate() {
        for (got, want) in [r[i], g[i], b[i]].into_iter().zip(px) {
            let code = encode_gamma8(got) as i32;
            assert!((code - *want as i32).abs() <= 1, "pixel {i}: {code} vs {want}");
        }
    }
}

#[test]
fn rgba8_with_srgb_profile_keeps_alpha() {
    let icc = LcmsEngine.serialize(&LcmsEngine.reference_profile()).unwrap();
    let bytes = tiff8(photometric::RGB, 4, 2, &[200, 100, 50, 7, 0, 0, 0, 250], |dir| {
        dir.insert(tag::EXTRA_SAMPLES, Value::Short(vec![extra_samples::UNASSOC_ALPHA]));
        dir.insert(tag::ICC_PROFILE, Value::Undefined(icc));
    });
    let preview = HdrReader::new(Cursor::new(bytes))
        .unwrap()
        .read_rgba8(&LcmsEngine, &mut NoProgress)
        .unwrap();
    assert_eq!(preview.pixel(0, 0)[3], 7);
    assert_eq!(preview.pixel(1, 0), [0, 0, 0, 250]);
}

fn colorimetric(dir: &mut Directory) {
    dir.insert(tag::WHITE_POINT, Value::Rational(vec![[3127, 10000], [3290, 10000]]));
    dir.insert(
        tag::PRIMARY_CHROMATICITIES,
        Value::Rational(vec![[64, 100], [33, 100], [30, 100], [60, 100], [15, 100], [6, 100]]),
    );
}

#[test]
fn colorimetric_tags_build_a_profile() {
    let bytes = tiff8(photometric::RGB, 3, 2, &[255, 255, 255, 0, 0, 0], colorimetric);
    let reader = HdrReader::new(Cursor::new(bytes.clone())).unwrap();
    assert!(matches!(reader.embedded_profile(), Some(EmbeddedProfile::Colorimetric(_))));
    assert!(resolve(&LcmsEngine, reader.embedded_profile(), reader.format()).is_some());

    let frame = read_with(bytes.clone(), &LcmsEngine, ReadOptions::default());
    for v in frame.sample(0, 0) {
        assert_abs_diff_eq!(v, 1.0, epsilon = 0.03);
    }
    for v in frame.sample(1, 0) {
        assert_abs_diff_eq!(v, 0.0, epsilon = 0.01);
    }

    let off = ReadOptions {
        colorimetric_fallback: false,
        ..Default::default()
    };
    let reader = HdrReader::with_options(Cursor::new(bytes), off).unwrap();
    assert!(reader.embedded_profile().is_none());
}
