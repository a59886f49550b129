use approx::assert_relative_eq;
use lumtiff_core::{Frame, NoProgress, ProgressEvent, Rgb16Pixels, Rgba8Image, encode_gamma8};
use lumtiff_icc::LcmsEngine;
use lumtiff_icc::fake::FakeEngine;
use lumtiff_io::container::tags::tag;
use lumtiff_io::container::{Endian, TiffDecoder};
use lumtiff_io::{
    ColorSpace, EmbeddedProfile, HdrReader, HdrWriter, SampleKind, StripSource, WriteCompression, WriteOptions,
};
use std::io::Cursor;

fn write_mem(source: StripSource<'_>, options: WriteOptions) -> Vec<u8> {
    HdrWriter::with_options(Cursor::new(Vec::new()), options)
        .expect("start writer")
        .write(source, &FakeEngine::identity(), &mut NoProgress)
        .expect("write")
        .into_inner()
}

fn gradient(width: u32, height: u32) -> Frame {
    let n = (width * height) as usize;
    let x = (0..n).map(|i| i as f32 * 0.37).collect();
    let y = (0..n).map(|i| 1.0 / (i as f32 + 1.0)).collect();
    let z = (0..n).map(|i| -(i as f32) + 1e4).collect();
    Frame::from_planes(width, height, x, y, z).expect("frame")
}

#[test]
fn float_round_trip_is_exact() {
    let frame = gradient(7, 5);
    for compression in [WriteCompression::None, WriteCompression::Deflate, WriteCompression::Lzw] {
        let options = WriteOptions::default().with_compression(compression);
        let bytes = write_mem(StripSource::FloatRgb(&frame), options);
        let mut reader = HdrReader::new(Cursor::new(bytes)).expect("open");
        assert_eq!(reader.format().sample_kind(), SampleKind::Float);
        assert!(reader.embedded_profile().is_none());
        let back = reader.read_frame(&FakeEngine::identity(), &mut NoProgress).expect("read");
        assert_eq!(back.xyz(), frame.xyz(), "{compression:?}");
    }
}

#[test]
fn word_round_trip_truncates() {
    let frame = Frame::from_planes(3, 1, vec![0.9, 1000.7, 65535.0], vec![2.0; 3], vec![70000.0, -3.0, 12.5]).unwrap();
    let bytes = write_mem(StripSource::Rgb16Planes(&frame), WriteOptions::default());
    let mut reader = HdrReader::new(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.format().sample_kind(), SampleKind::Word);
    let back = reader.read_frame(&FakeEngine::identity(), &mut NoProgress).unwrap();
    assert_eq!(back.sample(0, 0), [0.0, 2.0, 65535.0]);
    assert_eq!(back.sample(1, 0), [1000.0, 2.0, 0.0]);
    assert_eq!(back.sample(2, 0), [65535.0, 2.0, 12.0]);
}

#[test]
fn rgb16_pixels_embed_profile_and_round_trip() {
    let px = Rgb16Pixels::new(2, 2, (0..12).map(|i| i * 5000).collect()).unwrap();
    let bytes = write_mem(StripSource::Rgb16Pixels(&px), WriteOptions::default());
    let mut reader = HdrReader::new(Cursor::new(bytes)).unwrap();
    assert!(matches!(reader.embedded_profile(), Some(EmbeddedProfile::Icc(icc)) if !icc.is_empty()));
    let back = reader.read_frame(&FakeEngine::identity(), &mut NoProgress).unwrap();
    assert_eq!(back.sample(1, 1), [45000.0, 50000.0, 55000.0]);
}

#[test]
fn byte_round_trip_through_display_gamma() {
    let width = 16;
    let pixels: Vec<[u8; 4]> = (0..width * 2).map(|i| [(i * 8) as u8, 255 - (i * 8) as u8, 17, 255]).collect();
    let image = Rgba8Image::from_pixels(width, 2, pixels.clone()).unwrap();
    let bytes = write_mem(StripSource::Rgba8(&image), WriteOptions::default());

    let mut reader = HdrReader::new(Cursor::new(bytes)).unwrap();
    assert!(reader.format().has_alpha());
    let frame = reader.read_frame(&FakeEngine::identity(), &mut NoProgress).unwrap();
    let (r, g, b) = frame.xyz();
    for (i, px) in pixels.iter().enumerate() {
        assert_eq!([encode_gamma8(r[i]), encode_gamma8(g[i]), encode_gamma8(b[i])], [px[0], px[1], px[2]]);
    }
}

#[test]
fn byte_output_has_profile_and_one_strip_per_row() {
    let image = Rgba8Image::from_pixels(5, 4, vec![[10, 20, 30, 40]; 20]).unwrap();
    let mut events = Vec::new();
    let mut progress = |e: ProgressEvent| events.push(e);
    let bytes = HdrWriter::new(Cursor::new(Vec::new()))
        .unwrap()
        .write(StripSource::Rgba8(&image), &LcmsEngine, &mut progress)
        .unwrap()
        .into_inner();
    assert_eq!(events.first(), Some(&ProgressEvent::Maximum(4)));
    assert_eq!(events.last(), Some(&ProgressEvent::Step(4)));

    let decoder = TiffDecoder::new(Cursor::new(bytes)).unwrap();
    assert_eq!(decoder.strip_count(), 4);
    let icc = decoder.directory().bytes(tag::ICC_PROFILE).expect("ICC tag");
    assert!(!icc.is_empty());
    assert_eq!(decoder.directory().ascii(tag::SOFTWARE), Some("lumtiff"));
}

#[test]
fn rgba8_preview_reads_back_pixels() {
    let pixels = vec![[1, 2, 3, 4], [250, 251, 252, 253]];
    let image = Rgba8Image::from_pixels(2, 1, pixels.clone()).unwrap();
    let bytes = write_mem(StripSource::Rgba8(&image), WriteOptions::default());
    let mut reader = HdrReader::new(Cursor::new(bytes)).unwrap();
    let preview = reader.read_rgba8(&FakeEngine::identity(), &mut NoProgress).unwrap();
    assert_eq!(preview.pixels(), &pixels[..]);
}

#[test]
fn logluv_round_trip() {
    let colors = [[0.9505f32, 1.0, 1.089], [0.2, 0.1, 0.05], [120.0, 250.0, 30.0], [1e-3, 2e-3, 4e-3]];
    let frame = Frame::from_planes(
        4,
        1,
        colors.iter().map(|c| c[0]).collect(),
        colors.iter().map(|c| c[1]).collect(),
        colors.iter().map(|c| c[2]).collect(),
    )
    .unwrap();
    let bytes = write_mem(StripSource::LogLuv(&frame), WriteOptions::default());
    let mut reader = HdrReader::new(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.format().color_space(), ColorSpace::LogLuv);
    assert_eq!(reader.stonits(), 1.0);
    let back = reader.read_frame(&LcmsEngine, &mut NoProgress).unwrap();

    let uv = |[x, y, z]: [f32; 3]| {
        let s = x + 15.0 * y + 3.0 * z;
        (4.0 * x / s, 9.0 * y / s)
    };
    for (i, c) in colors.iter().enumerate() {
        let got = back.sample(i as u32, 0);
        assert_relative_eq!(got[1], c[1], max_relative = 0.003);
        let (u0, v0) = uv(*c);
        let (u1, v1) = uv(got);
        assert!((u0 - u1).abs() <= 1.0 / 410.0, "u' {u0} vs {u1}");
        assert!((v0 - v1).abs() <= 1.0 / 410.0, "v' {v0} vs {v1}");
    }
}

#[test]
fn logluv_ignores_configured_compression() {
    let frame = Frame::filled(3, 2, [0.5, 0.5, 0.5]).unwrap();
    let bytes = write_mem(
        StripSource::LogLuv(&frame),
        WriteOptions::default().with_compression(WriteCompression::PackBits),
    );
    let reader = HdrReader::new(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.directory().u16(tag::COMPRESSION), Some(34676));
}

#[test]
fn encodings_decode_identically() {
    let image = Rgba8Image::from_pixels(9, 3, (0..27).map(|i| [i as u8 * 9, 7, 255 - i as u8, 128]).collect()).unwrap();
    let words = Rgb16Pixels::new(9, 3, (0..81).map(|i| (i * 811) as u16).collect()).unwrap();
    let reference = |source: StripSource<'_>| {
        let bytes = write_mem(source, WriteOptions::default().with_compression(WriteCompression::None));
        HdrReader::new(Cursor::new(bytes))
            .unwrap()
            .read_frame(&FakeEngine::identity(), &mut NoProgress)
            .unwrap()
    };
    let variants = [
        WriteOptions::default().with_endian(Endian::Big),
        WriteOptions::default().with_compression(WriteCompression::Lzw),
        WriteOptions::default().with_compression(WriteCompression::PackBits),
        WriteOptions::default().with_predictor(true),
        WriteOptions::default()
            .with_endian(Endian::Big)
            .with_predictor(true)
            .with_compression(WriteCompression::Lzw),
    ];

    for source in [StripSource::Rgba8(&image), StripSource::Rgb16Pixels(&words)] {
        let expected = reference(source);
        for options in &variants {
            let bytes = write_mem(source, options.clone());
            let frame = HdrReader::new(Cursor::new(bytes))
                .unwrap()
                .read_frame(&FakeEngine::identity(), &mut NoProgress)
                .unwrap();
            assert_eq!(frame.xyz(), expected.xyz(), "{options:?}");
        }
    }
}

#[test]
fn file_round_trip_with_helpers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("float.tif");
    let frame = gradient(4, 3);
    lumtiff_io::write_float(&path, &frame).unwrap();
    let back = lumtiff_io::read(&path).unwrap();
    assert_eq!(back.xyz(), frame.xyz());

    let path = dir.path().join("planes.tif");
    let planes = Frame::filled(2, 2, [100.0, 200.0, 300.0]).unwrap();
    lumtiff_io::write_rgb16_planes(&path, &planes).unwrap();
    assert_eq!(lumtiff_io::read(&path).unwrap().sample(1, 1), [100.0, 200.0, 300.0]);
}

#[test]
fn software_tag_can_be_dropped() {
    let frame = Frame::filled(1, 1, [1.0; 3]).unwrap();
    let bytes = write_mem(StripSource::FloatRgb(&frame), WriteOptions::default().with_software(None));
    let reader = HdrReader::new(Cursor::new(bytes)).unwrap();
    assert!(!reader.directory().contains(tag::SOFTWARE));
}
