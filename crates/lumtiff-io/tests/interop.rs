//! Files exchanged with the independent `tiff` crate.

use lumtiff_core::{Frame, NoProgress};
use lumtiff_icc::LcmsEngine;
use lumtiff_icc::fake::FakeEngine;
use lumtiff_io::{ColorSpace, HdrReader, HdrWriter, SampleKind, StripSource, WriteCompression, WriteOptions};
use std::io::Cursor;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{TiffEncoder, colortype};

fn encode_with_tiff<C: colortype::ColorType>(width: u32, height: u32, data: &[C::Inner]) -> Vec<u8>
where
    [C::Inner]: tiff::encoder::TiffValue,
{
    let mut cursor = Cursor::new(Vec::new());
    TiffEncoder::new(&mut cursor)
        .unwrap()
        .write_image::<C>(width, height, data)
        .unwrap();
    cursor.into_inner()
}

fn read(bytes: Vec<u8>) -> (lumtiff_io::PixelFormat, Frame) {
    let mut reader = HdrReader::new(Cursor::new(bytes)).expect("open tiff-crate file");
    let format = reader.format().clone();
    let frame = reader.read_frame(&LcmsEngine, &mut NoProgress).expect("decode");
    (format, frame)
}

#[test]
fn reads_rgb8() {
    let data: Vec<u8> = (0..4 * 3 * 3).map(|i| (i * 7) as u8).collect();
    let (format, frame) = read(encode_with_tiff::<colortype::RGB8>(4, 3, &data));
    assert_eq!(format.sample_kind(), SampleKind::Byte);
    assert!(!format.has_alpha());
    let [r, g, b] = frame.sample(3, 2);
    let px = &data[(2 * 4 + 3) * 3..];
    assert_eq!(r, (px[0] as f32 / 255.0).powf(2.2));
    assert_eq!(g, (px[1] as f32 / 255.0).powf(2.2));
    assert_eq!(b, (px[2] as f32 / 255.0).powf(2.2));
}

#[test]
fn reads_rgb16() {
    let data: Vec<u16> = (0..5 * 2 * 3).map(|i| (i * 2000) as u16).collect();
    let (format, frame) = read(encode_with_tiff::<colortype::RGB16>(5, 2, &data));
    assert_eq!(format.sample_kind(), SampleKind::Word);
    assert_eq!(frame.sample(4, 1), [54000.0, 56000.0, 58000.0]);
}

#[test]
fn reads_rgb32_float() {
    let data: Vec<f32> = (0..3 * 3 * 3).map(|i| i as f32 * 0.125 - 1.0).collect();
    let (format, frame) = read(encode_with_tiff::<colortype::RGB32Float>(3, 3, &data));
    assert_eq!(format.sample_kind(), SampleKind::Float);
    assert_eq!(frame.sample(0, 0), [-1.0, -0.875, -0.75]);
    assert_eq!(frame.sample(2, 2), [2.0, 2.125, 2.25]);
}

#[test]
fn reads_cmyk8() {
    let data = [0u8, 0, 0, 0, 255, 255, 255, 0];
    let (format, frame) = read(encode_with_tiff::<colortype::CMYK8>(2, 1, &data));
    assert_eq!(format.color_space(), ColorSpace::Cmyk);
    assert_eq!(frame.sample(0, 0), [1.0, 1.0, 1.0]);
    assert_eq!(frame.sample(1, 0), [0.0, 0.0, 0.0]);
}

#[test]
fn tiff_crate_reads_our_float_output() {
    let frame = Frame::from_planes(2, 2, vec![0.5, 1.5, 2.5, 3.5], vec![-1.0; 4], vec![100.0; 4]).unwrap();
    for compression in [WriteCompression::None, WriteCompression::Lzw] {
        let options = WriteOptions::default().with_compression(compression);
        let bytes = HdrWriter::with_options(Cursor::new(Vec::new()), options)
            .unwrap()
            .write(StripSource::FloatRgb(&frame), &FakeEngine::identity(), &mut NoProgress)
            .unwrap()
            .into_inner();
        let mut decoder = Decoder::new(Cursor::new(bytes)).unwrap();
        assert_eq!(decoder.dimensions().unwrap(), (2, 2));
        let DecodingResult::F32(samples) = decoder.read_image().unwrap() else {
            panic!("expected float samples");
        };
        assert_eq!(&samples[9..12], &[3.5, -1.0, 100.0]);
    }
}

#[test]
fn tiff_crate_reads_our_rgb16_output() {
    let frame = Frame::filled(3, 1, [1.0, 2000.5, 65535.0]).unwrap();
    let options = WriteOptions::default().with_compression(WriteCompression::None);
    let bytes = HdrWriter::with_options(Cursor::new(Vec::new()), options)
        .unwrap()
        .write(StripSource::Rgb16Planes(&frame), &FakeEngine::identity(), &mut NoProgress)
        .unwrap()
        .into_inner();
    let mut decoder = Decoder::new(Cursor::new(bytes)).unwrap();
    let DecodingResult::U16(samples) = decoder.read_image().unwrap() else {
        panic!("expected 16-bit samples");
    };
    assert_eq!(samples, vec![1, 2000, 65535, 1, 2000, 65535, 1, 2000, 65535]);
}
