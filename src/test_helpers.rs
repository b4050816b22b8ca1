//! Shared test utilities for the wallpost test suite.
//!
//! Builds synthetic uploads in memory so tests never depend on fixture files:
//! plain JPEG/PNG encodes, high-entropy PNGs that resist compression, and
//! files carrying an EXIF block assembled by [`ExifBuilder`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tiff = ExifBuilder::new(false)
//!     .ascii(0x010F, "Canon")
//!     .ascii(0x0110, "Canon EOS R5")
//!     .short(0x8827, 400)
//!     .build();
//! let upload = jpeg_with_exif(64, 48, &tiff);
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

// =========================================================================
// Plain images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

fn encode_png(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Baseline JPEG with a smooth gradient.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 90)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// PNG with a smooth gradient.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_png(&gradient(width, height))
}

/// PNG filled with pseudo-random pixels.
///
/// Noise defeats both PNG and JPEG compression, so encoded sizes stay
/// roughly proportional to pixel count.
pub fn noise_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut state: u32 = 0x2545_F491;
    let img = RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        };
        image::Rgb([next(), next(), next()])
    });
    encode_png(&img)
}

// =========================================================================
// Images with an embedded EXIF block
// =========================================================================

/// JPEG with `tiff` stored in an APP1 `Exif` segment right after SOI.
pub fn jpeg_with_exif(width: u32, height: u32, tiff: &[u8]) -> Vec<u8> {
    let plain = jpeg_bytes(width, height);
    let seg_len = u16::try_from(2 + 6 + tiff.len()).expect("EXIF block too large for APP1");

    let mut out = Vec::with_capacity(plain.len() + tiff.len() + 10);
    out.extend_from_slice(&plain[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&seg_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&plain[2..]);
    out
}

/// PNG with `tiff` stored in an `eXIf` chunk right after IHDR.
pub fn png_with_exif(width: u32, height: u32, tiff: &[u8]) -> Vec<u8> {
    // 8-byte signature + IHDR (4 len + 4 type + 13 data + 4 CRC)
    const AFTER_IHDR: usize = 33;
    let plain = png_bytes(width, height);

    let mut chunk = Vec::with_capacity(tiff.len() + 12);
    chunk.extend_from_slice(&(tiff.len() as u32).to_be_bytes());
    chunk.extend_from_slice(b"eXIf");
    chunk.extend_from_slice(tiff);
    let crc = crc32fast::hash(&chunk[4..]);
    chunk.extend_from_slice(&crc.to_be_bytes());

    let mut out = plain[..AFTER_IHDR].to_vec();
    out.extend(chunk);
    out.extend_from_slice(&plain[AFTER_IHDR..]);
    out
}

// =========================================================================
// EXIF blobs
// =========================================================================

const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;
const TAG_EXIF_IFD: u16 = 0x8769;

struct Entry {
    tag: u16,
    kind: u16,
    count: u32,
    data: Vec<u8>,
}

/// Assembles a TIFF-structured EXIF blob.
///
/// Make (0x010F) and Model (0x0110) go to IFD0; every other tag goes to the
/// Exif sub-IFD, linked from IFD0 when non-empty. Layout:
///
/// ```text
/// header | IFD0 entries | IFD0 values | Exif IFD entries | Exif IFD values
/// ```
pub struct ExifBuilder {
    big_endian: bool,
    ifd0: Vec<Entry>,
    exif: Vec<Entry>,
}

impl ExifBuilder {
    pub fn new(big_endian: bool) -> Self {
        Self {
            big_endian,
            ifd0: Vec::new(),
            exif: Vec::new(),
        }
    }

    fn u16_bytes(&self, v: u16) -> [u8; 2] {
        if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    }

    fn u32_bytes(&self, v: u32) -> [u8; 4] {
        if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    }

    fn push(mut self, entry: Entry) -> Self {
        if matches!(entry.tag, 0x010F | 0x0110) {
            self.ifd0.push(entry);
        } else {
            self.exif.push(entry);
        }
        self
    }

    pub fn ascii(self, tag: u16, value: &str) -> Self {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        let count = data.len() as u32;
        self.push(Entry {
            tag,
            kind: TYPE_ASCII,
            count,
            data,
        })
    }

    pub fn short(self, tag: u16, value: u16) -> Self {
        let data = self.u16_bytes(value).to_vec();
        self.push(Entry {
            tag,
            kind: TYPE_SHORT,
            count: 1,
            data,
        })
    }

    pub fn long(self, tag: u16, value: u32) -> Self {
        let data = self.u32_bytes(value).to_vec();
        self.push(Entry {
            tag,
            kind: TYPE_LONG,
            count: 1,
            data,
        })
    }

    pub fn rational(self, tag: u16, num: u32, den: u32) -> Self {
        let mut data = self.u32_bytes(num).to_vec();
        data.extend_from_slice(&self.u32_bytes(den));
        self.push(Entry {
            tag,
            kind: TYPE_RATIONAL,
            count: 1,
            data,
        })
    }

    pub fn build(mut self) -> Vec<u8> {
        self.ifd0.sort_by_key(|e| e.tag);
        self.exif.sort_by_key(|e| e.tag);

        let mut out = Vec::new();
        out.extend_from_slice(if self.big_endian { b"MM\0*" } else { b"II*\0" });
        out.extend_from_slice(&self.u32_bytes(8));

        let link_exif = !self.exif.is_empty();
        let ifd0_count = self.ifd0.len() + usize::from(link_exif);
        let ifd0_values_len: usize = self.ifd0.iter().map(external_len).sum();
        let exif_offset = 8 + ifd_len(ifd0_count) + ifd0_values_len;

        let pointer = link_exif.then(|| Entry {
            tag: TAG_EXIF_IFD,
            kind: TYPE_LONG,
            count: 1,
            data: self.u32_bytes(exif_offset as u32).to_vec(),
        });

        let mut ifd0: Vec<&Entry> = self.ifd0.iter().collect();
        ifd0.extend(pointer.as_ref());
        self.write_ifd(&mut out, &ifd0);

        if link_exif {
            debug_assert_eq!(out.len(), exif_offset);
            let exif: Vec<&Entry> = self.exif.iter().collect();
            self.write_ifd(&mut out, &exif);
        }
        out
    }

    /// Write one IFD (count, entries, next-IFD = 0) followed by its values.
    fn write_ifd(&self, out: &mut Vec<u8>, entries: &[&Entry]) {
        let mut value_offset = out.len() + ifd_len(entries.len());
        let mut values = Vec::new();

        out.extend_from_slice(&self.u16_bytes(entries.len() as u16));
        for entry in entries {
            out.extend_from_slice(&self.u16_bytes(entry.tag));
            out.extend_from_slice(&self.u16_bytes(entry.kind));
            out.extend_from_slice(&self.u32_bytes(entry.count));
            if entry.data.len() <= 4 {
                let mut slot = entry.data.clone();
                slot.resize(4, 0);
                out.extend_from_slice(&slot);
            } else {
                out.extend_from_slice(&self.u32_bytes(value_offset as u32));
                values.extend_from_slice(&entry.data);
                if entry.data.len() % 2 == 1 {
                    values.push(0);
                }
                value_offset += external_len(entry);
            }
        }
        out.extend_from_slice(&self.u32_bytes(0));
        out.extend(values);
    }
}

fn ifd_len(entries: usize) -> usize {
    2 + 12 * entries + 4
}

/// Bytes an entry occupies outside its IFD, padded to a word boundary.
fn external_len(entry: &Entry) -> usize {
    if entry.data.len() <= 4 {
        0
    } else {
        entry.data.len() + entry.data.len() % 2
    }
}
