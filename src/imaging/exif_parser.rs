//! Minimal EXIF reader for JPEG, PNG and TIFF uploads.
//!
//! Extracts six capture fields as raw text:
//! - Make (0x010F) and Model (0x0110) from IFD0
//! - ExposureTime (0x829A), FNumber (0x829D), ISO (0x8827) and
//!   FocalLength (0x920A) from the Exif sub-IFD (pointer tag 0x8769)
//!
//! Locating the TIFF structure:
//! - JPEG: APP1 marker whose payload starts with `Exif\0\0`.
//! - PNG: the `eXIf` chunk.
//! - TIFF: the file itself.
//!
//! Values are kept as text (`RATIONAL` becomes `"n/d"`) so that the caption
//! layer decides how to parse and render them. Every read is bounds-checked;
//! a malformed value is dropped without affecting its neighbours.

use crate::metadata::MetadataFieldSet;

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

const TAG_MAKE: u16 = 0x010F;
const TAG_MODEL: u16 = 0x0110;
const TAG_EXIF_IFD: u16 = 0x8769;
const TAG_EXPOSURE_TIME: u16 = 0x829A;
const TAG_F_NUMBER: u16 = 0x829D;
const TAG_ISO: u16 = 0x8827;
const TAG_FOCAL_LENGTH: u16 = 0x920A;

/// Read the capture fields from a whole image file.
///
/// Returns `None` when the file has no EXIF block or the block is corrupt.
pub fn read_exif(file: &[u8]) -> Option<MetadataFieldSet> {
    locate_exif(file).and_then(read_fields)
}

/// Find the EXIF byte region inside an image file.
///
/// The returned slice starts at the TIFF header (`II*\0` or `MM\0*`).
pub fn locate_exif(data: &[u8]) -> Option<&[u8]> {
    if data.starts_with(&[0xFF, 0xD8]) {
        find_jpeg_app1_exif(data)
    } else if data.starts_with(PNG_SIGNATURE) {
        find_png_exif_chunk(data)
    } else if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
        Some(data)
    } else {
        data.strip_prefix(EXIF_HEADER)
    }
}

// ---------------------------------------------------------------------------
// Container scanning
// ---------------------------------------------------------------------------

/// Walk JPEG markers up to SOS looking for an `Exif` APP1 segment.
fn find_jpeg_app1_exif(data: &[u8]) -> Option<&[u8]> {
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];
        // SOS or EOI: entropy-coded data follows, stop scanning
        if marker == 0xDA || marker == 0xD9 {
            break;
        }
        // Fill bytes and markers without a length field
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }

        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if seg_len < 2 {
            break;
        }
        let seg_start = pos + 4;
        let seg_end = (pos + 2 + seg_len).min(data.len());

        if marker == 0xE1 {
            if let Some(tiff) = data[seg_start..seg_end].strip_prefix(EXIF_HEADER) {
                return Some(tiff);
            }
        }
        pos += 2 + seg_len;
    }
    None
}

/// Walk PNG chunks looking for `eXIf`.
fn find_png_exif_chunk(data: &[u8]) -> Option<&[u8]> {
    let mut pos = PNG_SIGNATURE.len();
    while pos + 8 <= data.len() {
        let len = u32::from_be_bytes(data[pos..pos + 4].try_into().ok()?) as usize;
        let kind = &data[pos + 4..pos + 8];
        let body_start = pos + 8;
        let body_end = body_start.checked_add(len)?;
        if body_end > data.len() {
            return None;
        }
        match kind {
            b"eXIf" => return Some(&data[body_start..body_end]),
            // eXIf must precede IDAT; nothing useful after it
            b"IDAT" | b"IEND" => return None,
            _ => {}
        }
        pos = body_end + 4; // skip CRC
    }
    None
}

// ---------------------------------------------------------------------------
// TIFF / IFD parsing
// ---------------------------------------------------------------------------

/// Byte-order-aware, bounds-checked view over a TIFF structure.
struct Tiff<'a> {
    data: &'a [u8],
    big_endian: bool,
}

impl<'a> Tiff<'a> {
    fn new(data: &'a [u8]) -> Option<Self> {
        let big_endian = match data.get(0..2)? {
            b"MM" => true,
            b"II" => false,
            _ => return None,
        };
        let tiff = Self { data, big_endian };
        // Verify TIFF magic (42)
        (tiff.u16(2)? == 42).then_some(tiff)
    }

    fn bytes(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        self.data.get(offset..offset.checked_add(len)?)
    }

    fn u16(&self, offset: usize) -> Option<u16> {
        let b: [u8; 2] = self.bytes(offset, 2)?.try_into().ok()?;
        Some(if self.big_endian {
            u16::from_be_bytes(b)
        } else {
            u16::from_le_bytes(b)
        })
    }

    fn u32(&self, offset: usize) -> Option<u32> {
        let b: [u8; 4] = self.bytes(offset, 4)?.try_into().ok()?;
        Some(if self.big_endian {
            u32::from_be_bytes(b)
        } else {
            u32::from_le_bytes(b)
        })
    }

    /// Iterate the 12-byte entries of the IFD at `offset`.
    fn entries(&self, offset: usize) -> Option<impl Iterator<Item = Entry> + '_> {
        let count = self.u16(offset)? as usize;
        let start = offset + 2;
        Some((0..count).map_while(move |i| self.entry(start + i * 12)))
    }

    fn entry(&self, offset: usize) -> Option<Entry> {
        Some(Entry {
            tag: self.u16(offset)?,
            typ: self.u16(offset + 2)?,
            count: self.u32(offset + 4)? as usize,
            value_field: offset + 8,
        })
    }

    /// Raw bytes of an entry's value, inline or at its offset.
    fn value_bytes(&self, entry: &Entry) -> Option<&'a [u8]> {
        let len = entry.count.checked_mul(type_size(entry.typ))?;
        if len <= 4 {
            self.bytes(entry.value_field, len)
        } else {
            let offset = self.u32(entry.value_field)? as usize;
            self.bytes(offset, len)
        }
    }

    /// Render an entry's first value as text.
    fn value_text(&self, entry: &Entry) -> Option<String> {
        if entry.count == 0 {
            return None;
        }
        let raw = self.value_bytes(entry)?;
        match entry.typ {
            // ASCII: NUL-terminated
            2 => {
                let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
                let text = String::from_utf8_lossy(&raw[..end]).trim().to_string();
                (!text.is_empty()).then_some(text)
            }
            3 => Some(self.u16_in(raw, 0)?.to_string()),
            4 => Some(self.u32_in(raw, 0)?.to_string()),
            5 => Some(format!("{}/{}", self.u32_in(raw, 0)?, self.u32_in(raw, 4)?)),
            10 => Some(format!(
                "{}/{}",
                self.u32_in(raw, 0)? as i32,
                self.u32_in(raw, 4)? as i32
            )),
            _ => None,
        }
    }

    fn u16_in(&self, raw: &[u8], at: usize) -> Option<u16> {
        let b: [u8; 2] = raw.get(at..at + 2)?.try_into().ok()?;
        Some(if self.big_endian {
            u16::from_be_bytes(b)
        } else {
            u16::from_le_bytes(b)
        })
    }

    fn u32_in(&self, raw: &[u8], at: usize) -> Option<u32> {
        let b: [u8; 4] = raw.get(at..at + 4)?.try_into().ok()?;
        Some(if self.big_endian {
            u32::from_be_bytes(b)
        } else {
            u32::from_le_bytes(b)
        })
    }
}

/// One IFD entry; `value_field` is the absolute offset of its 4-byte value slot.
struct Entry {
    tag: u16,
    typ: u16,
    count: usize,
    value_field: usize,
}

/// TIFF type sizes: count is number of values, not bytes.
fn type_size(typ: u16) -> usize {
    match typ {
        1 | 2 | 6 | 7 => 1, // BYTE, ASCII, SBYTE, UNDEFINED
        3 | 8 => 2,         // SHORT, SSHORT
        4 | 9 | 11 => 4,    // LONG, SLONG, FLOAT
        5 | 10 | 12 => 8,   // RATIONAL, SRATIONAL, DOUBLE
        _ => 1,
    }
}

/// Parse an EXIF region (TIFF header first, optional `Exif\0\0` prefix).
///
/// Returns `None` if the header or IFD0 is unreadable. Individual bad
/// entries only drop their own field.
pub fn read_fields(region: &[u8]) -> Option<MetadataFieldSet> {
    let data = region.strip_prefix(EXIF_HEADER).unwrap_or(region);
    let tiff = Tiff::new(data)?;
    let ifd0 = tiff.u32(4)? as usize;

    let mut fields = MetadataFieldSet::default();
    let mut exif_ifd = None;

    for entry in tiff.entries(ifd0)? {
        if entry.tag == TAG_EXIF_IFD {
            exif_ifd = tiff.u32(entry.value_field).map(|o| o as usize);
        } else {
            apply(&tiff, &entry, &mut fields);
        }
    }

    // A broken sub-IFD pointer keeps whatever IFD0 provided
    if let Some(entries) = exif_ifd.filter(|&o| o != ifd0).and_then(|o| tiff.entries(o)) {
        for entry in entries {
            apply(&tiff, &entry, &mut fields);
        }
    }

    Some(fields)
}

fn apply(tiff: &Tiff<'_>, entry: &Entry, fields: &mut MetadataFieldSet) {
    let slot = match entry.tag {
        TAG_MAKE => &mut fields.make,
        TAG_MODEL => &mut fields.model,
        TAG_ISO => &mut fields.iso,
        TAG_FOCAL_LENGTH => &mut fields.focal_length,
        TAG_F_NUMBER => &mut fields.f_number,
        TAG_EXPOSURE_TIME => &mut fields.exposure_time,
        _ => return,
    };
    if slot.is_none() {
        *slot = tiff.value_text(entry);
    }
}
