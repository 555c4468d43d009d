//! Minimal Exif, JPEG and HEIF byte streams for tests.

use std::fs;
use std::path::Path;

const ASCII: u16 = 2;
const SHORT: u16 = 3;
const LONG: u16 = 4;

const TAG_ORIENTATION: u16 = 0x0112;
const TAG_EXIF_IFD_POINTER: u16 = 0x8769;
const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
const TAG_OFFSET_TIME_ORIGINAL: u16 = 0x9011;

struct Entry {
    tag: u16,
    kind: u16,
    count: u32,
    data: Vec<u8>,
}

impl Entry {
    fn ascii(tag: u16, value: &str) -> Self {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        Self {
            tag,
            kind: ASCII,
            count: data.len() as u32,
            data,
        }
    }

    fn short(tag: u16, value: u16) -> Self {
        Self {
            tag,
            kind: SHORT,
            count: 1,
            data: value.to_le_bytes().to_vec(),
        }
    }

    fn long(tag: u16, value: u32) -> Self {
        Self {
            tag,
            kind: LONG,
            count: 1,
            data: value.to_le_bytes().to_vec(),
        }
    }
}

fn padded(len: usize) -> usize {
    (len + 1) & !1
}

fn ifd_len(entries: &[Entry]) -> usize {
    let out_of_line: usize = entries
        .iter()
        .filter(|e| e.data.len() > 4)
        .map(|e| padded(e.data.len()))
        .sum();
    2 + 12 * entries.len() + 4 + out_of_line
}

fn write_ifd(out: &mut Vec<u8>, entries: &[Entry]) {
    let data_start = out.len() + 2 + 12 * entries.len() + 4;
    let mut data = Vec::new();

    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for entry in entries {
        out.extend_from_slice(&entry.tag.to_le_bytes());
        out.extend_from_slice(&entry.kind.to_le_bytes());
        out.extend_from_slice(&entry.count.to_le_bytes());
        if entry.data.len() <= 4 {
            let mut inline = entry.data.clone();
            inline.resize(4, 0);
            out.extend_from_slice(&inline);
        } else {
            let offset = (data_start + data.len()) as u32;
            out.extend_from_slice(&offset.to_le_bytes());
            data.extend_from_slice(&entry.data);
            data.resize(padded(data.len()), 0);
        }
    }
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&data);
}

/// Little-endian TIFF block. `date_time_original` uses the Exif
/// `YYYY:MM:DD hh:mm:ss` layout; `offset` looks like `+09:00`.
pub fn exif_tiff(date_time_original: Option<&str>, offset: Option<&str>) -> Vec<u8> {
    let mut exif_entries = Vec::new();
    if let Some(value) = date_time_original {
        exif_entries.push(Entry::ascii(TAG_DATE_TIME_ORIGINAL, value));
    }
    if let Some(value) = offset {
        exif_entries.push(Entry::ascii(TAG_OFFSET_TIME_ORIGINAL, value));
    }

    let mut ifd0 = vec![Entry::short(TAG_ORIENTATION, 1)];
    if !exif_entries.is_empty() {
        ifd0.push(Entry::long(TAG_EXIF_IFD_POINTER, 0));
        let exif_offset = (8 + ifd_len(&ifd0)) as u32;
        if let Some(pointer) = ifd0.last_mut() {
            pointer.data = exif_offset.to_le_bytes().to_vec();
        }
    }

    let mut out = b"II\x2a\x00".to_vec();
    out.extend_from_slice(&8u32.to_le_bytes());
    write_ifd(&mut out, &ifd0);
    if !exif_entries.is_empty() {
        write_ifd(&mut out, &exif_entries);
    }
    out
}

/// SOI, one APP1 Exif segment, EOI.
pub fn jpeg_with_exif(tiff: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let segment_len = (2 + 6 + tiff.len()) as u16;
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

pub fn write_jpeg(path: &Path, date_time_original: &str) {
    let bytes = jpeg_with_exif(&exif_tiff(Some(date_time_original), None));
    fs::write(path, bytes).expect("write jpeg fixture");
}

fn iso_box(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = ((8 + payload.len()) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
    out
}

fn full_box(kind: &[u8; 4], version: u8, payload: &[u8]) -> Vec<u8> {
    let mut body = vec![version, 0, 0, 0];
    body.extend_from_slice(payload);
    iso_box(kind, &body)
}

/// `meta` box with one item of `item_type`, stored at an absolute file offset.
fn heif_meta(item_type: &[u8; 4], offset: u32, len: u32) -> Vec<u8> {
    let mut hdlr = 0u32.to_be_bytes().to_vec();
    hdlr.extend_from_slice(b"pict");
    hdlr.extend_from_slice(&[0; 12]);
    hdlr.push(0);

    let mut infe = 1u16.to_be_bytes().to_vec();
    infe.extend_from_slice(&0u16.to_be_bytes());
    infe.extend_from_slice(item_type);
    infe.push(0);
    let mut iinf = 1u16.to_be_bytes().to_vec();
    iinf.extend_from_slice(&full_box(b"infe", 2, &infe));

    // 4-byte offsets and lengths, no base offset.
    let mut iloc = vec![0x44, 0x00];
    iloc.extend_from_slice(&1u16.to_be_bytes());
    iloc.extend_from_slice(&1u16.to_be_bytes());
    iloc.extend_from_slice(&0u16.to_be_bytes());
    iloc.extend_from_slice(&1u16.to_be_bytes());
    iloc.extend_from_slice(&offset.to_be_bytes());
    iloc.extend_from_slice(&len.to_be_bytes());

    let mut meta = full_box(b"hdlr", 0, &hdlr);
    meta.extend_from_slice(&full_box(b"iinf", 0, &iinf));
    meta.extend_from_slice(&full_box(b"iloc", 0, &iloc));
    full_box(b"meta", 0, &meta)
}

/// `ftyp`, `meta`, then an `mdat` holding `item`.
pub fn heif_with_item(item_type: &[u8; 4], item: &[u8]) -> Vec<u8> {
    let mut ftyp = b"heic".to_vec();
    ftyp.extend_from_slice(&0u32.to_be_bytes());
    ftyp.extend_from_slice(b"mif1heic");
    let mut out = iso_box(b"ftyp", &ftyp);

    let len = item.len() as u32;
    let meta_len = heif_meta(item_type, 0, len).len();
    let offset = (out.len() + meta_len + 8) as u32;
    out.extend_from_slice(&heif_meta(item_type, offset, len));
    out.extend_from_slice(&iso_box(b"mdat", item));
    out
}

/// HEIF file whose Exif item wraps `tiff` behind the usual `Exif\0\0` prefix.
pub fn heif_with_exif(tiff: &[u8]) -> Vec<u8> {
    let mut item = 6u32.to_be_bytes().to_vec();
    item.extend_from_slice(b"Exif\0\0");
    item.extend_from_slice(tiff);
    heif_with_item(b"Exif", &item)
}
