use crate::classifier::lower_case_extension;
use crate::error::ExtractError;
use crate::metadata::resolve_local;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use exif::{Exif, In, Reader, Tag, Value};
use log::debug;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Extensions whose Exif block sits inside an ISO-BMFF container.
const CONTAINER_EXTENSIONS: &[&str] = &["heic", "heif"];

/// Date tags in priority order, each with its sub-second and offset companions.
const TIMESTAMP_TAGS: &[(Tag, Tag, Tag)] = &[
    (
        Tag::DateTimeOriginal,
        Tag::SubSecTimeOriginal,
        Tag::OffsetTimeOriginal,
    ),
    (
        Tag::DateTimeDigitized,
        Tag::SubSecTimeDigitized,
        Tag::OffsetTimeDigitized,
    ),
    (Tag::DateTime, Tag::SubSecTime, Tag::OffsetTime),
];

pub fn extract_taken_time(path: &Path) -> Result<DateTime<FixedOffset>, ExtractError> {
    let bytes = fs::read(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_container = lower_case_extension(path)
        .map(|ext| CONTAINER_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);
    let block = if is_container {
        unwrap_container(path, bytes)?
    } else {
        bytes
    };

    let exif = decode_metadata(path, block)?;
    taken_time(path, &exif).ok_or_else(|| ExtractError::MissingTimestamp {
        path: path.to_path_buf(),
    })
}

fn unwrap_container(path: &Path, bytes: Vec<u8>) -> Result<Vec<u8>, ExtractError> {
    Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .map(|exif| exif.buf().to_vec())
        .map_err(|err| ExtractError::UnsupportedContainer {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
}

fn decode_metadata(path: &Path, bytes: Vec<u8>) -> Result<Exif, ExtractError> {
    let reader = Reader::new();
    let decoded = if is_tiff_header(&bytes) {
        reader.read_raw(bytes)
    } else {
        reader.read_from_container(&mut Cursor::new(bytes))
    };
    decoded.map_err(|err| ExtractError::MetadataDecode {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

fn is_tiff_header(bytes: &[u8]) -> bool {
    bytes.starts_with(b"II\x2a\x00") || bytes.starts_with(b"MM\x00\x2a")
}

/// A malformed sub-second or offset companion is logged and dropped; the
/// date itself is still used.
fn taken_time(path: &Path, exif: &Exif) -> Option<DateTime<FixedOffset>> {
    TIMESTAMP_TAGS
        .iter()
        .find_map(|&(date_tag, subsec_tag, offset_tag)| {
            let raw = ascii_field(exif, date_tag)?;
            let mut value = exif::DateTime::from_ascii(raw).ok()?;
            if let Some(subsec) = ascii_field(exif, subsec_tag) {
                if let Err(err) = value.parse_subsec(subsec) {
                    debug!("{}: ignoring malformed {}: {}", path.display(), subsec_tag, err);
                    value.nanosecond = None;
                }
            }
            if let Some(offset) = ascii_field(exif, offset_tag) {
                if let Err(err) = value.parse_offset(offset) {
                    debug!("{}: ignoring malformed {}: {}", path.display(), offset_tag, err);
                    value.offset = None;
                }
            }
            to_chrono(&value)
        })
}

fn ascii_field(exif: &Exif, tag: Tag) -> Option<&[u8]> {
    match exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(ref parts) => parts.first().map(Vec::as_slice),
        _ => None,
    }
}

fn to_chrono(value: &exif::DateTime) -> Option<DateTime<FixedOffset>> {
    let date = NaiveDate::from_ymd_opt(
        i32::from(value.year),
        u32::from(value.month),
        u32::from(value.day),
    )?;
    let time = NaiveTime::from_hms_nano_opt(
        u32::from(value.hour),
        u32::from(value.minute),
        u32::from(value.second),
        value.nanosecond.unwrap_or(0),
    )?;
    let naive = date.and_time(time);

    match value.offset {
        Some(minutes) => FixedOffset::east_opt(i32::from(minutes) * 60)?
            .from_local_datetime(&naive)
            .single(),
        None => Some(resolve_local(naive)),
    }
}
