//! Arithmetic coding over UTF-8 code points: narrows a `[0, 1)` interval
//! symbol by symbol and transmits the midpoint of the final interval as
//! a fixed-precision big-float.

mod bigfloat;

use bigfloat::BigFloat;
use codec_core::CodecError;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct FrequencyTableItem {
    pub value: String,
    pub frequency: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArithmeticDetails {
    pub frequency_table: Vec<FrequencyTableItem>,
    pub compression_ratio: f32,
    pub size: usize,
}

fn calc_precision(length: u32) -> u32 {
    let bits = (length as f64 * 10f64.log2() * 1.42).ceil();
    (bits as u32).max(8)
}

fn frequency_table(text: &str) -> BTreeMap<char, u32> {
    let mut table = BTreeMap::new();
    for ch in text.chars() {
        *table.entry(ch).or_insert(0) += 1;
    }
    table
}

struct Interval {
    value: char,
    left: BigFloat,
    right: BigFloat,
}

/// Lays out contiguous `[left, right)` intervals over the frequency
/// table's code points, sorted ascending (the free ordering `BTreeMap`
/// already gives on `char` keys).
fn probability_intervals(
    table: &BTreeMap<char, u32>,
    data_length: u32,
    precision: u32,
) -> Vec<Interval> {
    let mut intervals = Vec::with_capacity(table.len());
    let mut left = BigFloat::zero(precision);
    for (&ch, &freq) in table {
        let width = BigFloat::from_ratio(freq as u64, data_length as u64, precision);
        let right = left.add(&width);
        intervals.push(Interval {
            value: ch,
            left: left.clone(),
            right: right.clone(),
        });
        left = right;
    }
    intervals
}

fn find_interval<'a>(intervals: &'a [Interval], n: &BigFloat) -> Result<&'a Interval, CodecError> {
    if intervals.is_empty() {
        return Err(CodecError::InvalidData(
            "empty probability interval table".to_string(),
        ));
    }
    let mut left_ptr: i64 = 0;
    let mut right_ptr: i64 = intervals.len() as i64 - 1;
    while left_ptr <= right_ptr {
        let mid = (left_ptr + right_ptr) / 2;
        let candidate = &intervals[mid as usize];
        let more_than_left = n.ge(&candidate.left);
        if more_than_left && n.lt(&candidate.right) {
            return Ok(candidate);
        } else if more_than_left {
            left_ptr = mid + 1;
        } else {
            right_ptr = mid - 1;
        }
    }
    intervals
        .get(left_ptr as usize)
        .ok_or_else(|| CodecError::InvalidData("value falls in no probability interval".to_string()))
}

fn frequency_table_to_list(table: &BTreeMap<char, u32>) -> Vec<FrequencyTableItem> {
    table
        .iter()
        .map(|(&ch, &freq)| FrequencyTableItem {
            value: ch.to_string(),
            frequency: freq,
        })
        .collect()
}

fn utf8_len(lead: u8) -> Option<usize> {
    if lead & 0x80 == 0 {
        Some(1)
    } else if lead & 0xE0 == 0xC0 {
        Some(2)
    } else if lead & 0xF0 == 0xE0 {
        Some(3)
    } else if lead & 0xF8 == 0xF0 {
        Some(4)
    } else {
        None
    }
}

fn read_char(buf: &[u8], pos: &mut usize) -> Result<char, CodecError> {
    let lead = *buf
        .get(*pos)
        .ok_or_else(|| CodecError::InvalidData("truncated frequency table entry".to_string()))?;
    let len = utf8_len(lead)
        .ok_or_else(|| CodecError::InvalidData("invalid UTF-8 lead byte".to_string()))?;
    let end = *pos + len;
    let slice = buf
        .get(*pos..end)
        .ok_or_else(|| CodecError::InvalidData("truncated UTF-8 code point".to_string()))?;
    let s = std::str::from_utf8(slice)
        .map_err(|e| CodecError::InvalidData(format!("invalid UTF-8 code point: {e}")))?;
    let ch = s
        .chars()
        .next()
        .ok_or_else(|| CodecError::InvalidData("empty UTF-8 code point".to_string()))?;
    *pos = end;
    Ok(ch)
}

struct Compressed {
    frame: Vec<u8>,
    frequency_table: BTreeMap<char, u32>,
}

fn compress_data(data: &[u8]) -> Result<Compressed, CodecError> {
    let text = std::str::from_utf8(data)
        .map_err(|e| CodecError::InvalidData(format!("input is not valid UTF-8: {e}")))?;
    let data_length = text.chars().count() as u32;
    if data_length == 0 {
        return Err(CodecError::InvalidData("empty input".to_string()));
    }

    let precision = calc_precision(data_length);
    let table = frequency_table(text);
    let intervals = probability_intervals(&table, data_length, precision);
    let by_char: std::collections::HashMap<char, (&BigFloat, &BigFloat)> = intervals
        .iter()
        .map(|i| (i.value, (&i.left, &i.right)))
        .collect();

    let mut left = BigFloat::zero(precision);
    let mut right = BigFloat::one(precision);
    for ch in text.chars() {
        let (sym_left, sym_right) = by_char[&ch];
        let span = right.sub(&left);
        let new_right = left.add(&span.mul(sym_right));
        let new_left = left.add(&span.mul(sym_left));
        right = new_right;
        left = new_left;
    }
    let midpoint = left.add(&right).halved();
    let payload = midpoint.serialize();

    let mut frame = Vec::with_capacity(6 + table.len() * 6 + payload.len());
    frame.extend(data_length.to_le_bytes());
    frame.extend((table.len() as u16).to_le_bytes());
    for (&ch, &freq) in &table {
        let mut buf = [0u8; 4];
        frame.extend(ch.encode_utf8(&mut buf).as_bytes());
        frame.extend((freq as u16).to_le_bytes());
    }
    frame.extend(payload);

    Ok(Compressed {
        frame,
        frequency_table: table,
    })
}

pub fn compress(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    Ok(compress_data(data)?.frame)
}

pub fn compress_with_details(data: &[u8]) -> Result<(Vec<u8>, ArithmeticDetails), CodecError> {
    let compressed = compress_data(data)?;
    let details = ArithmeticDetails {
        frequency_table: frequency_table_to_list(&compressed.frequency_table),
        compression_ratio: codec_core::ratio(data.len(), compressed.frame.len()),
        size: compressed.frame.len(),
    };
    Ok((compressed.frame, details))
}

struct Decompressed {
    data: Vec<u8>,
    frequency_table: BTreeMap<char, u32>,
}

fn decompress_data(compressed: &[u8]) -> Result<Decompressed, CodecError> {
    if compressed.len() < 6 {
        return Err(CodecError::InvalidData(
            "truncated arithmetic frame header".to_string(),
        ));
    }
    let data_length = u32::from_le_bytes(compressed[0..4].try_into().unwrap());
    let frequency_table_size = u16::from_le_bytes(compressed[4..6].try_into().unwrap());
    if data_length == 0 {
        return Err(CodecError::InvalidData("declared data length is zero".to_string()));
    }
    if frequency_table_size == 0 {
        return Err(CodecError::InvalidData(
            "zero-size frequency table on non-empty data".to_string(),
        ));
    }

    let mut pos = 6usize;
    let mut table = BTreeMap::new();
    for _ in 0..frequency_table_size {
        let ch = read_char(compressed, &mut pos)?;
        let freq_bytes = compressed
            .get(pos..pos + 2)
            .ok_or_else(|| CodecError::InvalidData("truncated frequency value".to_string()))?;
        let freq = u16::from_le_bytes(freq_bytes.try_into().unwrap());
        pos += 2;
        table.insert(ch, freq as u32);
    }

    let precision = calc_precision(data_length);
    let intervals = probability_intervals(&table, data_length, precision);

    let (mut n, _consumed) = BigFloat::deserialize(&compressed[pos..])?;
    if n.precision() != precision {
        return Err(CodecError::InvalidData(
            "big-float precision does not match recomputed precision".to_string(),
        ));
    }

    let mut out = String::with_capacity(data_length as usize);
    for i in 0..data_length {
        let interval = find_interval(&intervals, &n)?;
        out.push(interval.value);
        if i + 1 < data_length {
            let span = interval.right.sub(&interval.left);
            n = n.sub(&interval.left).div(&span);
        }
    }

    Ok(Decompressed {
        data: out.into_bytes(),
        frequency_table: table,
    })
}

pub fn decompress(compressed: &[u8]) -> Result<Vec<u8>, CodecError> {
    Ok(decompress_data(compressed)?.data)
}

pub fn decompress_with_details(
    compressed: &[u8],
) -> Result<(Vec<u8>, ArithmeticDetails), CodecError> {
    let decompressed = decompress_data(compressed)?;
    let details = ArithmeticDetails {
        frequency_table: frequency_table_to_list(&decompressed.frequency_table),
        compression_ratio: codec_core::ratio(compressed.len(), decompressed.data.len()),
        size: decompressed.data.len(),
    };
    Ok((decompressed.data, details))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_short_text() {
        let text = "mississippi";
        let compressed = compress(text.as_bytes()).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, text.as_bytes());
    }

    #[test]
    fn round_trips_single_code_point() {
        let text = "a";
        let compressed = compress(text.as_bytes()).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, text.as_bytes());
    }

    #[test]
    fn round_trips_non_ascii_multibyte_text() {
        let text = "Какой-то очень секретный текст.";
        let compressed = compress(text.as_bytes()).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, text.as_bytes());
    }

    #[test]
    fn frequency_sum_matches_code_point_count() {
        let text = "abracadabra";
        let (_, details) = compress_with_details(text.as_bytes()).unwrap();
        let sum: u32 = details.frequency_table.iter().map(|f| f.frequency).sum();
        assert_eq!(sum, text.chars().count() as u32);
    }

    #[test]
    fn rejects_truncated_frame() {
        let compressed = compress(b"mississippi").unwrap();
        let truncated = &compressed[..compressed.len() - 3];
        assert!(decompress(truncated).is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(compress(b"").is_err());
    }
}
