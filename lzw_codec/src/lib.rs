//! LZW dictionary coding over UTF-8 code points, seeded with the 256
//! single-byte code points plus a fixed 66-letter Cyrillic alphabet.
//!
//! Bit widths grow symmetrically on both sides using the `>=` rule noted
//! in `DESIGN.md` (the source's encoder/decoder disagreed on `>` vs
//! `>=`, a known LZW edge case; this implementation picks one and
//! applies it to both).

use bitio::{BitReader, BitWriter};
use codec_core::CodecError;
use serde::Serialize;
use std::collections::HashMap;

const CYRILLIC_ALPHABET: &str =
    "АБВГДЕЁЖЗИЙКЛМНОПРСТУФХЦЧШЩЪЫЬЭЮЯабвгдеёжзийклмнопрстуфхцчшщъыьэюя";
const INITIAL_SIZE_BIT: u32 = 9;

#[derive(Debug, Clone, Serialize)]
pub struct LzwDictionaryItem {
    pub value: String,
    pub number: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LzwDetails {
    pub dictionary: Vec<LzwDictionaryItem>,
    pub compression_ratio: f32,
    pub size: usize,
}

/// Seeds `forward`/`order` in one pass: `order[code]` is the string
/// assigned to `code`, kept in sync with `forward`'s code values since
/// codes are always handed out sequentially.
fn seed_entries() -> Vec<String> {
    let mut order = Vec::with_capacity(256 + CYRILLIC_ALPHABET.chars().count());
    for i in 0u32..256 {
        order.push(char::from_u32(i).expect("0..256 are valid code points").to_string());
    }
    for ch in CYRILLIC_ALPHABET.chars() {
        order.push(ch.to_string());
    }
    order
}

fn dictionary_list(order: &[String]) -> Vec<LzwDictionaryItem> {
    order
        .iter()
        .enumerate()
        .map(|(number, value)| LzwDictionaryItem {
            value: value.clone(),
            number: number as u32,
        })
        .collect()
}

fn emit_code(writer: &mut BitWriter, size_bit: u32, code: u32) {
    for i in (0..size_bit).rev() {
        writer.write_bit(((code >> i) & 1) as u8);
    }
}

struct Compressed {
    frame: Vec<u8>,
    dictionary: Vec<String>,
}

fn compress_data(data: &[u8]) -> Result<Compressed, CodecError> {
    let text = std::str::from_utf8(data)
        .map_err(|e| CodecError::InvalidData(format!("input is not valid UTF-8: {e}")))?;

    let order = seed_entries();
    let mut forward: HashMap<String, u32> = order
        .iter()
        .enumerate()
        .map(|(i, s)| (s.clone(), i as u32))
        .collect();
    let mut order = order;

    let mut size_bit = INITIAL_SIZE_BIT;
    let mut writer = BitWriter::new();
    let mut w = String::new();

    for ch in text.chars() {
        let mut candidate = w.clone();
        candidate.push(ch);
        if forward.contains_key(&candidate) {
            w = candidate;
        } else {
            let code = *forward.get(&w).ok_or_else(|| {
                CodecError::InvalidData(format!(
                    "code point {ch:?} has no seed entry and no preceding context to extend"
                ))
            })?;
            emit_code(&mut writer, size_bit, code);
            let next_code = order.len() as u32;
            forward.insert(candidate.clone(), next_code);
            order.push(candidate);
            if order.len() as u32 >= (1u32 << size_bit) {
                size_bit += 1;
            }
            w = ch.to_string();
        }
    }
    let final_code = *forward
        .get(&w)
        .ok_or_else(|| CodecError::InvalidData("final LZW string has no dictionary entry".to_string()))?;
    emit_code(&mut writer, size_bit, final_code);

    Ok(Compressed {
        frame: writer.into_bytes(),
        dictionary: order,
    })
}

pub fn compress(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    Ok(compress_data(data)?.frame)
}

pub fn compress_with_details(data: &[u8]) -> Result<(Vec<u8>, LzwDetails), CodecError> {
    let compressed = compress_data(data)?;
    let details = LzwDetails {
        dictionary: dictionary_list(&compressed.dictionary),
        compression_ratio: codec_core::ratio(data.len(), compressed.frame.len()),
        size: compressed.frame.len(),
    };
    Ok((compressed.frame, details))
}

struct CodeReader<'a> {
    reader: BitReader<'a>,
    total_bits: u64,
    bits_read: u64,
}

impl<'a> CodeReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        CodeReader {
            reader: BitReader::new(buf),
            total_bits: buf.len() as u64 * 8,
            bits_read: 0,
        }
    }

    /// Reads one `size_bit`-wide big-endian code, or `None` once fewer
    /// than `size_bit` bits remain (treated as end-of-stream padding).
    fn read_code(&mut self, size_bit: u32) -> Option<u32> {
        if self.total_bits - self.bits_read < size_bit as u64 {
            return None;
        }
        let mut code = 0u32;
        for _ in 0..size_bit {
            code = (code << 1) | self.reader.read_bit() as u32;
        }
        self.bits_read += size_bit as u64;
        Some(code)
    }
}

struct Decompressed {
    data: Vec<u8>,
    dictionary: Vec<String>,
}

fn decompress_data(compressed: &[u8]) -> Result<Decompressed, CodecError> {
    let mut dict = seed_entries();
    let mut size_bit = INITIAL_SIZE_BIT;
    let mut codes = CodeReader::new(compressed);

    let prev_code = codes
        .read_code(size_bit)
        .ok_or_else(|| CodecError::InvalidData("empty LZW stream".to_string()))?;
    let first = dict
        .get(prev_code as usize)
        .ok_or_else(|| CodecError::InvalidData("unknown initial LZW code".to_string()))?
        .clone();
    let mut c = first.chars().next().expect("seed entries are never empty");
    let mut out = String::new();
    out.push_str(&first);
    let mut prev_code = prev_code;

    while let Some(code) = codes.read_code(size_bit) {
        let s = if (code as usize) < dict.len() {
            dict[code as usize].clone()
        } else if code as usize == dict.len() {
            format!("{}{}", dict[prev_code as usize], c)
        } else {
            return Err(CodecError::InvalidData(format!(
                "LZW code {code} is neither known nor the next insertable code"
            )));
        };

        out.push_str(&s);
        c = s.chars().next().expect("decoded string is never empty");
        let inserted = format!("{}{}", dict[prev_code as usize], c);
        dict.push(inserted);
        if dict.len() as u32 >= (1u32 << size_bit) {
            size_bit += 1;
        }
        prev_code = code;
    }

    Ok(Decompressed {
        data: out.into_bytes(),
        dictionary: dict,
    })
}

pub fn decompress(compressed: &[u8]) -> Result<Vec<u8>, CodecError> {
    Ok(decompress_data(compressed)?.data)
}

pub fn decompress_with_details(compressed: &[u8]) -> Result<(Vec<u8>, LzwDetails), CodecError> {
    let decompressed = decompress_data(compressed)?;
    let details = LzwDetails {
        dictionary: dictionary_list(&decompressed.dictionary),
        compression_ratio: codec_core::ratio(compressed.len(), decompressed.data.len()),
        size: decompressed.data.len(),
    };
    Ok((decompressed.data, details))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_classic_example() {
        let text = "TOBEORNOTTOBEORTOBEORNOT";
        let compressed = compress(text.as_bytes()).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, text.as_bytes());
    }

    #[test]
    fn classic_example_dictionary_contains_expected_substrings() {
        let text = "TOBEORNOTTOBEORTOBEORNOT";
        let (_, details) = compress_with_details(text.as_bytes()).unwrap();
        let values: Vec<&str> = details.dictionary.iter().map(|d| d.value.as_str()).collect();
        for expected in ["TO", "BE", "OR", "NOT", "TOB"] {
            assert!(values.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn round_trips_seeded_cyrillic_alphabet_with_no_growth() {
        let compressed = compress(CYRILLIC_ALPHABET.as_bytes()).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, CYRILLIC_ALPHABET.as_bytes());
    }

    #[test]
    fn round_trips_input_requiring_wider_codes() {
        let text: String = (0..2000).map(|i| ((i % 26) as u8 + b'a') as char).collect();
        let compressed = compress(text.as_bytes()).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, text.as_bytes());
    }

    #[test]
    fn dictionary_size_never_exceeds_distinct_prefixes_seen() {
        let text = "ababababab";
        let (_, details) = compress_with_details(text.as_bytes()).unwrap();
        assert!(details.dictionary.len() <= 256 + 66 + text.len());
    }

    #[test]
    fn rejects_unknown_code() {
        // A single 9-bit code with all bits set (511) has no seed entry
        // and is not the next-insertable code (322).
        let mut writer = BitWriter::new();
        emit_code(&mut writer, 9, 511);
        let frame = writer.into_bytes();
        assert!(decompress(&frame).is_err());
    }
}
