//! Run-length encoding with decimal-ASCII counters: `<count><byte>` pairs,
//! no header and no footer (e.g. `"WWWWBBBWBB"` encodes to `"4W3B1W2B"`).
//!
//! A literal byte in `'0'..'9'` cannot be represented unambiguously by
//! this frame format — see the crate-level note in `DESIGN.md`. This
//! codec does not guard against such input; like the service it's
//! modeled on, it simply produces output that will not round-trip for
//! digit-valued bytes.

use codec_core::CodecError;
use serde::Serialize;

/// Introspection payload returned by [`compress_with_details`] and
/// [`decompress_with_details`].
#[derive(Debug, Clone, Serialize)]
pub struct RleDetails {
    pub compression_ratio: f32,
    pub size: usize,
}

/// Encodes `data` as `<decimal count><literal byte>` pairs over maximal
/// runs of identical bytes. Infallible on non-empty input; an empty input
/// produces empty output.
pub fn compress(data: &[u8]) -> Vec<u8> {
    if data.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(data.len());
    let mut current = data[0];
    let mut count: u64 = 1;

    let mut push_run = |out: &mut Vec<u8>, count: u64, byte: u8| {
        out.extend(count.to_string().into_bytes());
        out.push(byte);
    };

    for &b in &data[1..] {
        if b == current {
            count += 1;
        } else {
            push_run(&mut out, count, current);
            current = b;
            count = 1;
        }
    }
    push_run(&mut out, count, current);
    out
}

/// [`compress`] plus the compression-ratio/size introspection payload.
pub fn compress_with_details(data: &[u8]) -> (Vec<u8>, RleDetails) {
    let compressed = compress(data);
    let details = RleDetails {
        compression_ratio: codec_core::ratio(data.len(), compressed.len()),
        size: compressed.len(),
    };
    (compressed, details)
}

#[derive(PartialEq, Eq)]
enum State {
    GetCounter,
    GetByte,
}

/// Decodes a `<count><byte>` pair stream, per spec.md §4.B's two-state
/// machine.
pub fn decompress(compressed: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::with_capacity(compressed.len());
    let mut state = State::GetCounter;
    let mut counter_buf = String::new();

    for &b in compressed {
        let is_digit = b.is_ascii_digit();
        match state {
            State::GetCounter => {
                if is_digit {
                    counter_buf.push(b as char);
                } else {
                    let count: u64 = counter_buf.parse().map_err(|_| {
                        CodecError::InvalidData(format!("bad run counter {counter_buf:?}"))
                    })?;
                    out.extend(std::iter::repeat(b).take(count as usize));
                    counter_buf.clear();
                    state = State::GetByte;
                }
            }
            State::GetByte => {
                if is_digit {
                    state = State::GetCounter;
                    counter_buf.push(b as char);
                } else {
                    return Err(CodecError::InvalidData(
                        "literal byte with no preceding counter".to_string(),
                    ));
                }
            }
        }
    }

    if state == State::GetCounter && !counter_buf.is_empty() {
        return Err(CodecError::InvalidData(
            "trailing counter with no literal byte".to_string(),
        ));
    }

    Ok(out)
}

/// [`decompress`] plus the compression-ratio/size introspection payload,
/// computed relative to the decoded output.
pub fn decompress_with_details(
    compressed: &[u8],
) -> Result<(Vec<u8>, RleDetails), CodecError> {
    let data = decompress(compressed)?;
    let details = RleDetails {
        compression_ratio: codec_core::ratio(data.len(), compressed.len()),
        size: compressed.len(),
    };
    Ok((data, details))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_runs() {
        assert_eq!(compress(b"WWWWBBBWBB"), b"4W3B1W2B");
        assert_eq!(compress(b"BBBB"), b"4B");
    }

    #[test]
    fn decodes_runs() {
        assert_eq!(decompress(b"3B2W1B").unwrap(), b"BBBWWB");
    }

    #[test]
    fn rejects_trailing_counter() {
        assert!(decompress(b"2W3").is_err());
    }

    #[test]
    fn rejects_literal_without_counter() {
        assert!(decompress(b"2WB").is_err());
    }

    #[test]
    fn round_trips_single_byte() {
        let data = b"Q";
        let compressed = compress(data);
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn round_trips_long_run_past_255() {
        let data = vec![b'z'; 1000];
        let compressed = compress(&data);
        assert_eq!(decompress(&compressed).unwrap(), data);
        assert_eq!(compressed, b"1000z");
    }

    #[test]
    fn round_trips_arbitrary_non_digit_bytes() {
        let data: Vec<u8> = (0u16..256)
            .map(|b| b as u8)
            .filter(|b| !b.is_ascii_digit())
            .collect();
        let compressed = compress(&data);
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn details_report_size_and_ratio() {
        let (compressed, details) = compress_with_details(b"WWWWBBBWBB");
        assert_eq!(details.size, compressed.len());
        assert!(details.compression_ratio < 1.0);
    }
}
