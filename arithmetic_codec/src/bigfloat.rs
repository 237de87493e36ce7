//! A fixed-precision binary fraction used to carry the arithmetic coder's
//! narrowing interval. Values are always in `[0, 1)` here: `value =
//! mantissa / 2^precision`. Every operation rounds its exact result back
//! to `precision` bits, matching the role `math/big.Float` plays in the
//! source implementation without depending on its gob wire format.
//!
//! Serialization is the canonical format fixed in `DESIGN.md`: unsigned
//! varint precision, signed varint exponent (always `-precision` here),
//! length-prefixed two's-complement mantissa, big-endian.

use codec_core::CodecError;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};

#[derive(Debug, Clone)]
pub struct BigFloat {
    precision: u32,
    mantissa: BigInt,
}

fn round_div_nonneg(num: &BigInt, den: &BigInt) -> BigInt {
    let (q, r) = num.div_rem(den);
    if &r * BigInt::from(2) >= *den {
        q + BigInt::one()
    } else {
        q
    }
}

impl BigFloat {
    pub fn zero(precision: u32) -> Self {
        BigFloat {
            precision,
            mantissa: BigInt::zero(),
        }
    }

    pub fn one(precision: u32) -> Self {
        BigFloat {
            precision,
            mantissa: BigInt::one() << precision,
        }
    }

    pub fn from_ratio(num: u64, den: u64, precision: u32) -> Self {
        let scaled = BigInt::from(num) << precision;
        BigFloat {
            precision,
            mantissa: round_div_nonneg(&scaled, &BigInt::from(den)),
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        debug_assert_eq!(self.precision, other.precision);
        BigFloat {
            precision: self.precision,
            mantissa: &self.mantissa + &other.mantissa,
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        debug_assert_eq!(self.precision, other.precision);
        BigFloat {
            precision: self.precision,
            mantissa: &self.mantissa - &other.mantissa,
        }
    }

    pub fn mul(&self, other: &Self) -> Self {
        debug_assert_eq!(self.precision, other.precision);
        let raw = &self.mantissa * &other.mantissa;
        let scale = BigInt::one() << self.precision;
        BigFloat {
            precision: self.precision,
            mantissa: round_div_nonneg(&raw, &scale),
        }
    }

    pub fn div(&self, other: &Self) -> Self {
        debug_assert_eq!(self.precision, other.precision);
        let numerator = &self.mantissa << self.precision;
        BigFloat {
            precision: self.precision,
            mantissa: round_div_nonneg(&numerator, &other.mantissa),
        }
    }

    pub fn halved(&self) -> Self {
        BigFloat {
            precision: self.precision,
            mantissa: round_div_nonneg(&self.mantissa, &BigInt::from(2)),
        }
    }

    pub fn ge(&self, other: &Self) -> bool {
        self.mantissa >= other.mantissa
    }

    pub fn lt(&self, other: &Self) -> bool {
        self.mantissa < other.mantissa
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_uvarint(&mut out, self.precision as u64);
        write_ivarint(&mut out, -(self.precision as i64));
        let mantissa_bytes = self.mantissa.to_signed_bytes_be();
        write_uvarint(&mut out, mantissa_bytes.len() as u64);
        out.extend(mantissa_bytes);
        out
    }

    /// Returns the decoded value and the number of bytes consumed from
    /// `buf`.
    pub fn deserialize(buf: &[u8]) -> Result<(Self, usize), CodecError> {
        let mut pos = 0usize;
        let precision = read_uvarint(buf, &mut pos)? as u32;
        let exponent = read_ivarint(buf, &mut pos)?;
        if exponent != -(precision as i64) {
            return Err(CodecError::InvalidData(
                "big-float exponent does not match its precision".to_string(),
            ));
        }
        let mantissa_len = read_uvarint(buf, &mut pos)? as usize;
        if pos + mantissa_len > buf.len() {
            return Err(CodecError::InvalidData(
                "truncated big-float mantissa".to_string(),
            ));
        }
        let mantissa = BigInt::from_signed_bytes_be(&buf[pos..pos + mantissa_len]);
        pos += mantissa_len;
        Ok((BigFloat { precision, mantissa }, pos))
    }
}

fn write_uvarint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

fn read_uvarint(buf: &[u8], pos: &mut usize) -> Result<u64, CodecError> {
    let mut result: u64 = 0;
    let mut shift = 0u32;
    loop {
        let byte = *buf.get(*pos).ok_or_else(|| {
            CodecError::InvalidData("truncated varint in big-float header".to_string())
        })?;
        *pos += 1;
        result |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
        if shift >= 64 {
            return Err(CodecError::InvalidData("varint too long".to_string()));
        }
    }
}

fn write_ivarint(out: &mut Vec<u8>, value: i64) {
    let zigzag = ((value << 1) ^ (value >> 63)) as u64;
    write_uvarint(out, zigzag);
}

fn read_ivarint(buf: &[u8], pos: &mut usize) -> Result<i64, CodecError> {
    let zigzag = read_uvarint(buf, pos)?;
    Ok(((zigzag >> 1) as i64) ^ -((zigzag & 1) as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_serialization() {
        let value = BigFloat::from_ratio(1, 3, 32);
        let bytes = value.serialize();
        let (decoded, consumed) = BigFloat::deserialize(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(value.mantissa, decoded.mantissa);
        assert_eq!(value.precision, decoded.precision);
    }

    #[test]
    fn half_of_zero_to_one_is_midpoint() {
        let zero = BigFloat::zero(16);
        let one = BigFloat::one(16);
        let mid = zero.add(&one).halved();
        assert!(mid.ge(&zero));
        assert!(mid.lt(&one));
    }

    #[test]
    fn rejects_mismatched_exponent() {
        let mut bytes = BigFloat::from_ratio(1, 2, 16).serialize();
        // Corrupt the exponent's low byte (position 1, right after the
        // single-byte precision varint).
        bytes[1] ^= 0x02;
        assert!(BigFloat::deserialize(&bytes).is_err());
    }
}
