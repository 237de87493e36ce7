//! Textbook RSA key generation, PKCS#1 v1.5 (block type 02) padding,
//! encryption and decryption. Explicitly didactic: no constant-time
//! guarantees are made or needed.

mod primes;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use codec_core::CodecError;
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use rand::RngCore;

const PUBLIC_EXPONENT: u32 = 65537;
const MAX_KEYGEN_RETRIES: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub n: BigUint,
    pub e: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pub n: BigUint,
    pub d: BigUint,
}

impl PublicKey {
    pub fn key_len_bytes(&self) -> usize {
        (self.n.bits() as usize).div_ceil(8)
    }
}

impl PrivateKey {
    pub fn key_len_bytes(&self) -> usize {
        (self.n.bits() as usize).div_ceil(8)
    }
}

/// Encodes `n_bytes` and `other_bytes` (E or D) as base64 of
/// `u16 BE len(n_bytes) || n_bytes || other_bytes`.
///
/// The source service base64-encodes `N || E` (or `N || D`) and splits
/// them back apart on the wire with a hardcoded 256-byte offset, which
/// only round-trips for exactly 2048-bit keys. Prefixing `N`'s length
/// keeps this working for any `bitlen`.
fn encode_key_pair(n_bytes: &[u8], other_bytes: &[u8]) -> String {
    let mut buf = Vec::with_capacity(2 + n_bytes.len() + other_bytes.len());
    buf.extend_from_slice(&(n_bytes.len() as u16).to_be_bytes());
    buf.extend_from_slice(n_bytes);
    buf.extend_from_slice(other_bytes);
    BASE64.encode(buf)
}

fn decode_key_pair(encoded: &str) -> Result<(BigUint, BigUint), CodecError> {
    let buf = BASE64
        .decode(encoded)
        .map_err(|e| CodecError::InvalidData(format!("key is not valid base64: {e}")))?;
    if buf.len() < 2 {
        return Err(CodecError::InvalidData("key is too short to contain a length prefix".to_string()));
    }
    let n_len = u16::from_be_bytes([buf[0], buf[1]]) as usize;
    if buf.len() < 2 + n_len {
        return Err(CodecError::InvalidData("key is shorter than its declared N length".to_string()));
    }
    let n = BigUint::from_bytes_be(&buf[2..2 + n_len]);
    let other = BigUint::from_bytes_be(&buf[2 + n_len..]);
    Ok((n, other))
}

impl PublicKey {
    pub fn to_base64(&self) -> String {
        encode_key_pair(&self.n.to_bytes_be(), &self.e.to_bytes_be())
    }

    pub fn from_base64(encoded: &str) -> Result<Self, CodecError> {
        let (n, e) = decode_key_pair(encoded)?;
        Ok(PublicKey { n, e })
    }
}

impl PrivateKey {
    pub fn to_base64(&self) -> String {
        encode_key_pair(&self.n.to_bytes_be(), &self.d.to_bytes_be())
    }

    pub fn from_base64(encoded: &str) -> Result<Self, CodecError> {
        let (n, d) = decode_key_pair(encoded)?;
        Ok(PrivateKey { n, d })
    }
}

fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    if b.is_zero() {
        return (a.clone(), BigInt::one(), BigInt::zero());
    }
    let (g, x1, y1) = extended_gcd(b, &(a % b));
    let y = &x1 - (a / b) * &y1;
    (g, y1, y)
}

fn mod_inverse(a: &BigUint, modulus: &BigUint) -> Option<BigUint> {
    let a_signed = BigInt::from(a.clone());
    let m_signed = BigInt::from(modulus.clone());
    let (g, x, _) = extended_gcd(&a_signed, &m_signed);
    if g != BigInt::one() {
        return None;
    }
    let result = ((x % &m_signed) + &m_signed) % &m_signed;
    result.to_biguint()
}

/// Draws `p`, `q` of bit length `bitlen/2`, retrying the whole search
/// (bounded) when `n`'s bit length misses the target or `e` has no
/// inverse modulo `φ(n)`.
pub fn generate_keys(bitlen: usize) -> Result<(PublicKey, PrivateKey), CodecError> {
    let mut rng = OsRng;
    let half = bitlen / 2;
    let e = BigUint::from(PUBLIC_EXPONENT);

    for _ in 0..MAX_KEYGEN_RETRIES {
        let p = primes::generate_prime(&mut rng, half)
            .ok_or_else(|| CodecError::InternalFailure("prime search exhausted its budget".to_string()))?;
        let q = primes::generate_prime(&mut rng, half)
            .ok_or_else(|| CodecError::InternalFailure("prime search exhausted its budget".to_string()))?;

        let n = &p * &q;
        if n.bits() as usize != bitlen {
            continue;
        }

        let one = BigUint::one();
        let totient = (&p - &one) * (&q - &one);
        let d = match mod_inverse(&e, &totient) {
            Some(d) => d,
            None => continue,
        };

        return Ok((
            PublicKey { n: n.clone(), e },
            PrivateKey { n, d },
        ));
    }

    Err(CodecError::InternalFailure(
        "key generation exceeded its retry bound".to_string(),
    ))
}

fn fill_random_nonzero(rng: &mut dyn RngCore, buf: &mut [u8]) {
    for byte in buf.iter_mut() {
        loop {
            let mut one = [0u8; 1];
            rng.fill_bytes(&mut one);
            if one[0] != 0x00 {
                *byte = one[0];
                break;
            }
        }
    }
}

pub fn encrypt(pub_key: &PublicKey, message: &[u8]) -> Result<Vec<u8>, CodecError> {
    let key_len = pub_key.key_len_bytes();
    if message.len() > key_len - 11 {
        return Err(CodecError::MessageTooLong(format!(
            "message is {} bytes, maximum is {}",
            message.len(),
            key_len - 11
        )));
    }

    let ps_len = key_len - message.len() - 3;
    let mut block = vec![0u8; key_len];
    block[1] = 0x02;
    fill_random_nonzero(&mut OsRng, &mut block[2..2 + ps_len]);
    block[2 + ps_len] = 0x00;
    block[3 + ps_len..].copy_from_slice(message);

    let m = BigUint::from_bytes_be(&block);
    let c = m.modpow(&pub_key.e, &pub_key.n);

    let c_bytes = c.to_bytes_be();
    let mut out = vec![0u8; key_len];
    out[key_len - c_bytes.len()..].copy_from_slice(&c_bytes);
    Ok(out)
}

pub fn decrypt(priv_key: &PrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>, CodecError> {
    let key_len = priv_key.key_len_bytes();
    if ciphertext.len() != key_len {
        return Err(CodecError::InvalidCiphertext(format!(
            "ciphertext is {} bytes, want {key_len}",
            ciphertext.len()
        )));
    }

    let c = BigUint::from_bytes_be(ciphertext);
    let m = c.modpow(&priv_key.d, &priv_key.n);

    let m_bytes = m.to_bytes_be();
    let mut block = vec![0u8; key_len];
    block[key_len - m_bytes.len()..].copy_from_slice(&m_bytes);

    if block[0] != 0x00 || block[1] != 0x02 {
        return Err(CodecError::InvalidPadding(
            "block does not start with 00 02".to_string(),
        ));
    }
    let zero_offset = block[2..]
        .iter()
        .position(|&b| b == 0x00)
        .ok_or_else(|| CodecError::InvalidPadding("no padding terminator found".to_string()))?;

    Ok(block[2 + zero_offset + 1..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_short_message() {
        let (pub_key, priv_key) = generate_keys(256).unwrap();
        assert_eq!(pub_key.n.bits() as usize, 256);

        let message = "Какой-то очень секретный текст.".as_bytes();
        let ciphertext = encrypt(&pub_key, message).unwrap();
        let decrypted = decrypt(&priv_key, &ciphertext).unwrap();
        assert_eq!(decrypted, message);
    }

    #[test]
    fn round_trips_empty_message() {
        let (pub_key, priv_key) = generate_keys(256).unwrap();
        let ciphertext = encrypt(&pub_key, b"").unwrap();
        let decrypted = decrypt(&priv_key, &ciphertext).unwrap();
        assert_eq!(decrypted, b"");
    }

    #[test]
    fn round_trips_message_at_max_length() {
        let (pub_key, priv_key) = generate_keys(256).unwrap();
        let key_len = pub_key.key_len_bytes();
        let message = vec![0x42u8; key_len - 11];
        let ciphertext = encrypt(&pub_key, &message).unwrap();
        let decrypted = decrypt(&priv_key, &ciphertext).unwrap();
        assert_eq!(decrypted, message);
    }

    #[test]
    fn rejects_message_one_byte_too_long() {
        let (pub_key, _) = generate_keys(256).unwrap();
        let key_len = pub_key.key_len_bytes();
        let message = vec![0x42u8; key_len - 10];
        assert!(encrypt(&pub_key, &message).is_err());
    }

    #[test]
    fn rejects_wrong_length_ciphertext() {
        let (_, priv_key) = generate_keys(256).unwrap();
        let bad = vec![0u8; priv_key.key_len_bytes() - 1];
        assert!(decrypt(&priv_key, &bad).is_err());
    }

    #[test]
    fn key_pair_round_trips_through_base64() {
        let (pub_key, priv_key) = generate_keys(256).unwrap();
        let restored_pub = PublicKey::from_base64(&pub_key.to_base64()).unwrap();
        let restored_priv = PrivateKey::from_base64(&priv_key.to_base64()).unwrap();
        assert_eq!(restored_pub, pub_key);
        assert_eq!(restored_priv, priv_key);
    }

    #[test]
    fn rejects_truncated_base64_key() {
        let (pub_key, _) = generate_keys(256).unwrap();
        let encoded = pub_key.to_base64();
        let truncated = &encoded[..encoded.len() / 2];
        assert!(PublicKey::from_base64(truncated).is_err());
    }
}
