//! Probabilistic prime generation. `num-bigint` has no built-in
//! primality test (unlike Go's `math/big`, which backs `crypto/rand.Prime`
//! with a Miller-Rabin/Baillie-PSW test), so this hand-rolls a
//! Miller-Rabin test over `BigUint` and a rejection-sampling search for
//! an exact-bit-length prime candidate.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::RngCore;

const MILLER_RABIN_ROUNDS: u32 = 40;
const SMALL_PRIMES: &[u32] = &[2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47];

fn random_odd_biguint(rng: &mut dyn RngCore, bits: usize) -> BigUint {
    let num_bytes = bits.div_ceil(8);
    let mut buf = vec![0u8; num_bytes];
    rng.fill_bytes(&mut buf);

    let excess_bits = num_bytes * 8 - bits;
    buf[0] &= 0xFFu8 >> excess_bits;
    buf[0] |= 1u8 << (7 - excess_bits);
    *buf.last_mut().expect("num_bytes is at least 1") |= 1;

    BigUint::from_bytes_be(&buf)
}

fn is_probable_prime(n: &BigUint, rng: &mut dyn RngCore) -> bool {
    let two = BigUint::from(2u32);
    if *n < two {
        return false;
    }
    for &p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if *n == p {
            return true;
        }
        if n % &p == BigUint::zero() {
            return false;
        }
    }

    let one = BigUint::one();
    let n_minus_one = n - &one;
    let mut d = n_minus_one.clone();
    let mut s = 0u32;
    while (&d & &one) == BigUint::zero() {
        d >>= 1u32;
        s += 1;
    }

    'witness: for _ in 0..MILLER_RABIN_ROUNDS {
        let a = random_in_range(rng, &two, &(n - &two));
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue 'witness;
        }
        for _ in 0..s - 1 {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

fn random_biguint_bits(rng: &mut dyn RngCore, bits: usize) -> BigUint {
    let num_bytes = bits.div_ceil(8);
    let mut buf = vec![0u8; num_bytes];
    rng.fill_bytes(&mut buf);
    let excess_bits = num_bytes * 8 - bits;
    buf[0] &= 0xFFu8 >> excess_bits;
    BigUint::from_bytes_be(&buf)
}

/// Uniformly samples a `BigUint` in `[low, high]` by rejection sampling
/// over `high`'s bit length.
fn random_in_range(rng: &mut dyn RngCore, low: &BigUint, high: &BigUint) -> BigUint {
    let bits = high.bits() as usize;
    loop {
        let candidate = random_biguint_bits(rng, bits.max(1));
        if &candidate >= low && &candidate <= high {
            return candidate;
        }
    }
}

/// Searches for a prime with exactly `bits` bits, bounded to avoid
/// looping forever on a broken RNG.
pub fn generate_prime(rng: &mut dyn RngCore, bits: usize) -> Option<BigUint> {
    const MAX_ATTEMPTS: u32 = 20_000;
    for _ in 0..MAX_ATTEMPTS {
        let candidate = random_odd_biguint(rng, bits);
        if is_probable_prime(&candidate, rng) {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn generates_prime_of_exact_bit_length() {
        let mut rng = OsRng;
        let p = generate_prime(&mut rng, 64).expect("prime search should not exhaust its budget");
        assert_eq!(p.bits(), 64);
        assert!(is_probable_prime(&p, &mut rng));
    }

    #[test]
    fn rejects_small_composites() {
        let mut rng = OsRng;
        assert!(!is_probable_prime(&BigUint::from(15u32), &mut rng));
        assert!(!is_probable_prime(&BigUint::from(91u32), &mut rng));
        assert!(is_probable_prime(&BigUint::from(97u32), &mut rng));
    }
}
