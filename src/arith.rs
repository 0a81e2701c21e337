//! Modular arithmetic primitives underlying the Paillier cryptosystem.

use crate::CryptoError;

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_prime::nt_funcs::is_prime;
use num_prime::PrimalityTestConfig;
use num_traits::{One, Signed, Zero};

/// Number of candidates examined before a prime search gives up.
pub const PRIME_SEARCH_BUDGET: usize = 50_000;

/// Modular multiplicative inverse via the extended Euclidean algorithm.
///
/// Returns `None` when `a` and `m` are not coprime.
pub fn mod_inv(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    let modulus = BigInt::from(m.clone());

    let (mut old_r, mut r) = (BigInt::from(a.clone()), modulus.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }
    if !old_r.is_one() {
        return None;
    }

    let mut inv = old_s % &modulus;
    if inv.is_negative() {
        inv += &modulus;
    }
    inv.to_biguint()
}

/// The Paillier `L` function: `L(u) = (u - 1) / n`.
///
/// Callers must have checked that `u >= 1` and `n` divides `u - 1`.
pub fn l_function(u: &BigUint, n: &BigUint) -> BigUint {
    (u - BigUint::one()) / n
}

/// `lcm(p - 1, q - 1)`, the Carmichael-style exponent used for `lambda`.
pub fn predecessor_lcm(p: &BigUint, q: &BigUint) -> BigUint {
    (p - BigUint::one()).lcm(&(q - BigUint::one()))
}

/// Generate a random prime of exactly `bits` length, within the retry budget.
pub fn gen_prime(bits: u64) -> Result<BigUint, CryptoError> {
    let mut rng = rand::rngs::OsRng;
    for _ in 0..PRIME_SEARCH_BUDGET {
        let mut candidate = rng.gen_biguint(bits);
        // force the high bit so the candidate is exactly `bits` long, and
        // the low bit so it is odd
        candidate |= BigUint::one() << (bits - 1);
        candidate |= BigUint::one();
        if is_prime(&candidate, Some(PrimalityTestConfig::default())).probably() {
            return Ok(candidate);
        }
    }
    Err(CryptoError::KeyGeneration(format!(
        "prime search exhausted its budget of {} candidates",
        PRIME_SEARCH_BUDGET
    )))
}

/// Sample a blinding factor in `[1, n)` coprime to `n`.
pub fn rand_coprime(n: &BigUint) -> BigUint {
    let mut rng = rand::rngs::OsRng;
    loop {
        let r = rng.gen_biguint_range(&BigUint::one(), n);
        if r.gcd(n).is_one() {
            return r;
        }
    }
}
