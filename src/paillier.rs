//! Additively homomorphic Paillier encryption.
//!
//! Every ballot is encrypted under the election's public key; per-candidate
//! totals are obtained by multiplying ciphertexts mod `n^2` (which adds the
//! plaintexts) and decrypting the single combined ciphertext. No individual
//! vote is ever decrypted.

use crate::*;

use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Public half of a Paillier keypair; embedded in the election record and
/// shared with every voter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PaillierPublicKey {
    #[serde(with = "BigUintHex")]
    pub n: BigUint,

    #[serde(with = "BigUintHex")]
    pub g: BigUint,
}

impl PaillierPublicKey {
    pub fn n_squared(&self) -> BigUint {
        &self.n * &self.n
    }
}

/// Private half, held only by the tallying authority and never transmitted
/// to voters.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaillierPrivateKey {
    #[serde(with = "BigUintHex")]
    pub lambda: BigUint,

    #[serde(with = "BigUintHex")]
    pub mu: BigUint,

    #[serde(with = "BigUintHex")]
    pub n: BigUint,
}

/// A full Paillier keypair, generated once per election and immutable
/// afterward.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaillierKeypair {
    pub public: PaillierPublicKey,
    pub private: PaillierPrivateKey,
}

/// A Paillier ciphertext in `[0, n^2)`, wire-encoded as a lowercase hex
/// string. The encoding is stable within a deployment; ciphertexts are never
/// compared for duplicate detection, only voter and election keys are.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext(#[serde(with = "BigUintHex")] pub BigUint);

impl Ciphertext {
    /// Big-endian byte form; the input to leaf hashing and signing.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes_be()
    }
}

/// Generate a fresh Paillier keypair with a modulus of `bit_length` bits.
///
/// This is the simplified variant with `g = n + 1`. For that generator
/// `g^lambda = 1 + lambda * n (mod n^2)`, so `L(g^lambda mod n^2)` reduces to
/// `lambda mod n` and the scheme's validity constraint
/// `gcd(L(g^lambda mod n^2), n) = 1` holds by construction; there is no
/// generator-rejection branch to retry.
pub fn generate_keypair(bit_length: u64) -> Result<PaillierKeypair, CryptoError> {
    let half = bit_length / 2;
    let p = gen_prime(half)?;
    let q = loop {
        let q = gen_prime(half)?;
        if q != p {
            break q;
        }
    };

    let n = &p * &q;
    let g = &n + BigUint::one();
    let lambda = predecessor_lcm(&p, &q);
    let mu = mod_inv(&(&lambda % &n), &n)
        .ok_or_else(|| CryptoError::KeyGeneration("lambda is not invertible mod n".into()))?;

    Ok(PaillierKeypair {
        public: PaillierPublicKey { n: n.clone(), g },
        private: PaillierPrivateKey { lambda, mu, n },
    })
}

/// Encrypt `m` under `public`, requiring `0 <= m < n`.
///
/// Randomized: every call draws a fresh blinding factor `r` coprime to `n`,
/// so two encryptions of the same plaintext differ with overwhelming
/// probability.
pub fn encrypt(m: &BigUint, public: &PaillierPublicKey) -> Result<Ciphertext, CryptoError> {
    if *m >= public.n {
        return Err(CryptoError::InvalidPlaintext);
    }

    let n_squared = public.n_squared();
    let r = rand_coprime(&public.n);
    let c = (public.g.modpow(m, &n_squared) * r.modpow(&public.n, &n_squared)) % &n_squared;
    Ok(Ciphertext(c))
}

/// Homomorphic addition: multiply the ciphertexts mod `n^2`.
///
/// An empty list is an explicit error rather than a silent identity value:
/// "no votes yet" is an operational signal the caller must branch on.
pub fn combine(
    ciphertexts: &[Ciphertext],
    public: &PaillierPublicKey,
) -> Result<Ciphertext, CryptoError> {
    if ciphertexts.is_empty() {
        return Err(CryptoError::EmptyCombine);
    }

    let n_squared = public.n_squared();
    let mut acc = BigUint::one();
    for ciphertext in ciphertexts {
        acc = (acc * &ciphertext.0) % &n_squared;
    }
    Ok(Ciphertext(acc))
}

/// Decrypt with the standard two-step recovery:
/// `m = L(c^lambda mod n^2) * mu mod n`.
pub fn decrypt(
    ciphertext: &Ciphertext,
    private: &PaillierPrivateKey,
) -> Result<BigUint, CryptoError> {
    let n_squared = &private.n * &private.n;
    if ciphertext.0 >= n_squared {
        return Err(CryptoError::DecryptionFailed);
    }

    let u = ciphertext.0.modpow(&private.lambda, &n_squared);
    // a well-formed ciphertext lands in the 1 + k*n subgroup
    if u.is_zero() || !((&u - BigUint::one()) % &private.n).is_zero() {
        return Err(CryptoError::DecryptionFailed);
    }

    Ok((l_function(&u, &private.n) * &private.mu) % &private.n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn test_keypair() -> PaillierKeypair {
        generate_keypair(128).unwrap()
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let keypair = test_keypair();
        let m = BigUint::from(42u8);
        let ciphertext = encrypt(&m, &keypair.public).unwrap();
        assert_eq!(decrypt(&ciphertext, &keypair.private).unwrap(), m);
    }

    #[test]
    fn zero_plaintext_roundtrip() {
        let keypair = test_keypair();
        let ciphertext = encrypt(&BigUint::zero(), &keypair.public).unwrap();
        assert!(decrypt(&ciphertext, &keypair.private).unwrap().is_zero());
    }

    #[test]
    fn encryption_is_randomized() {
        let keypair = test_keypair();
        let m = BigUint::from(5u8);

        let mut seen = HashSet::new();
        for _ in 0..100 {
            let ciphertext = encrypt(&m, &keypair.public).unwrap();
            seen.insert(ciphertext.0.to_str_radix(16));
        }
        assert_eq!(seen.len(), 100);
    }

    #[test]
    fn combine_adds_plaintexts() {
        let keypair = test_keypair();
        let one = BigUint::one();

        let ciphertexts = vec![
            encrypt(&one, &keypair.public).unwrap(),
            encrypt(&one, &keypair.public).unwrap(),
            encrypt(&one, &keypair.public).unwrap(),
        ];
        let combined = combine(&ciphertexts, &keypair.public).unwrap();
        assert_eq!(
            decrypt(&combined, &keypair.private).unwrap(),
            BigUint::from(3u8)
        );
    }

    #[test]
    fn combine_empty_input_fails() {
        let keypair = test_keypair();
        assert!(matches!(
            combine(&[], &keypair.public),
            Err(CryptoError::EmptyCombine)
        ));
    }

    #[test]
    fn plaintext_out_of_range_fails() {
        let keypair = test_keypair();
        assert!(matches!(
            encrypt(&keypair.public.n, &keypair.public),
            Err(CryptoError::InvalidPlaintext)
        ));
    }

    #[test]
    fn ciphertext_out_of_range_fails() {
        let keypair = test_keypair();
        let out_of_range = Ciphertext(keypair.public.n_squared());
        assert!(matches!(
            decrypt(&out_of_range, &keypair.private),
            Err(CryptoError::DecryptionFailed)
        ));
    }

    #[test]
    fn malformed_ciphertext_fails_consistency_check() {
        let keypair = test_keypair();
        // n shares a factor with n^2, so c^lambda collapses out of the
        // 1 + k*n subgroup
        let malformed = Ciphertext(keypair.public.n.clone());
        assert!(matches!(
            decrypt(&malformed, &keypair.private),
            Err(CryptoError::DecryptionFailed)
        ));
    }

    #[test]
    fn ciphertext_serializes_as_hex() {
        let keypair = test_keypair();
        let ciphertext = encrypt(&BigUint::from(7u8), &keypair.public).unwrap();

        let json = serde_json::to_string(&ciphertext).unwrap();
        let parsed: Ciphertext = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ciphertext);
        assert!(json.trim_matches('"').chars().all(|c| c.is_ascii_hexdigit()));
    }
}
