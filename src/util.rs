use ed25519_dalek::{SigningKey, VerifyingKey};

/// Generate an ed25519 signing keypair from the OS RNG.
pub fn generate_signing_keypair() -> (SigningKey, VerifyingKey) {
    let mut csprng = rand::rngs::OsRng;
    let signing_key = SigningKey::generate(&mut csprng);
    let verifying_key = signing_key.verifying_key();
    (signing_key, verifying_key)
}
