//! The CSPRNG-backed implementation of [`arbiter_core::SecretGenerator`].

use arbiter_core::SecretGenerator;
use rand::RngCore;

/// Generates secrets by hex-encoding bytes drawn from the OS RNG.
pub struct RandomSecretGenerator {
    byte_len: usize,
}

impl RandomSecretGenerator {
    pub fn new(byte_len: usize) -> Self {
        Self { byte_len }
    }
}

impl SecretGenerator for RandomSecretGenerator {
    fn generate(&self) -> String {
        let mut bytes = vec![0u8; self.byte_len];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}
