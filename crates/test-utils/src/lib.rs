//! Random fixture synthesis for the pegbridge test suites.

use arbitrary::{Arbitrary, Unstructured};
use rand_core::{OsRng, RngCore};

/// Entropy buffer size; comfortably above what any single fixture consumes.
const ENTROPY_LEN: usize = 65_536;

/// Generates `Arbitrary` values from OS entropy.
///
/// The buffer is refilled per value, and generation retries a bounded number
/// of times since custom `Arbitrary` impls may reject an unstructured input.
#[derive(Debug)]
pub struct ArbitraryGenerator {
    buf: Vec<u8>,
}

impl Default for ArbitraryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ArbitraryGenerator {
    pub fn new() -> Self {
        Self::new_with_size(ENTROPY_LEN)
    }

    pub fn new_with_size(s: usize) -> Self {
        Self { buf: vec![0u8; s] }
    }

    /// Generates an arbitrary instance of type `T`.
    pub fn generate<T>(&mut self) -> T
    where
        T: for<'a> Arbitrary<'a>,
    {
        const MAX_ATTEMPTS: usize = 16;
        let mut last_error = None;

        for _ in 0..MAX_ATTEMPTS {
            OsRng.fill_bytes(&mut self.buf);
            let mut u = Unstructured::new(&self.buf);
            match T::arbitrary(&mut u) {
                Ok(value) => return value,
                Err(err) => last_error = Some(err),
            }
        }

        panic!(
            "failed to generate arbitrary instance: {}",
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_owned())
        );
    }
}
