//! Deterministic hash-seeded embedding provider.
//!
//! [`HashEmbeddingProvider`] stands in for a real embedding model. It derives
//! a seed from the SHA-256 digest of the text and fills the vector from a
//! seeded PRNG, so identical text always yields an identical vector. The
//! vectors carry no semantic meaning.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Default embedding dimensionality.
pub const DEFAULT_DIMENSIONS: usize = 384;

/// An [`EmbeddingProvider`] producing pseudo-random vectors keyed by a text hash.
///
/// Each component is in `[0, 1)`.
///
/// # Example
///
/// ```rust,ignore
/// use bithealth_rag::HashEmbeddingProvider;
///
/// let provider = HashEmbeddingProvider::new(384);
/// let a = provider.embed("The sky is blue.").await?;
/// let b = provider.embed("The sky is blue.").await?;
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HashEmbeddingProvider {
    dimensions: usize,
}

impl HashEmbeddingProvider {
    /// Create a provider producing vectors of length `dimensions`.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn seed_for(text: &str) -> u64 {
        let digest = Sha256::digest(text.as_bytes());
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(seed)
    }
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(RagError::EmbeddingError {
                provider: "hash".to_string(),
                message: "cannot embed empty text".to_string(),
            });
        }

        let mut rng = StdRng::seed_from_u64(Self::seed_for(text));
        Ok((0..self.dimensions).map(|_| rng.random::<f32>()).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
