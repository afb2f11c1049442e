use super::EmbeddingModel;
use crate::error::GhostResult;
use async_trait::async_trait;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Offline embedder using signed feature hashing over lowercase word tokens.
///
/// Texts sharing words land close together and identical text always maps to the same
/// unit vector, which is enough to drive indexing and matching without a provider.
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub const DEFAULT_DIMS: usize = 64;

    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    pub fn dimensions(&self) -> usize {
        self.dims
    }

    pub fn embed_sync(&self, input: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dims];
        let tokens = input
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty());
        for token in tokens {
            let h = fnv1a(token);
            let bucket = (h % self.dims as u64) as usize;
            // top bit picks the sign so unrelated tokens cancel rather than pile up
            v[bucket] += if h >> 63 == 0 { 1.0 } else { -1.0 };
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

fn fnv1a(token: &str) -> u64 {
    token
        .chars()
        .flat_map(char::to_lowercase)
        .fold(FNV_OFFSET, |h, c| (h ^ c as u64).wrapping_mul(FNV_PRIME))
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMS)
    }
}

#[async_trait]
impl EmbeddingModel for HashEmbedder {
    async fn embed(&self, text: &str) -> GhostResult<Vec<f32>> {
        Ok(self.embed_sync(text))
    }
}
