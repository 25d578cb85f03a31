/// Dimensionality of the default feature-hashing embedder.
const HASH_DIM: usize = 256;

/// Turns text into a fixed-size vector. How embeddings are produced is a
/// backend concern; the store only requires that equal text embeds equally.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Deterministic feature-hashing embedder: each lowercased token is hashed
/// into a fixed number of buckets and the result is L2-normalized. No model
/// service required, which keeps tests and local runs self-contained.
#[derive(Debug, Default, Clone)]
pub struct HashEmbedder;

impl HashEmbedder {
    pub fn new() -> Self {
        Self
    }

    fn bucket(token: &str) -> usize {
        // FNV-1a
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in token.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x100000001b3);
        }
        (hash % HASH_DIM as u64) as usize
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; HASH_DIM];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            vector[Self::bucket(&token.to_lowercase())] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

/// Cosine similarity of two equal-length vectors.
pub(crate) fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_is_deterministic() {
        let embedder = HashEmbedder::new();
        assert_eq!(
            embedder.embed("two sum with a hash map"),
            embedder.embed("two sum with a hash map")
        );
    }

    #[test]
    fn test_embedding_is_normalized() {
        let embedder = HashEmbedder::new();
        let vector = embedder.embed("graph traversal depth first search");
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_similar_text_scores_higher() {
        let embedder = HashEmbedder::new();
        let query = embedder.embed("hash map lookup");
        let close = embedder.embed("use a hash map for constant lookup");
        let far = embedder.embed("design a distributed queue with sharding");

        assert!(cosine(&query, &close) > cosine(&query, &far));
    }

    #[test]
    fn test_empty_text_embeds_to_zero() {
        let embedder = HashEmbedder::new();
        let vector = embedder.embed("   ");
        assert!(vector.iter().all(|v| *v == 0.0));
    }
}
