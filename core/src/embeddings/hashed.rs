use super::Embedder;
use anyhow::Result;

/// Deterministic bag-of-tokens embedder: tokens are feature-hashed into a
/// fixed-width vector which is then L2-normalized. Needs no model files or
/// network, so it serves as the offline and test backend. ASCII text tokenizes on word
/// boundaries; CJK text, which has no spaces, tokenizes as character
/// bigrams so that overlapping phrases still produce similar vectors.
pub struct HashedEmbedder {
    dim: usize,
}

impl HashedEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for HashedEmbedder {
    fn default() -> Self {
        Self::new(512)
    }
}

impl Embedder for HashedEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

impl HashedEmbedder {
    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        for token in tokenize(text) {
            let slot = (fnv1a(token.as_bytes()) as usize) % self.dim;
            vector[slot] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in vector.iter_mut() {
                *v /= norm;
            }
        }
        vector
    }
}

fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut prev_wide: Option<char> = None;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            word.push(ch.to_ascii_lowercase());
            prev_wide = None;
        } else {
            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
            if ch.is_alphanumeric() {
                // Non-ASCII letter: emit the char and its bigram with the
                // previous one.
                tokens.push(ch.to_string());
                if let Some(prev) = prev_wide {
                    tokens.push(format!("{}{}", prev, ch));
                }
                prev_wide = Some(ch);
            } else {
                prev_wide = None;
            }
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }
    tokens
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn deterministic_across_calls() {
        let embedder = HashedEmbedder::default();
        let a = embedder.embed(&["癌が治ると医師が推奨".to_string()]).unwrap();
        let b = embedder.embed(&["癌が治ると医師が推奨".to_string()]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn overlapping_phrases_are_closer_than_disjoint_ones() {
        let embedder = HashedEmbedder::default();
        let vs = embedder
            .embed(&[
                "医薬品の誇大広告は禁止される".to_string(),
                "誇大広告 医薬品 禁止".to_string(),
                "本日は晴天なり".to_string(),
            ])
            .unwrap();
        assert!(cosine(&vs[0], &vs[1]) > cosine(&vs[0], &vs[2]));
    }

    #[test]
    fn ascii_words_are_case_insensitive() {
        let embedder = HashedEmbedder::default();
        let vs = embedder
            .embed(&["Misleading Claims".to_string(), "misleading claims".to_string()])
            .unwrap();
        assert!((cosine(&vs[0], &vs[1]) - 1.0).abs() < 1e-6);
    }
}
