use std::sync::{Mutex, PoisonError};

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Length of the random part of every short URL.
pub const CODE_LEN: usize = 7;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

enum Source {
    Thread,
    Seeded(Mutex<StdRng>),
}

/// Builds short URLs as `prefix + CODE_LEN random alphanumerics`.
///
/// Codes are drawn uniformly with replacement. Nothing here checks for
/// uniqueness; the UNIQUE index on `short_url` is the only guard.
pub struct ShortCodeGenerator {
    prefix: String,
    source: Source,
}

impl ShortCodeGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            source: Source::Thread,
        }
    }

    /// Deterministic generator; two generators with the same seed emit the
    /// same sequence of short URLs.
    pub fn seeded(prefix: impl Into<String>, seed: u64) -> Self {
        Self {
            prefix: prefix.into(),
            source: Source::Seeded(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    /// Produce a new full short URL.
    pub fn generate(&self) -> String {
        let code = match &self.source {
            Source::Thread => random_code(&mut rand::thread_rng(), CODE_LEN),
            Source::Seeded(rng) => {
                let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
                random_code(&mut *rng, CODE_LEN)
            }
        };
        self.short_url_for(&code)
    }

    /// Rebuild the full short URL from the code part (the redirect path segment).
    pub fn short_url_for(&self, code: &str) -> String {
        format!("{}{}", self.prefix, code)
    }
}

impl std::fmt::Debug for ShortCodeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match self.source {
            Source::Thread => "thread",
            Source::Seeded(_) => "seeded",
        };
        f.debug_struct("ShortCodeGenerator")
            .field("prefix", &self.prefix)
            .field("source", &source)
            .finish()
    }
}

/// Generate a random alphanumeric string of the given length.
pub fn random_code<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
