use smallvec::SmallVec;

/// Most needles are a single word; keep their trigrams on the stack.
const INLINE: usize = 8;

pub type QueryTrigrams = SmallVec<[Trigram; INLINE]>;

/// Three bytes packed into the low 24 bits of a `u32`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Trigram(u32);

impl Trigram {
    #[inline]
    pub const fn from_bytes(b0: u8, b1: u8, b2: u8) -> Self {
        Trigram((b0 as u32) | ((b1 as u32) << 8) | ((b2 as u32) << 16))
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn to_bytes(self) -> [u8; 3] {
        let v = self.0;
        [
            (v & 0xFF) as u8,
            ((v >> 8) & 0xFF) as u8,
            ((v >> 16) & 0xFF) as u8,
        ]
    }
}

/// Every trigram of `text` (sliding window), sorted and deduplicated.
///
/// Works on bytes, so callers must case-fold first; record fields are
/// stored lowercased. Texts shorter than three bytes have no trigrams.
pub fn index_trigrams(text: &str) -> Vec<Trigram> {
    let bytes = text.as_bytes();
    if bytes.len() < 3 {
        return Vec::new();
    }

    let mut tris: Vec<Trigram> = bytes
        .windows(3)
        .map(|w| Trigram::from_bytes(w[0], w[1], w[2]))
        .collect();
    tris.sort_unstable();
    tris.dedup();
    tris
}

/// A subset of `needle`'s trigrams for candidate lookup.
///
/// Takes non-overlapping windows plus the final one, e.g. "commands" →
/// "com", "man", "nds". Any text containing the needle contains all of its
/// trigrams, so intersecting on a subset can only widen the candidate set,
/// never lose a match. Empty for needles under three bytes; those must be
/// verified by scanning.
pub fn query_trigrams(needle: &str) -> QueryTrigrams {
    let bytes = needle.as_bytes();
    let mut tris = QueryTrigrams::new();
    if bytes.len() < 3 {
        return tris;
    }

    let mut i = 0;
    while i + 3 <= bytes.len() {
        tris.push(Trigram::from_bytes(bytes[i], bytes[i + 1], bytes[i + 2]));
        i += 3;
    }

    if bytes.len() % 3 != 0 {
        let last = bytes.len() - 3;
        tris.push(Trigram::from_bytes(
            bytes[last],
            bytes[last + 1],
            bytes[last + 2],
        ));
    }

    tris.sort_unstable();
    tris.dedup();
    tris
}

#[cfg(test)]
#[path = "trigram_tests.rs"]
mod tests;
