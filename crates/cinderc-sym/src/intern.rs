//! String interner.
//!
//! Every identifier and string literal the front end sees is canonicalized
//! here: byte-identical content always resolves to the same [`StrId`], so
//! name comparison everywhere else in the compiler is an integer compare.
//!
//! Unlike the symbol table, interned strings are never freed; the table is
//! a whole-program cache owned by the driver and passed by reference into
//! every phase that needs it.
//!
//! # Performance Characteristics
//!
//! - **Interning (hit)**: O(chain length) byte compare, short-circuited by
//!   length and precomputed hash
//! - **Interning (miss)**: one allocation + O(1) bucket insert
//! - **Name comparison**: O(1) - [`StrId`] comparison
//!
//! On a hit the matched entry is promoted to the front of its bucket.
//! Identifiers repeat in bursts, so the next probe for the same name ends
//! after one compare. Promotion is a heuristic only; no caller may depend
//! on chain order.

use std::hash::Hasher;

use ahash::AHasher;
use cinderc_util::{define_idx, IndexVec};
use tracing::trace;

define_idx!(
    /// Stable handle to an interned string.
    StrId
);

/// An assembler output label, written as `L<n>` by the emission phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AsmLabel(pub u32);

impl std::fmt::Display for AsmLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Scanner classification of an interned name.
///
/// Fresh entries are plain identifiers. The scanner rewrites keyword
/// entries once, on first sight, storing its own keyword code; the interner
/// does not interpret the code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TokenClass {
    /// An ordinary identifier.
    #[default]
    Ident,
    /// A reserved word; the payload is the scanner's keyword code.
    Keyword(u16),
}

const NR_STRING_BUCKETS: usize = 128;

/// One interned string: the owned bytes, their precomputed hash, the
/// lazily assigned output label, and the scanner's classification.
#[derive(Debug)]
pub struct StrEntry {
    bytes: Box<[u8]>,
    hash: u64,
    label: Option<AsmLabel>,
    token: TokenClass,
    /// Next entry in the same hash bucket.
    link: Option<StrId>,
}

impl StrEntry {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn label(&self) -> Option<AsmLabel> {
        self.label
    }

    pub fn token(&self) -> TokenClass {
        self.token
    }
}

/// The string table: a hash-bucketed arena of [`StrEntry`] records.
///
/// This is an explicit context object. The driver owns one per program and
/// passes it by mutable reference; there is no global instance.
///
/// # Examples
///
/// ```
/// use cinderc_sym::intern::StringTable;
///
/// let mut strings = StringTable::new();
/// let a = strings.intern(b"count");
/// let b = strings.intern(b"count");
/// assert_eq!(a, b);
/// assert_eq!(strings.bytes(a), b"count");
/// ```
pub struct StringTable {
    entries: IndexVec<StrId, StrEntry>,
    buckets: [Option<StrId>; NR_STRING_BUCKETS],
    next_label: u32,
}

impl StringTable {
    pub fn new() -> Self {
        Self {
            entries: IndexVec::with_capacity(256),
            buckets: [None; NR_STRING_BUCKETS],
            next_label: 0,
        }
    }

    /// Intern a byte sequence, returning its canonical handle.
    ///
    /// Two calls with byte-identical content always return the same
    /// [`StrId`]; the returned handle stays valid for the whole program.
    pub fn intern(&mut self, bytes: &[u8]) -> StrId {
        let hash = Self::hash_bytes(bytes);
        let bucket = (hash % NR_STRING_BUCKETS as u64) as usize;

        let mut prev: Option<StrId> = None;
        let mut cursor = self.buckets[bucket];
        while let Some(id) = cursor {
            let entry = &self.entries[id];
            let next = entry.link;
            if entry.bytes.len() == bytes.len()
                && entry.hash == hash
                && *entry.bytes == *bytes
            {
                // Move-to-front so a repeat of this name ends after one
                // compare.
                if let Some(p) = prev {
                    self.entries[p].link = next;
                    self.entries[id].link = self.buckets[bucket];
                    self.buckets[bucket] = Some(id);
                }
                return id;
            }
            prev = Some(id);
            cursor = next;
        }

        trace!(len = bytes.len(), "intern miss");
        let id = self.entries.push(StrEntry {
            bytes: bytes.into(),
            hash,
            label: None,
            token: TokenClass::Ident,
            link: self.buckets[bucket],
        });
        self.buckets[bucket] = Some(id);
        id
    }

    /// Intern a `&str`. Convenience wrapper over [`StringTable::intern`].
    pub fn intern_str(&mut self, s: &str) -> StrId {
        self.intern(s.as_bytes())
    }

    /// The content of an interned string.
    pub fn bytes(&self, id: StrId) -> &[u8] {
        &self.entries[id].bytes
    }

    /// The whole entry, for callers that need hash or token state.
    pub fn entry(&self, id: StrId) -> &StrEntry {
        &self.entries[id]
    }

    /// The scanner classification of a name.
    pub fn token(&self, id: StrId) -> TokenClass {
        self.entries[id].token
    }

    /// Record the scanner classification of a name.
    pub fn set_token(&mut self, id: StrId, token: TokenClass) {
        self.entries[id].token = token;
    }

    /// Assign an output label to a string that will be emitted as data.
    ///
    /// The label is assigned at most once, the first time the literal is
    /// referenced; later calls return the same label.
    pub fn mark_for_emission(&mut self, id: StrId) -> AsmLabel {
        if let Some(label) = self.entries[id].label {
            return label;
        }
        self.next_label += 1;
        let label = AsmLabel(self.next_label);
        self.entries[id].label = Some(label);
        trace!(%label, "string marked for emission");
        label
    }

    /// Visit every string with an assigned output label.
    ///
    /// Called once at the end of a translation unit to emit pending
    /// literals. Read-only for the table; side effects happen in the
    /// caller.
    pub fn for_each_pending(&self, mut f: impl FnMut(StrId, AsmLabel)) {
        for (id, entry) in self.entries.iter_enumerated() {
            if let Some(label) = entry.label {
                f(id, label);
            }
        }
    }

    /// Number of distinct interned strings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn hash_bytes(bytes: &[u8]) -> u64 {
        let mut hasher = AHasher::default();
        hasher.write(bytes);
        hasher.finish()
    }
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}
