//! Scoped symbol table.
//!
//! The table is a hash-bucketed, scope-ordered index over symbol records.
//! Symbols live in an arena addressed by [`SymbolId`]; bucket chains are
//! index links inside the records, so unlinking is O(1) once an entry's
//! predecessor is known and no parent back-pointers are needed.
//!
//! The table borrows its bucket key from the interner: a symbol's bucket
//! is derived from its name's canonical handle. Anonymous symbols go into
//! one extra bucket of their own; putting them in the named buckets would
//! serve no purpose, since they are never found by name.
//!
//! Bucket ordering invariant: within a bucket, symbols are kept in
//! non-increasing scope order, innermost first. A new symbol at the same
//! level as existing entries lands in front of them, so the most recent
//! declaration at a level is found first, and a scan can stop as soon as
//! an entry's scope drops below the range it is searching.

use cinderc_util::{Fatal, FatalResult, IndexVec};
use tracing::debug;

use crate::intern::{StrId, StringTable};
use crate::sym::{
    BlockRef, ScopeLevel, SourceLoc, Storage, StorageClass, Symbol, SymbolId, VirtualReg,
};
use crate::ty::Ty;

const NR_SYMBOL_BUCKETS: usize = 64;
const ANON_BUCKET: usize = NR_SYMBOL_BUCKETS;

/// The symbol table context object.
///
/// Owns the symbol arena, the scope index, the scope stack state, and the
/// storage/register counters. The driver owns one per program and passes
/// it by mutable reference into every phase; there is no global instance.
pub struct SymbolTable {
    /// Arena of records. Released symbols leave a `None` slot behind,
    /// which the free list recycles.
    slots: IndexVec<SymbolId, Option<Symbol>>,
    free: Vec<SymbolId>,
    /// Bucket heads; the last bucket holds anonymous symbols.
    buckets: Vec<Option<SymbolId>>,
    pub(crate) current: ScopeLevel,
    pub(crate) frame_size: u32,
    pub(crate) next_ireg: u32,
    pub(crate) next_freg: u32,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            slots: IndexVec::with_capacity(256),
            free: Vec::new(),
            buckets: vec![None; NR_SYMBOL_BUCKETS + 1],
            current: ScopeLevel::GLOBAL,
            frame_size: 0,
            next_ireg: 0,
            next_freg: 0,
        }
    }

    /// Borrow a symbol record.
    ///
    /// # Panics
    ///
    /// Panics if the symbol has been released; holding a [`SymbolId`]
    /// across its reclamation is a programming error, like indexing out
    /// of bounds.
    pub fn sym(&self, id: SymbolId) -> &Symbol {
        self.slots[id].as_ref().expect("symbol has been released")
    }

    /// Mutably borrow a symbol record.
    ///
    /// # Panics
    ///
    /// Panics if the symbol has been released.
    pub fn sym_mut(&mut self, id: SymbolId) -> &mut Symbol {
        self.slots[id].as_mut().expect("symbol has been released")
    }

    /// Create a detached record at [`ScopeLevel::NONE`]. If `ty` is
    /// supplied, the caller yields ownership.
    pub fn alloc(
        &mut self,
        name: Option<StrId>,
        class: StorageClass,
        ty: Option<Ty>,
    ) -> SymbolId {
        let sym = Symbol::new(name, class, ty);
        match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(sym);
                id
            }
            None => self.slots.push(Some(sym)),
        }
    }

    fn bucket_of(&self, name: Option<StrId>) -> usize {
        match name {
            Some(id) => id.0 as usize % NR_SYMBOL_BUCKETS,
            None => ANON_BUCKET,
        }
    }

    /// Link a symbol into the index at the given scope level.
    ///
    /// The insertion point is before the first entry whose scope is not
    /// deeper, keeping the bucket's non-increasing order and making the
    /// newest declaration at a level the first found.
    pub fn insert(&mut self, id: SymbolId, scope: ScopeLevel) {
        self.sym_mut(id).scope = scope;
        let bucket = self.bucket_of(self.sym(id).name);

        let mut prev: Option<SymbolId> = None;
        let mut cursor = self.buckets[bucket];
        while let Some(c) = cursor {
            if self.sym(c).scope <= scope {
                break;
            }
            prev = Some(c);
            cursor = self.sym(c).link;
        }

        self.sym_mut(id).link = cursor;
        match prev {
            None => self.buckets[bucket] = Some(id),
            Some(p) => self.sym_mut(p).link = Some(id),
        }
    }

    /// Unlink a symbol from its bucket. Returns false if it is not there.
    fn unlink(&mut self, id: SymbolId) -> bool {
        let bucket = self.bucket_of(self.sym(id).name);

        let mut prev: Option<SymbolId> = None;
        let mut cursor = self.buckets[bucket];
        while let Some(c) = cursor {
            if c == id {
                let next = self.sym(c).link;
                match prev {
                    None => self.buckets[bucket] = next,
                    Some(p) => self.sym_mut(p).link = next,
                }
                self.sym_mut(id).link = None;
                return true;
            }
            prev = Some(c);
            cursor = self.sym(c).link;
        }
        false
    }

    /// Remove a symbol from the index.
    ///
    /// Removing a symbol that is not linked signals a defect in an
    /// upstream phase and is fatal.
    pub fn remove(&mut self, id: SymbolId) -> FatalResult<()> {
        if self.unlink(id) {
            Ok(())
        } else {
            Err(Fatal::UnlinkedSymbol)
        }
    }

    /// Find a symbol by name in the namespace `ns`, with scope in
    /// `start..=end`.
    ///
    /// Entries flagged [`StorageClass::HIDDEN`] are skipped unless `ns`
    /// requests them. The scan stops once an entry's scope falls below
    /// `start`: the bucket ordering guarantees nothing deeper in the
    /// chain can match. Entries above `end` are skipped but the scan
    /// continues past them.
    pub fn lookup(
        &self,
        name: StrId,
        ns: StorageClass,
        start: ScopeLevel,
        end: ScopeLevel,
    ) -> Option<SymbolId> {
        let mut cursor = self.buckets[self.bucket_of(Some(name))];
        while let Some(id) = cursor {
            let sym = self.sym(id);
            cursor = sym.link;

            if sym.class.contains(StorageClass::HIDDEN)
                && !ns.contains(StorageClass::HIDDEN)
            {
                continue;
            }
            if sym.scope < start {
                break;
            }
            if sym.scope > end {
                continue;
            }
            if sym.name != Some(name) {
                continue;
            }
            if !sym.class.intersects(ns) {
                continue;
            }
            return Some(id);
        }
        None
    }

    /// If `name` is a typedef visible in the current scope, return it.
    ///
    /// This cannot just search for the TYPEDEF bit: an ordinary name
    /// declared in an inner scope hides a typedef of the same spelling,
    /// so the ordinary-namespace winner is found first and then checked.
    pub fn find_typedef(&self, name: StrId) -> Option<SymbolId> {
        let id = self.lookup(name, StorageClass::ORDINARY, ScopeLevel::GLOBAL, self.current)?;
        if self.sym(id).class.contains(StorageClass::TYPEDEF) {
            Some(id)
        } else {
            None
        }
    }

    /// Find, or create, the label symbol for `name`.
    ///
    /// Labels live in their own namespace at function scope. On a miss
    /// the caller's closure constructs the branch target, so basic blocks
    /// are only created for labels seen for the first time.
    pub fn find_label(
        &mut self,
        name: StrId,
        make_target: impl FnOnce() -> BlockRef,
    ) -> SymbolId {
        if let Some(id) = self.lookup(
            name,
            StorageClass::LABEL,
            ScopeLevel::FUNCTION,
            ScopeLevel::FUNCTION,
        ) {
            return id;
        }
        let id = self.alloc(Some(name), StorageClass::LABEL, None);
        self.sym_mut(id).target = Some(make_target());
        self.insert(id, ScopeLevel::FUNCTION);
        id
    }

    /// Find a symbol by virtual register.
    ///
    /// Exhaustive scan over every bucket; the index is not keyed by
    /// register, so this is very slow. Acceptable for diagnostics and
    /// debugging only, never on a hot path.
    pub fn find_by_reg(&self, reg: VirtualReg) -> Option<SymbolId> {
        for &head in &self.buckets {
            let mut cursor = head;
            while let Some(id) = cursor {
                let sym = self.sym(id);
                if sym.reg == Some(reg) {
                    return Some(id);
                }
                cursor = sym.link;
            }
        }
        None
    }

    /// Visit every symbol with scope in `start..=end`, across all buckets
    /// including the anonymous one. Cross-bucket order is unspecified.
    ///
    /// Within a bucket, scopes only decrease, so scanning a bucket stops
    /// early once an entry drops below `start`.
    pub fn traverse(
        &self,
        start: ScopeLevel,
        end: ScopeLevel,
        mut f: impl FnMut(SymbolId, &Symbol),
    ) {
        for &head in &self.buckets {
            let mut cursor = head;
            while let Some(id) = cursor {
                let sym = self.sym(id);
                cursor = sym.link;
                if sym.scope < start {
                    break;
                }
                if sym.scope > end {
                    continue;
                }
                f(id, sym);
            }
        }
    }

    /// Collect the ids in a scope range, for passes that relink or
    /// release while walking.
    pub(crate) fn collect_range(&self, start: ScopeLevel, end: ScopeLevel) -> Vec<SymbolId> {
        let mut ids = Vec::new();
        self.traverse(start, end, |id, _| ids.push(id));
        ids
    }

    /// Construct the symbol for a string literal.
    ///
    /// The literal gets an array-of-char type covering its bytes plus the
    /// terminator, an output label, and an anonymous file-scope static
    /// symbol whose storage is that label.
    pub fn string_symbol(
        &mut self,
        strings: &mut StringTable,
        literal: StrId,
        loc: SourceLoc,
    ) -> SymbolId {
        let label = strings.mark_for_emission(literal);
        let ty = Ty::array_of(Ty::Char, strings.bytes(literal).len() + 1);
        let id = self.alloc(None, StorageClass::STATIC, Some(ty));
        {
            let sym = self.sym_mut(id);
            sym.storage = Storage::Label(label);
            sym.loc = loc;
        }
        self.insert(id, ScopeLevel::GLOBAL);
        id
    }

    /// Release a record: drop the owned type and recycle the arena slot.
    ///
    /// Only for symbols no longer linked in the scope index; linked
    /// symbols go through [`SymbolTable::release_range`].
    pub(crate) fn release(&mut self, id: SymbolId) {
        debug_assert!(self.sym(id).link.is_none());
        self.slots[id] = None;
        self.free.push(id);
    }

    /// Remove and release every symbol with scope in `start..=end`.
    ///
    /// Called once a function's compilation is fully complete, over
    /// `FUNCTION..=RETIRED`, to reclaim everything the function ever
    /// declared, including symbols parked at the retired level.
    pub fn release_range(&mut self, start: ScopeLevel, end: ScopeLevel) {
        let ids = self.collect_range(start, end);
        debug!(count = ids.len(), ?start, ?end, "releasing symbols");
        for id in ids {
            let unlinked = self.unlink(id);
            debug_assert!(unlinked);
            self.release(id);
        }
    }

    /// Forget everything: symbols, scopes, counters. For drivers that
    /// reuse one table across independent compilation units.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.buckets.iter_mut().for_each(|b| *b = None);
        self.current = ScopeLevel::GLOBAL;
        self.frame_size = 0;
        self.next_ireg = 0;
        self.next_freg = 0;
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
