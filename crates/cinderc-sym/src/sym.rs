//! Symbol records.
//!
//! A [`Symbol`] is one name-to-meaning binding, or one anonymous
//! compiler-internal value. Records live in the arena owned by
//! [`SymbolTable`](crate::table::SymbolTable) and are addressed by
//! [`SymbolId`]; the scope-index bucket chains and the ad hoc lists both
//! thread through index links stored in the record itself.

use bitflags::bitflags;
use cinderc_util::define_idx;

use crate::intern::{AsmLabel, StrId};
use crate::ty::Ty;

define_idx!(
    /// Stable handle to a symbol record in the table's arena.
    SymbolId
);

define_idx!(
    /// Branch target of a label symbol. Basic blocks are constructed by
    /// the intermediate-code phase; this subsystem only stores the handle.
    BlockRef
);

bitflags! {
    /// Storage-class bits.
    ///
    /// These double as the namespace mask in lookups: an identifier can
    /// simultaneously name an ordinary object, a label, and a tag, and
    /// each lookup filters by the bits it cares about.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct StorageClass: u16 {
        /// External linkage.
        const EXTERN     = 1 << 0;
        /// Internal linkage, static storage duration.
        const STATIC     = 1 << 1;
        /// A typedef name.
        const TYPEDEF    = 1 << 2;
        /// A virtual-register value; its address is never taken.
        const REGISTER   = 1 << 3;
        /// A statement label.
        const LABEL      = 1 << 4;
        /// Block-local automatic storage (frame slot).
        const BLOCK      = 1 << 5;
        /// A struct/union/enum tag.
        const TAG        = 1 << 6;
        /// A definition has been seen, not just a declaration.
        const DEFINED    = 1 << 7;
        /// The symbol has been referenced.
        const REFERENCED = 1 << 8;
        /// Excluded from ordinary lookups; set when a prototype scope
        /// folds into its enclosing scope. A lookup finds hidden entries
        /// only if its namespace mask includes this bit.
        const HIDDEN     = 1 << 9;

        /// The ordinary-identifier namespace.
        const ORDINARY = Self::EXTERN.bits()
            | Self::STATIC.bits()
            | Self::TYPEDEF.bits()
            | Self::REGISTER.bits()
            | Self::BLOCK.bits();
    }
}

/// Scope nesting level, totally ordered.
///
/// `NONE` marks a record not yet in the index. Live levels run from
/// `GLOBAL` through nested block levels up to `LIMIT`; `RETIRED` sits
/// beyond every live level and holds symbols that have left scope but are
/// not yet reclaimed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeLevel(pub u32);

impl ScopeLevel {
    /// Not yet assigned to any scope.
    pub const NONE: ScopeLevel = ScopeLevel(0);
    /// File scope.
    pub const GLOBAL: ScopeLevel = ScopeLevel(1);
    /// Function parameters and outermost function-body declarations.
    pub const FUNCTION: ScopeLevel = ScopeLevel(2);
    /// Deepest supported nesting level.
    pub const LIMIT: ScopeLevel = ScopeLevel(64);
    /// Holding level for symbols that have left scope.
    pub const RETIRED: ScopeLevel = ScopeLevel(Self::LIMIT.0 + 1);

    pub fn deeper(self) -> ScopeLevel {
        ScopeLevel(self.0 + 1)
    }

    pub fn shallower(self) -> ScopeLevel {
        debug_assert!(self > ScopeLevel::NONE);
        ScopeLevel(self.0 - 1)
    }
}

/// Compile-time storage assigned to a symbol.
///
/// The variant is determined by the storage class: automatic variables get
/// a frame offset, statics and string literals get an assembler label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Storage {
    /// Not yet assigned.
    #[default]
    None,
    /// Offset from the frame base; negative, toward lower addresses.
    Frame(i32),
    /// Assembler label of static data.
    Label(AsmLabel),
}

/// Virtual register class. Integral/pointer values and floating values
/// draw from independent counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegClass {
    Int,
    Float,
}

/// An abstract register identifier, mapped to physical storage by a later
/// allocation pass. The class tag keeps the two counters' id spaces
/// disjoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VirtualReg {
    pub class: RegClass,
    pub index: u32,
}

/// Source position for diagnostics. The file name shares the string
/// table, which lives for the whole program.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourceLoc {
    pub file: Option<StrId>,
    pub line: u32,
}

/// One declared or synthesized name.
#[derive(Debug)]
pub struct Symbol {
    /// Interned name; `None` for anonymous values.
    pub name: Option<StrId>,
    pub class: StorageClass,
    /// Owned type descriptor; labels carry none.
    pub ty: Option<Ty>,
    pub scope: ScopeLevel,
    pub reg: Option<VirtualReg>,
    pub storage: Storage,
    /// Alignment override; 0 means the type's natural alignment.
    pub align: u32,
    /// Branch target, for labels.
    pub target: Option<BlockRef>,
    pub loc: SourceLoc,
    /// Next symbol in the same scope-index bucket.
    pub(crate) link: Option<SymbolId>,
    /// Next symbol in the same ad hoc list.
    pub(crate) list: Option<SymbolId>,
}

impl Symbol {
    pub(crate) fn new(name: Option<StrId>, class: StorageClass, ty: Option<Ty>) -> Self {
        Self {
            name,
            class,
            ty,
            scope: ScopeLevel::NONE,
            reg: None,
            storage: Storage::default(),
            align: 0,
            target: None,
            loc: SourceLoc::default(),
            link: None,
            list: None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_level_ordering() {
        assert!(ScopeLevel::NONE < ScopeLevel::GLOBAL);
        assert!(ScopeLevel::GLOBAL < ScopeLevel::FUNCTION);
        assert!(ScopeLevel::FUNCTION < ScopeLevel::FUNCTION.deeper());
        assert!(ScopeLevel::LIMIT < ScopeLevel::RETIRED);
    }

    #[test]
    fn test_scope_level_stepping() {
        let block = ScopeLevel::FUNCTION.deeper();
        assert_eq!(block.shallower(), ScopeLevel::FUNCTION);
    }

    #[test]
    fn test_ordinary_namespace_excludes_labels_and_tags() {
        assert!(!StorageClass::ORDINARY.intersects(StorageClass::LABEL));
        assert!(!StorageClass::ORDINARY.intersects(StorageClass::TAG));
        assert!(StorageClass::ORDINARY.intersects(StorageClass::BLOCK));
        assert!(StorageClass::ORDINARY.intersects(StorageClass::TYPEDEF));
    }

    #[test]
    fn test_state_bits_do_not_defeat_namespace_check() {
        let class = StorageClass::EXTERN | StorageClass::REFERENCED;
        assert!(class.intersects(StorageClass::ORDINARY));
    }

    #[test]
    fn test_new_symbol_is_detached() {
        let sym = Symbol::new(None, StorageClass::REGISTER, Some(Ty::Int));
        assert!(sym.is_anonymous());
        assert_eq!(sym.scope, ScopeLevel::NONE);
        assert_eq!(sym.storage, Storage::None);
        assert!(sym.reg.is_none());
        assert!(sym.link.is_none());
        assert!(sym.list.is_none());
    }
}
