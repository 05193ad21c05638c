//! cinderc-sym - Symbol and String Tables
//!
//! This crate is the part of the compiler that gives meaning to
//! identifiers: every occurrence of the same lexeme becomes one interned
//! record, names resolve through C's scope rules (file, function,
//! prototype, and nested block scopes, with shadowing and declaration
//! hiding), and declared or synthesized values receive their compile-time
//! storage: frame offsets and virtual registers, both assigned lazily.
//!
//! # Overview
//!
//! Two context objects carry all state, owned by the driver and passed by
//! mutable reference; nothing here is global:
//!
//! - [`StringTable`] canonicalizes byte sequences. Interned strings live
//!   for the whole program and also carry the lazily assigned output
//!   labels of string literals.
//! - [`SymbolTable`] indexes symbol records by name and scope, tracks the
//!   scope nesting level, and owns the frame and register counters.
//!   Symbols outlive their syntactic scope (code generation still needs
//!   them) and are reclaimed per function by [`SymbolTable::release_range`].
//!
//! # Scope discipline
//!
//! Bucket chains keep symbols in non-increasing scope order, so lookups
//! see the innermost declaration first and can stop scanning as soon as
//! an entry falls below the requested range. Leaving a scope either
//! retires its symbols outright ([`ExitMode::Block`]) or hides them and
//! folds them into the enclosing scope ([`ExitMode::Prototype`]), which
//! is how prototype parameters stay available for redeclaration-conflict
//! checks against the function body.
//!
//! # Example
//!
//! ```
//! use cinderc_sym::{ExitMode, ScopeLevel, StorageClass, StringTable, SymbolTable, Ty};
//!
//! let mut strings = StringTable::new();
//! let mut table = SymbolTable::new();
//!
//! let n = strings.intern(b"n");
//! let global = table.alloc(Some(n), StorageClass::EXTERN, Some(Ty::Int));
//! table.insert(global, ScopeLevel::GLOBAL);
//!
//! table.enter_scope()?;
//! let local = table.alloc(Some(n), StorageClass::BLOCK, Some(Ty::Int));
//! table.insert(local, table.current_scope());
//!
//! // The inner declaration shadows the file-scope one.
//! let found = table.lookup(n, StorageClass::ORDINARY, ScopeLevel::GLOBAL, table.current_scope());
//! assert_eq!(found, Some(local));
//!
//! table.exit_scope(ExitMode::Block);
//! let found = table.lookup(n, StorageClass::ORDINARY, ScopeLevel::GLOBAL, table.current_scope());
//! assert_eq!(found, Some(global));
//! # Ok::<(), cinderc_util::Fatal>(())
//! ```
//!
//! # Module Structure
//!
//! - [`intern`] - string interning and output labels
//! - [`sym`] - the symbol record and its attribute types
//! - [`table`] - the scope index: insert, lookup, remove, traverse
//! - [`scope`] - scope entry/exit policies
//! - [`storage`] - lazy frame offsets and virtual registers
//! - [`list`] - declaration-ordered symbol lists
//! - [`ty`] - the minimal type descriptor interface
//! - [`emit`] - the assembler seam and end-of-unit passes

pub mod emit;
pub mod intern;
pub mod list;
pub mod scope;
pub mod storage;
pub mod sym;
pub mod table;
pub mod ty;

pub use emit::{Emit, Segment};
pub use intern::{AsmLabel, StrId, StringTable, TokenClass};
pub use list::SymbolList;
pub use scope::ExitMode;
pub use sym::{
    BlockRef, RegClass, ScopeLevel, SourceLoc, Storage, StorageClass, Symbol, SymbolId,
    VirtualReg,
};
pub use table::SymbolTable;
pub use ty::Ty;
