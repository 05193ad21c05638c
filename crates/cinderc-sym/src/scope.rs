//! Scope stack management.
//!
//! The front end calls [`SymbolTable::enter_scope`] and
//! [`SymbolTable::exit_scope`] as it walks into and out of syntactic
//! scopes. Exiting has two distinct policies, because C has two kinds of
//! scope ending:
//!
//! - An ordinary block ends and its declarations are gone for good: they
//!   move to the retired level, invisible to every later lookup, waiting
//!   for end-of-function reclamation.
//! - A function-prototype scope folds into the scope around it. The
//!   parameters must stop resolving as ordinary names, but they stay
//!   discoverable for redeclaration-conflict checks against the function
//!   body, so they are hidden and demoted one level instead of retired.

use cinderc_util::{Fatal, FatalResult};
use tracing::{debug, trace};

use crate::sym::{ScopeLevel, StorageClass};
use crate::table::SymbolTable;

/// How a scope ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitMode {
    /// Ordinary block scope: retire everything declared at or below it.
    Block,
    /// Prototype scope: hide everything and fold it into the enclosing
    /// scope, where explicit lookups can still find it.
    Prototype,
}

impl SymbolTable {
    /// The current nesting level.
    pub fn current_scope(&self) -> ScopeLevel {
        self.current
    }

    /// Enter a nested scope.
    pub fn enter_scope(&mut self) -> FatalResult<()> {
        let next = self.current.deeper();
        if next > ScopeLevel::LIMIT {
            return Err(Fatal::ScopeDepthExceeded { limit: ScopeLevel::LIMIT.0 });
        }
        self.current = next;
        trace!(level = next.0, "enter scope");
        Ok(())
    }

    /// Leave the current scope, applying the given policy to every symbol
    /// at or below it, then step back out one level.
    pub fn exit_scope(&mut self, mode: ExitMode) {
        debug_assert!(self.current > ScopeLevel::GLOBAL, "exiting file scope");

        let ids = self.collect_range(self.current, ScopeLevel::LIMIT);
        debug!(level = self.current.0, count = ids.len(), ?mode, "exit scope");

        match mode {
            ExitMode::Block => {
                for id in ids {
                    let unlinked = self.remove(id).is_ok();
                    debug_assert!(unlinked);
                    self.insert(id, ScopeLevel::RETIRED);
                }
            }
            ExitMode::Prototype => {
                let demoted = self.current.shallower();
                for id in ids {
                    let unlinked = self.remove(id).is_ok();
                    debug_assert!(unlinked);
                    self.sym_mut(id).class |= StorageClass::HIDDEN;
                    self.insert(id, demoted);
                }
            }
        }

        self.current = self.current.shallower();
    }
}
