//! Ad hoc symbol lists.
//!
//! Some sequences care about declaration order, not scope: a function's
//! parameters, a struct's members. Those are threaded through a second
//! link field in the symbol record, completely independent of the scope
//! index, so a symbol can sit in a bucket chain and on one list at the
//! same time.

use crate::intern::StrId;
use crate::sym::SymbolId;
use crate::table::SymbolTable;

/// An append-ordered sequence of symbols, threaded through the records'
/// list links. The default value is the empty list.
#[derive(Debug, Default)]
pub struct SymbolList {
    pub(crate) head: Option<SymbolId>,
}

impl SymbolList {
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl SymbolTable {
    /// Append a symbol to the end of a list.
    pub fn append_to_list(&mut self, id: SymbolId, list: &mut SymbolList) {
        debug_assert!(self.sym(id).list.is_none(), "symbol already on a list");
        match list.head {
            None => list.head = Some(id),
            Some(head) => {
                let mut cursor = head;
                while let Some(next) = self.sym(cursor).list {
                    cursor = next;
                }
                self.sym_mut(cursor).list = Some(id);
            }
        }
    }

    /// Find a symbol on a list by name. Linear.
    pub fn find_in_list(&self, name: StrId, list: &SymbolList) -> Option<SymbolId> {
        let mut cursor = list.head;
        while let Some(id) = cursor {
            if self.sym(id).name == Some(name) {
                return Some(id);
            }
            cursor = self.sym(id).list;
        }
        None
    }

    /// Collect a list's members in order.
    pub fn list_members(&self, list: &SymbolList) -> Vec<SymbolId> {
        let mut members = Vec::new();
        let mut cursor = list.head;
        while let Some(id) = cursor {
            members.push(id);
            cursor = self.sym(id).list;
        }
        members
    }

    /// Release every symbol on a list and empty it.
    ///
    /// Only for lists whose members are not linked in the scope index;
    /// index-linked symbols are reclaimed by
    /// [`SymbolTable::release_range`] instead.
    pub fn release_list(&mut self, list: &mut SymbolList) {
        let mut cursor = list.head.take();
        while let Some(id) = cursor {
            cursor = self.sym(id).list;
            self.release(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::StringTable;
    use crate::sym::{ScopeLevel, StorageClass};
    use crate::ty::Ty;

    #[test]
    fn test_append_preserves_order() {
        let mut strings = StringTable::new();
        let mut table = SymbolTable::new();
        let mut params = SymbolList::default();

        let ids: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|n| {
                let name = strings.intern_str(n);
                let id = table.alloc(Some(name), StorageClass::BLOCK, Some(Ty::Int));
                table.append_to_list(id, &mut params);
                id
            })
            .collect();

        assert_eq!(table.list_members(&params), ids);
    }

    #[test]
    fn test_find_in_list() {
        let mut strings = StringTable::new();
        let mut table = SymbolTable::new();
        let mut params = SymbolList::default();

        let a = strings.intern(b"a");
        let b = strings.intern(b"b");
        let ida = table.alloc(Some(a), StorageClass::BLOCK, Some(Ty::Int));
        table.append_to_list(ida, &mut params);

        assert_eq!(table.find_in_list(a, &params), Some(ida));
        assert_eq!(table.find_in_list(b, &params), None);
    }

    #[test]
    fn test_list_is_independent_of_scope_index() {
        let mut strings = StringTable::new();
        let mut table = SymbolTable::new();
        let mut params = SymbolList::default();

        let p = strings.intern(b"p");
        let id = table.alloc(Some(p), StorageClass::BLOCK, Some(Ty::Int));
        table.insert(id, ScopeLevel::FUNCTION);
        table.append_to_list(id, &mut params);

        // Unlinking from the index leaves the list intact.
        table.remove(id).unwrap();
        assert_eq!(table.find_in_list(p, &params), Some(id));
    }

    #[test]
    fn test_release_list_empties_it() {
        let mut strings = StringTable::new();
        let mut table = SymbolTable::new();
        let mut members = SymbolList::default();

        let a = strings.intern(b"a");
        let id = table.alloc(Some(a), StorageClass::BLOCK, Some(Ty::Int));
        table.append_to_list(id, &mut members);

        table.release_list(&mut members);
        assert!(members.is_empty());
        assert_eq!(table.find_in_list(a, &members), None);
    }
}
