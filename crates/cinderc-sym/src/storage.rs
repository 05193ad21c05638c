//! Storage and register assignment.
//!
//! Frame offsets and virtual registers are handed out lazily, the first
//! time code generation actually needs them. A local that is never used
//! never receives a frame slot, so dead declarations cost nothing.

use cinderc_util::{Fatal, FatalResult};

use crate::sym::{RegClass, ScopeLevel, Storage, StorageClass, SymbolId, VirtualReg};
use crate::table::SymbolTable;
use crate::ty::Ty;

fn round_up(n: u32, align: u32) -> u32 {
    (n + align - 1) / align * align
}

impl SymbolTable {
    /// Make sure a block-local symbol has frame storage.
    ///
    /// Advances the frame counter by the type's size, rounds it up to the
    /// type's alignment, and records the negated counter as the offset.
    /// Idempotent: a symbol that already has storage is left untouched,
    /// and so is anything that is not block-local.
    pub fn ensure_storage(&mut self, id: SymbolId) {
        let (size, align) = {
            let sym = self.sym(id);
            if !sym.class.contains(StorageClass::BLOCK) || sym.storage != Storage::None {
                return;
            }
            match &sym.ty {
                Some(ty) => (ty.size_of(), ty.align_of()),
                None => return,
            }
        };
        self.frame_size += size;
        self.frame_size = round_up(self.frame_size, align);
        let offset = -(self.frame_size as i32);
        self.sym_mut(id).storage = Storage::Frame(offset);
    }

    /// The virtual register holding this symbol's value, allocating one
    /// of the appropriate class if necessary.
    ///
    /// Integral and pointer values draw from one counter, floating values
    /// from another. A type with neither class is an upstream defect and
    /// fatal.
    pub fn assign_register(&mut self, id: SymbolId) -> FatalResult<VirtualReg> {
        if let Some(reg) = self.sym(id).reg {
            return Ok(reg);
        }

        let class = {
            let ty = self.sym(id).ty.as_ref().ok_or(Fatal::NoRegisterClass)?;
            if ty.is_integral() || ty.is_pointer() {
                RegClass::Int
            } else if ty.is_floating() {
                RegClass::Float
            } else {
                return Err(Fatal::NoRegisterClass);
            }
        };

        let index = match class {
            RegClass::Int => {
                let i = self.next_ireg;
                self.next_ireg += 1;
                i
            }
            RegClass::Float => {
                let i = self.next_freg;
                self.next_freg += 1;
                i
            }
        };

        let reg = VirtualReg { class, index };
        self.sym_mut(id).reg = Some(reg);
        Ok(reg)
    }

    /// Create an anonymous temporary of the given type.
    ///
    /// Temporaries are register values (the compiler never takes their
    /// address) and are placed directly at the retired level: they were
    /// never in scope, so there is nothing to retire them from. Ownership
    /// of the type passes to the new symbol.
    pub fn make_temporary(&mut self, ty: Ty) -> SymbolId {
        let id = self.alloc(None, StorageClass::REGISTER, Some(ty));
        self.insert(id, ScopeLevel::RETIRED);
        id
    }

    /// Bytes of frame space assigned so far in the current function.
    pub fn frame_size(&self) -> u32 {
        self.frame_size
    }

    /// Start a fresh frame. Called by the driver at the top of each
    /// function definition.
    pub fn reset_frame(&mut self) {
        self.frame_size = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::StringTable;

    fn local(table: &mut SymbolTable, strings: &mut StringTable, name: &str, ty: Ty) -> SymbolId {
        let name = strings.intern_str(name);
        let id = table.alloc(Some(name), StorageClass::BLOCK, Some(ty));
        table.insert(id, ScopeLevel::FUNCTION);
        id
    }

    fn frame_offset(table: &SymbolTable, id: SymbolId) -> i32 {
        match table.sym(id).storage {
            Storage::Frame(offset) => offset,
            other => panic!("expected frame storage, got {other:?}"),
        }
    }

    #[test]
    fn test_offsets_grow_away_from_frame_base() {
        let mut strings = StringTable::new();
        let mut table = SymbolTable::new();

        let a = local(&mut table, &mut strings, "a", Ty::Char);
        let b = local(&mut table, &mut strings, "b", Ty::Int);
        let c = local(&mut table, &mut strings, "c", Ty::Double);

        table.ensure_storage(a);
        table.ensure_storage(b);
        table.ensure_storage(c);

        let (oa, ob, oc) = (frame_offset(&table, a), frame_offset(&table, b), frame_offset(&table, c));
        assert!(oa < 0 && ob < oa && oc < ob);
        assert_eq!(ob % 4, 0);
        assert_eq!(oc % 8, 0);
    }

    #[test]
    fn test_ensure_storage_is_idempotent() {
        let mut strings = StringTable::new();
        let mut table = SymbolTable::new();
        let a = local(&mut table, &mut strings, "a", Ty::Int);

        table.ensure_storage(a);
        let first = frame_offset(&table, a);
        let size = table.frame_size();
        table.ensure_storage(a);
        assert_eq!(frame_offset(&table, a), first);
        assert_eq!(table.frame_size(), size);
    }

    #[test]
    fn test_unused_locals_take_no_frame_space() {
        let mut strings = StringTable::new();
        let mut table = SymbolTable::new();
        let _dead = local(&mut table, &mut strings, "dead", Ty::Double);
        // ensure_storage never called for it.
        assert_eq!(table.frame_size(), 0);
    }

    #[test]
    fn test_storage_skips_non_block_symbols() {
        let mut strings = StringTable::new();
        let mut table = SymbolTable::new();
        let g = strings.intern(b"g");
        let id = table.alloc(Some(g), StorageClass::EXTERN, Some(Ty::Int));
        table.insert(id, ScopeLevel::GLOBAL);
        table.ensure_storage(id);
        assert_eq!(table.sym(id).storage, Storage::None);
    }

    #[test]
    fn test_register_classes_use_separate_counters() {
        let mut table = SymbolTable::new();
        let i0 = table.make_temporary(Ty::Int);
        let f0 = table.make_temporary(Ty::Double);
        let i1 = table.make_temporary(Ty::ptr_to(Ty::Char));

        let ri0 = table.assign_register(i0).unwrap();
        let rf0 = table.assign_register(f0).unwrap();
        let ri1 = table.assign_register(i1).unwrap();

        assert_eq!(ri0, VirtualReg { class: RegClass::Int, index: 0 });
        assert_eq!(rf0, VirtualReg { class: RegClass::Float, index: 0 });
        assert_eq!(ri1, VirtualReg { class: RegClass::Int, index: 1 });
        assert_ne!(ri0, rf0);
    }

    #[test]
    fn test_assign_register_is_sticky() {
        let mut table = SymbolTable::new();
        let t = table.make_temporary(Ty::Int);
        let first = table.assign_register(t).unwrap();
        let second = table.assign_register(t).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_register_for_unclassifiable_type_is_fatal() {
        let mut table = SymbolTable::new();
        let t = table.make_temporary(Ty::array_of(Ty::Int, 4));
        assert_eq!(table.assign_register(t), Err(Fatal::NoRegisterClass));
    }

    #[test]
    fn test_temporaries_start_retired() {
        let mut table = SymbolTable::new();
        let t = table.make_temporary(Ty::Int);
        let sym = table.sym(t);
        assert!(sym.is_anonymous());
        assert!(sym.class.contains(StorageClass::REGISTER));
        assert_eq!(sym.scope, ScopeLevel::RETIRED);
    }

    #[test]
    fn test_reset_frame() {
        let mut strings = StringTable::new();
        let mut table = SymbolTable::new();
        let a = local(&mut table, &mut strings, "a", Ty::Long);
        table.ensure_storage(a);
        assert_eq!(table.frame_size(), 8);
        table.reset_frame();
        assert_eq!(table.frame_size(), 0);
    }
}
