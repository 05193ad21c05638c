//! Emission-facing passes.
//!
//! The assembler back end is a collaborator; this module defines the seam
//! it plugs into and the two bulk passes the driver runs at the end of a
//! translation unit: `.global` directives for referenced undefined
//! externs, and the pending string literals.

use tracing::debug;

use crate::intern::{AsmLabel, StringTable};
use crate::sym::{ScopeLevel, StorageClass};
use crate::table::SymbolTable;

/// Output placement for emitted data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment {
    Text,
    Data,
}

/// Sink for assembler-level output.
///
/// Implemented by the back end; the passes below only decide what to
/// emit, never how it is formatted.
pub trait Emit {
    /// Switch the active output segment.
    fn segment(&mut self, segment: Segment);
    /// Define an output label at the current position.
    fn define_label(&mut self, label: AsmLabel);
    /// Declare a name as externally visible (`.global`-style directive).
    fn globalize(&mut self, name: &[u8]);
    /// Emit raw string data, terminator included.
    fn string_data(&mut self, bytes: &[u8]);
}

/// Emit a `.global` directive for every referenced undefined extern at
/// file scope.
pub fn emit_externs(table: &SymbolTable, strings: &StringTable, out: &mut dyn Emit) {
    let mut count = 0usize;
    table.traverse(ScopeLevel::GLOBAL, ScopeLevel::GLOBAL, |_, sym| {
        if sym.class.contains(StorageClass::EXTERN | StorageClass::REFERENCED)
            && !sym.class.contains(StorageClass::DEFINED)
        {
            if let Some(name) = sym.name {
                out.globalize(strings.bytes(name));
                count += 1;
            }
        }
    });
    debug!(count, "emitted extern directives");
}

/// Emit every string literal that was marked for emission, each under its
/// label in the text segment, with the terminating NUL appended.
pub fn emit_literals(strings: &StringTable, out: &mut dyn Emit) {
    let mut count = 0usize;
    strings.for_each_pending(|id, label| {
        out.segment(Segment::Text);
        out.define_label(label);
        let mut data = strings.bytes(id).to_vec();
        data.push(0);
        out.string_data(&data);
        count += 1;
    });
    debug!(count, "emitted string literals");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::SourceLoc;
    use crate::ty::Ty;

    /// Records every directive it receives, in order.
    #[derive(Default)]
    struct Recorder {
        ops: Vec<String>,
    }

    impl Emit for Recorder {
        fn segment(&mut self, segment: Segment) {
            self.ops.push(format!("segment {segment:?}"));
        }

        fn define_label(&mut self, label: AsmLabel) {
            self.ops.push(format!("{label}:"));
        }

        fn globalize(&mut self, name: &[u8]) {
            self.ops.push(format!(".global {}", String::from_utf8_lossy(name)));
        }

        fn string_data(&mut self, bytes: &[u8]) {
            self.ops.push(format!("data {bytes:?}"));
        }
    }

    #[test]
    fn test_externs_referenced_undefined_only() {
        let mut strings = StringTable::new();
        let mut table = SymbolTable::new();

        for (name, class) in [
            ("used", StorageClass::EXTERN | StorageClass::REFERENCED),
            ("unused", StorageClass::EXTERN),
            (
                "defined",
                StorageClass::EXTERN | StorageClass::REFERENCED | StorageClass::DEFINED,
            ),
            ("local", StorageClass::STATIC | StorageClass::REFERENCED),
        ] {
            let id = table.alloc(Some(strings.intern_str(name)), class, Some(Ty::Int));
            table.insert(id, ScopeLevel::GLOBAL);
        }

        let mut out = Recorder::default();
        emit_externs(&table, &strings, &mut out);
        assert_eq!(out.ops, vec![".global used".to_string()]);
    }

    #[test]
    fn test_externs_ignore_inner_scopes() {
        let mut strings = StringTable::new();
        let mut table = SymbolTable::new();
        let id = table.alloc(
            Some(strings.intern_str("f")),
            StorageClass::EXTERN | StorageClass::REFERENCED,
            Some(Ty::Int),
        );
        table.insert(id, ScopeLevel::FUNCTION);

        let mut out = Recorder::default();
        emit_externs(&table, &strings, &mut out);
        assert!(out.ops.is_empty());
    }

    #[test]
    fn test_literals_emit_label_and_terminated_bytes() {
        let mut strings = StringTable::new();
        let mut table = SymbolTable::new();
        let lit = strings.intern(b"hi");
        table.string_symbol(&mut strings, lit, SourceLoc::default());

        let mut out = Recorder::default();
        emit_literals(&strings, &mut out);
        assert_eq!(
            out.ops,
            vec![
                "segment Text".to_string(),
                "L1:".to_string(),
                format!("data {:?}", [b'h', b'i', 0u8]),
            ]
        );
    }

    #[test]
    fn test_unlabeled_strings_are_not_emitted() {
        let mut strings = StringTable::new();
        strings.intern(b"just_an_identifier");

        let mut out = Recorder::default();
        emit_literals(&strings, &mut out);
        assert!(out.ops.is_empty());
    }
}
