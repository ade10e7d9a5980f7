//! Opcode dispatch table.
//!
//! Built once from the ISA's instruction list; opcode ids index it directly.

use std::fmt;

use crate::isa::{Handler, InstrEntry, Isa, OpcodeId};

/// Maps every opcode id to its handler.
pub struct DispatchTable {
    entries: Vec<InstrEntry>,
}

impl DispatchTable {
    /// Builds the table from `isa.instructions()`.
    pub fn build(isa: &dyn Isa) -> Self {
        let entries = isa.instructions();
        tracing::debug!(forms = entries.len(), "dispatch table built");
        Self { entries }
    }

    /// Number of instruction forms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the ISA supplied no instructions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Handler for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range. The ISA only hands out ids of its own list.
    #[inline(always)]
    pub fn handler(&self, id: OpcodeId) -> &dyn Handler {
        self.entries[id.0].handler.as_ref()
    }

    /// Mnemonic for `id`, if in range.
    pub fn name(&self, id: OpcodeId) -> Option<&'static str> {
        self.entries.get(id.0).map(|e| e.name)
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("len", &self.entries.len())
            .finish()
    }
}
