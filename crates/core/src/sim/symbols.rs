//! Function symbol table.
//!
//! Address ranges of the guest's functions, taken from an ELF image and used by
//! the call tracer to name call targets and returning functions.

/// One function: `[start, start + size)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    /// First byte of the function.
    pub start: u64,
    /// Length of the function in bytes.
    pub size: u64,
    /// Symbol name.
    pub name: String,
}

impl Symbol {
    /// Creates a symbol.
    pub fn new(name: impl Into<String>, start: u64, size: u64) -> Self {
        Self {
            start,
            size,
            name: name.into(),
        }
    }

    /// True if `addr` lies inside the function.
    pub const fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr - self.start < self.size
    }
}

/// Function ranges sorted by start address.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    syms: Vec<Symbol>,
}

impl SymbolTable {
    /// Builds a table; the input may be in any order.
    pub fn new(mut syms: Vec<Symbol>) -> Self {
        syms.sort_by_key(|s| s.start);
        Self { syms }
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.syms.len()
    }

    /// True if the table holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.syms.is_empty()
    }

    /// Finds the function containing `addr`.
    ///
    /// # Returns
    ///
    /// The nearest symbol starting at or below `addr`, if its range covers it.
    pub fn lookup(&self, addr: u64) -> Option<&Symbol> {
        let idx = self.syms.partition_point(|s| s.start <= addr);
        self.syms[..idx].iter().rev().find(|s| s.contains(addr))
    }
}
