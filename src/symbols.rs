use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    Function,
    Label,
    Data,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub address: u64,
    pub kind: SymbolType,
}

/// Address-ordered symbol table used to put label lines in front of
/// instructions.
#[derive(Default)]
pub struct SymbolTable {
    // Map start_addr -> Symbol
    // Several names on one address is common (aliases, section symbols); the
    // best one according to `rank` wins.
    symbols_by_addr: BTreeMap<u64, Symbol>,
}

fn rank(kind: SymbolType) -> u8 {
    match kind {
        SymbolType::Function => 3,
        SymbolType::Label => 2,
        SymbolType::Data => 1,
        SymbolType::Unknown => 0,
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: Symbol) {
        if symbol.name.is_empty() {
            return;
        }
        match self.symbols_by_addr.get(&symbol.address) {
            Some(existing) if rank(existing.kind) >= rank(symbol.kind) => {}
            _ => {
                self.symbols_by_addr.insert(symbol.address, symbol);
            }
        }
    }

    /// Symbol starting exactly at `address`.
    pub fn name_at(&self, address: u64) -> Option<&str> {
        self.symbols_by_addr
            .get(&address)
            .map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.symbols_by_addr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols_by_addr.is_empty()
    }
}

/// Best-effort demangling: Rust first, then Itanium C++. Anything else comes
/// back unchanged.
pub fn demangle(name: &str) -> String {
    if let Ok(sym) = rustc_demangle::try_demangle(name) {
        return format!("{:#}", sym);
    }
    if name.starts_with("_Z") {
        if let Ok(sym) = cpp_demangle::Symbol::new(name.as_bytes()) {
            if let Ok(s) = sym.demangle() {
                return s;
            }
        }
    }
    name.to_string()
}
