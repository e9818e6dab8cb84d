use std::collections::HashMap;

use crate::vm::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SymbolKind {
    Static,
    Field,
    Argument,
    Local,
}

impl SymbolKind {
    /// The VM segment holding variables of this kind.
    pub const fn segment(self) -> Segment {
        match self {
            Self::Static => Segment::Static,
            Self::Field => Segment::This,
            Self::Argument => Segment::Argument,
            Self::Local => Segment::Local,
        }
    }

    const fn is_class_level(self) -> bool {
        matches!(self, Self::Static | Self::Field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Symbol {
    type_name: String,
    kind: SymbolKind,
    index: usize,
}

/// Variables visible while compiling one class.
///
/// Lookups search the subroutine scope first, then the class scope.
#[derive(Debug, Default)]
pub struct SymbolTable {
    class_name: String,
    class_scope: HashMap<String, Symbol>,
    subroutine_scope: HashMap<String, Symbol>,
    counts: HashMap<SymbolKind, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything, including class-level variables.
    pub fn start_class(&mut self, class_name: &str) {
        class_name.clone_into(&mut self.class_name);
        self.class_scope.clear();
        self.subroutine_scope.clear();
        self.counts.clear();
    }

    /// Clear the subroutine scope; a method gets `this` as argument 0.
    pub fn start_subroutine(&mut self, kind: SubroutineKind) {
        self.subroutine_scope.clear();
        self.counts.remove(&SymbolKind::Argument);
        self.counts.remove(&SymbolKind::Local);

        if kind == SubroutineKind::Method {
            let class_name = self.class_name.clone();
            self.define("this", &class_name, SymbolKind::Argument);
        }
    }

    /// Add a variable, giving it the next index of its kind.
    pub fn define(&mut self, name: &str, type_name: &str, kind: SymbolKind) {
        let count = self.counts.entry(kind).or_default();
        let symbol = Symbol {
            type_name: type_name.to_owned(),
            kind,
            index: *count,
        };
        *count += 1;

        let scope = if kind.is_class_level() {
            &mut self.class_scope
        } else {
            &mut self.subroutine_scope
        };
        scope.insert(name.to_owned(), symbol);
    }

    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.lookup(name).map(|symbol| symbol.kind)
    }

    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|symbol| symbol.type_name.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup(name).map(|symbol| symbol.index)
    }

    pub fn var_count(&self, kind: SymbolKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or_default()
    }
}
