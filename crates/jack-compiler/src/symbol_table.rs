//! Two-scope symbol environment.
//!
//! Class scope (`Static`/`Field`) is created once per compilation unit and
//! persists for its duration. Subroutine scope (`Arg`/`Var`) is wholly
//! replaced — not popped — at each `start_subroutine`. Resolution always
//! tries subroutine scope first so a subroutine-local name can shadow a
//! class-level one.

use std::collections::HashMap;

/// The role a symbol plays: static, field, argument, or local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Static,
    Field,
    Arg,
    Var,
}

/// A resolved symbol: its declared Jack type, kind, and kind-local index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub declared_type: String,
    pub kind: Kind,
    pub index: u16,
}

#[derive(Default)]
struct Scope {
    entries: HashMap<String, SymbolEntry>,
    next_static: u16,
    next_field: u16,
    next_arg: u16,
    next_var: u16,
}

impl Scope {
    fn next_index(&mut self, kind: Kind) -> u16 {
        let counter = match kind {
            Kind::Static => &mut self.next_static,
            Kind::Field => &mut self.next_field,
            Kind::Arg => &mut self.next_arg,
            Kind::Var => &mut self.next_var,
        };
        let index = *counter;
        *counter += 1;
        index
    }

    fn count(&self, kind: Kind) -> u16 {
        match kind {
            Kind::Static => self.next_static,
            Kind::Field => self.next_field,
            Kind::Arg => self.next_arg,
            Kind::Var => self.next_var,
        }
    }
}

/// The class-then-subroutine symbol environment.
pub struct SymbolEnv {
    class_scope: Scope,
    subroutine_scope: Scope,
}

impl SymbolEnv {
    pub fn new() -> Self {
        SymbolEnv {
            class_scope: Scope::default(),
            subroutine_scope: Scope::default(),
        }
    }

    /// Record `name` with the next kind-local index in the scope that owns
    /// its kind (class scope for Static/Field, subroutine scope for
    /// Arg/Var), then advance that kind's counter.
    pub fn define(&mut self, name: &str, declared_type: &str, kind: Kind) {
        let scope = match kind {
            Kind::Static | Kind::Field => &mut self.class_scope,
            Kind::Arg | Kind::Var => &mut self.subroutine_scope,
        };
        let index = scope.next_index(kind);
        scope.entries.insert(
            name.to_string(),
            SymbolEntry {
                declared_type: declared_type.to_string(),
                kind,
                index,
            },
        );
    }

    /// Wholly replace the subroutine scope — not pop it — and reset the
    /// Arg/Var counters. Called at the start of every subroutine
    /// declaration.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope = Scope::default();
    }

    /// Resolve `name`, consulting subroutine scope before class scope so a
    /// subroutine-local name can shadow a class-level one.
    pub fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
        self.subroutine_scope
            .entries
            .get(name)
            .or_else(|| self.class_scope.entries.get(name))
    }

    pub fn count(&self, kind: Kind) -> u16 {
        match kind {
            Kind::Static | Kind::Field => self.class_scope.count(kind),
            Kind::Arg | Kind::Var => self.subroutine_scope.count(kind),
        }
    }
}

impl Default for SymbolEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_kind_local_and_contiguous() {
        let mut env = SymbolEnv::new();
        env.define("x", "int", Kind::Field);
        env.define("y", "int", Kind::Field);
        env.define("count", "int", Kind::Static);

        assert_eq!(env.lookup("x").unwrap().index, 0);
        assert_eq!(env.lookup("y").unwrap().index, 1);
        assert_eq!(env.lookup("count").unwrap().index, 0);
        assert_eq!(env.count(Kind::Field), 2);
        assert_eq!(env.count(Kind::Static), 1);
    }

    #[test]
    fn subroutine_scope_is_replaced_not_popped() {
        let mut env = SymbolEnv::new();
        env.define("a", "int", Kind::Arg);
        env.start_subroutine();
        assert!(env.lookup("a").is_none());
        assert_eq!(env.count(Kind::Arg), 0);
    }

    #[test]
    fn subroutine_scope_shadows_class_scope() {
        let mut env = SymbolEnv::new();
        env.define("x", "int", Kind::Field);
        env.define("x", "Array", Kind::Var);

        let resolved = env.lookup("x").unwrap();
        assert_eq!(resolved.kind, Kind::Var);
        assert_eq!(resolved.declared_type, "Array");
    }

    #[test]
    fn field_count_matches_object_alloc_size() {
        let mut env = SymbolEnv::new();
        env.define("a", "int", Kind::Field);
        env.define("b", "int", Kind::Field);
        env.define("c", "int", Kind::Field);
        assert_eq!(env.count(Kind::Field), 3);
    }
}
