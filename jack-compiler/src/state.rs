//! Per-file compilation state: scoped symbol tables and label counters.
//!
//! One `CompileState` lives for the compilation of one Jack class. The class
//! scope (`static`/`field`) persists across subroutines; the subroutine scope
//! (`argument`/`local`) is cleared at each subroutine declaration. Lookup is
//! subroutine-first, so a local or argument legally shadows a class variable.

use crate::error::{CompileError, Result};
use crate::token::Span;
use std::collections::HashMap;

/// Storage class of a Jack variable, determining its VM segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Static,
    Field,
    Argument,
    Local,
}

impl VarKind {
    /// The VM segment this kind of variable lives in.
    pub fn segment(self) -> &'static str {
        match self {
            VarKind::Static => "static",
            VarKind::Field => "this",
            VarKind::Argument => "argument",
            VarKind::Local => "local",
        }
    }

    fn is_class_level(self) -> bool {
        matches!(self, VarKind::Static | VarKind::Field)
    }
}

/// A resolved variable: declared type, storage class, and the zero-based
/// ordinal within that storage class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarEntry {
    pub ty: String,
    pub kind: VarKind,
    pub index: u16,
}

/// Which statement-label family a counter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    While,
    If,
}

#[derive(Debug, Default)]
pub struct CompileState {
    class_name: String,
    subroutine_name: String,
    class_scope: HashMap<String, VarEntry>,
    subroutine_scope: HashMap<String, VarEntry>,
    static_count: u16,
    field_count: u16,
    argument_count: u16,
    local_count: u16,
    /// Subroutine key -> (while labels issued, if labels issued).
    label_counters: HashMap<String, (u32, u32)>,
    /// `{class}.{subroutine}.{argc}`, fixed once the parameter list is
    /// complete and reused for the function header and every label inside.
    subroutine_key: String,
}

impl CompileState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new class: clear the class scope and its counters.
    pub fn enter_class(&mut self, name: &str) {
        self.class_name = name.to_string();
        self.class_scope.clear();
        self.static_count = 0;
        self.field_count = 0;
    }

    /// Begin a new subroutine: clear the subroutine scope and its counters.
    pub fn reset_subroutine_scope(&mut self) {
        self.subroutine_scope.clear();
        self.argument_count = 0;
        self.local_count = 0;
    }

    pub fn set_subroutine_name(&mut self, name: &str) {
        self.subroutine_name = name.to_string();
    }

    /// Reserve argument index 0 for the implicit receiver of a method.
    /// The slot gets no named entry; `this` is reached through `pointer 0`.
    pub fn reserve_argument(&mut self) {
        self.argument_count += 1;
    }

    /// Insert a variable into the scope its kind belongs to, assigning the
    /// next index for that kind. Within one scope, the last definition wins.
    pub fn define(&mut self, name: &str, ty: &str, kind: VarKind) {
        let counter = match kind {
            VarKind::Static => &mut self.static_count,
            VarKind::Field => &mut self.field_count,
            VarKind::Argument => &mut self.argument_count,
            VarKind::Local => &mut self.local_count,
        };
        let entry = VarEntry {
            ty: ty.to_string(),
            kind,
            index: *counter,
        };
        *counter += 1;

        if kind.is_class_level() {
            self.class_scope.insert(name.to_string(), entry);
        } else {
            self.subroutine_scope.insert(name.to_string(), entry);
        }
    }

    /// Resolve a name, subroutine scope first.
    pub fn lookup(&self, name: &str) -> Option<&VarEntry> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    /// Number of variables defined so far for a kind in the current scope.
    pub fn count(&self, kind: VarKind) -> u16 {
        match kind {
            VarKind::Static => self.static_count,
            VarKind::Field => self.field_count,
            VarKind::Argument => self.argument_count,
            VarKind::Local => self.local_count,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Fix the current subroutine's key from the argument count as it stands
    /// now. Must be called once per subroutine, after its parameters are
    /// defined and before any labels or the function header are emitted.
    pub fn latch_subroutine_key(&mut self) {
        let key = format!(
            "{}.{}.{}",
            self.class_name, self.subroutine_name, self.argument_count
        );
        self.label_counters.insert(key.clone(), (0, 0));
        self.subroutine_key = key;
    }

    /// The latched `{class}.{subroutine}.{argc}` key.
    pub fn subroutine_key(&self) -> &str {
        &self.subroutine_key
    }

    /// Issue the next 0-based label ordinal for the current subroutine.
    pub fn fresh_label(&mut self, kind: LabelKind) -> u32 {
        let counters = self
            .label_counters
            .entry(self.subroutine_key.clone())
            .or_insert((0, 0));
        let slot = match kind {
            LabelKind::While => &mut counters.0,
            LabelKind::If => &mut counters.1,
        };
        let issued = *slot;
        *slot += 1;
        issued
    }

    /// Render a `push`/`pop` command for a named variable, mapping `field`
    /// to the `this` segment. Unknown names are fatal.
    pub fn var_access(&self, name: &str, span: Span, push: bool) -> Result<String> {
        let entry = self
            .lookup(name)
            .ok_or_else(|| CompileError::undefined_variable(name, span))?;
        Ok(format!(
            "{} {} {}",
            if push { "push" } else { "pop" },
            entry.kind.segment(),
            entry.index
        ))
    }
}
