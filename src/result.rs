//! Rows of the watch window
//!
//! An `EvalResult` is one line of a watch/locals display. Rows are built once by
//! the provider or by an expansion and never change afterwards; expanding a row
//! produces new rows through its `child_expansion`.

use crate::expansion::Expansion;
use crate::value::{DebugValue, TypeRef};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

bitflags! {
    /// Presentation flags of a row
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ResultFlags: u32 {
        const READ_ONLY = 1 << 0;
        const EXPANDABLE = 1 << 1;
    }
}

impl Default for ResultFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// What kind of entity a row shows, used for the UI icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Data,
    Property,
    Method,
    Class,
    Interface,
    Other,
}

/// Which part of the expansion framework produced a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionKind {
    /// Root row created by the provider
    Root,
    /// Field or property row from a member expansion
    Member,
    /// Element row from an array expansion
    ArrayElement,
    /// Native interface pointer row
    NativeView,
    /// Informational row that stands in for a value
    Explicit,
}

/// One row of an expansion tree
#[derive(Debug, Clone, Serialize)]
pub struct EvalResult {
    name: String,
    full_name: Option<String>,
    child_full_name_prefix: Option<String>,
    declared_type: Option<TypeRef>,
    runtime_type: Option<TypeRef>,
    display_value: Option<String>,
    value: Option<DebugValue>,
    kind: ExpansionKind,
    #[serde(skip)]
    child_expansion: Option<Arc<dyn Expansion>>,
    flags: ResultFlags,
    category: Category,
    editable_value: Option<String>,
    format_specifiers: Vec<String>,
}

impl EvalResult {
    /// Row backed by a value
    pub fn for_value(
        kind: ExpansionKind,
        name: impl Into<String>,
        declared_type: TypeRef,
        value: DebugValue,
    ) -> Self {
        Self {
            name: name.into(),
            full_name: None,
            child_full_name_prefix: None,
            declared_type: Some(declared_type),
            runtime_type: Some(value.type_ref.clone()),
            display_value: None,
            value: Some(value),
            kind,
            child_expansion: None,
            flags: ResultFlags::empty(),
            category: Category::Data,
            editable_value: None,
            format_specifiers: Vec::new(),
        }
    }

    /// Read-only informational row with a fixed display value and no children
    pub fn explicit(name: impl Into<String>, display_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: None,
            child_full_name_prefix: None,
            declared_type: None,
            runtime_type: None,
            display_value: Some(display_value.into()),
            value: None,
            kind: ExpansionKind::Explicit,
            child_expansion: None,
            flags: ResultFlags::READ_ONLY,
            category: Category::Data,
            editable_value: None,
            format_specifiers: Vec::new(),
        }
    }

    /// Set the full name; children extend it through a parenthesized prefix
    /// when the expression is not a plain path
    pub fn with_full_name(mut self, full_name: Option<String>) -> Self {
        self.child_full_name_prefix = full_name.as_deref().map(|name| {
            if needs_parentheses(name) {
                format!("({})", name)
            } else {
                name.to_string()
            }
        });
        self.full_name = full_name;
        self
    }

    pub fn with_child_full_name_prefix(mut self, prefix: Option<String>) -> Self {
        self.child_full_name_prefix = prefix;
        self
    }

    pub fn with_expansion(mut self, expansion: Option<Arc<dyn Expansion>>) -> Self {
        self.flags.set(ResultFlags::EXPANDABLE, expansion.is_some());
        self.child_expansion = expansion;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_editable_value(mut self, editable_value: Option<String>) -> Self {
        self.editable_value = editable_value;
        self
    }

    /// Mark read-only; a read-only row never offers an editable value
    pub fn read_only(mut self) -> Self {
        self.flags.insert(ResultFlags::READ_ONLY);
        self.editable_value = None;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    pub fn child_full_name_prefix(&self) -> Option<&str> {
        self.child_full_name_prefix.as_deref()
    }

    pub fn declared_type(&self) -> Option<&TypeRef> {
        self.declared_type.as_ref()
    }

    pub fn runtime_type(&self) -> Option<&TypeRef> {
        self.runtime_type.as_ref()
    }

    /// Precomputed display value; `None` means the provider formats it on demand
    pub fn display_value(&self) -> Option<&str> {
        self.display_value.as_deref()
    }

    pub fn value(&self) -> Option<&DebugValue> {
        self.value.as_ref()
    }

    pub fn kind(&self) -> ExpansionKind {
        self.kind
    }

    pub fn child_expansion(&self) -> Option<&Arc<dyn Expansion>> {
        self.child_expansion.as_ref()
    }

    pub fn has_children(&self) -> bool {
        self.child_expansion.is_some()
    }

    pub fn flags(&self) -> ResultFlags {
        self.flags
    }

    pub fn is_read_only(&self) -> bool {
        self.flags.contains(ResultFlags::READ_ONLY)
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn editable_value(&self) -> Option<&str> {
        self.editable_value.as_deref()
    }

    pub fn format_specifiers(&self) -> &[String] {
        &self.format_specifiers
    }
}

impl PartialEq for EvalResult {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.full_name == other.full_name
            && self.child_full_name_prefix == other.child_full_name_prefix
            && self.declared_type == other.declared_type
            && self.runtime_type == other.runtime_type
            && self.display_value == other.display_value
            && self.value == other.value
            && self.kind == other.kind
            && self.child_expansion.as_ref().map(|e| e.name())
                == other.child_expansion.as_ref().map(|e| e.name())
            && self.flags == other.flags
            && self.category == other.category
            && self.editable_value == other.editable_value
            && self.format_specifiers == other.format_specifiers
    }
}

/// Whether an expression must be parenthesized before a member access or
/// indexer is appended to it
fn needs_parentheses(expr: &str) -> bool {
    let expr = expr.trim();

    // A leading cast such as `(Foo)bar` binds looser than `.`
    if expr.starts_with('(') {
        let mut depth = 0usize;
        for (i, c) in expr.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return i + 1 != expr.len();
                    }
                }
                _ => {}
            }
        }
        return true;
    }

    let mut depth = 0usize;
    for c in expr.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            c if depth == 0 && (c.is_whitespace() || "+-*/%?:!&|^<>=~,".contains(c)) => {
                return true;
            }
            _ => {}
        }
    }
    false
}
