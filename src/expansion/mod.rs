//! Expansions turn one inspected value into a paginated sequence of rows
//!
//! Every variant follows the same counting discipline. Each row the variant
//! would produce advances the shared [`Cursor`] exactly once, and the row is
//! materialized only when the cursor position falls inside the requested
//! [`Window`]. Composite expansions thread the same cursor through their
//! children, so a flat page can be cut out of a tree of heterogeneous
//! expansions without building every row.

mod aggregate;
mod array;
mod members;
mod native_view;

pub use aggregate::AggregateExpansion;
pub use array::ArrayExpansion;
pub use members::MemberExpansion;
pub use native_view::{format_native_address, NativeViewExpansion};

use crate::context::InspectionContext;
use crate::error::ExpansionResult;
use crate::result::EvalResult;
use crate::value::{DebugValue, ValueKind};
use std::fmt;
use std::sync::Arc;

/// The page of rows a caller asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub count: usize,
    /// Ignore `start`/`count` and produce every row
    pub visit_all: bool,
}

impl Window {
    /// Rows `[start, start + count)`
    pub fn page(start: usize, count: usize) -> Self {
        Self {
            start,
            count,
            visit_all: false,
        }
    }

    /// Every row, regardless of position
    pub fn all() -> Self {
        Self {
            start: 0,
            count: usize::MAX,
            visit_all: true,
        }
    }

    /// Counts rows without materializing any of them
    pub fn none() -> Self {
        Self::page(usize::MAX, 0)
    }

    /// First position past the window
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.count)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.visit_all || (index >= self.start && index - self.start < self.count)
    }
}

/// Running count of rows considered so far in one traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the next row to be considered
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn advance(&mut self) {
        self.index += 1;
    }

    /// Count `rows` rows without looking at them
    pub fn skip(&mut self, rows: usize) {
        self.index += rows;
    }
}

/// Options that shape which expansions apply to a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionOptions {
    pub show_static_members: bool,
    pub native_view: bool,
}

impl Default for ExpansionOptions {
    fn default() -> Self {
        Self {
            show_static_members: false,
            native_view: true,
        }
    }
}

/// A producer of child rows for a value
///
/// Implementations hold no per-request state and are shared across threads.
pub trait Expansion: fmt::Debug + Send + Sync {
    /// Short name used in logs and row comparisons
    fn name(&self) -> &'static str;

    /// Advance `cursor` once per row this expansion produces for `value`, and
    /// append to `rows` each row whose position falls inside `window`
    fn get_rows(
        &self,
        ctx: &InspectionContext,
        rows: &mut Vec<EvalResult>,
        parent: &EvalResult,
        value: &DebugValue,
        window: Window,
        cursor: &mut Cursor,
    ) -> ExpansionResult<()>;
}

/// Pick the expansion for a value, or `None` when it has no children
pub fn create_expansion(
    value: &DebugValue,
    options: ExpansionOptions,
) -> Option<Arc<dyn Expansion>> {
    match &value.data {
        ValueKind::Null | ValueKind::Primitive { .. } | ValueKind::String { .. } => None,
        ValueKind::Array { .. } => ArrayExpansion::create(value, options),
        ValueKind::Object { .. } => {
            let mut expansions = Vec::new();
            if let Some(members) = MemberExpansion::create(value, options) {
                expansions.push(members);
            }
            if options.native_view && value.native_com_pointer.is_some_and(|ptr| ptr != 0) {
                expansions.push(NativeViewExpansion::instance());
            }
            AggregateExpansion::create(expansions)
        }
    }
}

/// Build the full name of a child from its parent's prefix
pub(crate) fn child_full_name(parent: &EvalResult, suffix: &str) -> Option<String> {
    parent
        .child_full_name_prefix()
        .map(|prefix| format!("{}{}", prefix, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Member;

    #[test]
    fn test_window_contains() {
        let window = Window::page(2, 3);
        assert!(!window.contains(1));
        assert!(window.contains(2));
        assert!(window.contains(4));
        assert!(!window.contains(5));
        assert_eq!(window.end(), 5);

        let unbounded = Window::page(3, usize::MAX);
        assert!(unbounded.contains(usize::MAX - 1));
        assert_eq!(unbounded.end(), usize::MAX);

        assert!(Window::all().contains(0));
        assert!(Window::all().contains(1_000_000));
        assert!(!Window::none().contains(0));
    }

    #[test]
    fn test_cursor_counts() {
        let mut cursor = Cursor::new();
        cursor.advance();
        cursor.skip(4);
        assert_eq!(cursor.index(), 5);
    }

    #[test]
    fn test_create_expansion_by_shape() {
        let options = ExpansionOptions::default();
        assert!(create_expansion(&DebugValue::null("Object"), options).is_none());
        assert!(create_expansion(&DebugValue::primitive("Int32", "1"), options).is_none());
        assert!(create_expansion(&DebugValue::array("Int32", vec![]), options).is_none());

        let plain = DebugValue::object(
            "Point",
            vec![Member::field("X", DebugValue::primitive("Int32", "1"))],
        );
        assert_eq!(create_expansion(&plain, options).unwrap().name(), "members");

        let com = DebugValue::object("System.__ComObject", vec![]).with_native_com_pointer(0x10);
        assert_eq!(create_expansion(&com, options).unwrap().name(), "native_view");

        let both = plain.clone().with_native_com_pointer(0x10);
        assert_eq!(create_expansion(&both, options).unwrap().name(), "aggregate");

        let hidden = ExpansionOptions {
            native_view: false,
            ..options
        };
        assert!(create_expansion(&com, hidden).is_none());
        let null_pointer = DebugValue::object("Empty", vec![]).with_native_com_pointer(0);
        assert!(create_expansion(&null_pointer, options).is_none());
    }
}
