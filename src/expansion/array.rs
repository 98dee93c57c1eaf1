//! Elements of an array value
//!
//! Arrays may be multi-dimensional with non-zero lower bounds. Elements are
//! shown in row-major order and named by their indices, e.g. `[1, 0]`. Rows
//! before and after the window are counted in one step rather than visited.

use super::{child_full_name, create_expansion, Cursor, Expansion, ExpansionOptions, Window};
use crate::context::InspectionContext;
use crate::error::{ExpansionError, ExpansionResult};
use crate::result::{EvalResult, ExpansionKind};
use crate::value::{DebugValue, Dimension, TypeRef, ValueKind};
use std::sync::Arc;

#[derive(Debug)]
pub struct ArrayExpansion {
    dimensions: Vec<Dimension>,
    options: ExpansionOptions,
}

impl ArrayExpansion {
    /// Build the expansion for an array, `None` when it has no elements
    pub fn create(value: &DebugValue, options: ExpansionOptions) -> Option<Arc<dyn Expansion>> {
        let dimensions = value.array_dimensions()?;
        let expansion = Self {
            dimensions,
            options,
        };
        if expansion.len() == Some(0) {
            return None;
        }
        Some(Arc::new(expansion))
    }

    /// Total number of elements, `None` when the dimensions cannot be indexed
    ///
    /// Every index must be addressable: the element count fits in `usize` and
    /// the last index of each dimension fits in `i64`.
    fn len(&self) -> Option<usize> {
        self.dimensions.iter().try_fold(1usize, |total, dim| {
            let last = i64::try_from(dim.length.saturating_sub(1)).ok()?;
            dim.lower_bound.checked_add(last)?;
            total.checked_mul(dim.length)
        })
    }

    /// Indexer text for the element at a flat, row-major position
    fn element_name(&self, mut flat: usize) -> Option<String> {
        let mut indices = vec![0i64; self.dimensions.len()];
        for (slot, dim) in indices.iter_mut().zip(&self.dimensions).rev() {
            let offset = i64::try_from(flat % dim.length).ok()?;
            *slot = dim.lower_bound.checked_add(offset)?;
            flat /= dim.length;
        }
        let indices: Vec<String> = indices.iter().map(|i| i.to_string()).collect();
        Some(format!("[{}]", indices.join(", ")))
    }

    fn row(
        &self,
        parent: &EvalResult,
        element_type: &TypeRef,
        flat: usize,
        element: &DebugValue,
    ) -> Option<EvalResult> {
        let name = self.element_name(flat)?;
        let row = EvalResult::for_value(
            ExpansionKind::ArrayElement,
            name.clone(),
            element_type.clone(),
            element.clone(),
        )
        .with_full_name(child_full_name(parent, &name))
        .with_editable_value(element.editable_text())
        .with_expansion(create_expansion(element, self.options));
        Some(row)
    }
}

impl Expansion for ArrayExpansion {
    fn name(&self) -> &'static str {
        "array"
    }

    fn get_rows(
        &self,
        ctx: &InspectionContext,
        rows: &mut Vec<EvalResult>,
        parent: &EvalResult,
        value: &DebugValue,
        window: Window,
        cursor: &mut Cursor,
    ) -> ExpansionResult<()> {
        let ValueKind::Array {
            element_type,
            elements,
            ..
        } = &value.data
        else {
            return Err(ExpansionError::UnexpectedValueShape {
                expected: "array",
                type_name: value.type_ref.to_string(),
            });
        };

        let malformed = || ExpansionError::UnexpectedValueShape {
            expected: "array with an element for every index",
            type_name: value.type_ref.to_string(),
        };
        let total = match self.len() {
            Some(total) if elements.len() >= total => total,
            _ => return Err(malformed()),
        };

        // Elements ahead of the window
        let mut i = if window.visit_all {
            0
        } else {
            window.start.saturating_sub(cursor.index()).min(total)
        };
        cursor.skip(i);

        while i < total && window.contains(cursor.index()) {
            if ctx.is_cancelled() {
                return Err(ExpansionError::Cancelled);
            }
            let row = self
                .row(parent, element_type, i, &elements[i])
                .ok_or_else(malformed)?;
            rows.push(row);
            cursor.advance();
            i += 1;
        }

        // Elements past the window
        cursor.skip(total - i);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DebuggeeProcess;
    use pretty_assertions::assert_eq;

    fn ints(n: usize) -> Vec<DebugValue> {
        (0..n)
            .map(|i| DebugValue::primitive("Int32", i.to_string()))
            .collect()
    }

    fn parent(value: &DebugValue) -> EvalResult {
        EvalResult::for_value(ExpansionKind::Root, "a", value.type_ref.clone(), value.clone())
            .with_full_name(Some("a".to_string()))
    }

    fn ctx() -> InspectionContext {
        InspectionContext::new(Arc::new(DebuggeeProcess::new(true)))
    }

    fn expand(value: &DebugValue, window: Window, cursor: &mut Cursor) -> Vec<EvalResult> {
        let expansion = ArrayExpansion::create(value, ExpansionOptions::default()).unwrap();
        let mut rows = Vec::new();
        expansion
            .get_rows(&ctx(), &mut rows, &parent(value), value, window, cursor)
            .unwrap();
        rows
    }

    #[test]
    fn test_one_dimensional_page() {
        let value = DebugValue::array("Int32", ints(10));
        let mut cursor = Cursor::new();
        let rows = expand(&value, Window::page(4, 3), &mut cursor);

        let names: Vec<&str> = rows.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["[4]", "[5]", "[6]"]);
        assert_eq!(rows[0].full_name(), Some("a[4]"));
        assert_eq!(rows[0].editable_value(), Some("4"));
        assert_eq!(rows[0].declared_type().unwrap().name(), "Int32");
        assert_eq!(cursor.index(), 10);
    }

    #[test]
    fn test_offset_cursor() {
        let value = DebugValue::array("Int32", ints(4));
        let mut cursor = Cursor::new();
        cursor.skip(3);
        let rows = expand(&value, Window::page(2, 2), &mut cursor);

        // positions 3..7, window covers position 3 only
        let names: Vec<&str> = rows.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["[0]"]);
        assert_eq!(cursor.index(), 7);
    }

    #[test]
    fn test_window_past_end() {
        let value = DebugValue::array("Int32", ints(3));
        let mut cursor = Cursor::new();
        let rows = expand(&value, Window::page(50, 10), &mut cursor);
        assert!(rows.is_empty());
        assert_eq!(cursor.index(), 3);
    }

    #[test]
    fn test_multi_dimensional_names() {
        let value = DebugValue::multi_array(
            "Int32",
            vec![
                Dimension {
                    length: 2,
                    lower_bound: -1,
                },
                Dimension::new(3),
            ],
            ints(6),
        );
        let rows = expand(&value, Window::all(), &mut Cursor::new());

        let names: Vec<&str> = rows.iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec!["[-1, 0]", "[-1, 1]", "[-1, 2]", "[0, 0]", "[0, 1]", "[0, 2]"]
        );
        assert_eq!(rows[4].full_name(), Some("a[0, 1]"));
    }

    #[test]
    fn test_empty_array_has_no_expansion() {
        let empty = DebugValue::array("Int32", vec![]);
        assert!(ArrayExpansion::create(&empty, ExpansionOptions::default()).is_none());
    }

    #[test]
    fn test_missing_elements() {
        let value = DebugValue::multi_array("Int32", vec![Dimension::new(4)], ints(2));
        let expansion = ArrayExpansion::create(&value, ExpansionOptions::default()).unwrap();
        let err = expand_err(&expansion, &value);
        assert!(matches!(err, ExpansionError::UnexpectedValueShape { .. }));
    }

    fn expand_err(expansion: &Arc<dyn Expansion>, value: &DebugValue) -> ExpansionError {
        let mut cursor = Cursor::new();
        expansion
            .get_rows(
                &ctx(),
                &mut Vec::new(),
                &parent(value),
                value,
                Window::all(),
                &mut cursor,
            )
            .unwrap_err()
    }

    #[test]
    fn test_element_count_overflow() {
        let value = DebugValue::multi_array(
            "Int32",
            vec![Dimension::new(usize::MAX / 4), Dimension::new(usize::MAX / 4)],
            ints(2),
        );
        let expansion = ArrayExpansion::create(&value, ExpansionOptions::default()).unwrap();
        let err = expand_err(&expansion, &value);
        assert!(matches!(err, ExpansionError::UnexpectedValueShape { .. }));
    }

    #[test]
    fn test_lower_bound_overflow() {
        let value = DebugValue::multi_array(
            "Int32",
            vec![Dimension {
                length: 2,
                lower_bound: i64::MAX,
            }],
            ints(2),
        );
        let expansion = ArrayExpansion::create(&value, ExpansionOptions::default()).unwrap();
        let err = expand_err(&expansion, &value);
        assert!(matches!(err, ExpansionError::UnexpectedValueShape { .. }));

        // The last index may sit exactly on the bound
        let value = DebugValue::multi_array(
            "Int32",
            vec![Dimension {
                length: 2,
                lower_bound: i64::MAX - 1,
            }],
            ints(2),
        );
        let rows = expand(&value, Window::all(), &mut Cursor::new());
        assert_eq!(rows[1].name(), format!("[{}]", i64::MAX));
    }
}
