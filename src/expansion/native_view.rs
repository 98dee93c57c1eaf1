//! The "Native View" row of a COM wrapper
//!
//! Produces a single row naming the native interface pointer behind a runtime
//! callable wrapper, so the user can continue in a native evaluator. When the
//! process cannot be inspected natively the row is replaced by an explanatory
//! placeholder instead of failing the request.

use super::{Cursor, Expansion, Window};
use crate::context::{InspectionContext, PointerWidth};
use crate::error::{ExpansionError, ExpansionResult};
use crate::result::{Category, EvalResult, ExpansionKind};
use crate::value::DebugValue;
use lazy_static::lazy_static;
use std::sync::Arc;
use tracing::debug;

/// Label of the placeholder row
pub const NATIVE_VIEW_NAME: &str = "Native View";

/// Display value of the placeholder row
pub const NATIVE_VIEW_REQUIRES_NATIVE_DEBUGGING: &str =
    "Native View requires native debugging to be enabled.";

/// Cast marker in front of the address
const INTERFACE_CAST: &str = "(IUnknown*)";

/// Marks the full name as native expression text
const NATIVE_LANGUAGE_PREFIX: &str = "{C++}";

lazy_static! {
    static ref INSTANCE: Arc<NativeViewExpansion> = Arc::new(NativeViewExpansion { _private: () });
}

/// Single-row expansion exposing the native interface pointer of a value
#[derive(Debug)]
pub struct NativeViewExpansion {
    _private: (),
}

impl NativeViewExpansion {
    /// The process-wide instance
    pub fn instance() -> Arc<dyn Expansion> {
        INSTANCE.clone()
    }

    fn row(&self, ctx: &InspectionContext, value: &DebugValue) -> ExpansionResult<EvalResult> {
        if let Err(err) = ctx.process().native_runtime() {
            debug!(error = %err, "native view unavailable, showing placeholder");
            return Ok(EvalResult::explicit(
                NATIVE_VIEW_NAME,
                NATIVE_VIEW_REQUIRES_NATIVE_DEBUGGING,
            ));
        }

        let pointer = value
            .native_com_pointer
            .ok_or_else(|| ExpansionError::MissingNativePointer {
                type_name: value.type_ref.to_string(),
            })?;

        let address = format_native_address(pointer, ctx.process().pointer_width());
        let name = format!("{}{}", INTERFACE_CAST, address);
        let full_name = format!("{}{}", NATIVE_LANGUAGE_PREFIX, name);

        Ok(EvalResult::for_value(
            ExpansionKind::NativeView,
            name,
            value.type_ref.clone(),
            value.clone(),
        )
        .with_full_name(Some(full_name.clone()))
        .with_child_full_name_prefix(Some(full_name))
        .with_category(Category::Data)
        .read_only())
    }
}

impl Expansion for NativeViewExpansion {
    fn name(&self) -> &'static str {
        "native_view"
    }

    fn get_rows(
        &self,
        ctx: &InspectionContext,
        rows: &mut Vec<EvalResult>,
        _parent: &EvalResult,
        value: &DebugValue,
        window: Window,
        cursor: &mut Cursor,
    ) -> ExpansionResult<()> {
        // Querying the native runtime is a side effect; the row is not even counted.
        if ctx.is_side_effect_free() {
            return Ok(());
        }

        if window.contains(cursor.index()) {
            rows.push(self.row(ctx, value)?);
        }
        cursor.advance();
        Ok(())
    }
}

/// Format an address as `0x` followed by lower-case hex, zero-padded to the
/// pointer width
pub fn format_native_address(address: u64, width: PointerWidth) -> String {
    format!("0x{:0width$x}", address, width = width.hex_digits())
}
