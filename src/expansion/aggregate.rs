//! Composite of several expansions presented as one list

use super::{Cursor, Expansion, Window};
use crate::context::InspectionContext;
use crate::error::{ExpansionError, ExpansionResult};
use crate::result::EvalResult;
use crate::value::DebugValue;
use std::sync::Arc;

/// Concatenates the rows of its children; numbering continues across children
#[derive(Debug)]
pub struct AggregateExpansion {
    expansions: Vec<Arc<dyn Expansion>>,
}

impl AggregateExpansion {
    /// Combine expansions: none yields `None`, a single one is returned as is
    pub fn create(mut expansions: Vec<Arc<dyn Expansion>>) -> Option<Arc<dyn Expansion>> {
        match expansions.len() {
            0 => None,
            1 => expansions.pop(),
            _ => Some(Arc::new(Self { expansions })),
        }
    }

    pub fn expansions(&self) -> &[Arc<dyn Expansion>] {
        &self.expansions
    }
}

impl Expansion for AggregateExpansion {
    fn name(&self) -> &'static str {
        "aggregate"
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
        for expansion in &self.expansions {
            if ctx.is_cancelled() {
                return Err(ExpansionError::Cancelled);
            }
            expansion.get_rows(ctx, rows, parent, value, window, cursor)?;

            // The page is full; later children cannot contribute.
            if !window.visit_all && cursor.index() >= window.end() {
                break;
            }
        }
        Ok(())
    }
}
