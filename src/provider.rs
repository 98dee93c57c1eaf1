//! Result provider - builds root rows and serves pages of their children

use crate::config::Config;
use crate::context::InspectionContext;
use crate::error::ExpansionResult;
use crate::expansion::{create_expansion, format_native_address, Cursor, Window};
use crate::result::{EvalResult, ExpansionKind};
use crate::value::{DebugValue, ValueKind};
use tracing::{debug, trace, warn};

/// Renders values as display strings
pub trait Formatter: Send + Sync {
    fn format_value(&self, value: &DebugValue, ctx: &InspectionContext) -> ExpansionResult<String>;
}

/// Minimal formatter: primitives as their text, strings quoted, objects and
/// arrays as their type in braces
///
/// Objects wrapping a native COM interface are followed by the interface
/// address, padded to the process pointer width.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

impl Formatter for DefaultFormatter {
    fn format_value(&self, value: &DebugValue, ctx: &InspectionContext) -> ExpansionResult<String> {
        Ok(match &value.data {
            ValueKind::Null => "null".to_string(),
            ValueKind::Primitive { text } => text.clone(),
            ValueKind::String { text } => format!("{:?}", text),
            ValueKind::Object { .. } => match value.native_com_pointer {
                Some(ptr) if ptr != 0 => {
                    let width = ctx.process().pointer_width();
                    format!("{{{}}} {}", value.type_ref, format_native_address(ptr, width))
                }
                _ => format!("{{{}}}", value.type_ref),
            },
            ValueKind::Array { element_type, .. } => {
                let lengths: Vec<String> = value
                    .array_dimensions()
                    .unwrap_or_default()
                    .iter()
                    .map(|d| d.length.to_string())
                    .collect();
                format!("{{{}[{}]}}", element_type, lengths.join(", "))
            }
        })
    }
}

/// Creates rows for inspected values and pages through their expansions
pub struct ResultProvider {
    config: Config,
    formatter: Box<dyn Formatter>,
}

impl ResultProvider {
    pub fn new(config: Config) -> Self {
        Self::with_formatter(config, DefaultFormatter)
    }

    pub fn with_formatter(config: Config, formatter: impl Formatter + 'static) -> Self {
        Self {
            config,
            formatter: Box::new(formatter),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the root row for a value
    ///
    /// `full_name` is the expression that produced the value; children extend
    /// it so each row can be re-evaluated on its own.
    pub fn evaluate(
        &self,
        name: impl Into<String>,
        full_name: Option<String>,
        value: DebugValue,
    ) -> EvalResult {
        let expansion = create_expansion(&value, self.config.expansion_options());
        let editable = value.editable_text();
        EvalResult::for_value(ExpansionKind::Root, name, value.type_ref.clone(), value)
            .with_full_name(full_name)
            .with_editable_value(editable)
            .with_expansion(expansion)
    }

    /// Children `[start, start + count)` of a row
    pub fn get_children(
        &self,
        ctx: &InspectionContext,
        row: &EvalResult,
        start: usize,
        count: usize,
    ) -> ExpansionResult<Vec<EvalResult>> {
        let (rows, _) = self.get_rows(ctx, row, Window::page(start, count))?;
        Ok(rows)
    }

    /// Every child of a row
    pub fn get_all_children(
        &self,
        ctx: &InspectionContext,
        row: &EvalResult,
    ) -> ExpansionResult<Vec<EvalResult>> {
        let (rows, _) = self.get_rows(ctx, row, Window::all())?;
        Ok(rows)
    }

    /// Children of a row with the given name
    pub fn find_children_named(
        &self,
        ctx: &InspectionContext,
        row: &EvalResult,
        name: &str,
    ) -> ExpansionResult<Vec<EvalResult>> {
        let mut rows = self.get_all_children(ctx, row)?;
        rows.retain(|child| child.name() == name);
        Ok(rows)
    }

    /// Number of children, counted without materializing any of them
    pub fn child_count(
        &self,
        ctx: &InspectionContext,
        row: &EvalResult,
    ) -> ExpansionResult<usize> {
        let (_, cursor) = self.get_rows(ctx, row, Window::none())?;
        Ok(cursor.index())
    }

    /// Display value of a row, formatting the backing value if needed
    pub fn display_value(
        &self,
        ctx: &InspectionContext,
        row: &EvalResult,
    ) -> ExpansionResult<String> {
        if let Some(display) = row.display_value() {
            return Ok(display.to_string());
        }
        match row.value() {
            Some(value) => self.formatter.format_value(value, ctx),
            None => Ok(String::new()),
        }
    }

    fn get_rows(
        &self,
        ctx: &InspectionContext,
        row: &EvalResult,
        window: Window,
    ) -> ExpansionResult<(Vec<EvalResult>, Cursor)> {
        let mut rows = Vec::new();
        let mut cursor = Cursor::new();

        let (Some(expansion), Some(value)) = (row.child_expansion(), row.value()) else {
            trace!(row = row.name(), "row has no children");
            return Ok((rows, cursor));
        };

        if let Err(err) = expansion.get_rows(ctx, &mut rows, row, value, window, &mut cursor) {
            warn!(
                row = row.name(),
                expansion = expansion.name(),
                error = %err,
                "expansion failed"
            );
            return Err(err);
        }
        debug!(
            row = row.name(),
            expansion = expansion.name(),
            start = window.start,
            visit_all = window.visit_all,
            produced = rows.len(),
            considered = cursor.index(),
            "expanded row"
        );
        Ok((rows, cursor))
    }
}

impl Default for ResultProvider {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
