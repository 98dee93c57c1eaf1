//! Raw members of an object value

use super::{child_full_name, create_expansion, Cursor, Expansion, ExpansionOptions, Window};
use crate::context::{EvaluationFlags, InspectionContext};
use crate::error::{ExpansionError, ExpansionResult};
use crate::result::{Category, EvalResult, ExpansionKind};
use crate::value::{DebugValue, Member, ValueKind, Visibility};
use std::sync::Arc;

/// One row per field or property, instance members first in declaration
/// order, then static members when enabled
#[derive(Debug)]
pub struct MemberExpansion {
    /// Indices into the object's member list, in display order
    order: Vec<usize>,
    options: ExpansionOptions,
}

impl MemberExpansion {
    /// Build the expansion for an object, `None` when nothing would be shown
    pub fn create(value: &DebugValue, options: ExpansionOptions) -> Option<Arc<dyn Expansion>> {
        let members = value.members();
        let instance = members.iter().enumerate().filter(|(_, m)| !m.is_static);
        let statics = members
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_static && options.show_static_members);

        let order: Vec<usize> = instance.chain(statics).map(|(i, _)| i).collect();
        if order.is_empty() {
            return None;
        }
        Some(Arc::new(Self { order, options }))
    }

    fn row(&self, parent: &EvalResult, member: &Member) -> EvalResult {
        let category = if member.is_property {
            Category::Property
        } else {
            Category::Data
        };

        let row = EvalResult::for_value(
            ExpansionKind::Member,
            member.name.clone(),
            member.declared_type.clone(),
            member.value.clone(),
        )
        .with_full_name(child_full_name(parent, &format!(".{}", member.name)))
        .with_category(category)
        .with_editable_value(member.value.editable_text())
        .with_expansion(create_expansion(&member.value, self.options));

        if member.read_only {
            row.read_only()
        } else {
            row
        }
    }
}

impl Expansion for MemberExpansion {
    fn name(&self) -> &'static str {
        "members"
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
        let ValueKind::Object { members } = &value.data else {
            return Err(ExpansionError::UnexpectedValueShape {
                expected: "object",
                type_name: value.type_ref.to_string(),
            });
        };

        let hide_non_public = ctx.flags().contains(EvaluationFlags::HIDE_NON_PUBLIC);

        for &i in &self.order {
            let Some(member) = members.get(i) else {
                return Err(ExpansionError::UnexpectedValueShape {
                    expected: "object with matching members",
                    type_name: value.type_ref.to_string(),
                });
            };
            if hide_non_public && member.visibility == Visibility::NonPublic {
                continue;
            }
            if ctx.is_cancelled() {
                return Err(ExpansionError::Cancelled);
            }

            if window.contains(cursor.index()) {
                rows.push(self.row(parent, member));
            }
            cursor.advance();
        }
        Ok(())
    }
}
