//! Remote evaluation boundary
//!
//! Expansion requests may arrive from another process. Everything that crosses
//! the boundary is plain serializable data: the request carries the root value
//! and the path of child names to walk, the response carries formatted rows.
//! `LocalEvaluationService` answers requests in-process and is what a
//! transport would wrap.

use crate::context::{EvaluationFlags, InspectionContext, Process};
use crate::provider::ResultProvider;
use crate::result::{Category, EvalResult, ExpansionKind};
use crate::snapshot::Snapshot;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the expression evaluator service
pub const EXPRESSION_EVALUATOR_SERVICE: &str = "expressionEvaluatorService";
pub const EXPRESSION_EVALUATOR_SERVICE_GET_CHILDREN: &str = "GetChildren";
pub const EXPRESSION_EVALUATOR_SERVICE_GET_ALL_CHILDREN: &str = "GetAllChildren";
pub const EXPRESSION_EVALUATOR_SERVICE_GET_CHILD_COUNT: &str = "GetChildCount";

/// A request to expand a row reached from a root value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionRequest {
    pub method: String,
    pub root: Snapshot,
    /// Child names to follow from the root before expanding
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub flags: EvaluationFlags,
}

/// A row as seen on the far side of the boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowData {
    pub name: String,
    pub full_name: Option<String>,
    pub declared_type: Option<String>,
    pub runtime_type: Option<String>,
    pub display_value: String,
    pub kind: ExpansionKind,
    pub category: Category,
    pub read_only: bool,
    pub expandable: bool,
    pub editable_value: Option<String>,
}

impl RowData {
    /// Resolve a row into transferable data, formatting its display value
    pub fn from_row(
        provider: &ResultProvider,
        ctx: &InspectionContext,
        row: &EvalResult,
    ) -> Result<Self> {
        Ok(Self {
            name: row.name().to_string(),
            full_name: row.full_name().map(str::to_string),
            declared_type: row.declared_type().map(|t| t.to_string()),
            runtime_type: row.runtime_type().map(|t| t.to_string()),
            display_value: provider.display_value(ctx, row)?,
            kind: row.kind(),
            category: row.category(),
            read_only: row.is_read_only(),
            expandable: row.has_children(),
            editable_value: row.editable_value().map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionResponse {
    pub rows: Vec<RowData>,
    /// Set by child-count requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_count: Option<usize>,
}

/// Something that answers expansion requests
pub trait EvaluationService {
    fn call(&self, request: ExpansionRequest) -> Result<ExpansionResponse>;
}

/// Follow `path` from `root` by child name, taking the first match at each step
pub fn resolve_path(
    provider: &ResultProvider,
    ctx: &InspectionContext,
    root: EvalResult,
    path: &[String],
) -> Result<EvalResult> {
    let mut row = root;
    for name in path {
        let found = provider
            .find_children_named(ctx, &row, name)
            .with_context(|| format!("Failed to expand '{}'", row.name()))?;
        let Some(child) = found.into_iter().next() else {
            return Err(anyhow!("'{}' has no child named '{}'", row.name(), name));
        };
        row = child;
    }
    Ok(row)
}

/// Answers requests against a process in this address space
pub struct LocalEvaluationService {
    provider: ResultProvider,
    process: Option<Arc<dyn Process>>,
}

impl LocalEvaluationService {
    /// Use the process settings recorded in each request's snapshot
    pub fn new(provider: ResultProvider) -> Self {
        Self {
            provider,
            process: None,
        }
    }

    /// Answer every request against one process
    pub fn with_process(provider: ResultProvider, process: Arc<dyn Process>) -> Self {
        Self {
            provider,
            process: Some(process),
        }
    }

    /// Decode a JSON request, answer it, and encode the response
    pub fn handle_json(&self, request: &str) -> Result<String> {
        let request: ExpansionRequest =
            serde_json::from_str(request).context("Malformed expansion request")?;
        let response = self.call(request)?;
        Ok(serde_json::to_string(&response)?)
    }
}

impl EvaluationService for LocalEvaluationService {
    fn call(&self, request: ExpansionRequest) -> Result<ExpansionResponse> {
        let process: Arc<dyn Process> = match &self.process {
            Some(process) => process.clone(),
            None => Arc::new(request.root.process.to_process()?),
        };
        let ctx = InspectionContext::new(process).with_flags(request.flags);

        let full_name = request.root.root_full_name();
        let root = self
            .provider
            .evaluate(request.root.name.clone(), Some(full_name), request.root.value);
        let row = resolve_path(&self.provider, &ctx, root, &request.path)?;

        let (rows, child_count) = match request.method.as_str() {
            EXPRESSION_EVALUATOR_SERVICE_GET_CHILDREN => {
                let count = request.count.unwrap_or(self.provider.config().page_size);
                (self.provider.get_children(&ctx, &row, request.start, count)?, None)
            }
            EXPRESSION_EVALUATOR_SERVICE_GET_ALL_CHILDREN => {
                (self.provider.get_all_children(&ctx, &row)?, None)
            }
            EXPRESSION_EVALUATOR_SERVICE_GET_CHILD_COUNT => {
                (Vec::new(), Some(self.provider.child_count(&ctx, &row)?))
            }
            other => {
                return Err(anyhow!(
                    "Unknown {} method: {}",
                    EXPRESSION_EVALUATOR_SERVICE,
                    other
                ))
            }
        };

        let rows = rows
            .iter()
            .map(|child| RowData::from_row(&self.provider, &ctx, child))
            .collect::<Result<Vec<_>>>()?;

        Ok(ExpansionResponse { rows, child_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DebuggeeProcess;
    use crate::snapshot::ProcessSettings;
    use crate::value::{DebugValue, Dimension, Member};
    use pretty_assertions::assert_eq;

    fn request(method: &str) -> ExpansionRequest {
        ExpansionRequest {
            method: method.to_string(),
            root: Snapshot {
                name: "doc".to_string(),
                full_name: None,
                value: DebugValue::object(
                    "Document",
                    vec![Member::field(
                        "Shell",
                        DebugValue::object("System.__ComObject", vec![])
                            .with_native_com_pointer(0xABCD),
                    )],
                ),
                process: ProcessSettings {
                    native_debugging: true,
                    pointer_width: Some(32),
                },
            },
            path: vec!["Shell".to_string()],
            start: 0,
            count: None,
            flags: EvaluationFlags::empty(),
        }
    }

    #[test]
    fn test_get_children_along_path() {
        let service = LocalEvaluationService::new(ResultProvider::default());
        let response = service
            .call(request(EXPRESSION_EVALUATOR_SERVICE_GET_CHILDREN))
            .unwrap();

        assert_eq!(response.rows.len(), 1);
        let row = &response.rows[0];
        assert_eq!(row.name, "(IUnknown*)0x0000abcd");
        assert_eq!(row.full_name.as_deref(), Some("{C++}(IUnknown*)0x0000abcd"));
        assert_eq!(row.display_value, "{System.__ComObject} 0x0000abcd");
        assert_eq!(row.kind, ExpansionKind::NativeView);
        assert!(row.read_only);
        assert!(!row.expandable);
    }

    #[test]
    fn test_service_process_overrides_snapshot() {
        let service = LocalEvaluationService::with_process(
            ResultProvider::default(),
            Arc::new(DebuggeeProcess::new(false)),
        );
        let response = service
            .call(request(EXPRESSION_EVALUATOR_SERVICE_GET_ALL_CHILDREN))
            .unwrap();

        assert_eq!(response.rows.len(), 1);
        assert_eq!(response.rows[0].name, "Native View");
        assert_eq!(response.rows[0].kind, ExpansionKind::Explicit);
    }

    #[test]
    fn test_child_count() {
        let service = LocalEvaluationService::new(ResultProvider::default());
        let mut req = request(EXPRESSION_EVALUATOR_SERVICE_GET_CHILD_COUNT);
        req.flags = EvaluationFlags::NO_SIDE_EFFECTS;

        let response = service.call(req).unwrap();
        assert!(response.rows.is_empty());
        assert_eq!(response.child_count, Some(0));
    }

    #[test]
    fn test_json_round_trip() {
        let service = LocalEvaluationService::new(ResultProvider::default());
        let request =
            serde_json::to_string(&request(EXPRESSION_EVALUATOR_SERVICE_GET_CHILDREN)).unwrap();

        let response: ExpansionResponse =
            serde_json::from_str(&service.handle_json(&request).unwrap()).unwrap();
        assert_eq!(response.rows[0].name, "(IUnknown*)0x0000abcd");
    }

    #[test]
    fn test_errors() {
        let service = LocalEvaluationService::new(ResultProvider::default());

        let err = service.call(request("Evaluate")).unwrap_err();
        assert!(err.to_string().contains("Unknown expressionEvaluatorService method"));

        let mut req = request(EXPRESSION_EVALUATOR_SERVICE_GET_CHILDREN);
        req.path = vec!["Missing".to_string()];
        let err = service.call(req).unwrap_err();
        assert_eq!(err.to_string(), "'doc' has no child named 'Missing'");

        assert!(service.handle_json("{").is_err());
    }

    #[test]
    fn test_unindexable_array_is_rejected() {
        let service = LocalEvaluationService::new(ResultProvider::default());
        let elements = vec![
            DebugValue::primitive("Int32", "1"),
            DebugValue::primitive("Int32", "2"),
        ];
        let oversized = vec![Dimension::new(usize::MAX / 4), Dimension::new(usize::MAX / 4)];
        let past_bound = vec![Dimension {
            length: 2,
            lower_bound: i64::MAX,
        }];

        for dimensions in [oversized, past_bound] {
            let mut req = request(EXPRESSION_EVALUATOR_SERVICE_GET_CHILDREN);
            req.root.value = DebugValue::multi_array("Int32", dimensions, elements.clone());
            req.path.clear();

            let err = service
                .handle_json(&serde_json::to_string(&req).unwrap())
                .unwrap_err();
            assert!(err.to_string().contains("every index"), "{err}");
        }
    }
}
