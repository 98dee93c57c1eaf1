//! Snapshot files describing an inspected value and its process
//!
//! Snapshots are read from JSON, YAML or TOML depending on the file extension.

use crate::context::{DebuggeeProcess, PointerWidth};
use crate::value::DebugValue;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Process settings recorded with a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessSettings {
    pub native_debugging: bool,
    /// 32 or 64; the host width when absent
    pub pointer_width: Option<u32>,
}

impl Default for ProcessSettings {
    fn default() -> Self {
        Self {
            native_debugging: true,
            pointer_width: None,
        }
    }
}

impl ProcessSettings {
    pub fn to_process(&self) -> Result<DebuggeeProcess> {
        let width = match self.pointer_width {
            Some(bits) => PointerWidth::from_bits(bits)
                .ok_or_else(|| anyhow!("pointer_width must be 32 or 64, got {}", bits))?,
            None => PointerWidth::host(),
        };
        Ok(DebuggeeProcess::new(self.native_debugging).with_pointer_width(width))
    }
}

/// A named value captured from a debuggee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    /// Expression that produced the value; defaults to `name`
    #[serde(default)]
    pub full_name: Option<String>,
    pub value: DebugValue,
    #[serde(default)]
    pub process: ProcessSettings,
}

impl Snapshot {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("json")
            .to_ascii_lowercase();

        let snapshot = match extension.as_str() {
            "json" => serde_json::from_str(&content).map_err(anyhow::Error::from),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(anyhow::Error::from),
            "toml" => toml::from_str(&content).map_err(anyhow::Error::from),
            other => return Err(anyhow!("Unsupported snapshot format: .{}", other)),
        };
        snapshot.with_context(|| format!("Invalid snapshot: {}", path.display()))
    }

    /// Expression text of the root row
    pub fn root_full_name(&self) -> String {
        self.full_name.clone().unwrap_or_else(|| self.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_yaml_snapshot() {
        let file = write_temp(
            ".yaml",
            r#"
name: shell
value:
  type: System.__ComObject
  data:
    kind: object
  native_com_pointer: 4096
process:
  native_debugging: false
  pointer_width: 32
"#,
        );

        let snapshot = Snapshot::from_file(file.path()).unwrap();
        assert_eq!(snapshot.root_full_name(), "shell");
        assert_eq!(snapshot.value.native_com_pointer, Some(4096));
        assert!(!snapshot.process.native_debugging);
        assert!(snapshot.process.to_process().is_ok());
    }

    #[test]
    fn test_toml_snapshot() {
        let file = write_temp(
            ".toml",
            r#"
name = "count"
full_name = "this.count"

[value]
type = "Int32"
data = { kind = "primitive", text = "3" }
"#,
        );

        let snapshot = Snapshot::from_file(file.path()).unwrap();
        assert_eq!(snapshot.root_full_name(), "this.count");
        assert_eq!(snapshot.value, DebugValue::primitive("Int32", "3"));
        assert_eq!(snapshot.process, ProcessSettings::default());
    }

    #[test]
    fn test_bad_pointer_width() {
        let settings = ProcessSettings {
            native_debugging: true,
            pointer_width: Some(16),
        };
        assert!(settings.to_process().is_err());
    }

    #[test]
    fn test_unknown_extension() {
        let file = write_temp(".txt", "name = 1");
        let err = Snapshot::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported snapshot format"));
    }
}
