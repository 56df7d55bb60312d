//! A single dependency declaration.
//!
//! Each non-blank, non-comment line inside the manifest section decomposes
//! into whitespace-separated positional fields:
//!
//! ```text
//! name  source  [version]  [target]  [requires]
//! ```
//!
//! `-` is the placeholder for an unset optional field. `requires` is a
//! comma-separated list of other declaration names that must resolve first.

/// One named dependency entry from a manifest section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Unique name within the manifest.
    pub name: String,

    /// Where the dependency comes from: a URL or a filesystem path.
    pub source: String,

    /// Optional version constraint (e.g. `v1.2`, `>=2.5.0`).
    pub version: Option<String>,

    /// Where it should be materialized, relative to the repository root.
    /// Defaults to `<vendor_dir>/<name>` when unset.
    pub target: Option<String>,

    /// Names of declarations that must resolve before this one.
    pub requires: Vec<String>,
}

impl Declaration {
    /// Decompose whitespace-separated fields into a declaration.
    ///
    /// Returns a human-readable message on failure; the parser wraps it with
    /// the document path and line number.
    pub fn from_fields(fields: &[&str]) -> Result<Self, String> {
        if fields.len() < 2 {
            return Err(
                "a declaration needs at least a name and a source location".to_string(),
            );
        }
        if fields.len() > 5 {
            return Err(format!(
                "too many fields (expected at most 5, found {})",
                fields.len()
            ));
        }

        let name = fields[0].to_string();
        if name.is_empty() || name == "-" {
            return Err("declaration name must be non-empty".to_string());
        }

        let source = fields[1].to_string();
        if source == "-" {
            return Err(format!("declaration '{}' has no source location", name));
        }

        let version = optional_field(fields.get(2));
        let target = optional_field(fields.get(3));
        let requires = match optional_field(fields.get(4)) {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => Vec::new(),
        };

        Ok(Self {
            name,
            source,
            version,
            target,
            requires,
        })
    }

    /// The target subpath, falling back to `<vendor_dir>/<name>`.
    pub fn target_or_default(&self, vendor_dir: &str) -> String {
        match &self.target {
            Some(t) => t.clone(),
            None => format!("{}/{}", vendor_dir.trim_end_matches('/'), self.name),
        }
    }
}

/// Map a raw optional field to a value, treating `-` as unset.
fn optional_field(field: Option<&&str>) -> Option<String> {
    match field {
        Some(&"-") | None => None,
        Some(&value) => Some(value.to_string()),
    }
}
