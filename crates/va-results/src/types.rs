//! Result data types.

use serde::{Deserialize, Serialize};
use va_core::{AnalysisMethod, FlowCondition, ResultId};

/// One stored value. Parsers commit scalars while reading headers and
/// vectors once a table ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ResultValue {
    Double(f64),
    Int(i64),
    Str(String),
    DoubleVec(Vec<f64>),
    IntVec(Vec<i64>),
    StrVec(Vec<String>),
}

impl ResultValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Double(_) => "double",
            Self::Int(_) => "int",
            Self::Str(_) => "string",
            Self::DoubleVec(_) => "double_vec",
            Self::IntVec(_) => "int_vec",
            Self::StrVec(_) => "string_vec",
        }
    }

    /// Number of entries; scalars count as one.
    pub fn len(&self) -> usize {
        match self {
            Self::Double(_) | Self::Int(_) | Self::Str(_) => 1,
            Self::DoubleVec(v) => v.len(),
            Self::IntVec(v) => v.len(),
            Self::StrVec(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scalar numeric view; integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64_slice(&self) -> Option<&[f64]> {
        match self {
            Self::DoubleVec(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64_slice(&self) -> Option<&[i64]> {
        match self {
            Self::IntVec(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str_slice(&self) -> Option<&[String]> {
        match self {
            Self::StrVec(v) => Some(v),
            _ => None,
        }
    }

    /// Each entry rendered for a CSV cell.
    pub fn cells(&self) -> Vec<String> {
        match self {
            Self::Double(v) => vec![v.to_string()],
            Self::Int(v) => vec![v.to_string()],
            Self::Str(v) => vec![v.clone()],
            Self::DoubleVec(v) => v.iter().map(f64::to_string).collect(),
            Self::IntVec(v) => v.iter().map(i64::to_string).collect(),
            Self::StrVec(v) => v.clone(),
        }
    }
}

impl From<f64> for ResultValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<i64> for ResultValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<String> for ResultValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for ResultValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<Vec<f64>> for ResultValue {
    fn from(v: Vec<f64>) -> Self {
        Self::DoubleVec(v)
    }
}

impl From<Vec<i64>> for ResultValue {
    fn from(v: Vec<i64>) -> Self {
        Self::IntVec(v)
    }
}

impl From<Vec<String>> for ResultValue {
    fn from(v: Vec<String>) -> Self {
        Self::StrVec(v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultField {
    pub name: String,
    pub value: ResultValue,
}

/// Typed case header attached once Mach, AoA and Beta are all known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaseHeader {
    pub method: AnalysisMethod,
    pub flow: FlowCondition,
}

/// A named, ordered collection of fields.
///
/// Field names may repeat; each `add` appends and lookups return the most
/// recent entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: ResultId,
    pub name: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<CaseHeader>,
    #[serde(default)]
    pub fields: Vec<ResultField>,
}

impl ResultRecord {
    pub fn new(id: ResultId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            header: None,
            fields: Vec::new(),
        }
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<ResultValue>) {
        self.fields.push(ResultField {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Latest value stored under `name`.
    pub fn find(&self, name: &str) -> Option<&ResultValue> {
        self.fields
            .iter()
            .rev()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    /// Every value stored under `name`, oldest first.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ResultValue> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.name == name)
            .map(|f| &f.value)
    }

    pub fn count(&self, name: &str) -> usize {
        self.find_all(name).count()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn f64(&self, name: &str) -> Option<f64> {
        self.find(name).and_then(ResultValue::as_f64)
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.find(name).and_then(ResultValue::as_i64)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.find(name).and_then(ResultValue::as_str)
    }

    pub fn f64_slice(&self, name: &str) -> Option<&[f64]> {
        self.find(name).and_then(ResultValue::as_f64_slice)
    }

    pub fn i64_slice(&self, name: &str) -> Option<&[i64]> {
        self.find(name).and_then(ResultValue::as_i64_slice)
    }

    pub fn str_slice(&self, name: &str) -> Option<&[String]> {
        self.find(name).and_then(ResultValue::as_str_slice)
    }

    /// Distinct field names in first-seen order.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for f in &self.fields {
            if !names.contains(&f.name.as_str()) {
                names.push(&f.name);
            }
        }
        names
    }
}

/// Archive manifest for one stored sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub name: String,
    pub timestamp: String,
    pub model_base: String,
    pub analysis_method: AnalysisMethod,
    pub case_count: usize,
    pub solver_version: String,
}
