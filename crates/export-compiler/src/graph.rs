//! Typed filter-graph builder.
//!
//! Filter graphs are assembled as data — chains of filters with named
//! input and output streams — and serialized to ffmpeg's textual
//! `-filter_complex` syntax in one place. Embedded numeric expressions
//! (crop offsets, piecewise ramps) are escaped centrally during
//! serialization, so no call site ever hand-escapes commas.

use serde::{Deserialize, Serialize};

/// A parameter value inside a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Int(i64),
    Num(f64),
    Str(String),
    /// An ffmpeg expression. Commas and colons inside it are escaped
    /// when the graph is serialized.
    Expr(String),
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Num(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

/// One `key=value` (or bare positional) filter parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub key: Option<String>,
    pub value: ParamValue,
}

/// A single filter node: a name plus ordered parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    pub params: Vec<Param>,
}

impl Filter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Add a named parameter.
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.push(Param {
            key: Some(key.into()),
            value: value.into(),
        });
        self
    }

    /// Add a positional parameter.
    pub fn pos(mut self, value: impl Into<ParamValue>) -> Self {
        self.params.push(Param {
            key: None,
            value: value.into(),
        });
        self
    }

    /// Add a named expression parameter (escaped at serialization).
    pub fn expr(mut self, key: impl Into<String>, expression: impl Into<String>) -> Self {
        self.params.push(Param {
            key: Some(key.into()),
            value: ParamValue::Expr(expression.into()),
        });
        self
    }

    fn serialize_into(&self, out: &mut String) {
        out.push_str(&self.name);
        if self.params.is_empty() {
            return;
        }
        out.push('=');
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                out.push(':');
            }
            if let Some(key) = &param.key {
                out.push_str(key);
                out.push('=');
            }
            match &param.value {
                ParamValue::Int(v) => out.push_str(&v.to_string()),
                ParamValue::Num(v) => out.push_str(&format_num(*v)),
                ParamValue::Str(v) => out.push_str(v),
                ParamValue::Expr(v) => out.push_str(&escape_expr(v)),
            }
        }
    }
}

/// A linear chain: input streams → filters → output streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterChain {
    pub inputs: Vec<String>,
    pub filters: Vec<Filter>,
    pub outputs: Vec<String>,
}

/// An ordered collection of chains forming one `-filter_complex` graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterGraph {
    pub chains: Vec<FilterChain>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chain connecting `inputs` through `filters` to `outputs`.
    pub fn chain(&mut self, inputs: Vec<String>, filters: Vec<Filter>, outputs: Vec<String>) {
        self.chains.push(FilterChain {
            inputs,
            filters,
            outputs,
        });
    }

    /// Serialize the whole graph to ffmpeg `-filter_complex` syntax.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (i, chain) in self.chains.iter().enumerate() {
            if i > 0 {
                out.push(';');
            }
            for input in &chain.inputs {
                out.push('[');
                out.push_str(input);
                out.push(']');
            }
            for (j, filter) in chain.filters.iter().enumerate() {
                if j > 0 {
                    out.push(',');
                }
                filter.serialize_into(&mut out);
            }
            for output in &chain.outputs {
                out.push('[');
                out.push_str(output);
                out.push(']');
            }
        }
        out
    }
}

/// Deterministic stream-label allocation.
///
/// Labels are derived purely from the allocation order, so compiling the
/// same timeline twice produces byte-identical graphs.
#[derive(Debug, Default)]
pub struct LabelAllocator {
    counters: std::collections::HashMap<String, usize>,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        let label = format!("{prefix}{counter}");
        *counter += 1;
        label
    }
}

/// Format a float the way ffmpeg expects: no exponent, no trailing
/// noise for integral values.
fn format_num(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let formatted = format!("{v:.6}");
        formatted.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Escape an expression for embedding as a filter parameter value.
///
/// Commas separate filters and colons separate parameters, so both must
/// be escaped inside expression values.
fn escape_expr(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    for c in expr.chars() {
        if c == ',' || c == ':' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
