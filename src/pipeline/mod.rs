//! Post-processing pipeline: a small transform language applied to fetched
//! values. Steps are parsed once into typed instructions, then folded over
//! the value left to right.

use crate::core::coerce::{coerce_to_f64, number_value, CoerceError};
use crate::core::error::{FetchError, FetchResult};
use crate::core::types::PostprocessSpec;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("unknown transform step \"{0}\"")]
    UnknownStep(String),

    #[error("invalid operand in step \"{step}\": {reason}")]
    InvalidOperand { step: String, reason: String },

    #[error("step \"{step}\" failed: {reason}")]
    StepFailed { step: String, reason: String },

    #[error(transparent)]
    Coerce(#[from] CoerceError),
}

/// What to do when a postprocess sequence cannot be parsed or applied.
/// `Fallback` preserves the original engine's behavior: log and hand the
/// caller the untransformed value. `Strict` rejects the whole batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelinePolicy {
    #[default]
    Fallback,
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithmeticOp {
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            ArithmeticOp::Add => lhs + rhs,
            ArithmeticOp::Sub => lhs - rhs,
            ArithmeticOp::Mul => lhs * rhs,
            ArithmeticOp::Div => lhs / rhs,
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Mul => "mul",
            ArithmeticOp::Div => "div",
        };
        f.write_str(name)
    }
}

/// One parsed transform instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineStep {
    /// `json:<path>`: JSON-parse string input, then walk the dot path.
    ExtractJson(Vec<String>),
    /// `object:<path>`: walk the dot path without a parse step.
    ExtractObject(Vec<String>),
    /// `toNumber`
    CoerceNumber,
    /// `add:`/`sub:`/`mul:`/`div:` with a float right operand.
    Arithmetic(ArithmeticOp, f64),
}

const ARITHMETIC_PREFIXES: &[(&str, ArithmeticOp)] = &[
    ("add:", ArithmeticOp::Add),
    ("sub:", ArithmeticOp::Sub),
    ("mul:", ArithmeticOp::Mul),
    ("div:", ArithmeticOp::Div),
];

pub fn parse_step(raw: &str) -> Result<PipelineStep, PipelineError> {
    if raw == "toNumber" {
        return Ok(PipelineStep::CoerceNumber);
    }
    if let Some(path) = raw.strip_prefix("json:") {
        return Ok(PipelineStep::ExtractJson(split_path(path)));
    }
    if let Some(path) = raw.strip_prefix("object:") {
        return Ok(PipelineStep::ExtractObject(split_path(path)));
    }
    for (prefix, op) in ARITHMETIC_PREFIXES {
        if let Some(operand) = raw.strip_prefix(prefix) {
            let operand = operand
                .trim()
                .parse::<f64>()
                .map_err(|err| PipelineError::InvalidOperand {
                    step: raw.to_string(),
                    reason: err.to_string(),
                })?;
            return Ok(PipelineStep::Arithmetic(*op, operand));
        }
    }
    Err(PipelineError::UnknownStep(raw.to_string()))
}

pub fn parse_steps(spec: &PostprocessSpec) -> Result<Vec<PipelineStep>, PipelineError> {
    spec.steps().iter().map(|raw| parse_step(raw)).collect()
}

fn split_path(path: &str) -> Vec<String> {
    path.split('.').map(str::to_string).collect()
}

/// Walk a dot path. A pure-numeric segment indexes arrays; any lookup that
/// misses resolves the rest of the walk to JSON null.
fn walk(value: &Value, path: &[String]) -> Value {
    let mut current = value;
    for segment in path {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index)),
            _ => None,
        };
        match next {
            Some(v) => current = v,
            None => return Value::Null,
        }
    }
    current.clone()
}

fn run_step(value: Value, step: &PipelineStep) -> Result<Value, PipelineError> {
    match step {
        PipelineStep::ExtractJson(path) => {
            let parsed = match value {
                Value::String(ref raw) => {
                    serde_json::from_str::<Value>(raw).map_err(|err| PipelineError::StepFailed {
                        step: format!("json:{}", path.join(".")),
                        reason: err.to_string(),
                    })?
                }
                other => other,
            };
            Ok(walk(&parsed, path))
        }
        PipelineStep::ExtractObject(path) => Ok(walk(&value, path)),
        PipelineStep::CoerceNumber => {
            let n = coerce_to_f64(&value)?;
            number_value(n).ok_or_else(|| PipelineError::StepFailed {
                step: "toNumber".to_string(),
                reason: "value has no JSON number representation".to_string(),
            })
        }
        PipelineStep::Arithmetic(op, operand) => {
            let lhs = coerce_to_f64(&value)?;
            number_value(op.apply(lhs, *operand)).ok_or_else(|| PipelineError::StepFailed {
                step: format!("{op}:{operand}"),
                reason: "non-finite arithmetic result".to_string(),
            })
        }
    }
}

pub fn apply_steps(value: Value, steps: &[PipelineStep]) -> Result<Value, PipelineError> {
    steps.iter().try_fold(value, run_step)
}

/// Apply an optional postprocess directive under the configured failure
/// policy. No-op when the directive is absent.
pub fn apply(
    value: Value,
    spec: Option<&PostprocessSpec>,
    policy: PipelinePolicy,
) -> FetchResult<Value> {
    let Some(spec) = spec else {
        return Ok(value);
    };

    let outcome = parse_steps(spec).and_then(|steps| apply_steps(value.clone(), &steps));
    match outcome {
        Ok(transformed) => Ok(transformed),
        Err(err) => match policy {
            PipelinePolicy::Fallback => {
                warn!("postprocess failed, returning untransformed value: {err}");
                Ok(value)
            }
            PipelinePolicy::Strict => Err(FetchError::Pipeline(err)),
        },
    }
}
