//! Named values referenced by constraints, objectives and natures.

use serde::{Deserialize, Serialize};

use super::{display_by_name, identifiable};
use crate::numeric::is_zero;
use crate::reference::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Scalar,
    List,
    StepRange,
    FunctionTable,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Scalar => "SCALAR",
            ValueType::List => "LIST",
            ValueType::StepRange => "STEP_RANGE",
            ValueType::FunctionTable => "FUNCTION_TABLE",
        }
    }
}

display_by_name!(ValueType);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueKind {
    Scalar(f64),
    List(Vec<f64>),
    /// `count` values starting at `start`, `step` apart.
    StepRange { start: f64, step: f64, count: usize },
    /// Tabulated function, points sorted by abscissa.
    FunctionTable { points: Vec<(f64, f64)> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub identity: Identity,
    pub value: ValueKind,
}

identifiable!(NamedValue, ValueType, "NamedValue", |this| match this.value {
    ValueKind::Scalar(_) => ValueType::Scalar,
    ValueKind::List(_) => ValueType::List,
    ValueKind::StepRange { .. } => ValueType::StepRange,
    ValueKind::FunctionTable { .. } => ValueType::FunctionTable,
});

impl NamedValue {
    pub fn new(identity: Identity, value: ValueKind) -> Self {
        Self { identity, value }
    }

    pub fn scalar(identity: Identity, value: f64) -> Self {
        Self::new(identity, ValueKind::Scalar(value))
    }

    pub fn function_table(identity: Identity, mut points: Vec<(f64, f64)>) -> Self {
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self::new(identity, ValueKind::FunctionTable { points })
    }

    pub fn is_function(&self) -> bool {
        matches!(self.value, ValueKind::FunctionTable { .. })
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self.value {
            ValueKind::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Discrete values of a list or step range.
    pub fn values(&self) -> Vec<f64> {
        match &self.value {
            ValueKind::Scalar(value) => vec![*value],
            ValueKind::List(values) => values.clone(),
            ValueKind::StepRange { start, step, count } => {
                (0..*count).map(|i| start + step * i as f64).collect()
            }
            ValueKind::FunctionTable { points } => points.iter().map(|(x, _)| *x).collect(),
        }
    }

    /// Linear interpolation of a function table, clamped at both ends.
    pub fn interpolate(&self, x: f64) -> Option<f64> {
        let ValueKind::FunctionTable { points } = &self.value else {
            return None;
        };
        let first = points.first()?;
        let last = points.last()?;
        if x <= first.0 {
            return Some(first.1);
        }
        if x >= last.0 {
            return Some(last.1);
        }
        points.windows(2).find_map(|pair| {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            if x < x0 || x > x1 {
                return None;
            }
            if is_zero(x1 - x0) {
                return Some(y0);
            }
            Some(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
        })
    }
}
