//! # Variables
//!
//! Named, typed and ranged script parameters.
//!
//! ## Responsibilities
//! - **Declaration**: `var()` registers a variable and yields its effective value.
//! - **Merging**: Redeclaring a variable keeps the earlier value if it still fits.
//! - **External Control**: Callers (the CLI, a UI) set values before or between runs.

use crate::errors::{EaselError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    Number,
    Text,
    Boolean,
    Button,
}

impl FromStr for VarType {
    type Err = EaselError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "number" => Ok(Self::Number),
            "text" => Ok(Self::Text),
            "boolean" => Ok(Self::Boolean),
            "button" => Ok(Self::Button),
            _ => Err(EaselError::InvalidMode {
                what: "var type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VarType::Number => "number",
            VarType::Text => "text",
            VarType::Boolean => "boolean",
            VarType::Button => "button",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl VarValue {
    /// Parses a command-line style value: `true`/`false`, a number, or text.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => VarValue::Boolean(true),
            "false" => VarValue::Boolean(false),
            _ => raw
                .parse::<f64>()
                .map(VarValue::Number)
                .unwrap_or_else(|_| VarValue::Text(raw.to_string())),
        }
    }

    /// Converts the value to `kind` when that is lossless enough to be useful.
    pub fn coerce(&self, kind: VarType) -> Option<VarValue> {
        match (kind, self) {
            (VarType::Number, VarValue::Number(_)) => Some(self.clone()),
            (VarType::Number, VarValue::Text(s)) => s.trim().parse().ok().map(VarValue::Number),
            (VarType::Boolean, VarValue::Boolean(_)) => Some(self.clone()),
            (VarType::Boolean, VarValue::Text(s)) => match s.trim() {
                "true" | "1" => Some(VarValue::Boolean(true)),
                "false" | "0" => Some(VarValue::Boolean(false)),
                _ => None,
            },
            (VarType::Text | VarType::Button, VarValue::Text(_)) => Some(self.clone()),
            (VarType::Text, other) => Some(VarValue::Text(other.to_string())),
            _ => None,
        }
    }

    fn matches(&self, kind: VarType) -> bool {
        matches!(
            (kind, self),
            (VarType::Number, VarValue::Number(_))
                | (VarType::Boolean, VarValue::Boolean(_))
                | (VarType::Text | VarType::Button, VarValue::Text(_))
        )
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Number(n) => write!(f, "{}", n),
            VarValue::Boolean(b) => write!(f, "{}", b),
            VarValue::Text(s) => f.write_str(s),
        }
    }
}

/// A declared script variable. Identity is the name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VarType,
    pub default: Option<VarValue>,
    pub min: f64,
    pub max: f64,
    pub value: Option<VarValue>,
}

impl Variable {
    /// Creates a variable whose value starts at its default.
    ///
    /// A missing default becomes `min` for numbers, `""` for text and `false`
    /// for booleans. Buttons carry the name of the function they trigger.
    pub fn new(
        name: impl Into<String>,
        kind: VarType,
        default: Option<VarValue>,
        min: f64,
        max: f64,
    ) -> Result<Self> {
        let name = name.into();
        let default = match default {
            Some(value) => Some(value.coerce(kind).ok_or_else(|| {
                EaselError::InvalidArgument(format!(
                    "var '{}': default {:?} is not a {}",
                    name, value, kind
                ))
            })?),
            None => match kind {
                VarType::Number => Some(VarValue::Number(min)),
                VarType::Text => Some(VarValue::Text(String::new())),
                VarType::Boolean => Some(VarValue::Boolean(false)),
                VarType::Button => None,
            },
        };
        Ok(Self {
            name,
            kind,
            value: default.clone(),
            default,
            min,
            max,
        })
    }

    /// Whether this (earlier) variable's value can be carried into `newer`.
    pub fn complies_to(&self, newer: &Variable) -> bool {
        if self.kind != newer.kind {
            return false;
        }
        match &self.value {
            Some(VarValue::Number(n)) => *n >= newer.min && *n <= newer.max,
            Some(value) => value.matches(newer.kind),
            None => false,
        }
    }
}

/// All variables known to a sketch across runs.
#[derive(Clone, Debug, Default)]
pub struct VariableRegistry {
    declared: Vec<Variable>,
    previous: Vec<Variable>,
    overrides: HashMap<String, VarValue>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `var` and returns its effective value.
    pub fn declare(&mut self, mut var: Variable) -> Option<VarValue> {
        let carried = self
            .previous
            .iter()
            .find(|old| old.name == var.name)
            .filter(|old| old.complies_to(&var))
            .and_then(|old| old.value.clone())
            .or_else(|| self.override_for(&var));

        if let Some(value) = carried {
            debug!(name = %var.name, value = %value, "Carrying variable value forward");
            var.value = Some(value);
        }

        let value = var.value.clone();
        match self.declared.iter_mut().find(|v| v.name == var.name) {
            Some(slot) => *slot = var,
            None => self.declared.push(var),
        }
        value
    }

    fn override_for(&self, var: &Variable) -> Option<VarValue> {
        let raw = self.overrides.get(&var.name)?;
        let value = raw.coerce(var.kind)?;
        let candidate = Variable {
            value: Some(value.clone()),
            ..var.clone()
        };
        candidate.complies_to(var).then_some(value)
    }

    /// Sets a value from outside the script. Takes effect on the next declaration.
    pub fn set(&mut self, name: &str, value: VarValue) {
        for var in self.declared.iter_mut().chain(self.previous.iter_mut()) {
            if var.name == name {
                if let Some(coerced) = value.coerce(var.kind) {
                    var.value = Some(coerced);
                }
            }
        }
        self.overrides.insert(name.to_string(), value);
    }

    /// Starts a new run: this run's declarations become the ones to merge with.
    pub fn begin_run(&mut self) {
        if !self.declared.is_empty() {
            self.previous = std::mem::take(&mut self.declared);
        }
    }

    pub fn variables(&self) -> &[Variable] {
        &self.declared
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.declared.iter().find(|v| v.name == name)
    }

    pub fn value(&self, name: &str) -> Option<VarValue> {
        self.get(name).and_then(|v| v.value.clone())
    }

    /// Values that should seed a fresh registry (the current declarations plus overrides).
    pub fn snapshot_values(&self) -> Vec<(String, VarValue)> {
        let mut values: Vec<(String, VarValue)> = self
            .overrides
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for var in &self.declared {
            if let Some(value) = &var.value {
                values.retain(|(k, _)| k != &var.name);
                values.push((var.name.clone(), value.clone()));
            }
        }
        values
    }

    /// The deprecated bulk form of `var()`: every entry becomes a number.
    pub fn setvars(&mut self, entries: &[(String, f64)]) -> Result<()> {
        for (name, value) in entries {
            let var = Variable::new(
                name.clone(),
                VarType::Number,
                Some(VarValue::Number(*value)),
                0.0,
                255.0,
            )?;
            self.declare(var);
        }
        Ok(())
    }
}
