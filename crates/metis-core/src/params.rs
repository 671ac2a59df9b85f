//! Parámetros de receta.
//!
//! Los valores son `serde_json::Value`; el tipo admitido lo fija el valor
//! por defecto (un entero se acepta donde se espera un real).
use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::PipelineError;

/// Mapa plano de ajustes recibido del ejecutor externo.
pub type Settings = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub description: String,
    pub default: Value,
    pub choices: Vec<Value>,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, default: impl Into<Value>) -> Self {
        Self { name: name.into(),
               description: description.into(),
               default: default.into(),
               choices: Vec::new() }
    }

    pub fn choices<I, V>(mut self, choices: I) -> Self
        where I: IntoIterator<Item = V>,
              V: Into<Value>
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Normaliza y comprueba un valor entrante.
    fn accept(&self, owner: &str, value: &Value) -> Result<Value, PipelineError> {
        let invalid = |reason: String| PipelineError::InvalidSetting { subject: owner.to_string(),
                                                                        name: self.name.clone(),
                                                                        reason };
        let accepted = match (&self.default, value) {
            (Value::Bool(_), Value::Bool(_)) | (Value::String(_), Value::String(_)) => value.clone(),
            (Value::Number(d), Value::Number(n)) if d.is_f64() => n.as_f64().map(Value::from).ok_or_else(|| invalid(format!("{n} is not a number")))?,
            (Value::Number(_), Value::Number(n)) if n.is_i64() || n.is_u64() => value.clone(),
            _ => return Err(invalid(format!("expected {}, got {value}", type_name(&self.default)))),
        };
        if !self.choices.is_empty() && !self.choices.contains(&accepted) {
            let allowed: Vec<String> = self.choices.iter().map(Value::to_string).collect();
            return Err(invalid(format!("{accepted} not in [{}]", allowed.join(", "))));
        }
        Ok(accepted)
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parámetros declarados con sus valores actuales.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterList {
    specs: Vec<ParameterSpec>,
    values: IndexMap<String, Value>,
}

impl ParameterList {
    pub fn new(specs: Vec<ParameterSpec>) -> Self {
        let values = specs.iter().map(|s| (s.name.clone(), s.default.clone())).collect();
        Self { specs, values }
    }

    /// Aplica ajustes. Una clave vale como `name` o como `<owner>.name`;
    /// la forma calificada se aplica después. Devuelve las claves
    /// desconocidas (no son fatales).
    pub fn apply(&mut self, owner: &str, settings: &Settings) -> Result<Vec<String>, PipelineError> {
        let prefix = format!("{owner}.");
        let mut unknown = Vec::new();
        let mut qualified = Vec::new();
        for (key, value) in settings {
            if let Some(name) = key.strip_prefix(&prefix).filter(|n| self.values.contains_key(*n)) {
                qualified.push((name, value));
            } else if self.values.contains_key(key) {
                self.set(owner, key, value)?;
            } else {
                warn!("{owner}: ignoring unknown setting '{key}'");
                unknown.push(key.clone());
            }
        }
        for (name, value) in qualified {
            self.set(owner, name, value)?;
        }
        Ok(unknown)
    }

    fn set(&mut self, owner: &str, name: &str, value: &Value) -> Result<(), PipelineError> {
        let Some(spec) = self.specs.iter().find(|s| s.name == name) else {
            return Ok(());
        };
        let accepted = spec.accept(owner, value)?;
        self.values.insert(name.to_string(), accepted);
        Ok(())
    }

    pub fn specs(&self) -> &[ParameterSpec] {
        &self.specs
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Valores actuales como objeto JSON (entra en el fingerprint).
    pub fn as_json(&self) -> Value {
        Value::Object(self.values.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params() -> ParameterList {
        ParameterList::new(vec![ParameterSpec::new("stacking.method", "Combination method", "median").choices(["average", "median", "sum"]),
                                ParameterSpec::new("threshold", "Clip threshold", 3.0),
                                ParameterSpec::new("niter", "Iterations", 2)])
    }

    fn settings(v: Value) -> Settings {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn qualified_key_wins_over_short_key() {
        let mut p = params();
        let unknown = p.apply("metis_det_dark",
                              &settings(json!({"metis_det_dark.stacking.method": "sum", "stacking.method": "average"})))
                       .unwrap();
        assert!(unknown.is_empty());
        assert_eq!(p.get_str("stacking.method"), Some("sum"));
    }

    #[test]
    fn integers_are_accepted_for_floats() {
        let mut p = params();
        p.apply("r", &settings(json!({"threshold": 5}))).unwrap();
        assert_eq!(p.get_f64("threshold"), Some(5.0));
    }

    #[test]
    fn wrong_type_or_choice_is_rejected() {
        let mut p = params();
        let err = p.apply("r", &settings(json!({"niter": 1.5}))).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidSetting { ref name, .. } if name == "niter"));
        let err = p.apply("r", &settings(json!({"stacking.method": "mode"}))).unwrap_err();
        assert!(err.to_string().contains("not in"));
    }

    #[test]
    fn unknown_keys_are_reported() {
        let mut p = params();
        let unknown = p.apply("r", &settings(json!({"bogus": 1, "other.niter": 3}))).unwrap();
        assert_eq!(unknown, vec!["bogus".to_string(), "other.niter".to_string()]);
        assert_eq!(p.get_i64("niter"), Some(2));
    }
}
