//! Slots: ejes de configuración enumerables (banda, detector, target, fuente).
//!
//! Un template de item (p.ej. `{band}_IMAGE_{target}_RAW`) queda resuelto
//! cuando todos sus placeholders tienen valor en un `SlotBindings`. Los
//! valores válidos de cada slot forman un dominio cerrado (`SlotDomain`).
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::DomainError;

macro_rules! slot_enum {
    ($(#[$meta:meta])* $name:ident, $slot:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name { $($variant),+ }

        impl $name {
            /// Nombre del slot que este enum enumera.
            pub const SLOT: &'static str = $slot;
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self { $($name::$variant => $text),+ }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(DomainError::UnknownSlotValue { slot: $slot.to_string(), value: other.to_string() }),
                }
            }
        }
    };
}

slot_enum!(
    /// Banda espectral / modo de observación.
    Band, "band" { Lm => "LM", N => "N", Ifu => "IFU" }
);

slot_enum!(
    /// Detector físico.
    Detector, "detector" { TwoRg => "2RG", Geo => "GEO", Ifu => "IFU" }
);

slot_enum!(
    /// Tipo de objetivo observado.
    Target, "target" { Sci => "SCI", Std => "STD", Sky => "SKY" }
);

slot_enum!(
    /// Fuente de iluminación de los flats.
    Source, "source" { Lamp => "LAMP", Twilight => "TWILIGHT" }
);

impl Band {
    /// Detector que registra esta banda.
    pub fn detector(&self) -> Detector {
        match self {
            Band::Lm => Detector::TwoRg,
            Band::N => Detector::Geo,
            Band::Ifu => Detector::Ifu,
        }
    }
}

impl Detector {
    /// Traduce el modo técnico de la cabecera (`ESO DPR TECH`) al detector.
    /// Tabla fija; cualquier otro valor devuelve `None`.
    pub fn from_tech_mode(mode: &str) -> Option<Detector> {
        match mode.trim() {
            "IMAGE,LM" => Some(Detector::TwoRg),
            "IMAGE,N" => Some(Detector::Geo),
            "IFU" => Some(Detector::Ifu),
            _ => None,
        }
    }
}

/// Asignación ordenada slot -> valor.
///
/// El orden de inserción se conserva para que los mensajes y el hashing sean
/// deterministas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotBindings(IndexMap<String, String>);

impl SlotBindings {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Variante encadenable de `insert`.
    pub fn with(mut self, slot: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(slot, value);
        self
    }

    pub fn insert(&mut self, slot: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(slot.into(), value.into())
    }

    pub fn get(&self, slot: &str) -> Option<&str> {
        self.0.get(slot).map(String::as_str)
    }

    pub fn contains(&self, slot: &str) -> bool {
        self.0.contains_key(slot)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Combina `self` sobre `base`: en caso de conflicto gana `self`
    /// (el binding más específico).
    pub fn overlay(&self, base: &SlotBindings) -> SlotBindings {
        let mut out = base.clone();
        for (k, v) in self.0.iter() {
            out.0.insert(k.clone(), v.clone());
        }
        out
    }

    /// Fusiona `other` en `self` exigiendo acuerdo en los slots compartidos.
    pub fn merge_strict(&mut self, other: &SlotBindings) -> Result<(), DomainError> {
        for (k, v) in other.0.iter() {
            match self.0.get(k) {
                Some(existing) if existing != v => {
                    return Err(DomainError::SlotConflict { slot: k.clone(),
                                                           values: vec![existing.clone(), v.clone()] });
                }
                Some(_) => {}
                None => {
                    self.0.insert(k.clone(), v.clone());
                }
            }
        }
        Ok(())
    }

    /// Sustituye los placeholders `{slot}` de `template`. Los slots sin valor
    /// se dejan literalmente (`{target}`), útil para documentación.
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match after.find('}') {
                Some(end) => {
                    let slot = &after[..end];
                    match self.get(slot) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push('{');
                            out.push_str(slot);
                            out.push('}');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Placeholders distintos de `template`, en orden de aparición.
    pub fn placeholders(template: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        let mut rest = template;
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else { break };
            let slot = &after[..end];
            if !slot.is_empty() && !found.iter().any(|s| s == slot) {
                found.push(slot.to_string());
            }
            rest = &after[end + 1..];
        }
        found
    }
}

impl fmt::Display for SlotBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str("}")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SlotBindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = SlotBindings::new();
        for (k, v) in iter {
            out.insert(k, v);
        }
        out
    }
}

/// Enumeraciones cerradas de valores por slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDomain(IndexMap<String, Vec<String>>);

impl SlotDomain {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Dominio por defecto del instrumento.
    pub fn metis() -> Self {
        Self::new().with_slot(Band::SLOT, Band::ALL.iter().map(Band::as_str))
                   .with_slot(Detector::SLOT, Detector::ALL.iter().map(Detector::as_str))
                   .with_slot(Target::SLOT, Target::ALL.iter().map(Target::as_str))
                   .with_slot(Source::SLOT, Source::ALL.iter().map(Source::as_str))
    }

    pub fn with_slot<I, S>(mut self, slot: impl Into<String>, values: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.0.insert(slot.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn values(&self, slot: &str) -> Option<&[String]> {
        self.0.get(slot).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Combina `self` sobre `base` (las restricciones de `self` ganan).
    pub fn overlay(&self, base: &SlotDomain) -> SlotDomain {
        let mut out = base.clone();
        for (k, v) in self.0.iter() {
            out.0.insert(k.clone(), v.clone());
        }
        out
    }
}
