//! Emparejamiento de tags.
//!
//! Un `TagPattern` se compila al declarar un input (los derivados se
//! rehacen con el dominio del registro al cargar) y se evalúa una vez por
//! frame. Los grupos con nombre (`(?P<band>LM|N)`) producen los
//! bindings de slot; un patrón sin grupos produce un binding vacío.
use std::fmt;

use metis_domain::{SlotBindings, SlotDomain};
use regex::Regex;

use crate::errors::PipelineError;

#[derive(Debug, Clone)]
pub struct TagPattern {
    source: String,
    regex: Regex,
    slots: Vec<String>,
}

impl TagPattern {
    /// Compila una expresión regular; se ancla completa (`^...$`).
    pub fn new(owner: &str, expr: &str) -> Result<Self, PipelineError> {
        let regex = Regex::new(&format!("^(?:{expr})$")).map_err(|e| PipelineError::InvalidPattern { item: owner.to_string(),
                                                                                                   pattern: expr.to_string(),
                                                                                                   reason: e.to_string() })?;
        let slots = regex.capture_names().flatten().map(str::to_string).collect();
        Ok(Self { source: expr.to_string(),
                  regex,
                  slots })
    }

    /// Tag fijo, sin slots.
    pub fn literal(owner: &str, tag: &str) -> Result<Self, PipelineError> {
        Self::new(owner, &regex::escape(tag))
    }

    /// Deriva el patrón de un template de nombre: los slots ligados se
    /// sustituyen y cada slot libre se convierte en un grupo con nombre
    /// restringido a su dominio.
    pub fn from_template(owner: &str,
                         template: &str,
                         bindings: &SlotBindings,
                         domain: &SlotDomain)
                         -> Result<Self, PipelineError> {
        let rendered = bindings.render(template);
        let mut expr = String::new();
        let mut seen: Vec<String> = Vec::new();
        let mut rest = rendered.as_str();
        while let Some(start) = rest.find('{') {
            expr.push_str(&regex::escape(&rest[..start]));
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                return Err(PipelineError::InvalidPattern { item: owner.to_string(),
                                                           pattern: template.to_string(),
                                                           reason: "unterminated placeholder".to_string() });
            };
            let slot = &after[..end];
            let alternatives = match domain.values(slot) {
                Some(values) if !values.is_empty() => {
                    values.iter().map(|v| regex::escape(v)).collect::<Vec<_>>().join("|")
                }
                _ => "[A-Z0-9]+".to_string(),
            };
            // Un slot repetido no puede volver a nombrarse en el regex.
            if seen.iter().any(|s| s == slot) {
                expr.push_str(&format!("(?:{alternatives})"));
            } else {
                expr.push_str(&format!("(?P<{slot}>{alternatives})"));
                seen.push(slot.to_string());
            }
            rest = &after[end + 1..];
        }
        expr.push_str(&regex::escape(rest));
        Self::new(owner, &expr)
    }

    /// `None` si no hay match; en caso contrario los slots capturados.
    pub fn matches(&self, tag: &str) -> Option<SlotBindings> {
        let caps = self.regex.captures(tag)?;
        let mut bindings = SlotBindings::new();
        for slot in &self.slots {
            if let Some(m) = caps.name(slot) {
                bindings.insert(slot.clone(), m.as_str());
            }
        }
        Some(bindings)
    }

    pub fn is_match(&self, tag: &str) -> bool {
        self.regex.is_match(tag)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }
}

impl fmt::Display for TagPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_pattern_yields_empty_bindings() {
        let p = TagPattern::literal("PinholeTable", "PINHOLE_TABLE").unwrap();
        let b = p.matches("PINHOLE_TABLE").unwrap();
        assert!(b.is_empty());
        assert!(p.matches("PINHOLE_TABLE_2").is_none());
    }

    #[test]
    fn named_groups_extract_slots() {
        let p = TagPattern::new("raw", "LM_IMAGE_(?P<target>SCI|STD)_RAW").unwrap();
        assert_eq!(p.slots(), &["target".to_string()]);
        let b = p.matches("LM_IMAGE_STD_RAW").unwrap();
        assert_eq!(b.get("target"), Some("STD"));
        assert!(p.matches("LM_IMAGE_SKY_RAW").is_none());
    }

    #[test]
    fn pattern_is_anchored() {
        let p = TagPattern::new("dark", "DARK_(?P<detector>2RG|GEO)_RAW").unwrap();
        assert!(p.matches("X_DARK_2RG_RAW").is_none());
        assert!(p.matches("DARK_2RG_RAW_OLD").is_none());
    }

    #[test]
    fn invalid_expression_fails_at_declaration() {
        let err = TagPattern::new("broken", "LM_(?P<band>").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPattern { ref item, .. } if item == "broken"));
    }

    #[test]
    fn template_binds_known_slots_and_captures_free_ones() {
        let bindings = SlotBindings::new().with("band", "LM");
        let p = TagPattern::from_template("ImageRaw", "{band}_IMAGE_{target}_RAW", &bindings, &SlotDomain::metis()).unwrap();
        assert_eq!(p.as_str(), "LM_IMAGE_(?P<target>SCI|STD|SKY)_RAW");
        let b = p.matches("LM_IMAGE_SKY_RAW").unwrap();
        assert_eq!(b.get("target"), Some("SKY"));
        assert!(p.matches("N_IMAGE_SKY_RAW").is_none());
    }

    #[test]
    fn template_without_domain_accepts_uppercase_tokens() {
        let p = TagPattern::from_template("x", "{mode}_TABLE", &SlotBindings::new(), &SlotDomain::new()).unwrap();
        assert_eq!(p.matches("LSS_TABLE").unwrap().get("mode"), Some("LSS"));
    }
}
