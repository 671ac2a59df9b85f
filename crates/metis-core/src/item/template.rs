//! Templates de DataItem.
//!
//! Un `ItemTemplate` describe un tipo de fichero con placeholders de slot en
//! nombre, título y descripción. "Mezclar" una banda es ligar el slot
//! `band`: la especialización es composición de datos, no jerarquía de
//! tipos.
use metis_domain::{FrameGroup, FrameLevel, FrameType, SlotBindings, SlotDomain};
use serde::{Deserialize, Serialize};

/// Extensión física esperada (nombre -> tipo).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    pub frame_type: FrameType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub id: String,
    pub parent: Option<String>,
    pub name: String,
    pub title: String,
    pub description: String,
    pub group: Option<FrameGroup>,
    pub level: Option<FrameLevel>,
    pub frame_type: Option<FrameType>,
    pub layout: Vec<Extension>,
    pub bindings: SlotBindings,
    /// Restricciones de dominio propias (sobre el dominio del registro).
    pub domain: SlotDomain,
}

/// Tipo declarado con `data_item!`.
pub trait DataItem {
    fn template() -> ItemTemplate;
}

impl ItemTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self { id: id.into(),
               parent: None,
               title: name.clone(),
               name,
               description: String::new(),
               group: None,
               level: None,
               frame_type: None,
               layout: Vec::new(),
               bindings: SlotBindings::new(),
               domain: SlotDomain::new() }
    }

    pub fn of<T: DataItem>() -> Self {
        T::template()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn group(mut self, group: FrameGroup) -> Self {
        self.group = Some(group);
        self
    }

    pub fn level(mut self, level: FrameLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn frame_type(mut self, frame_type: FrameType) -> Self {
        self.frame_type = Some(frame_type);
        self
    }

    pub fn extension(mut self, name: impl Into<String>, frame_type: FrameType) -> Self {
        self.layout.push(Extension { name: name.into(),
                                     frame_type });
        self
    }

    pub fn bind(mut self, slot: impl Into<String>, value: impl Into<String>) -> Self {
        self.bindings.insert(slot, value);
        self
    }

    /// Restringe los valores admitidos de un slot libre.
    pub fn restrict<I, S>(mut self, slot: impl Into<String>, values: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.domain = std::mem::take(&mut self.domain).with_slot(slot, values);
        self
    }

    /// Template hijo: hereda todo del padre y registra su ascendencia. Los
    /// bindings añadidos después al hijo ganan sobre los heredados.
    pub fn derive(&self, id: impl Into<String>) -> Self {
        let mut child = self.clone();
        child.parent = Some(self.id.clone());
        child.id = id.into();
        child
    }

    /// Slots usados en nombre, título o descripción.
    pub fn slots(&self) -> Vec<String> {
        let mut out = SlotBindings::placeholders(&self.name);
        for text in [&self.title, &self.description] {
            for slot in SlotBindings::placeholders(text) {
                if !out.contains(&slot) {
                    out.push(slot);
                }
            }
        }
        out
    }

    pub fn unbound_slots(&self) -> Vec<String> {
        self.slots().into_iter().filter(|s| !self.bindings.contains(s)).collect()
    }

    /// Abstracto = algún slot sin ligar.
    pub fn is_abstract(&self) -> bool {
        !self.unbound_slots().is_empty()
    }

    /// Especialización parcial o total: `bindings` se fusiona bajo los
    /// bindings propios (el propio gana).
    pub fn specialize(&self, bindings: &SlotBindings) -> Self {
        let mut out = self.clone();
        out.bindings = self.bindings.overlay(bindings);
        out
    }

    /// Nombre (tag) con los bindings propios aplicados; puede contener
    /// placeholders si el template es abstracto.
    pub fn resolved_name(&self) -> String {
        self.bindings.render(&self.name)
    }

    pub fn resolved_title(&self) -> String {
        self.bindings.render(&self.title)
    }

    pub fn resolved_description(&self) -> String {
        self.bindings.render(&self.description)
    }

    /// Dominio efectivo: restricciones propias sobre `base`.
    pub fn effective_domain(&self, base: &SlotDomain) -> SlotDomain {
        self.domain.overlay(base)
    }
}
