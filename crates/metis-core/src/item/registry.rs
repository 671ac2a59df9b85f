//! Registro de items concretos.
//!
//! Mapa nombre resuelto -> `ResolvedItem`, aditivo y de vida de proceso. Se
//! inyecta explícitamente en el motor (los tests usan registros nuevos); la
//! instancia global es sólo un `Arc` compartido inicializado una vez.
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, info};
use metis_domain::{SlotBindings, SlotDomain};
use once_cell::sync::Lazy;

use super::resolved::ResolvedItem;
use super::template::ItemTemplate;
use crate::errors::PipelineError;

static GLOBAL: Lazy<Arc<ItemRegistry>> = Lazy::new(|| Arc::new(ItemRegistry::new()));

#[derive(Debug)]
pub struct ItemRegistry {
    items: DashMap<String, Arc<ResolvedItem>>,
    templates: DashMap<String, ItemTemplate>,
    domain: SlotDomain,
}

impl Default for ItemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemRegistry {
    /// Registro vacío sobre el dominio del instrumento.
    pub fn new() -> Self {
        Self::with_domain(SlotDomain::metis())
    }

    pub fn with_domain(domain: SlotDomain) -> Self {
        Self { items: DashMap::new(),
               templates: DashMap::new(),
               domain }
    }

    /// Instancia de proceso.
    pub fn global() -> Arc<ItemRegistry> {
        Arc::clone(&GLOBAL)
    }

    pub fn domain(&self) -> &SlotDomain {
        &self.domain
    }

    /// Registra un item concreto. Un nombre ya presente no se reemplaza:
    /// devuelve `false` y deja constancia en el log.
    pub fn register(&self, item: ResolvedItem) -> bool {
        match self.items.entry(item.name.clone()) {
            Entry::Occupied(existing) => {
                info!("item '{}' already registered (from {}), ignoring registration from {}",
                      item.name,
                      existing.get().template,
                      item.template);
                false
            }
            Entry::Vacant(slot) => {
                debug!("registered item '{}'", item.name);
                slot.insert(Arc::new(item));
                true
            }
        }
    }

    /// Registra el template y todas sus variantes concretas sobre el
    /// producto cartesiano de los dominios de sus slots libres. Devuelve
    /// cuántas variantes se añadieron.
    pub fn register_template(&self, template: &ItemTemplate) -> Result<usize, PipelineError> {
        let domain = template.effective_domain(&self.domain);
        let mut combos = vec![template.bindings.clone()];
        for slot in template.unbound_slots() {
            let values = domain.values(&slot)
                               .filter(|v| !v.is_empty())
                               .ok_or_else(|| PipelineError::MissingAttribute { item: template.id.clone(),
                                                                                attribute: format!("domain of slot '{slot}'") })?;
            let mut next = Vec::with_capacity(combos.len() * values.len());
            for base in &combos {
                for value in values {
                    next.push(base.clone().with(slot.as_str(), value.as_str()));
                }
            }
            combos = next;
        }
        let mut added = 0;
        for bindings in combos {
            let concrete = template.specialize(&bindings);
            if self.register(ResolvedItem::from_template(&concrete)?) {
                added += 1;
            }
        }
        self.templates.entry(template.id.clone()).or_insert_with(|| template.clone());
        Ok(added)
    }

    /// Búsqueda exacta por nombre resuelto.
    pub fn find(&self, name: &str) -> Option<Arc<ResolvedItem>> {
        self.items.get(name).map(|r| Arc::clone(r.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Nombre resuelto (posiblemente parcial) de `template` bajo `bindings`.
    pub fn specialize(&self, template: &ItemTemplate, bindings: &SlotBindings) -> String {
        template.specialize(bindings).resolved_name()
    }

    /// `specialize` + `find`. La ausencia es un error de configuración.
    pub fn promote(&self, template: &ItemTemplate, bindings: &SlotBindings) -> Result<Arc<ResolvedItem>, PipelineError> {
        let name = self.specialize(template, bindings);
        self.find(&name).ok_or_else(|| PipelineError::Unresolvable { template: template.id.clone(),
                                                                     name,
                                                                     bindings: template.bindings.overlay(bindings).to_string() })
    }

    pub fn template(&self, id: &str) -> Option<ItemTemplate> {
        self.templates.get(id).map(|t| t.value().clone())
    }

    /// Nombres registrados, ordenados.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.items.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
