use metis_domain::{FrameGroup, FrameLevel, FrameType, SlotBindings};
use serde::{Deserialize, Serialize};

use super::template::{Extension, ItemTemplate};
use crate::errors::PipelineError;

/// Item concreto: todos los slots de su template están ligados.
///
/// Se interna una sola vez por nombre en el `ItemRegistry`; nunca se
/// sintetizan tipos en tiempo de ejecución.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedItem {
    pub name: String,
    pub title: String,
    pub description: String,
    pub group: Option<FrameGroup>,
    pub level: Option<FrameLevel>,
    pub frame_type: Option<FrameType>,
    pub layout: Vec<Extension>,
    pub bindings: SlotBindings,
    /// Id del template del que procede.
    pub template: String,
    pub parent: Option<String>,
}

impl ResolvedItem {
    pub fn from_template(template: &ItemTemplate) -> Result<Self, PipelineError> {
        if template.is_abstract() {
            return Err(PipelineError::Unresolvable { template: template.id.clone(),
                                                     name: template.resolved_name(),
                                                     bindings: template.bindings.to_string() });
        }
        Ok(Self { name: template.resolved_name(),
                  title: template.resolved_title(),
                  description: template.resolved_description(),
                  group: template.group,
                  level: template.level,
                  frame_type: template.frame_type,
                  layout: template.layout.clone(),
                  bindings: template.bindings.clone(),
                  template: template.id.clone(),
                  parent: template.parent.clone() })
    }

    pub fn is_raw(&self) -> bool {
        self.group == Some(FrameGroup::Raw)
    }
}
