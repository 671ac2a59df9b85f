//! Conjunto de inputs de una ejecución.
use std::collections::HashSet;

use log::{debug, info};
use metis_domain::{Frame, FrameSet, SlotBindings};

use crate::errors::PipelineError;
use crate::input::{Input, InputSpec};
use crate::io::HeaderReader;
use crate::item::ItemRegistry;

#[derive(Debug)]
pub struct InputSet {
    owner: String,
    inputs: Vec<Input>,
    bindings: SlotBindings,
    validated: bool,
}

impl InputSet {
    /// Instancia cada input declarado contra el mismo frameset. Los tags que
    /// no corresponden a ningún item registrado se anotan y se ignoran.
    pub fn new(owner: impl Into<String>,
               specs: Vec<InputSpec>,
               frameset: &FrameSet,
               registry: &ItemRegistry)
               -> Result<Self, PipelineError> {
        let owner = owner.into();
        let mut names: HashSet<&str> = HashSet::new();
        for spec in &specs {
            if !names.insert(spec.name.as_str()) {
                return Err(PipelineError::InvalidDeclaration { subject: owner,
                                                               reason: format!("input '{}' declared twice", spec.name) });
            }
        }

        let mut inputs = Vec::with_capacity(specs.len());
        for spec in specs {
            inputs.push(Input::from_frameset(spec, frameset, registry)?);
        }

        for frame in frameset {
            if !registry.contains(&frame.tag) {
                info!("{owner}: ignoring {} with unrecognized tag '{}'", frame.path.display(), frame.tag);
            } else if !inputs.iter().any(|i| i.contents().iter().any(|m| m.frame.path == frame.path)) {
                debug!("{owner}: {} ({}) is not consumed by any input", frame.path.display(), frame.tag);
            }
        }

        Ok(Self { owner,
                  inputs,
                  bindings: SlotBindings::new(),
                  validated: false })
    }

    /// Valida cada input (se detiene en el primer error) y fusiona sus
    /// bindings. Sólo puede llamarse una vez.
    pub fn validate(&mut self, headers: &dyn HeaderReader) -> Result<&SlotBindings, PipelineError> {
        if self.validated {
            return Err(PipelineError::InvalidState { subject: self.owner.clone(),
                                                     operation: "validate".to_string(),
                                                     state: "VALIDATED".to_string() });
        }
        let mut merged = SlotBindings::new();
        for input in self.inputs.iter_mut() {
            let bindings = input.validate(headers)?;
            merged.merge_strict(bindings)
                  .map_err(|e| PipelineError::from_domain(self.owner.as_str(), e))?;
        }
        debug!("{}: resolved bindings {merged}", self.owner);
        self.bindings = merged;
        self.validated = true;
        Ok(&self.bindings)
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Bindings fusionados (vacíos antes de validar).
    pub fn bindings(&self) -> &SlotBindings {
        &self.bindings
    }

    pub fn input(&self, name: &str) -> Option<&Input> {
        self.inputs.iter().find(|i| i.name() == name)
    }

    /// Como `input`, pero un nombre no declarado es un error.
    pub fn require(&self, name: &str) -> Result<&Input, PipelineError> {
        self.input(name).ok_or_else(|| PipelineError::InvalidDeclaration { subject: self.owner.clone(),
                                                                           reason: format!("no input named '{name}'") })
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn valid_frames(&self) -> Vec<Frame> {
        union(self.inputs.iter().map(Input::valid_frames))
    }

    pub fn used_frames(&self) -> Vec<Frame> {
        union(self.inputs.iter().map(Input::used_frames))
    }
}

// Un mismo fichero puede casar con dos inputs; se conserva la primera aparición.
fn union(groups: impl Iterator<Item = Vec<Frame>>) -> Vec<Frame> {
    let mut out: Vec<Frame> = Vec::new();
    for frame in groups.flatten() {
        if !out.iter().any(|f| f.path == frame.path && f.tag == frame.tag) {
            out.push(frame);
        }
    }
    out
}
