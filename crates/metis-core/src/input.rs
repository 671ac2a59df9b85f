//! Clasificación de inputs (Single / Multiple).
//!
//! Un `Input` se crea al construir el `InputSet`, se puebla con un único
//! recorrido del frameset y se valida una vez:
//!
//! `Unloaded -> Loaded -> Validated`, o `Loaded -> Failed`.
//!
//! - Single: si hay varias coincidencias gana la última (warning con ambos
//!   ficheros).
//! - Multiple: todas las coincidencias en orden del frameset. Para items
//!   RAW se exige además un único detector según `ESO DPR TECH`.
use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use metis_domain::{Detector, Frame, FrameGroup, FrameSet, SlotBindings, SlotDomain};

use crate::constants::KEY_DPR_TECH;
use crate::errors::PipelineError;
use crate::io::HeaderReader;
use crate::item::{ItemRegistry, ItemTemplate, ResolvedItem};
use crate::tag::TagPattern;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Multiple,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::Single => "single",
            Cardinality::Multiple => "multiple",
        }
    }
}

/// Declaración de un input de receta.
#[derive(Debug, Clone)]
pub struct InputSpec {
    pub name: String,
    pub item: ItemTemplate,
    pub pattern: TagPattern,
    pub required: bool,
    pub cardinality: Cardinality,
    pub same_detector: bool,
    /// `true` si el patrón viene de `with_pattern` y no del nombre del item.
    pub explicit_pattern: bool,
}

impl InputSpec {
    /// Input de un único fichero; el patrón se deriva del nombre del item.
    pub fn single(name: impl Into<String>, item: ItemTemplate) -> Result<Self, PipelineError> {
        Self::build(name.into(), item, Cardinality::Single)
    }

    /// Input de uno o más ficheros. Si el item es RAW se activa la
    /// comprobación de detector único.
    pub fn multiple(name: impl Into<String>, item: ItemTemplate) -> Result<Self, PipelineError> {
        Self::build(name.into(), item, Cardinality::Multiple)
    }

    fn build(name: String, item: ItemTemplate, cardinality: Cardinality) -> Result<Self, PipelineError> {
        let domain = item.effective_domain(&SlotDomain::metis());
        let pattern = TagPattern::from_template(&item.id, &item.name, &item.bindings, &domain)?;
        let same_detector = cardinality == Cardinality::Multiple && item.group == Some(FrameGroup::Raw);
        Ok(Self { name,
                  item,
                  pattern,
                  required: true,
                  cardinality,
                  same_detector,
                  explicit_pattern: false })
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Sustituye el patrón derivado por una expresión explícita.
    pub fn with_pattern(mut self, expr: &str) -> Result<Self, PipelineError> {
        self.pattern = TagPattern::new(&self.item.id, expr)?;
        self.explicit_pattern = true;
        Ok(self)
    }

    pub fn same_detector(mut self, enabled: bool) -> Self {
        self.same_detector = enabled;
        self
    }

    pub fn title(&self) -> String {
        self.item.resolved_title()
    }

    /// Patrón efectivo frente a `registry`. El derivado en la declaración
    /// usa el dominio del instrumento; al cargar se rehace con el dominio
    /// del registro.
    fn pattern_for(&self, registry: &ItemRegistry) -> Result<TagPattern, PipelineError> {
        if self.explicit_pattern {
            return Ok(self.pattern.clone());
        }
        let domain = self.item.effective_domain(registry.domain());
        TagPattern::from_template(&self.item.id, &self.item.name, &self.item.bindings, &domain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    Unloaded,
    Loaded,
    Validated,
    Failed,
}

impl fmt::Display for InputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InputState::Unloaded => "UNLOADED",
            InputState::Loaded => "LOADED",
            InputState::Validated => "VALIDATED",
            InputState::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Frame clasificado junto al item concreto que lo describe.
#[derive(Debug, Clone)]
pub struct MatchedFrame {
    pub frame: Frame,
    pub item: Arc<ResolvedItem>,
    /// Slots capturados por el patrón.
    pub captured: SlotBindings,
}

#[derive(Debug)]
pub struct Input {
    spec: InputSpec,
    state: InputState,
    matched: Vec<MatchedFrame>,
    bindings: SlotBindings,
    used: Cell<bool>,
}

impl Input {
    pub fn new(spec: InputSpec) -> Self {
        let bindings = spec.item.bindings.clone();
        Self { spec,
               state: InputState::Unloaded,
               matched: Vec::new(),
               bindings,
               used: Cell::new(false) }
    }

    /// `new` + `load`.
    pub fn from_frameset(spec: InputSpec, frameset: &FrameSet, registry: &ItemRegistry) -> Result<Self, PipelineError> {
        let mut input = Self::new(spec);
        input.load(frameset, registry)?;
        Ok(input)
    }

    /// Recorre el frameset una vez. Los tags que casan con el patrón pero no
    /// están registrados se ignoran.
    pub fn load(&mut self, frameset: &FrameSet, registry: &ItemRegistry) -> Result<(), PipelineError> {
        self.ensure_state(InputState::Unloaded, "load")?;
        let pattern = self.spec.pattern_for(registry)?;
        for frame in frameset {
            let Some(captured) = pattern.matches(&frame.tag) else {
                continue;
            };
            let Some(item) = registry.find(&frame.tag) else {
                debug!("{}: tag '{}' matches but is not a registered item, ignoring {}",
                       self.spec.name,
                       frame.tag,
                       frame.path.display());
                continue;
            };
            let mut classified = frame.clone();
            classified.group = item.group.or(frame.group);
            classified.level = item.level.or(frame.level);
            classified.frame_type = item.frame_type.or(frame.frame_type);
            let matched = MatchedFrame { frame: classified,
                                         item,
                                         captured };
            match self.spec.cardinality {
                Cardinality::Single => {
                    if let Some(previous) = self.matched.pop() {
                        warn!("{}: several frames match '{}', using {} instead of {}",
                              self.spec.name,
                              self.spec.title(),
                              matched.frame.path.display(),
                              previous.frame.path.display());
                    }
                    self.matched.push(matched);
                }
                Cardinality::Multiple => self.matched.push(matched),
            }
        }
        debug!("{}: {} frame(s) matched {}", self.spec.name, self.matched.len(), pattern);
        self.state = InputState::Loaded;
        Ok(())
    }

    /// Comprueba presencia, acuerdo de slots y detector único. Cualquier
    /// error deja el input en `Failed`.
    pub fn validate(&mut self, headers: &dyn HeaderReader) -> Result<&SlotBindings, PipelineError> {
        self.ensure_state(InputState::Loaded, "validate")?;
        match self.check(headers) {
            Ok(bindings) => {
                self.bindings = bindings;
                self.state = InputState::Validated;
                Ok(&self.bindings)
            }
            Err(e) => {
                self.state = InputState::Failed;
                Err(e)
            }
        }
    }

    fn check(&self, headers: &dyn HeaderReader) -> Result<SlotBindings, PipelineError> {
        if self.matched.is_empty() {
            if self.spec.required {
                return Err(PipelineError::NotFound { input: self.spec.name.clone(),
                                                     title: self.spec.title(),
                                                     tag: self.spec.item.resolved_name() });
            }
            return Ok(self.spec.item.bindings.clone());
        }

        let mut bindings = self.spec.item.bindings.clone();
        for m in &self.matched {
            bindings.merge_strict(&m.item.bindings)
                    .and_then(|_| bindings.merge_strict(&m.captured))
                    .map_err(|e| PipelineError::from_domain(self.spec.name.as_str(), e))?;
        }

        if self.spec.same_detector {
            if let Some(detector) = self.single_detector(headers)? {
                bindings.merge_strict(&SlotBindings::new().with(Detector::SLOT, detector.as_str()))
                        .map_err(|e| PipelineError::from_domain(self.spec.name.as_str(), e))?;
            }
        }
        Ok(bindings)
    }

    /// Detector común a todos los frames, leído de la cabecera. `None` si
    /// ningún frame declara el modo técnico.
    fn single_detector(&self, headers: &dyn HeaderReader) -> Result<Option<Detector>, PipelineError> {
        let mut found: Vec<Detector> = Vec::new();
        for m in &self.matched {
            let header = headers.read_header(&m.frame)?;
            let Some(mode) = header.get_str(KEY_DPR_TECH) else {
                warn!("{}: {} has no '{}' keyword, skipping detector check for it",
                      self.spec.name,
                      m.frame.path.display(),
                      KEY_DPR_TECH);
                continue;
            };
            let detector = Detector::from_tech_mode(mode).ok_or_else(|| PipelineError::UnmappedValue { subject: self.spec.name.clone(),
                                                                                                       attribute: KEY_DPR_TECH.to_string(),
                                                                                                       value: mode.to_string(),
                                                                                                       file: m.frame.path.display().to_string() })?;
            if !found.contains(&detector) {
                found.push(detector);
            }
        }
        if found.len() > 1 {
            return Err(PipelineError::ValueConflict { subject: self.spec.name.clone(),
                                                      attribute: Detector::SLOT.to_string(),
                                                      values: found.iter().map(|d| d.as_str().to_string()).collect() });
        }
        Ok(found.pop())
    }

    fn ensure_state(&self, expected: InputState, operation: &str) -> Result<(), PipelineError> {
        if self.state != expected {
            return Err(PipelineError::InvalidState { subject: self.spec.name.clone(),
                                                     operation: operation.to_string(),
                                                     state: self.state.to_string() });
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &InputSpec {
        &self.spec
    }

    pub fn state(&self) -> InputState {
        self.state
    }

    /// Bindings del input (tras validar, incluye los de los frames).
    pub fn bindings(&self) -> &SlotBindings {
        &self.bindings
    }

    /// Coincidencias clasificadas, en orden del frameset.
    pub fn contents(&self) -> &[MatchedFrame] {
        &self.matched
    }

    /// Único frame de un input Single (o el primero de un Multiple).
    pub fn frame(&self) -> Option<&Frame> {
        self.matched.first().map(|m| &m.frame)
    }

    pub fn frames(&self) -> Vec<&Frame> {
        self.matched.iter().map(|m| &m.frame).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matched.len()
    }

    /// Marca los frames como consumidos. Idempotente.
    pub fn use_frames(&self) {
        self.used.set(true);
    }

    pub fn is_used(&self) -> bool {
        self.used.get()
    }

    pub fn valid_frames(&self) -> Vec<Frame> {
        self.matched.iter().map(|m| m.frame.clone()).collect()
    }

    pub fn used_frames(&self) -> Vec<Frame> {
        if self.is_used() {
            self.valid_frames()
        } else {
            Vec::new()
        }
    }
}
