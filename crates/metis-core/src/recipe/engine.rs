//! Motor de ejecución de recetas.
//!
//! Orden estricto por ejecución:
//! ajustes -> InputSet -> validate -> process -> save -> frameset de salida.
//! Dos productos con la misma ruta de salida abortan antes de guardar nada.
//! Cada transición deja un evento; cualquier fallo deja `RunFailed` y se
//! devuelve sin transformar.
use std::collections::HashSet;
use std::sync::Arc;

use log::{error, info};
use metis_domain::{FrameSet, SlotBindings};
use serde_json::json;
use uuid::Uuid;

use super::{ProcessContext, Recipe, RunState};
use crate::config::EngineConfig;
use crate::constants::ENGINE_VERSION;
use crate::errors::PipelineError;
use crate::event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
use crate::hashing::hash_value;
use crate::inputset::InputSet;
use crate::io::FrameIo;
use crate::item::ItemRegistry;
use crate::params::{ParameterList, Settings};

#[derive(Debug)]
pub struct RecipeEngine<I, E = InMemoryEventStore>
    where I: FrameIo,
          E: EventStore
{
    registry: Arc<ItemRegistry>,
    io: I,
    events: E,
    config: EngineConfig,
    last_run: Option<Uuid>,
}

impl<I: FrameIo> RecipeEngine<I, InMemoryEventStore> {
    /// Motor con store de eventos en memoria y configuración por defecto.
    pub fn new(registry: Arc<ItemRegistry>, io: I) -> Self {
        Self::with_store(registry, io, InMemoryEventStore::default())
    }
}

impl<I, E> RecipeEngine<I, E>
    where I: FrameIo,
          E: EventStore
{
    pub fn with_store(registry: Arc<ItemRegistry>, io: I, events: E) -> Self {
        Self { registry,
               io,
               events,
               config: EngineConfig::default(),
               last_run: None }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ItemRegistry> {
        &self.registry
    }

    pub fn io(&self) -> &I {
        &self.io
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn last_run_id(&self) -> Option<Uuid> {
        self.last_run
    }

    /// Eventos de la última ejecución.
    pub fn last_events(&self) -> Vec<RunEvent> {
        self.last_run.map(|id| self.events.list(id)).unwrap_or_default()
    }

    /// Secuencia compacta de la última ejecución, p.ej. `"SIVPsC"`.
    pub fn event_codes(&self) -> String {
        self.last_events().iter().map(|e| e.kind.code()).collect()
    }

    /// Estado de la última ejecución reconstruido por replay.
    pub fn state(&self) -> RunState {
        RunState::replay(&self.last_events())
    }

    /// Ejecuta `recipe` sobre `frameset` y devuelve los frames emitidos.
    pub fn run(&mut self, recipe: &dyn Recipe, frameset: &FrameSet, settings: &Settings) -> Result<FrameSet, PipelineError> {
        let run_id = Uuid::new_v4();
        self.last_run = Some(run_id);
        self.events.append_kind(run_id,
                                RunEventKind::RunStarted { recipe: recipe.name().to_string(),
                                                           version: recipe.version().to_string(),
                                                           frame_count: frameset.len() });
        info!("{}: starting with {} frame(s)", recipe.name(), frameset.len());

        let mut state = RunState::Created;
        match self.execute(run_id, recipe, frameset, settings, &mut state) {
            Ok(output) => {
                info!("{}: done, {} product(s)", recipe.name(), output.len());
                Ok(output)
            }
            Err(err) => {
                if err.is_data_not_found() {
                    error!("{}: input data missing while {}: {}", recipe.name(), state, err);
                }
                self.events.append_kind(run_id,
                                        RunEventKind::RunFailed { state: state.to_string(),
                                                                  error: err.clone() });
                Err(err)
            }
        }
    }

    fn execute(&mut self,
               run_id: Uuid,
               recipe: &dyn Recipe,
               frameset: &FrameSet,
               settings: &Settings,
               state: &mut RunState)
               -> Result<FrameSet, PipelineError> {
        let name = recipe.name();

        let mut parameters = ParameterList::new(recipe.parameters());
        for key in parameters.apply(name, settings)? {
            self.events.append_kind(run_id, RunEventKind::SettingIgnored { key });
        }

        let mut inputset = InputSet::new(name, recipe.inputs()?, frameset, &self.registry)?;
        let names = inputset.inputs().iter().map(|i| i.name().to_string()).collect();
        self.events.append_kind(run_id, RunEventKind::InputSetBuilt { inputs: names });
        state.advance();

        let bindings = inputset.validate(&self.io)?.clone();
        self.events.append_kind(run_id, RunEventKind::Validated { bindings: pairs(&bindings) });
        state.advance();

        let products = {
            let ctx = ProcessContext { recipe: name,
                                       inputset: &inputset,
                                       parameters: &parameters,
                                       io: &self.io,
                                       frameset };
            recipe.process(&ctx)?
        };
        self.events.append_kind(run_id,
                                RunEventKind::Processed { products: products.iter().map(|p| p.tag().to_string()).collect() });
        state.advance();

        let mut paths = HashSet::with_capacity(products.len());
        for product in &products {
            let path = product.output_path(&self.config);
            if !paths.insert(path.clone()) {
                return Err(PipelineError::DuplicateOutput { product: product.tag().to_string(),
                                                            path: path.display().to_string() });
            }
        }

        let used = inputset.used_frames();
        let mut output = FrameSet::new();
        let mut hashes = Vec::with_capacity(products.len());
        for product in &products {
            let frame = product.save(name, frameset, &parameters, &used, &self.io, &self.config)?;
            let hash = product.data().hash();
            self.events.append_kind(run_id,
                                    RunEventKind::ProductSaved { tag: frame.tag.clone(),
                                                                 path: frame.path.display().to_string(),
                                                                 hash: hash.clone() });
            hashes.push(hash);
            output.push(frame);
        }
        state.advance();

        let fingerprint = hash_value(&json!({
            "engine_version": ENGINE_VERSION,
            "recipe": name,
            "version": recipe.version(),
            "params": parameters.as_json(),
            "inputs": frameset.tags(),
            "outputs": hashes,
        }));
        self.events.append_kind(run_id,
                                RunEventKind::RunCompleted { fingerprint,
                                                             outputs: output.iter().map(|f| f.path.display().to_string()).collect() });
        state.advance();
        Ok(output)
    }
}

fn pairs(bindings: &SlotBindings) -> Vec<(String, String)> {
    bindings.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
