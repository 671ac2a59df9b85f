//! Motor de recetas: orden de fases, ajustes, errores y eventos.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use metis_adapters::items::{BasicReduced, ImageRaw, MasterDark};
use metis_adapters::{register_catalogue, MemoryFrameIo};
use metis_core::constants::KEY_DPR_TECH;
use metis_core::item::DataItem;
use metis_core::{ErrorKind, FrameIoError, InputSpec, ItemRegistry, ItemTemplate, ParameterSpec, PipelineError, ProcessContext,
                 Product, ProductData, Recipe, RecipeEngine, RunEventKind, RunState, Settings};
use metis_domain::{FrameSet, Header, Image};
use serde_json::json;

/// Receta de prueba que registra lo que observa durante `process`.
struct Recorder {
    use_raw: bool,
    fail: bool,
    copies: usize,
    calls: Cell<usize>,
    seen_validated: Cell<bool>,
    seen_bindings: RefCell<String>,
}

impl Recorder {
    fn new() -> Self {
        Self { use_raw: true,
               fail: false,
               copies: 1,
               calls: Cell::new(0),
               seen_validated: Cell::new(false),
               seen_bindings: RefCell::new(String::new()) }
    }
}

impl Recipe for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn synopsis(&self) -> &str {
        "records what the engine hands to process"
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::new("scale", "Output scale", 1.0)]
    }

    fn inputs(&self) -> Result<Vec<InputSpec>, PipelineError> {
        Ok(vec![InputSpec::multiple("raw", ImageRaw::template().bind("band", "LM"))?,
                InputSpec::single("dark", MasterDark::template())?])
    }

    fn products(&self) -> Vec<ItemTemplate> {
        vec![BasicReduced::template()]
    }

    fn process(&self, ctx: &ProcessContext<'_>) -> Result<Vec<Product>, PipelineError> {
        self.calls.set(self.calls.get() + 1);
        self.seen_validated.set(ctx.inputset.is_validated());
        *self.seen_bindings.borrow_mut() = ctx.bindings().to_string();
        if self.fail {
            return Err(PipelineError::processing(self.name(), "recorder failure"));
        }
        let scale = ctx.parameters.get_f64("scale").unwrap_or(1.0);
        let image = if self.use_raw {
            ctx.load_all("raw")?.remove(0).scale(scale)
        } else {
            Image::filled(1, 1, scale)
        };
        let product = Product::new(&BasicReduced::template(), ctx.bindings(), ProductData::Image(image))?;
        Ok(vec![product; self.copies])
    }
}

fn registry() -> Arc<ItemRegistry> {
    let reg = ItemRegistry::new();
    register_catalogue(&reg).expect("catalogue");
    Arc::new(reg)
}

fn io() -> MemoryFrameIo {
    MemoryFrameIo::new().with_frame("a.fits", Header::new().with(KEY_DPR_TECH, "IMAGE,LM"), Image::filled(1, 1, 2.0))
                        .with_frame("c.fits", Header::new(), Image::filled(1, 1, 0.5))
}

fn frames() -> FrameSet {
    FrameSet::from_pairs([("a.fits", "LM_IMAGE_SCI_RAW"), ("c.fits", "MASTER_DARK_2RG")])
}

fn fingerprint(engine: &RecipeEngine<MemoryFrameIo>) -> Option<String> {
    engine.last_events().into_iter().find_map(|e| match e.kind {
                                        RunEventKind::RunCompleted { fingerprint, .. } => Some(fingerprint),
                                        _ => None,
                                    })
}

#[test]
fn process_runs_after_validation_and_before_any_save() {
    let recorder = Recorder::new();
    let mut engine = RecipeEngine::new(registry(), io());
    let out = engine.run(&recorder, &frames(), &Settings::new()).expect("run");

    assert_eq!(recorder.calls.get(), 1);
    assert!(recorder.seen_validated.get());
    assert_eq!(*recorder.seen_bindings.borrow(), "{band=LM, target=SCI, detector=2RG}");
    assert_eq!(out.tags(), vec!["LM_SCI_BASIC_REDUCED"]);
    assert_eq!(engine.event_codes(), "SIVPsC");
    assert_eq!(engine.state(), RunState::Done);
}

#[test]
fn validation_failure_skips_process() {
    let recorder = Recorder::new();
    let mut engine = RecipeEngine::new(registry(), io());
    let only_raw = FrameSet::from_pairs([("a.fits", "LM_IMAGE_SCI_RAW")]);

    let err = engine.run(&recorder, &only_raw, &Settings::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(recorder.calls.get(), 0);
    assert_eq!(engine.event_codes(), "SIF");
    assert_eq!(engine.state(), RunState::Failed);
}

#[test]
fn process_errors_propagate_unchanged_and_nothing_is_saved() {
    let recorder = Recorder { fail: true, ..Recorder::new() };
    let mut engine = RecipeEngine::new(registry(), io());

    let err = engine.run(&recorder, &frames(), &Settings::new()).unwrap_err();
    assert_eq!(err, PipelineError::processing("recorder", "recorder failure"));
    assert_eq!(engine.event_codes(), "SIVF");
    assert!(engine.io().saved_paths().is_empty());
}

#[test]
fn unknown_settings_only_warn() {
    let recorder = Recorder::new();
    let mut engine = RecipeEngine::new(registry(), io());
    let mut settings = Settings::new();
    settings.insert("recorder.scale".into(), json!(3));
    settings.insert("nonsense".into(), json!(true));

    let out = engine.run(&recorder, &frames(), &settings).expect("run");
    assert_eq!(engine.event_codes(), "SWIVPsC");
    let saved = out.iter().next().expect("one product");
    assert_eq!(engine.io().image_of(&saved.path).map(|i| i.data), Some(vec![6.0]));
}

#[test]
fn invalid_setting_fails_before_classification() {
    let recorder = Recorder::new();
    let mut engine = RecipeEngine::new(registry(), io());
    let mut settings = Settings::new();
    settings.insert("scale".into(), json!("large"));

    let err = engine.run(&recorder, &frames(), &settings).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(engine.event_codes(), "SF");
}

#[test]
fn data_not_found_is_returned_as_is() {
    let recorder = Recorder::new();
    let mut engine = RecipeEngine::new(registry(), MemoryFrameIo::new());

    let err = engine.run(&recorder, &frames(), &Settings::new()).unwrap_err();
    assert_eq!(err, PipelineError::Io(FrameIoError::DataNotFound { path: "a.fits".into() }));
    assert!(err.is_data_not_found());
    let failed_state = engine.last_events().into_iter().find_map(|e| match e.kind {
                                                               RunEventKind::RunFailed { state, .. } => Some(state),
                                                               _ => None,
                                                           });
    assert_eq!(failed_state.as_deref(), Some("INPUTSET-BUILT"));
}

#[test]
fn product_without_raw_frame_is_not_saved() {
    let recorder = Recorder { use_raw: false, ..Recorder::new() };
    let mut engine = RecipeEngine::new(registry(), io());

    let err = engine.run(&recorder, &frames(), &Settings::new()).unwrap_err();
    assert_eq!(err, PipelineError::NoRawFrame { product: "LM_SCI_BASIC_REDUCED".into() });
    assert_eq!(engine.event_codes(), "SIVPF");
}

#[test]
fn run_without_products_still_passes_through_saving() {
    let recorder = Recorder { copies: 0, ..Recorder::new() };
    let mut engine = RecipeEngine::new(registry(), io());

    let out = engine.run(&recorder, &frames(), &Settings::new()).expect("run");
    assert!(out.is_empty());
    assert_eq!(engine.event_codes(), "SIVPC");
    assert_eq!(engine.state(), RunState::Done);
}

#[test]
fn products_sharing_an_output_path_are_rejected_before_saving() {
    let recorder = Recorder { copies: 2, ..Recorder::new() };
    let mut engine = RecipeEngine::new(registry(), io());

    let err = engine.run(&recorder, &frames(), &Settings::new()).unwrap_err();
    assert_eq!(err,
               PipelineError::DuplicateOutput { product: "LM_SCI_BASIC_REDUCED".into(),
                                                path: "./lm_sci_basic_reduced.fits".into() });
    assert_eq!(err.kind(), ErrorKind::Processing);
    assert_eq!(engine.event_codes(), "SIVPF");
    assert!(engine.io().saved_paths().is_empty());
    let failed_state = engine.last_events().into_iter().find_map(|e| match e.kind {
                                                               RunEventKind::RunFailed { state, .. } => Some(state),
                                                               _ => None,
                                                           });
    assert_eq!(failed_state.as_deref(), Some("PROCESSED"));
}

#[test]
fn identical_runs_share_a_fingerprint() {
    let mut first = RecipeEngine::new(registry(), io());
    first.run(&Recorder::new(), &frames(), &Settings::new()).expect("first");
    let mut second = RecipeEngine::new(registry(), io());
    second.run(&Recorder::new(), &frames(), &Settings::new()).expect("second");
    assert!(fingerprint(&first).is_some());
    assert_eq!(fingerprint(&first), fingerprint(&second));

    let mut settings = Settings::new();
    settings.insert("scale".into(), json!(2.0));
    let mut third = RecipeEngine::new(registry(), io());
    third.run(&Recorder::new(), &frames(), &settings).expect("third");
    assert_ne!(fingerprint(&first), fingerprint(&third));
}
