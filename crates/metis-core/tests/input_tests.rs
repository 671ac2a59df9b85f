//! Clasificación de inputs Single / Multiple.

use metis_adapters::{register_catalogue, MemoryFrameIo};
use metis_core::constants::KEY_DPR_TECH;
use metis_core::item::DataItem;
use metis_core::{Input, InputSpec, InputState, ItemRegistry, ItemTemplate, PipelineError};
use metis_domain::{FrameGroup, FrameSet, Header, Image, SlotDomain};

use metis_adapters::items::{DarkRaw, ImageRaw, MasterDark, PersistenceMap};

fn registry() -> ItemRegistry {
    let reg = ItemRegistry::new();
    register_catalogue(&reg).expect("catalogue");
    reg
}

fn io_with(files: &[(&str, Option<&str>)]) -> MemoryFrameIo {
    let io = MemoryFrameIo::new();
    for (path, mode) in files {
        let header = match mode {
            Some(m) => Header::new().with(KEY_DPR_TECH, *m),
            None => Header::new(),
        };
        io.insert(*path, header, Image::filled(1, 1, 0.0));
    }
    io
}

fn lm_raw() -> ItemTemplate {
    ImageRaw::template().bind("band", "LM")
}

#[test]
fn single_keeps_the_last_match() {
    let reg = registry();
    let frames = FrameSet::from_pairs([("a.fits", "MASTER_DARK_2RG"), ("b.fits", "MASTER_DARK_2RG"), ("c.fits", "MASTER_DARK_2RG")]);
    let spec = InputSpec::single("dark", MasterDark::template()).unwrap();
    let mut input = Input::from_frameset(spec, &frames, &reg).unwrap();
    assert_eq!(input.len(), 1);
    assert_eq!(input.frame().map(|f| f.path.to_str()), Some(Some("c.fits")));

    input.validate(&MemoryFrameIo::new()).expect("single calib needs no header");
    assert_eq!(input.state(), InputState::Validated);
    assert_eq!(input.bindings().get("detector"), Some("2RG"));
}

#[test]
fn required_absent_fails_with_title_optional_absent_succeeds() {
    let reg = registry();
    let frames = FrameSet::from_pairs([("x.fits", "LM_IMAGE_SCI_RAW")]);

    let spec = InputSpec::single("dark", MasterDark::template().bind("detector", "GEO")).unwrap();
    let mut required = Input::from_frameset(spec, &frames, &reg).unwrap();
    let err = required.validate(&MemoryFrameIo::new()).unwrap_err();
    assert_eq!(err,
               PipelineError::NotFound { input: "dark".into(),
                                         title: "GEO master dark".into(),
                                         tag: "MASTER_DARK_GEO".into() });
    assert_eq!(required.state(), InputState::Failed);

    let spec = InputSpec::single("dark", MasterDark::template()).unwrap().optional();
    let mut optional = Input::from_frameset(spec, &frames, &reg).unwrap();
    optional.validate(&MemoryFrameIo::new()).expect("optional may be empty");
    assert!(optional.is_empty());
    assert!(optional.frame().is_none());
}

#[test]
fn multiple_keeps_frameset_order_and_resolves_detector() {
    let reg = registry();
    let io = io_with(&[("a.fits", Some("IMAGE,LM")), ("b.fits", Some("IMAGE,LM"))]);
    let frames = FrameSet::from_pairs([("b.fits", "LM_IMAGE_SCI_RAW"), ("z.fits", "N_IMAGE_SCI_RAW"), ("a.fits", "LM_IMAGE_SCI_RAW")]);
    let spec = InputSpec::multiple("raw", lm_raw()).unwrap();
    let mut input = Input::from_frameset(spec, &frames, &reg).unwrap();

    let paths: Vec<_> = input.frames().iter().map(|f| f.path.display().to_string()).collect();
    assert_eq!(paths, vec!["b.fits", "a.fits"]);
    assert!(input.contents().iter().all(|m| m.frame.group == Some(FrameGroup::Raw)));

    let bindings = input.validate(&io).expect("same detector").clone();
    assert_eq!(bindings.get("detector"), Some("2RG"));
    assert_eq!(bindings.get("target"), Some("SCI"));
    assert_eq!(bindings.get("band"), Some("LM"));
}

#[test]
fn multiple_detectors_conflict_names_both() {
    let reg = registry();
    let io = io_with(&[("a.fits", Some("IMAGE,LM")), ("b.fits", Some("IMAGE,N"))]);
    let frames = FrameSet::from_pairs([("a.fits", "LM_IMAGE_STD_RAW"), ("b.fits", "LM_IMAGE_STD_RAW")]);
    let mut input = Input::from_frameset(InputSpec::multiple("raw", lm_raw()).unwrap(), &frames, &reg).unwrap();

    let err = input.validate(&io).unwrap_err();
    assert_eq!(err,
               PipelineError::ValueConflict { subject: "raw".into(),
                                              attribute: "detector".into(),
                                              values: vec!["2RG".into(), "GEO".into()] });
}

#[test]
fn unmapped_tech_mode_is_reported_with_the_file() {
    let reg = registry();
    let io = io_with(&[("a.fits", Some("LSS,LM"))]);
    let frames = FrameSet::from_pairs([("a.fits", "DARK_2RG_RAW")]);
    let mut input = Input::from_frameset(InputSpec::multiple("raw", DarkRaw::template()).unwrap(), &frames, &reg).unwrap();

    match input.validate(&io).unwrap_err() {
        PipelineError::UnmappedValue { value, file, .. } => {
            assert_eq!(value, "LSS,LM");
            assert_eq!(file, "a.fits");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn missing_tech_mode_is_skipped() {
    let reg = registry();
    let io = io_with(&[("a.fits", None), ("b.fits", Some("IMAGE,N"))]);
    let frames = FrameSet::from_pairs([("a.fits", "DARK_GEO_RAW"), ("b.fits", "DARK_GEO_RAW")]);
    let mut input = Input::from_frameset(InputSpec::multiple("raw", DarkRaw::template()).unwrap(), &frames, &reg).unwrap();
    assert_eq!(input.validate(&io).unwrap().get("detector"), Some("GEO"));
}

#[test]
fn disagreeing_targets_in_one_input_conflict() {
    let reg = registry();
    let io = io_with(&[("a.fits", Some("IMAGE,LM")), ("b.fits", Some("IMAGE,LM"))]);
    let frames = FrameSet::from_pairs([("a.fits", "LM_IMAGE_SCI_RAW"), ("b.fits", "LM_IMAGE_STD_RAW")]);
    let mut input = Input::from_frameset(InputSpec::multiple("raw", lm_raw()).unwrap(), &frames, &reg).unwrap();
    let err = input.validate(&io).unwrap_err();
    assert!(matches!(err, PipelineError::ValueConflict { ref attribute, .. } if attribute == "target"));
}

#[test]
fn unknown_tags_are_ignored() {
    let reg = registry();
    let frames = FrameSet::from_pairs([("u.fits", "SOMETHING_ELSE"), ("d.fits", "MASTER_DARK_IFU"), ("v.fits", "MASTER_DARK_XYZ")]);
    let input = Input::from_frameset(InputSpec::single("dark", MasterDark::template()).unwrap(), &frames, &reg).unwrap();
    assert_eq!(input.frames().len(), 1);
    assert_eq!(input.frame().map(|f| f.tag.as_str()), Some("MASTER_DARK_IFU"));
}

#[test]
fn use_frames_is_idempotent() {
    let reg = registry();
    let frames = FrameSet::from_pairs([("d.fits", "MASTER_DARK_GEO")]);
    let input = Input::from_frameset(InputSpec::single("dark", MasterDark::template()).unwrap(), &frames, &reg).unwrap();
    assert!(input.used_frames().is_empty());
    assert_eq!(input.valid_frames().len(), 1);
    input.use_frames();
    input.use_frames();
    assert!(input.is_used());
    assert_eq!(input.used_frames().len(), 1);
}

#[test]
fn explicit_pattern_overrides_the_derived_one() {
    let reg = registry();
    let frames = FrameSet::from_pairs([("a.fits", "LM_IMAGE_SKY_RAW"), ("b.fits", "LM_IMAGE_SCI_RAW")]);
    let spec = InputSpec::multiple("raw", ImageRaw::template()).unwrap()
                                                               .with_pattern("LM_IMAGE_(?P<target>SCI|STD)_RAW")
                                                               .unwrap();
    let input = Input::from_frameset(spec, &frames, &reg).unwrap();
    assert_eq!(input.frame().map(|f| f.tag.as_str()), Some("LM_IMAGE_SCI_RAW"));
    assert_eq!(input.contents()[0].captured.get("target"), Some("SCI"));

    let err = InputSpec::single("bad", ImageRaw::template()).unwrap().with_pattern("(?P<x").unwrap_err();
    assert!(matches!(err, PipelineError::InvalidPattern { .. }));
}

#[test]
fn explicit_pattern_captures_reach_the_bindings() {
    let reg = registry();
    let frames = FrameSet::from_pairs([("p.fits", "PERSISTENCE_MAP")]);
    let spec = InputSpec::single("persistence", PersistenceMap::template()).unwrap()
                                                                           .with_pattern("(?P<kind>PERSISTENCE)_MAP")
                                                                           .unwrap();
    let mut input = Input::from_frameset(spec, &frames, &reg).unwrap();
    let bindings = input.validate(&MemoryFrameIo::new()).expect("captured slot merges").clone();
    assert_eq!(bindings.get("kind"), Some("PERSISTENCE"));
}

#[test]
fn captured_value_disagreeing_with_the_item_conflicts() {
    let reg = registry();
    let frames = FrameSet::from_pairs([("d.fits", "MASTER_DARK_GEO")]);
    let spec = InputSpec::single("dark", MasterDark::template()).unwrap()
                                                               .with_pattern("(?P<detector>MASTER)_DARK_GEO")
                                                               .unwrap();
    let mut input = Input::from_frameset(spec, &frames, &reg).unwrap();
    let err = input.validate(&MemoryFrameIo::new()).unwrap_err();
    assert_eq!(err,
               PipelineError::ValueConflict { subject: "dark".into(),
                                              attribute: "detector".into(),
                                              values: vec!["GEO".into(), "MASTER".into()] });
    assert_eq!(input.state(), InputState::Failed);
}

#[test]
fn derived_pattern_follows_the_registry_domain() {
    let reg = ItemRegistry::with_domain(SlotDomain::new().with_slot("detector", ["XYZ"]));
    assert_eq!(reg.register_template(&MasterDark::template()).unwrap(), 1);
    let frames = FrameSet::from_pairs([("d.fits", "MASTER_DARK_XYZ"), ("e.fits", "MASTER_DARK_GEO")]);

    let mut input = Input::from_frameset(InputSpec::single("dark", MasterDark::template()).unwrap(), &frames, &reg).unwrap();
    assert_eq!(input.frame().map(|f| f.tag.as_str()), Some("MASTER_DARK_XYZ"));
    assert_eq!(input.validate(&MemoryFrameIo::new()).unwrap().get("detector"), Some("XYZ"));
}
