use metis_domain::{Band, CombineMethod, Detector, DomainError, Frame, FrameGroup, FrameSet, Header, HeaderValue, Image,
                   SlotBindings, SlotDomain, Target};

#[test]
fn test_band_maps_to_detector() {
    assert_eq!(Band::Lm.detector(), Detector::TwoRg);
    assert_eq!(Band::N.detector(), Detector::Geo);
    assert_eq!(Band::Ifu.detector(), Detector::Ifu);
}

#[test]
fn test_slot_values_parse_and_reject_unknown() {
    assert_eq!("SCI".parse::<Target>().unwrap(), Target::Sci);
    assert_eq!("2RG".parse::<Detector>().unwrap(), Detector::TwoRg);
    let err = "XX".parse::<Band>().unwrap_err();
    assert_eq!(err, DomainError::UnknownSlotValue { slot: "band".into(), value: "XX".into() });
}

#[test]
fn test_metis_domain_is_closed() {
    let domain = SlotDomain::metis();
    assert_eq!(domain.values("band").unwrap(), &["LM".to_string(), "N".to_string(), "IFU".to_string()]);
    assert_eq!(domain.values("detector").unwrap().len(), 3);
    assert!(domain.values("unknown").is_none());

    let restricted = SlotDomain::new().with_slot("band", ["LM", "N"]).overlay(&domain);
    assert_eq!(restricted.values("band").unwrap().len(), 2);
    assert_eq!(restricted.values("target").unwrap().len(), 3);
}

#[test]
fn test_bindings_display_is_ordered() {
    let b: SlotBindings = [("band", "LM"), ("target", "SCI")].into_iter().collect();
    assert_eq!(b.to_string(), "{band=LM, target=SCI}");
}

#[test]
fn test_frameset_preserves_caller_order() {
    let fs = FrameSet::from_pairs([("b.fits", "X"), ("a.fits", "X"), ("c.fits", "Y")]);
    let paths: Vec<String> = fs.iter().map(|f| f.path.display().to_string()).collect();
    assert_eq!(paths, vec!["b.fits", "a.fits", "c.fits"]);
    assert_eq!(fs.find_by_tag("X").len(), 2);
}

#[test]
fn test_frame_group_flags_raw() {
    let f = Frame::new("a.fits", "DARK_2RG_RAW").with_group(FrameGroup::Raw);
    assert!(f.is_raw());
    assert!(!Frame::new("a.fits", "DARK_2RG_RAW").is_raw());
}

#[test]
fn test_header_lookup() {
    let h = Header::new().with("ESO DPR TECH", "IMAGE,LM").with("NAXIS", 2i64);
    assert_eq!(h.get_str("ESO DPR TECH"), Some("IMAGE,LM"));
    assert_eq!(h.get("NAXIS"), Some(&HeaderValue::Integer(2)));
    assert_eq!(h.get_str("NAXIS"), None);
    assert_eq!(h.len(), 2);
}

#[test]
fn test_image_arithmetic_checks_shape() {
    let a = Image::filled(2, 2, 4.0);
    let b = Image::filled(2, 2, 1.0);
    assert_eq!(a.subtract(&b).unwrap().data, vec![3.0; 4]);
    assert_eq!(a.divide(&Image::filled(2, 2, 0.0)).unwrap().data, vec![0.0; 4]);
    assert!(a.subtract(&Image::filled(3, 1, 1.0)).is_err());
    assert_eq!(a.scale(0.5).mean(), 2.0);
}

#[test]
fn test_image_data_length_is_checked() {
    assert_eq!(Image::new(2, 2, vec![1.0]).unwrap_err(),
               DomainError::DataLength { expected: 4, found: 1 });
    // Campos públicos: una imagen incoherente no llega a indexarse.
    let broken = Image { width: 2,
                         height: 2,
                         data: vec![1.0; 3] };
    assert_eq!(Image::filled(2, 2, 1.0).subtract(&broken).unwrap_err(),
               DomainError::DataLength { expected: 4, found: 3 });
    assert!(broken.check_len().is_err());
}

#[test]
fn test_combine_method_parse() {
    assert_eq!("MEDIAN".parse::<CombineMethod>().unwrap(), CombineMethod::Median);
    assert_eq!("mean".parse::<CombineMethod>().unwrap(), CombineMethod::Average);
    assert!("sigclip".parse::<CombineMethod>().is_err());
    let v = serde_json::to_value(CombineMethod::Sum).unwrap();
    assert_eq!(v, serde_json::json!("Sum"));
}
