use super::table::{lookup, OPERATIONS};
use super::*;
use crate::error::ErrorCode;
use std::path::Path;

fn step(yaml: &str) -> Step {
    Step::from_yaml_str(1, yaml).unwrap()
}

fn resolve_step(yaml: &str) -> Result<ResolvedParams> {
    let step = step(yaml);
    let family = Family::from_process(step.process()).unwrap();
    let schema = lookup(family, &step)?;
    resolve(&step, schema, &Defaults::default())
}

#[test]
fn test_file_group_explicit_form() {
    let step = step("{process: analysis, type: VHI, VCI_file: vci.tif}");
    let reference = resolve_file_group(&step, "VCI_file", "VCI_dir", "VCI_pattern").unwrap();
    assert_eq!(
        reference.as_triple(),
        (Some(Path::new("vci.tif")), None, None)
    );
}

#[test]
fn test_file_group_pattern_form() {
    let step = step("{process: analysis, type: VHI, VCI_dir: /vci, VCI_pattern: 'vci_*.tif'}");
    let reference = resolve_file_group(&step, "VCI_file", "VCI_dir", "VCI_pattern").unwrap();
    assert_eq!(
        reference.as_triple(),
        (None, Some(Path::new("/vci")), Some("vci_*.tif"))
    );

    let no_dir = self::step("{process: analysis, type: VHI, VCI_pattern: 'vci_*.tif'}");
    let reference = resolve_file_group(&no_dir, "VCI_file", "VCI_dir", "VCI_pattern").unwrap();
    assert_eq!(reference.as_triple(), (None, None, Some("vci_*.tif")));
}

#[test]
fn test_file_group_explicit_wins() {
    let step = step("{VCI_file: a.tif, VCI_dir: /vci, VCI_pattern: '*.tif', process: analysis}");
    let reference = resolve_file_group(&step, "VCI_file", "VCI_dir", "VCI_pattern").unwrap();
    assert_eq!(reference, FileReference::Explicit(PathBuf::from("a.tif")));
}

#[test]
fn test_file_group_neither_form() {
    let step = step("{process: analysis, type: VHI, VCI_dir: /vci}");
    let err = resolve_file_group(&step, "VCI_file", "VCI_dir", "VCI_pattern").unwrap_err();
    assert!(err.is_resolution_failure());
    assert!(err.message().contains("VCI_file"));
    assert!(err.message().contains("VCI_pattern"));
}

#[test]
fn test_optional_and_required_primitives() {
    let step = step("{process: CHIRPS, type: download, interval: monthly}");
    assert_eq!(
        resolve_optional(&step, "interval", None),
        Some(ParamValue::from("monthly"))
    );
    assert_eq!(
        resolve_optional(&step, "dates", Some(ParamValue::from("2016"))),
        Some(ParamValue::from("2016"))
    );
    assert_eq!(resolve_optional(&step, "dates", None), None);

    assert!(resolve_required(&step, "interval").is_ok());
    let err = resolve_required(&step, "output_dir").unwrap_err();
    assert_eq!(err.key(), Some("output_dir"));
    assert!(err.cause().is_none());
}

#[test]
fn test_flag_is_presence_only() {
    let with_false = step("{process: raster, overwrite: false}");
    assert_eq!(resolve_flag(&with_false, "overwrite"), Some(()));

    let with_null = step("{process: raster, overwrite: ~}");
    assert_eq!(resolve_flag(&with_null, "overwrite"), Some(()));

    let absent = step("{process: raster}");
    assert_eq!(resolve_flag(&absent, "overwrite"), None);
}

#[test]
fn test_every_flag_resolves_from_presence() {
    for schema in OPERATIONS {
        for flag in schema.flags() {
            let mut base = minimal_step_yaml(schema);
            let absent = resolve(&step(&base), schema, &Defaults::default()).unwrap();
            assert!(!absent.flag(flag).unwrap(), "{} {flag}", schema.title());

            base.push_str(&format!("{flag}: false\n"));
            let present = resolve(&step(&base), schema, &Defaults::default()).unwrap();
            assert!(present.flag(flag).unwrap(), "{} {flag}", schema.title());
        }
    }
}

#[test]
fn test_every_required_key_fails_when_removed() {
    for schema in OPERATIONS {
        for key in schema.required_keys() {
            let yaml: String = minimal_step_yaml(schema)
                .lines()
                .filter(|line| !line.starts_with(&format!("{key}:")))
                .map(|line| format!("{line}\n"))
                .collect();
            let step = step(&yaml);
            let family = Family::from_process(step.process()).unwrap();
            let err = lookup(family, &step)
                .and_then(|schema| resolve(&step, schema, &Defaults::default()))
                .unwrap_err();
            assert_eq!(err.key(), Some(key), "{} without {key}", schema.title());
            assert_eq!(err.code(), ErrorCode::VALIDATION_MISSING_KEY);
        }
    }
}

#[test]
fn test_every_file_group_needs_a_form() {
    for schema in OPERATIONS {
        for (group, _) in schema.groups() {
            let yaml: String = minimal_step_yaml(schema)
                .lines()
                .filter(|line| {
                    let key = line.split(':').next().unwrap_or_default();
                    key != group.file && key != group.pattern && key != group.dir
                })
                .map(|line| format!("{line}\n"))
                .collect();
            let err = resolve(&step(&yaml), schema, &Defaults::default()).unwrap_err();
            assert!(err.is_resolution_failure(), "{} {}", schema.title(), group.label);
            assert_eq!(err.key(), Some(group.file));
        }
    }
}

#[test]
fn test_minimal_steps_resolve() {
    for schema in OPERATIONS {
        let yaml = minimal_step_yaml(schema);
        let resolved = resolve(&step(&yaml), schema, &Defaults::default());
        assert!(resolved.is_ok(), "{}: {:?}", schema.title(), resolved.err());
    }
}

#[test]
fn test_required_directory_for_pattern_form() {
    let err = resolve_step(
        "{process: impact, type: area, hazard_pattern: 'vhi_*.tif', boundary_file: adm.shp, output_file: out.csv}",
    )
    .unwrap_err();
    assert_eq!(err.key(), Some("hazard_dir"));

    let resolved = resolve_step(
        "{process: analysis, type: VHI, VCI_pattern: 'vci_*.tif', TCI_file: tci.tif, output_file: vhi.tif}",
    )
    .unwrap();
    assert_eq!(
        resolved.input("VCI").unwrap(),
        FileReference::Pattern {
            dir: None,
            pattern: "vci_*.tif".to_string()
        }
    );
}

#[test]
fn test_missing_output_specification() {
    let err = resolve_step(
        "{process: impact, type: population, hazard_pattern: 'vhi_*.tif', hazard_dir: /h, population_file: pop.tif, boundary_file: adm.shp}",
    )
    .unwrap_err();
    assert!(err.is_resolution_failure());
    assert!(err.message().contains("output"));
    assert_eq!(err.key(), Some("output_file"));
}

#[test]
fn test_registry_defaults_fill_omitted_keys() {
    let resolved = resolve_step("{process: MODIS, type: download, output_dir: /modis}").unwrap();
    assert_eq!(resolved.text("product").unwrap(), "MOD13A3.005");
    assert_eq!(resolved.opt_text_list("tiles").unwrap(), None);

    let resolved = resolve_step(
        "{process: CHIRPS, type: longterm_average, output_dir: /o, input_dir: /i, interval: monthly}",
    )
    .unwrap();
    assert_eq!(resolved.text_list("functions").unwrap(), vec!["AVG"]);

    let resolved = resolve_step(
        "{process: impact, type: area, hazard_file: vhi.tif, boundary_file: adm.shp, output_file: out.csv}",
    )
    .unwrap();
    assert_eq!(resolved.opt_number("hazard_threshold").unwrap(), Some(40.0));
}

#[test]
fn test_step_values_override_defaults() {
    let resolved =
        resolve_step("{process: MODIS, type: download, output_dir: /m, product: MOD11A2.006}")
            .unwrap();
    assert_eq!(resolved.text("product").unwrap(), "MOD11A2.006");
}

#[test]
fn test_value_kinds_are_checked() {
    let err = resolve_step(
        "{process: CHIRPS, type: download, output_dir: /o, interval: monthly, start_date: 'March'}",
    )
    .unwrap_err();
    assert_eq!(err.key(), Some("start_date"));
    assert_eq!(err.code(), ErrorCode::VALIDATION_INVALID_VALUE);

    let err = resolve_step("{process: raster, type: crop, input_dir: [a], output_dir: /o, boundary_file: b.shp}")
        .unwrap_err();
    assert_eq!(err.key(), Some("input_dir"));

    let err = resolve_step(
        "{process: impact, type: area, hazard_file: h.tif, boundary_file: b.shp, output_file: o.csv, hazard_threshold: high}",
    )
    .unwrap_err();
    assert_eq!(err.key(), Some("hazard_threshold"));
}

#[test]
fn test_dates_accept_partial_forms() {
    assert!(check_date("dates", "2016-02-29").is_ok());
    assert!(check_date("dates", "2016-02").is_ok());
    assert!(check_date("dates", "2016").is_ok());
    assert!(check_date("dates", "2015-02-29").is_err());
    assert!(check_date("dates", "2016-13").is_err());
    assert!(check_date("dates", "16").is_err());
}

#[test]
fn test_text_list_accepts_single_value() {
    let resolved = resolve_step(
        "{process: MODIS, type: download, output_dir: /m, tiles: h21v09, dates: [2016-01, 2016-02]}",
    )
    .unwrap();
    assert_eq!(resolved.text_list("tiles").unwrap(), vec!["h21v09"]);
    assert_eq!(resolved.text_list("dates").unwrap(), vec!["2016-01", "2016-02"]);
}

#[test]
fn test_invalid_input_pattern() {
    let err = resolve_step(
        "{process: analysis, type: VHI, VCI_dir: /v, VCI_pattern: '^(vci', TCI_file: t.tif, output_file: o.tif}",
    )
    .unwrap_err();
    assert_eq!(err.key(), Some("VCI_pattern"));
    assert!(err.cause().is_some());
}

#[test]
fn test_extract_layer_choice() {
    let err = resolve_step("{process: MODIS, type: extract, input_dir: /i, output_dir: /o, layer: NDWI}")
        .unwrap_err();
    assert_eq!(err.key(), Some("layer"));
    assert!(err.message().contains("NDVI"));
}

#[test]
fn test_resolve_all_collects_every_issue() {
    let step = step("{process: raster, type: crop, file_pattern: '^(bad'}");
    let schema = lookup(Family::Raster, &step).unwrap();
    let issues = resolve_all(&step, schema, &Defaults::default()).unwrap_err();
    let keys: Vec<_> = issues.iter().filter_map(|e| e.key()).collect();
    assert_eq!(keys, vec!["input_dir", "output_dir", "boundary_file", "file_pattern"]);
}

/// A step for `schema` carrying every required key and the explicit form of
/// every file group; the pattern-only groups get a directory and pattern.
fn minimal_step_yaml(schema: &OperationSchema) -> String {
    let mut yaml = format!("process: {}\ntype: {}\n", schema.family, schema.type_name);
    if let Some(layer) = schema.layer {
        yaml.push_str(&format!("layer: {layer}\n"));
    }
    for spec in schema.params {
        match spec {
            ParamSpec::Required("layer", _) => {
                if schema.layer.is_none() {
                    yaml.push_str("layer: NDVI\n");
                }
            }
            ParamSpec::Required(key, kind) => {
                let value = match kind {
                    ValueKind::Number | ValueKind::Integer => "1",
                    ValueKind::Date => "2016-01",
                    ValueKind::Pattern => "'*.tif'",
                    _ => "value",
                };
                yaml.push_str(&format!("{key}: {value}\n"));
            }
            ParamSpec::Input(group) | ParamSpec::Output(group) => {
                yaml.push_str(&format!("{}: {}.tif\n", group.file, group.label))
            }
            ParamSpec::Optional(..) | ParamSpec::Flag(_) => {}
        }
    }
    yaml
}
