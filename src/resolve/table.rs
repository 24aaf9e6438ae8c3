//! The static key table: one entry per (family, type[, layer])

use super::schema::{
    Fallback, Family, FileGroup, Operation, OperationSchema, ParamSpec, RegistryKey, ValueKind,
};
use super::value::ParamValue;
use crate::config::Step;
use crate::error::{ConfigFileError, Result};

use Fallback::None as NoDefault;
use ParamSpec::{Flag, Input, Optional, Output, Required};
use ValueKind::{Date, DateList, Integer, Mapping, Number, Path, Pattern, Text, TextList};

pub const EXTRACT_LAYERS: &[&str] = &["NDVI", "EVI", "LST_Day", "LST_Night"];
pub const FIELD_TYPES: &[&str] = &["DOUBLE", "FLOAT", "LONG", "SHORT"];

const CURRENT: FileGroup = FileGroup::new("current", "current_file", "current_dir", "current_file_pattern");
const LONGTERM_AVG: FileGroup = FileGroup::new(
    "longterm_avg",
    "longterm_avg_file",
    "longterm_avg_dir",
    "longterm_avg_file_pattern",
);
const LONGTERM_SD: FileGroup = FileGroup::new(
    "longterm_sd",
    "longterm_sd_file",
    "longterm_sd_dir",
    "longterm_sd_file_pattern",
);
const OUTPUT_FILE_PATTERN: FileGroup =
    FileGroup::new("output", "output_file", "output_dir", "output_file_pattern");
const OUTPUT: FileGroup = FileGroup::new("output", "output_file", "output_dir", "output_pattern");
const OUTPUT_STRICT: FileGroup = OUTPUT.with_required_dir();

const HAZARD: FileGroup =
    FileGroup::new("hazard", "hazard_file", "hazard_dir", "hazard_pattern").with_required_dir();
const RASTER: FileGroup =
    FileGroup::new("raster", "raster_file", "raster_dir", "raster_pattern").with_required_dir();
const POLYGON: FileGroup =
    FileGroup::new("polygon", "polygon_file", "polygon_dir", "polygon_pattern").with_required_dir();

const START_DATE: ParamSpec = Optional("start_date", Date, NoDefault);
const END_DATE: ParamSpec = Optional("end_date", Date, NoDefault);
const HAZARD_THRESHOLD: ParamSpec =
    Optional("hazard_threshold", Number, Fallback::Registry(RegistryKey::HazardThreshold));

/// Every operation, in listing order
pub static OPERATIONS: &[OperationSchema] = &[
    // CHIRPS rainfall
    OperationSchema {
        family: Family::Chirps,
        type_name: "download",
        layer: None,
        operation: Operation::ChirpsDownload,
        summary: "Download CHIRPS precipitation data",
        params: &[
            Required("output_dir", Path),
            Required("interval", Text),
            Optional("dates", DateList, NoDefault),
            START_DATE,
            END_DATE,
            Flag("overwrite"),
        ],
    },
    OperationSchema {
        family: Family::Chirps,
        type_name: "longterm_average",
        layer: None,
        operation: Operation::ChirpsLongtermAverage,
        summary: "Long-term statistics of CHIRPS precipitation",
        params: &[
            Required("output_dir", Path),
            Required("input_dir", Path),
            Required("interval", Text),
            Optional(
                "functions",
                TextList,
                Fallback::Registry(RegistryKey::LongtermFunctions),
            ),
            Optional("file_pattern", Pattern, NoDefault),
        ],
    },
    // MODIS vegetation and temperature
    OperationSchema {
        family: Family::Modis,
        type_name: "download",
        layer: None,
        operation: Operation::ModisDownload,
        summary: "Download MODIS tiles",
        params: &[
            Required("output_dir", Path),
            Optional("product", Text, Fallback::Registry(RegistryKey::ModisProduct)),
            Optional("tiles", TextList, NoDefault),
            Optional("dates", DateList, NoDefault),
            Optional("mosaic_dir", Path, NoDefault),
            Optional("MRT_dir", Path, NoDefault),
            Flag("overwrite"),
        ],
    },
    OperationSchema {
        family: Family::Modis,
        type_name: "extract",
        layer: None,
        operation: Operation::ModisExtract,
        summary: "Extract a layer from MODIS HDF files",
        params: &[
            Required("input_dir", Path),
            Required("output_dir", Path),
            Required("layer", ValueKind::Choice(EXTRACT_LAYERS)),
            Optional("file_pattern", Pattern, NoDefault),
            Optional("output_pattern", Text, NoDefault),
            Optional("product", Text, NoDefault),
        ],
    },
    OperationSchema {
        family: Family::Modis,
        type_name: "calc_average",
        layer: Some("day_night_temp"),
        operation: Operation::ModisDayNightAverage,
        summary: "Average of day and night land surface temperature",
        params: &[
            Required("layer", Text),
            Required("lst_day_dir", Path),
            Required("lst_night_dir", Path),
            Required("output_dir", Path),
            Optional("file_pattern", Pattern, NoDefault),
            Optional("output_pattern", Text, NoDefault),
        ],
    },
    OperationSchema {
        family: Family::Modis,
        type_name: "calc_average",
        layer: Some("long_term_statistics"),
        operation: Operation::ModisLongtermStatistics,
        summary: "Long-term statistics of a MODIS product",
        params: &[
            Required("layer", Text),
            Required("input_dir", Path),
            Required("output_dir", Path),
            Required("product", Text),
            Required("file_pattern", Pattern),
            Optional("country", Text, NoDefault),
            Optional("output_pattern", Text, NoDefault),
            START_DATE,
            END_DATE,
            Optional("functions", TextList, NoDefault),
            Optional("interval", Text, NoDefault),
        ],
    },
    // derived indices
    OperationSchema {
        family: Family::Analysis,
        type_name: "rainfall_anomaly",
        layer: None,
        operation: Operation::RainfallAnomaly,
        summary: "Rainfall anomaly against the long-term average",
        params: &[
            Input(CURRENT),
            Input(LONGTERM_AVG),
            Output(OUTPUT_FILE_PATTERN),
        ],
    },
    OperationSchema {
        family: Family::Analysis,
        type_name: "SPI",
        layer: None,
        operation: Operation::StandardizedPrecipitationIndex,
        summary: "Standardized precipitation index",
        params: &[
            Input(CURRENT),
            Input(LONGTERM_AVG),
            Input(LONGTERM_SD),
            Output(OUTPUT_FILE_PATTERN),
        ],
    },
    OperationSchema {
        family: Family::Analysis,
        type_name: "days_since_last_rain",
        layer: None,
        operation: Operation::DaysSinceLastRain,
        summary: "Days since the last rainfall above a threshold",
        params: &[
            Optional("input_dir", Path, NoDefault),
            Optional("output_dir", Path, NoDefault),
            Optional("file_pattern", Pattern, NoDefault),
            Optional("threshold", Number, NoDefault),
            Optional("max_days", Integer, NoDefault),
            START_DATE,
        ],
    },
    OperationSchema {
        family: Family::Analysis,
        type_name: "VCI",
        layer: None,
        operation: Operation::VegetationConditionIndex,
        summary: "Vegetation condition index",
        params: &[
            Input(CURRENT),
            Input(FileGroup::new("EVI_max", "EVI_max_file", "EVI_max_dir", "EVI_max_pattern")),
            Input(FileGroup::new("EVI_min", "EVI_min_file", "EVI_min_dir", "EVI_min_pattern")),
            Output(OUTPUT_FILE_PATTERN),
        ],
    },
    OperationSchema {
        family: Family::Analysis,
        type_name: "TCI",
        layer: None,
        operation: Operation::TemperatureConditionIndex,
        summary: "Temperature condition index",
        params: &[
            Input(CURRENT),
            Input(FileGroup::new("LST_max", "LST_max_file", "LST_max_dir", "LST_max_pattern")),
            Input(FileGroup::new("LST_min", "LST_min_file", "LST_min_dir", "LST_min_pattern")),
            Output(OUTPUT_FILE_PATTERN),
            Optional("interval", Text, NoDefault),
        ],
    },
    OperationSchema {
        family: Family::Analysis,
        type_name: "VHI",
        layer: None,
        operation: Operation::VegetationHealthIndex,
        summary: "Vegetation health index from VCI and TCI",
        params: &[
            Input(FileGroup::new("VCI", "VCI_file", "VCI_dir", "VCI_pattern")),
            Input(FileGroup::new("TCI", "TCI_file", "TCI_dir", "TCI_pattern")),
            Output(OUTPUT),
        ],
    },
    // raster utilities
    OperationSchema {
        family: Family::Raster,
        type_name: "crop",
        layer: None,
        operation: Operation::Crop,
        summary: "Crop rasters to a boundary",
        params: &[
            Required("input_dir", Path),
            Required("output_dir", Path),
            Required("boundary_file", Path),
            Optional("file_pattern", Pattern, NoDefault),
            Optional("output_pattern", Text, NoDefault),
            Flag("overwrite"),
            Flag("no_data"),
        ],
    },
    OperationSchema {
        family: Family::Raster,
        type_name: "match_projection",
        layer: None,
        operation: Operation::MatchProjection,
        summary: "Reproject rasters onto a master grid",
        params: &[
            Input(
                FileGroup::new("master", "master_file", "master_dir", "master_pattern")
                    .with_required_dir(),
            ),
            Input(
                FileGroup::new("slave", "slave_file", "slave_dir", "slave_pattern")
                    .with_required_dir(),
            ),
            Output(OUTPUT_STRICT),
        ],
    },
    OperationSchema {
        family: Family::Raster,
        type_name: "zonal_statistics",
        layer: None,
        operation: Operation::ZonalStatistics,
        summary: "Zonal statistics of rasters over polygons",
        params: &[
            Input(RASTER),
            Input(POLYGON),
            Output(OUTPUT_STRICT),
            Required("zone_field", Text),
        ],
    },
    OperationSchema {
        family: Family::Raster,
        type_name: "apply_mask",
        layer: None,
        operation: Operation::ApplyMask,
        summary: "Mask rasters by polygons",
        params: &[
            Input(RASTER),
            Input(POLYGON),
            Output(OUTPUT_STRICT),
            Flag("no_data"),
        ],
    },
    // hazard impact
    OperationSchema {
        family: Family::Impact,
        type_name: "area",
        layer: None,
        operation: Operation::ImpactArea,
        summary: "Area affected by a hazard",
        params: &[
            Input(HAZARD),
            Required("boundary_file", Path),
            Output(OUTPUT_STRICT),
            Optional("boundary_field", Text, NoDefault),
            HAZARD_THRESHOLD,
            START_DATE,
            END_DATE,
        ],
    },
    OperationSchema {
        family: Family::Impact,
        type_name: "crops",
        layer: None,
        operation: Operation::ImpactCrops,
        summary: "Cropland affected by a hazard",
        params: &[
            Input(HAZARD),
            Input(FileGroup::new("crop", "crop_boundary", "crop_dir", "crop_pattern")),
            Required("boundary_file", Path),
            Output(OUTPUT_STRICT),
            Optional("boundary_field", Text, NoDefault),
            Optional("crop_field", Text, NoDefault),
            HAZARD_THRESHOLD,
            START_DATE,
            END_DATE,
        ],
    },
    OperationSchema {
        family: Family::Impact,
        type_name: "population",
        layer: None,
        operation: Operation::ImpactPopulation,
        summary: "Population affected by a hazard",
        params: &[
            Input(HAZARD),
            Input(FileGroup::new(
                "population",
                "population_file",
                "population_dir",
                "population_pattern",
            )),
            Required("boundary_file", Path),
            Output(OUTPUT_STRICT),
            Optional("boundary_field", Text, NoDefault),
            HAZARD_THRESHOLD,
            START_DATE,
            END_DATE,
        ],
    },
    OperationSchema {
        family: Family::Impact,
        type_name: "poverty",
        layer: None,
        operation: Operation::ImpactPoverty,
        summary: "People in poverty affected by a hazard",
        params: &[
            Input(HAZARD),
            Input(FileGroup::new(
                "poverty",
                "poverty_file",
                "poverty_dir",
                "poverty_pattern",
            )),
            Output(OUTPUT_STRICT),
            Optional("hazard_field", Text, NoDefault),
            Optional("hazard_area_code", Text, NoDefault),
            Optional("poverty_field", Text, NoDefault),
            Optional("poverty_area_code", Text, NoDefault),
            Optional("poverty_multiplier", Number, NoDefault),
            Optional("output_field", Text, NoDefault),
            START_DATE,
            END_DATE,
        ],
    },
    // CSV tables
    OperationSchema {
        family: Family::Table,
        type_name: "calc_field",
        layer: None,
        operation: Operation::CalcField,
        summary: "Append a column computed from another",
        params: &[
            Required("table_file", Path),
            Required("new_field", Text),
            Required("source_field", Text),
            Optional("multiplier", Number, Fallback::Number(1.0)),
            Optional(
                "field_type",
                ValueKind::Choice(FIELD_TYPES),
                Fallback::Text("DOUBLE"),
            ),
        ],
    },
    OperationSchema {
        family: Family::Table,
        type_name: "add_field",
        layer: None,
        operation: Operation::AddField,
        summary: "Append a constant column",
        params: &[
            Required("table_file", Path),
            Required("new_field", Text),
            Required("value", Text),
        ],
    },
    OperationSchema {
        family: Family::Table,
        type_name: "choropleth",
        layer: None,
        operation: Operation::Choropleth,
        summary: "Write an area/value table for choropleth maps",
        params: &[
            Required("input_file", Path),
            Required("output_file", Path),
            Required("area_field", Text),
            Required("value_field", Text),
            Required("start_date_field", Text),
            Required("end_date_field", Text),
        ],
    },
    OperationSchema {
        family: Family::Table,
        type_name: "merge",
        layer: None,
        operation: Operation::MergeTables,
        summary: "Inner join of two tables",
        params: &[
            Required("first_file", Path),
            Required("second_file", Path),
            Required("output_file", Path),
            Required("first_field", Text),
            Required("second_field", Text),
        ],
    },
    OperationSchema {
        family: Family::Table,
        type_name: "aggregate",
        layer: None,
        operation: Operation::Aggregate,
        summary: "Group rows and aggregate columns",
        params: &[
            Required("input_file", Path),
            Required("output_file", Path),
            Required("group_field", Text),
            Optional("functions", Mapping, Fallback::EmptyMapping),
            Optional("all_fields", ValueKind::Bool, Fallback::Bool(true)),
        ],
    },
];

/// Operations of one family, in listing order
pub fn family_operations(family: Family) -> impl Iterator<Item = &'static OperationSchema> {
    OPERATIONS.iter().filter(move |schema| schema.family == family)
}

/// Select the schema for a step of a known family.
///
/// Fails naming the type and family when `type` is unknown, and naming
/// `layer` when the type is split by layer and the step's layer is missing
/// or unknown.
pub fn lookup(family: Family, step: &Step) -> Result<&'static OperationSchema> {
    let type_name = match step.get("type") {
        None | Some(serde_yaml::Value::Null) => return Err(ConfigFileError::missing_key("type")),
        Some(value) => step
            .type_name()
            .ok_or_else(|| {
                ConfigFileError::invalid_value(
                    "type",
                    format!("'type' must be a string, found {}", ParamValue::from(value).kind_name()),
                )
            })?,
    };

    let candidates: Vec<&'static OperationSchema> = family_operations(family)
        .filter(|schema| schema.type_name == type_name)
        .collect();

    match candidates.as_slice() {
        [] => Err(ConfigFileError::invalid_type(family.name(), type_name)),
        [single] if single.layer.is_none() => Ok(*single),
        layered => {
            let known: Vec<&str> = layered.iter().filter_map(|schema| schema.layer).collect();
            let layer = step
                .get("layer")
                .filter(|v| !v.is_null())
                .ok_or_else(|| ConfigFileError::missing_key("layer"))?;
            let layer = ParamValue::from(layer).to_text().unwrap_or_default();
            layered
                .iter()
                .find(|schema| schema.layer == Some(layer.as_str()))
                .copied()
                .ok_or_else(|| {
                    ConfigFileError::invalid_value(
                        "layer",
                        format!(
                            "Unknown {family} {type_name} layer '{layer}'; expected one of {}",
                            known.join(", ")
                        ),
                    )
                })
        }
    }
}
