//! Typed requests, one per operation.
//!
//! Field names follow the collaborator's argument names, which is why some
//! differ from the job keys (`no_data` is sent as `nodata`, `boundary_file`
//! as `boundary`, `functions` as `function_list`).

use crate::files::{FileReference, OutputSpec};
use crate::resolve::Family;
use crate::tables::TableOperation;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChirpsDownload {
    pub output_dir: PathBuf,
    pub interval: String,
    pub dates: Option<Vec<String>>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChirpsLongtermStats {
    pub interval: String,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub pattern: Option<String>,
    pub function_list: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModisDownload {
    pub output_dir: PathBuf,
    pub product: String,
    pub tiles: Option<Vec<String>>,
    pub dates: Option<Vec<String>>,
    pub mosaic_dir: Option<PathBuf>,
    pub mrt_dir: Option<PathBuf>,
    pub overwrite: bool,
}

/// Layers extractable from MODIS HDF files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModisLayer {
    #[serde(rename = "NDVI")]
    Ndvi,
    #[serde(rename = "EVI")]
    Evi,
    #[serde(rename = "LST_Day")]
    LstDay,
    #[serde(rename = "LST_Night")]
    LstNight,
}

impl ModisLayer {
    pub fn parse(layer: &str) -> Option<Self> {
        match layer {
            "NDVI" => Some(ModisLayer::Ndvi),
            "EVI" => Some(ModisLayer::Evi),
            "LST_Day" => Some(ModisLayer::LstDay),
            "LST_Night" => Some(ModisLayer::LstNight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModisExtract {
    pub layer: ModisLayer,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub file_pattern: Option<String>,
    pub output_pattern: Option<String>,
    pub product: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayNightAverage {
    pub day_dir: PathBuf,
    pub night_dir: PathBuf,
    pub output_dir: PathBuf,
    pub input_pattern: Option<String>,
    pub output_pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModisLongtermStats {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub product: String,
    pub interval: Option<String>,
    pub country: Option<String>,
    pub input_pattern: String,
    pub output_pattern: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub function_list: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainfallAnomaly {
    pub current: FileReference,
    pub longterm_avg: FileReference,
    pub destination: OutputSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardizedPrecipitation {
    pub current: FileReference,
    pub longterm_avg: FileReference,
    pub longterm_sd: FileReference,
    pub destination: OutputSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaysSinceLastRain {
    pub data_dir: Option<PathBuf>,
    pub data_pattern: Option<String>,
    pub dst_dir: Option<PathBuf>,
    pub start_date: Option<String>,
    pub threshold: Option<f64>,
    pub max_days: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VegetationCondition {
    pub current: FileReference,
    pub evi_max: FileReference,
    pub evi_min: FileReference,
    pub destination: OutputSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureCondition {
    pub current: FileReference,
    pub lst_max: FileReference,
    pub lst_min: FileReference,
    pub destination: OutputSpec,
    pub interval: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VegetationHealth {
    pub vci: FileReference,
    pub tci: FileReference,
    pub destination: OutputSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropFiles {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub boundary_file: PathBuf,
    pub file_pattern: Option<String>,
    pub output_pattern: Option<String>,
    pub overwrite: bool,
    pub nodata: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchProjection {
    pub master: FileReference,
    pub slave: FileReference,
    pub destination: OutputSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZonalStatistics {
    pub raster: FileReference,
    pub polygon: FileReference,
    pub destination: OutputSpec,
    pub zone_field: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskByShapefile {
    pub raster: FileReference,
    pub polygon: FileReference,
    pub destination: OutputSpec,
    pub nodata: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactArea {
    pub hazard_raster: FileReference,
    pub boundary: PathBuf,
    pub b_field: Option<String>,
    pub threshold: Option<f64>,
    pub destination: OutputSpec,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactCrops {
    pub hazard_raster: FileReference,
    pub crop_boundary: FileReference,
    pub crop_field: Option<String>,
    pub threshold: Option<f64>,
    pub admin_boundary: PathBuf,
    pub admin_boundary_field: Option<String>,
    pub destination: OutputSpec,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactPopulation {
    pub hazard_raster: FileReference,
    pub population_raster: FileReference,
    pub boundary: PathBuf,
    pub b_field: Option<String>,
    pub threshold: Option<f64>,
    pub destination: OutputSpec,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactPoverty {
    pub impact: FileReference,
    pub impact_field: Option<String>,
    pub impact_match_field: Option<String>,
    pub poor: FileReference,
    pub poor_field: Option<String>,
    pub poor_match_field: Option<String>,
    pub poor_multiplier: Option<f64>,
    pub destination: OutputSpec,
    pub output_field: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// A normalized request for one operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Call {
    ChirpsDownload(ChirpsDownload),
    ChirpsLongtermStats(ChirpsLongtermStats),
    ModisDownload(ModisDownload),
    ModisExtract(ModisExtract),
    DayNightAverage(DayNightAverage),
    ModisLongtermStats(ModisLongtermStats),
    RainfallAnomaly(RainfallAnomaly),
    StandardizedPrecipitation(StandardizedPrecipitation),
    DaysSinceLastRain(DaysSinceLastRain),
    VegetationCondition(VegetationCondition),
    TemperatureCondition(TemperatureCondition),
    VegetationHealth(VegetationHealth),
    CropFiles(CropFiles),
    MatchProjection(MatchProjection),
    ZonalStatistics(ZonalStatistics),
    MaskByShapefile(MaskByShapefile),
    ImpactArea(ImpactArea),
    ImpactCrops(ImpactCrops),
    ImpactPopulation(ImpactPopulation),
    ImpactPoverty(ImpactPoverty),
    Table(TableOperation),
}

impl Call {
    pub fn family(&self) -> Family {
        match self {
            Call::ChirpsDownload(_) | Call::ChirpsLongtermStats(_) => Family::Chirps,
            Call::ModisDownload(_)
            | Call::ModisExtract(_)
            | Call::DayNightAverage(_)
            | Call::ModisLongtermStats(_) => Family::Modis,
            Call::RainfallAnomaly(_)
            | Call::StandardizedPrecipitation(_)
            | Call::DaysSinceLastRain(_)
            | Call::VegetationCondition(_)
            | Call::TemperatureCondition(_)
            | Call::VegetationHealth(_) => Family::Analysis,
            Call::CropFiles(_)
            | Call::MatchProjection(_)
            | Call::ZonalStatistics(_)
            | Call::MaskByShapefile(_) => Family::Raster,
            Call::ImpactArea(_)
            | Call::ImpactCrops(_)
            | Call::ImpactPopulation(_)
            | Call::ImpactPoverty(_) => Family::Impact,
            Call::Table(_) => Family::Table,
        }
    }

    /// Collaborator function name
    pub fn function(&self) -> &'static str {
        match self {
            Call::ChirpsDownload(_) | Call::ModisDownload(_) => "download_data",
            Call::ChirpsLongtermStats(_) => "calculate_longterm_stats",
            Call::ModisExtract(req) => match req.layer {
                ModisLayer::Ndvi => "extract_NDVI",
                ModisLayer::Evi => "extract_EVI",
                ModisLayer::LstDay | ModisLayer::LstNight => "extract_LST",
            },
            Call::DayNightAverage(_) => "match_day_night_files",
            Call::ModisLongtermStats(_) => "calc_longterm_stats",
            Call::RainfallAnomaly(_) => "calc_rainfall_anomaly",
            Call::StandardizedPrecipitation(_) => "calc_standardized_precipitation_index",
            Call::DaysSinceLastRain(_) => "calc_days_since_last_rainfall",
            Call::VegetationCondition(_) => "calc_vci",
            Call::TemperatureCondition(_) => "calc_tci",
            Call::VegetationHealth(_) => "calc_vhi",
            Call::CropFiles(_) => "crop_files",
            Call::MatchProjection(_) => "match_projection",
            Call::ZonalStatistics(_) => "calc_zonal_statistics",
            Call::MaskByShapefile(_) => "mask_by_shapefile",
            Call::ImpactArea(_) => "calculate_impact_area",
            Call::ImpactCrops(_) => "calculate_impact_crops",
            Call::ImpactPopulation(_) => "calculate_impact_popn",
            Call::ImpactPoverty(_) => "calculate_impact_poverty",
            Call::Table(op) => op.function(),
        }
    }

    /// `family.function`, the name the backend is invoked with
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.family().name().to_ascii_lowercase(), self.function())
    }

    /// Input file groups, primary group first
    pub fn inputs(&self) -> Vec<(&'static str, &FileReference)> {
        match self {
            Call::RainfallAnomaly(req) => {
                vec![("current", &req.current), ("longterm_avg", &req.longterm_avg)]
            }
            Call::StandardizedPrecipitation(req) => vec![
                ("current", &req.current),
                ("longterm_avg", &req.longterm_avg),
                ("longterm_sd", &req.longterm_sd),
            ],
            Call::VegetationCondition(req) => vec![
                ("current", &req.current),
                ("EVI_max", &req.evi_max),
                ("EVI_min", &req.evi_min),
            ],
            Call::TemperatureCondition(req) => vec![
                ("current", &req.current),
                ("LST_max", &req.lst_max),
                ("LST_min", &req.lst_min),
            ],
            Call::VegetationHealth(req) => vec![("VCI", &req.vci), ("TCI", &req.tci)],
            Call::MatchProjection(req) => vec![("slave", &req.slave), ("master", &req.master)],
            Call::ZonalStatistics(req) => vec![("raster", &req.raster), ("polygon", &req.polygon)],
            Call::MaskByShapefile(req) => vec![("raster", &req.raster), ("polygon", &req.polygon)],
            Call::ImpactArea(req) => vec![("hazard", &req.hazard_raster)],
            Call::ImpactCrops(req) => {
                vec![("hazard", &req.hazard_raster), ("crop", &req.crop_boundary)]
            }
            Call::ImpactPopulation(req) => vec![
                ("hazard", &req.hazard_raster),
                ("population", &req.population_raster),
            ],
            Call::ImpactPoverty(req) => vec![("hazard", &req.impact), ("poverty", &req.poor)],
            _ => Vec::new(),
        }
    }

    /// Output specification, for operations producing named files
    pub fn destination(&self) -> Option<&OutputSpec> {
        match self {
            Call::RainfallAnomaly(req) => Some(&req.destination),
            Call::StandardizedPrecipitation(req) => Some(&req.destination),
            Call::VegetationCondition(req) => Some(&req.destination),
            Call::TemperatureCondition(req) => Some(&req.destination),
            Call::VegetationHealth(req) => Some(&req.destination),
            Call::MatchProjection(req) => Some(&req.destination),
            Call::ZonalStatistics(req) => Some(&req.destination),
            Call::MaskByShapefile(req) => Some(&req.destination),
            Call::ImpactArea(req) => Some(&req.destination),
            Call::ImpactCrops(req) => Some(&req.destination),
            Call::ImpactPopulation(req) => Some(&req.destination),
            Call::ImpactPoverty(req) => Some(&req.destination),
            _ => None,
        }
    }

    /// Directories the operation writes into
    pub fn output_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = match self {
            Call::ChirpsDownload(req) => vec![req.output_dir.clone()],
            Call::ChirpsLongtermStats(req) => vec![req.output_dir.clone()],
            Call::ModisDownload(req) => {
                let mut dirs = vec![req.output_dir.clone()];
                dirs.extend(req.mosaic_dir.clone());
                dirs
            }
            Call::ModisExtract(req) => vec![req.output_dir.clone()],
            Call::DayNightAverage(req) => vec![req.output_dir.clone()],
            Call::ModisLongtermStats(req) => vec![req.output_dir.clone()],
            Call::DaysSinceLastRain(req) => req.dst_dir.iter().cloned().collect(),
            Call::CropFiles(req) => vec![req.output_dir.clone()],
            Call::Table(op) => op
                .output_path()
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .into_iter()
                .collect(),
            _ => Vec::new(),
        };
        dirs.extend(self.destination().and_then(OutputSpec::directory));
        dirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_call_serializes_collaborator_names() {
        let call = Call::CropFiles(CropFiles {
            input_dir: PathBuf::from("/in"),
            output_dir: PathBuf::from("/out"),
            boundary_file: PathBuf::from("b.shp"),
            file_pattern: None,
            output_pattern: None,
            overwrite: false,
            nodata: true,
        });
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["input_dir"], "/in");
        assert_eq!(json["nodata"], true);
        assert!(json["file_pattern"].is_null());
        assert_eq!(call.qualified_name(), "raster.crop_files");
        assert_eq!(call.output_dirs(), vec![PathBuf::from("/out")]);
    }

    #[test]
    fn test_extract_function_follows_layer() {
        let mut request = ModisExtract {
            layer: ModisLayer::LstNight,
            input_dir: PathBuf::from("/hdf"),
            output_dir: PathBuf::from("/tif"),
            file_pattern: None,
            output_pattern: None,
            product: None,
        };
        assert_eq!(Call::ModisExtract(request.clone()).function(), "extract_LST");
        request.layer = ModisLayer::Evi;
        assert_eq!(Call::ModisExtract(request).function(), "extract_EVI");
        assert_eq!(ModisLayer::parse("LST_Day"), Some(ModisLayer::LstDay));
        assert_eq!(ModisLayer::parse("lst_day"), None);
    }

    #[test]
    fn test_impact_inputs_start_with_hazard() {
        let call = Call::ImpactPopulation(ImpactPopulation {
            hazard_raster: FileReference::Pattern {
                dir: Some(PathBuf::from("/h")),
                pattern: "vhi_*.tif".to_string(),
            },
            population_raster: FileReference::Explicit(PathBuf::from("pop.tif")),
            boundary: PathBuf::from("adm.shp"),
            b_field: None,
            threshold: Some(40.0),
            destination: OutputSpec::Pattern {
                dir: Some(PathBuf::from("/out")),
                pattern: "{stem}.csv".to_string(),
            },
            start_date: None,
            end_date: None,
        });
        let inputs = call.inputs();
        assert_eq!(inputs[0].0, "hazard");
        assert_eq!(inputs[1].0, "population");
        assert_eq!(call.output_dirs(), vec![PathBuf::from("/out")]);
        assert_eq!(call.family(), Family::Impact);
    }
}
