//! Declarative description of the keys each operation accepts

use super::value::ParamValue;
use crate::config::Defaults;
use serde::Serialize;
use std::fmt;

/// Top-level `process` discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Family {
    Chirps,
    Modis,
    Analysis,
    Raster,
    Impact,
    Table,
}

impl Family {
    pub const ALL: [Family; 6] = [
        Family::Chirps,
        Family::Modis,
        Family::Analysis,
        Family::Raster,
        Family::Impact,
        Family::Table,
    ];

    /// Case-insensitive lookup of a `process` value
    pub fn from_process(process: &str) -> Option<Family> {
        Self::ALL
            .into_iter()
            .find(|family| family.name().eq_ignore_ascii_case(process.trim()))
    }

    /// Canonical spelling
    pub fn name(&self) -> &'static str {
        match self {
            Family::Chirps => "CHIRPS",
            Family::Modis => "MODIS",
            Family::Analysis => "analysis",
            Family::Raster => "raster",
            Family::Impact => "impact",
            Family::Table => "table",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every operation a job can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operation {
    ChirpsDownload,
    ChirpsLongtermAverage,
    ModisDownload,
    ModisExtract,
    ModisDayNightAverage,
    ModisLongtermStatistics,
    RainfallAnomaly,
    StandardizedPrecipitationIndex,
    DaysSinceLastRain,
    VegetationConditionIndex,
    TemperatureConditionIndex,
    VegetationHealthIndex,
    Crop,
    MatchProjection,
    ZonalStatistics,
    ApplyMask,
    ImpactArea,
    ImpactCrops,
    ImpactPopulation,
    ImpactPoverty,
    CalcField,
    AddField,
    Choropleth,
    MergeTables,
    Aggregate,
}

/// Expected shape of a key's value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueKind {
    /// Scalar string; numbers are stringified
    Text,
    /// Filesystem path, same acceptance as `Text`
    Path,
    Number,
    Integer,
    Bool,
    /// List of scalars or a single scalar
    TextList,
    /// `YYYY-MM-DD`, `YYYY-MM` or `YYYY`
    Date,
    DateList,
    /// Filename pattern that must compile
    Pattern,
    /// Mapping of text to text
    Mapping,
    /// One of a fixed set of strings
    Choice(&'static [&'static str]),
}

impl ValueKind {
    pub fn describe(&self) -> String {
        match self {
            ValueKind::Text => "text".to_string(),
            ValueKind::Path => "path".to_string(),
            ValueKind::Number => "number".to_string(),
            ValueKind::Integer => "integer".to_string(),
            ValueKind::Bool => "boolean".to_string(),
            ValueKind::TextList => "list".to_string(),
            ValueKind::Date => "date".to_string(),
            ValueKind::DateList => "date list".to_string(),
            ValueKind::Pattern => "pattern".to_string(),
            ValueKind::Mapping => "mapping".to_string(),
            ValueKind::Choice(options) => options.join("|"),
        }
    }
}

/// Registry entries usable as fallbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKey {
    LongtermFunctions,
    ModisProduct,
    HazardThreshold,
}

impl RegistryKey {
    pub fn lookup(&self, defaults: &Defaults) -> Option<ParamValue> {
        match self {
            RegistryKey::LongtermFunctions => {
                Some(ParamValue::from(defaults.chirps.longterm_functions.clone()))
            }
            RegistryKey::ModisProduct => {
                Some(ParamValue::from(defaults.modis.default_product.clone()))
            }
            RegistryKey::HazardThreshold => {
                defaults.hazard_impact.threshold().map(ParamValue::Number)
            }
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            RegistryKey::LongtermFunctions => "chirps.longterm_functions",
            RegistryKey::ModisProduct => "modis.default_product",
            RegistryKey::HazardThreshold => "hazard_impact.thresholds[hazard_var]",
        }
    }
}

/// Value used when an optional key is omitted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fallback {
    None,
    Text(&'static str),
    Number(f64),
    Bool(bool),
    EmptyMapping,
    Registry(RegistryKey),
}

impl Fallback {
    pub fn value(&self, defaults: &Defaults) -> Option<ParamValue> {
        match self {
            Fallback::None => None,
            Fallback::Text(s) => Some(ParamValue::from(*s)),
            Fallback::Number(n) => Some(ParamValue::Number(*n)),
            Fallback::Bool(b) => Some(ParamValue::Boolean(*b)),
            Fallback::EmptyMapping => Some(ParamValue::Object(Default::default())),
            Fallback::Registry(key) => key.lookup(defaults),
        }
    }
}

/// Either an explicit file key or a directory plus pattern
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileGroup {
    pub label: &'static str,
    pub file: &'static str,
    pub dir: &'static str,
    pub pattern: &'static str,
    /// The pattern form needs the directory key too
    pub dir_required: bool,
}

impl FileGroup {
    pub const fn new(
        label: &'static str,
        file: &'static str,
        dir: &'static str,
        pattern: &'static str,
    ) -> Self {
        Self {
            label,
            file,
            dir,
            pattern,
            dir_required: false,
        }
    }

    pub const fn with_required_dir(mut self) -> Self {
        self.dir_required = true;
        self
    }
}

/// One entry of an operation's key list
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamSpec {
    Required(&'static str, ValueKind),
    Optional(&'static str, ValueKind, Fallback),
    /// Presence flag: the value is ignored
    Flag(&'static str),
    Input(FileGroup),
    Output(FileGroup),
}

impl ParamSpec {
    /// Name the resolved value is stored under
    pub fn name(&self) -> &'static str {
        match self {
            ParamSpec::Required(key, _) | ParamSpec::Optional(key, _, _) | ParamSpec::Flag(key) => {
                key
            }
            ParamSpec::Input(group) | ParamSpec::Output(group) => group.label,
        }
    }
}

/// Key list of one (family, type[, layer]) combination
#[derive(Debug)]
pub struct OperationSchema {
    pub family: Family,
    pub type_name: &'static str,
    /// Value of `layer` selecting this schema among several of the same type
    pub layer: Option<&'static str>,
    pub operation: Operation,
    pub summary: &'static str,
    pub params: &'static [ParamSpec],
}

impl OperationSchema {
    /// Keys that must always be present
    pub fn required_keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self
            .params
            .iter()
            .filter_map(|spec| match spec {
                ParamSpec::Required(key, _) => Some(*key),
                _ => None,
            })
            .collect();
        if self.layer.is_some() && !keys.contains(&"layer") {
            keys.insert(0, "layer");
        }
        keys
    }

    pub fn flags(&self) -> Vec<&'static str> {
        self.params
            .iter()
            .filter_map(|spec| match spec {
                ParamSpec::Flag(key) => Some(*key),
                _ => None,
            })
            .collect()
    }

    pub fn optional_keys(&self) -> Vec<&'static str> {
        self.params
            .iter()
            .filter_map(|spec| match spec {
                ParamSpec::Optional(key, _, _) => Some(*key),
                _ => None,
            })
            .collect()
    }

    /// Input and output groups, outputs flagged `true`
    pub fn groups(&self) -> Vec<(&'static FileGroup, bool)> {
        self.params
            .iter()
            .filter_map(|spec| match spec {
                ParamSpec::Input(group) => Some((group, false)),
                ParamSpec::Output(group) => Some((group, true)),
                _ => None,
            })
            .collect()
    }

    /// `family type[ layer]`
    pub fn title(&self) -> String {
        match self.layer {
            Some(layer) => format!("{} {} (layer {})", self.family, self.type_name, layer),
            None => format!("{} {}", self.family, self.type_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_is_case_insensitive() {
        assert_eq!(Family::from_process("chirps"), Some(Family::Chirps));
        assert_eq!(Family::from_process("Modis"), Some(Family::Modis));
        assert_eq!(Family::from_process("RASTER"), Some(Family::Raster));
        assert_eq!(Family::from_process("Table"), Some(Family::Table));
        assert_eq!(Family::from_process("unknown"), None);
        assert_eq!(Family::from_process(""), None);
    }

    #[test]
    fn test_registry_fallbacks() {
        let defaults = Defaults::default();
        assert_eq!(
            Fallback::Registry(RegistryKey::ModisProduct).value(&defaults),
            Some(ParamValue::from("MOD13A3.005"))
        );
        assert_eq!(
            Fallback::Registry(RegistryKey::HazardThreshold).value(&defaults),
            Some(ParamValue::Number(40.0))
        );
        assert_eq!(Fallback::None.value(&defaults), None);
    }
}
