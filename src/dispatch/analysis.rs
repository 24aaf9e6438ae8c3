use super::unsupported;
use crate::error::Result;
use crate::geo::call::{
    Call, DaysSinceLastRain, RainfallAnomaly, StandardizedPrecipitation, TemperatureCondition,
    VegetationCondition, VegetationHealth,
};
use crate::resolve::{Operation, ResolvedParams};

pub(super) fn build(params: &ResolvedParams) -> Result<Call> {
    match params.operation() {
        Operation::RainfallAnomaly => Ok(Call::RainfallAnomaly(RainfallAnomaly {
            current: params.input("current")?,
            longterm_avg: params.input("longterm_avg")?,
            destination: params.output("output")?,
        })),
        Operation::StandardizedPrecipitationIndex => {
            Ok(Call::StandardizedPrecipitation(StandardizedPrecipitation {
                current: params.input("current")?,
                longterm_avg: params.input("longterm_avg")?,
                longterm_sd: params.input("longterm_sd")?,
                destination: params.output("output")?,
            }))
        }
        Operation::DaysSinceLastRain => Ok(Call::DaysSinceLastRain(DaysSinceLastRain {
            data_dir: params.opt_path("input_dir")?,
            data_pattern: params.opt_text("file_pattern")?,
            dst_dir: params.opt_path("output_dir")?,
            start_date: params.opt_text("start_date")?,
            threshold: params.opt_number("threshold")?,
            max_days: params.opt_integer("max_days")?,
        })),
        Operation::VegetationConditionIndex => Ok(Call::VegetationCondition(VegetationCondition {
            current: params.input("current")?,
            evi_max: params.input("EVI_max")?,
            evi_min: params.input("EVI_min")?,
            destination: params.output("output")?,
        })),
        Operation::TemperatureConditionIndex => {
            Ok(Call::TemperatureCondition(TemperatureCondition {
                current: params.input("current")?,
                lst_max: params.input("LST_max")?,
                lst_min: params.input("LST_min")?,
                destination: params.output("output")?,
                interval: params.opt_text("interval")?,
            }))
        }
        Operation::VegetationHealthIndex => Ok(Call::VegetationHealth(VegetationHealth {
            vci: params.input("VCI")?,
            tci: params.input("TCI")?,
            destination: params.output("output")?,
        })),
        _ => Err(unsupported(params)),
    }
}
