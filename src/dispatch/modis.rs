use super::unsupported;
use crate::error::{ConfigFileError, Result};
use crate::geo::call::{
    Call, DayNightAverage, ModisDownload, ModisExtract, ModisLayer, ModisLongtermStats,
};
use crate::resolve::{Operation, ResolvedParams};

pub(super) fn build(params: &ResolvedParams) -> Result<Call> {
    match params.operation() {
        Operation::ModisDownload => Ok(Call::ModisDownload(ModisDownload {
            output_dir: params.path("output_dir")?,
            product: params.text("product")?,
            tiles: params.opt_text_list("tiles")?,
            dates: params.opt_text_list("dates")?,
            mosaic_dir: params.opt_path("mosaic_dir")?,
            mrt_dir: params.opt_path("MRT_dir")?,
            overwrite: params.flag("overwrite")?,
        })),
        Operation::ModisExtract => {
            let layer = params.text("layer")?;
            let layer = ModisLayer::parse(&layer).ok_or_else(|| {
                ConfigFileError::invalid_value("layer", format!("Unknown MODIS extract layer '{layer}'"))
            })?;
            Ok(Call::ModisExtract(ModisExtract {
                layer,
                input_dir: params.path("input_dir")?,
                output_dir: params.path("output_dir")?,
                file_pattern: params.opt_text("file_pattern")?,
                output_pattern: params.opt_text("output_pattern")?,
                product: params.opt_text("product")?,
            }))
        }
        Operation::ModisDayNightAverage => Ok(Call::DayNightAverage(DayNightAverage {
            day_dir: params.path("lst_day_dir")?,
            night_dir: params.path("lst_night_dir")?,
            output_dir: params.path("output_dir")?,
            input_pattern: params.opt_text("file_pattern")?,
            output_pattern: params.opt_text("output_pattern")?,
        })),
        Operation::ModisLongtermStatistics => Ok(Call::ModisLongtermStats(ModisLongtermStats {
            input_dir: params.path("input_dir")?,
            output_dir: params.path("output_dir")?,
            product: params.text("product")?,
            interval: params.opt_text("interval")?,
            country: params.opt_text("country")?,
            input_pattern: params.text("file_pattern")?,
            output_pattern: params.opt_text("output_pattern")?,
            start_date: params.opt_text("start_date")?,
            end_date: params.opt_text("end_date")?,
            function_list: params.opt_text_list("functions")?,
        })),
        _ => Err(unsupported(params)),
    }
}
