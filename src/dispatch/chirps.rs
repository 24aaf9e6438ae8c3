use super::unsupported;
use crate::error::Result;
use crate::geo::call::{Call, ChirpsDownload, ChirpsLongtermStats};
use crate::resolve::{Operation, ResolvedParams};

pub(super) fn build(params: &ResolvedParams) -> Result<Call> {
    match params.operation() {
        Operation::ChirpsDownload => Ok(Call::ChirpsDownload(ChirpsDownload {
            output_dir: params.path("output_dir")?,
            interval: params.text("interval")?,
            dates: params.opt_text_list("dates")?,
            start_date: params.opt_text("start_date")?,
            end_date: params.opt_text("end_date")?,
            overwrite: params.flag("overwrite")?,
        })),
        Operation::ChirpsLongtermAverage => Ok(Call::ChirpsLongtermStats(ChirpsLongtermStats {
            interval: params.text("interval")?,
            input_dir: params.path("input_dir")?,
            output_dir: params.path("output_dir")?,
            pattern: params.opt_text("file_pattern")?,
            function_list: params.text_list("functions")?,
        })),
        _ => Err(unsupported(params)),
    }
}
