use super::unsupported;
use crate::error::Result;
use crate::geo::call::{Call, CropFiles, MaskByShapefile, MatchProjection, ZonalStatistics};
use crate::resolve::{Operation, ResolvedParams};

pub(super) fn build(params: &ResolvedParams) -> Result<Call> {
    match params.operation() {
        Operation::Crop => Ok(Call::CropFiles(CropFiles {
            input_dir: params.path("input_dir")?,
            output_dir: params.path("output_dir")?,
            boundary_file: params.path("boundary_file")?,
            file_pattern: params.opt_text("file_pattern")?,
            output_pattern: params.opt_text("output_pattern")?,
            overwrite: params.flag("overwrite")?,
            nodata: params.flag("no_data")?,
        })),
        Operation::MatchProjection => Ok(Call::MatchProjection(MatchProjection {
            master: params.input("master")?,
            slave: params.input("slave")?,
            destination: params.output("output")?,
        })),
        Operation::ZonalStatistics => Ok(Call::ZonalStatistics(ZonalStatistics {
            raster: params.input("raster")?,
            polygon: params.input("polygon")?,
            destination: params.output("output")?,
            zone_field: params.text("zone_field")?,
        })),
        Operation::ApplyMask => Ok(Call::MaskByShapefile(MaskByShapefile {
            raster: params.input("raster")?,
            polygon: params.input("polygon")?,
            destination: params.output("output")?,
            nodata: params.flag("no_data")?,
        })),
        _ => Err(unsupported(params)),
    }
}
