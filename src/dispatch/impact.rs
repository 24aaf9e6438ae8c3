use super::unsupported;
use crate::error::Result;
use crate::geo::call::{Call, ImpactArea, ImpactCrops, ImpactPopulation, ImpactPoverty};
use crate::resolve::{Operation, ResolvedParams};

pub(super) fn build(params: &ResolvedParams) -> Result<Call> {
    match params.operation() {
        Operation::ImpactArea => Ok(Call::ImpactArea(ImpactArea {
            hazard_raster: params.input("hazard")?,
            boundary: params.path("boundary_file")?,
            b_field: params.opt_text("boundary_field")?,
            threshold: params.opt_number("hazard_threshold")?,
            destination: params.output("output")?,
            start_date: params.opt_text("start_date")?,
            end_date: params.opt_text("end_date")?,
        })),
        Operation::ImpactCrops => Ok(Call::ImpactCrops(ImpactCrops {
            hazard_raster: params.input("hazard")?,
            crop_boundary: params.input("crop")?,
            crop_field: params.opt_text("crop_field")?,
            threshold: params.opt_number("hazard_threshold")?,
            admin_boundary: params.path("boundary_file")?,
            admin_boundary_field: params.opt_text("boundary_field")?,
            destination: params.output("output")?,
            start_date: params.opt_text("start_date")?,
            end_date: params.opt_text("end_date")?,
        })),
        Operation::ImpactPopulation => Ok(Call::ImpactPopulation(ImpactPopulation {
            hazard_raster: params.input("hazard")?,
            population_raster: params.input("population")?,
            boundary: params.path("boundary_file")?,
            b_field: params.opt_text("boundary_field")?,
            threshold: params.opt_number("hazard_threshold")?,
            destination: params.output("output")?,
            start_date: params.opt_text("start_date")?,
            end_date: params.opt_text("end_date")?,
        })),
        Operation::ImpactPoverty => Ok(Call::ImpactPoverty(ImpactPoverty {
            impact: params.input("hazard")?,
            impact_field: params.opt_text("hazard_field")?,
            impact_match_field: params.opt_text("hazard_area_code")?,
            poor: params.input("poverty")?,
            poor_field: params.opt_text("poverty_field")?,
            poor_match_field: params.opt_text("poverty_area_code")?,
            poor_multiplier: params.opt_number("poverty_multiplier")?,
            destination: params.output("output")?,
            output_field: params.opt_text("output_field")?,
            start_date: params.opt_text("start_date")?,
            end_date: params.opt_text("end_date")?,
        })),
        _ => Err(unsupported(params)),
    }
}
