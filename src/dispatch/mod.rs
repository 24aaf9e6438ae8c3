//! Per-family type dispatch: step + key table → typed [`Call`]

mod analysis;
mod chirps;
mod impact;
mod modis;
mod raster;
mod table;

use crate::config::{Defaults, Step};
use crate::error::{ConfigFileError, Result};
use crate::geo::Call;
use crate::resolve::{self, Family, ResolvedParams};
use tracing::debug;

/// Build the call for a step of `family`, stopping at the first problem.
///
/// Resolver errors are returned unchanged.
pub fn build_call(family: Family, step: &Step, defaults: &Defaults) -> Result<Call> {
    check_step(family, step, defaults).map_err(|mut issues| issues.remove(0))
}

/// Build the call for a step of `family`, collecting every problem.
///
/// The error vector is never empty.
pub fn check_step(
    family: Family,
    step: &Step,
    defaults: &Defaults,
) -> std::result::Result<Call, Vec<ConfigFileError>> {
    let schema = resolve::table::lookup(family, step).map_err(|e| vec![e])?;
    let params = resolve::resolve_all(step, schema, defaults)?;
    let call = build(&params).map_err(|e| vec![e])?;
    debug!("Step {} dispatches to {}", step.position(), call.qualified_name());
    Ok(call)
}

fn build(params: &ResolvedParams) -> Result<Call> {
    match params.schema().family {
        Family::Chirps => chirps::build(params),
        Family::Modis => modis::build(params),
        Family::Analysis => analysis::build(params),
        Family::Raster => raster::build(params),
        Family::Impact => impact::build(params),
        Family::Table => table::build(params),
    }
}

/// Failure for a schema routed to the wrong family builder
fn unsupported(params: &ResolvedParams) -> ConfigFileError {
    let schema = params.schema();
    ConfigFileError::invalid_type(schema.family.name(), schema.type_name)
}
