use super::{CollaboratorError, Geoprocessor, Invocation};

/// Prints each invocation instead of running it
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunGeoprocessor;

impl DryRunGeoprocessor {
    pub fn new() -> Self {
        Self
    }

    pub fn render(invocation: &Invocation) -> Result<String, CollaboratorError> {
        Ok(serde_json::to_string_pretty(invocation)?)
    }
}

impl Geoprocessor for DryRunGeoprocessor {
    fn execute(&self, invocation: &Invocation) -> Result<(), CollaboratorError> {
        tracing::info!(
            "[dry-run] step {}: {} ({} input file(s), {} output(s))",
            invocation.step,
            invocation.operation,
            invocation.input_count(),
            invocation.outputs.len()
        );
        println!("{}", Self::render(invocation)?);
        Ok(())
    }
}
