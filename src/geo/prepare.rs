use super::{Call, Invocation};
use crate::config::Defaults;
use crate::files::{FilePattern, FileReference, FileSetError, NamingError, PatternError};
use crate::resolve::Family;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum PrepareError {
    #[error("cannot expand {label} files")]
    Inputs {
        label: String,
        #[source]
        source: FileSetError,
    },
    #[error("cannot name output for {}", .input.display())]
    Naming {
        input: PathBuf,
        #[source]
        source: NamingError,
    },
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("cannot create output directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Expand inputs, synthesize outputs and create output directories.
///
/// In dry-run mode a missing input directory only warns and nothing is
/// created on disk.
pub fn prepare(
    step: usize,
    call: Call,
    defaults: &Defaults,
    dry_run: bool,
) -> Result<Invocation, PrepareError> {
    let mut invocation = Invocation::new(step, call);

    for (label, reference) in invocation.arguments.inputs() {
        let files = match reference.expand() {
            Ok(files) => files,
            Err(FileSetError::MissingDirectory(dir)) if dry_run => {
                warn!("{label} directory {} does not exist yet", dir.display());
                Vec::new()
            }
            Err(source) => {
                return Err(PrepareError::Inputs {
                    label: label.to_string(),
                    source,
                })
            }
        };
        invocation.inputs.insert(label.to_string(), files);
    }
    if let Call::Table(op) = &invocation.arguments {
        invocation.inputs.insert(
            "table".to_string(),
            op.input_paths().into_iter().map(PathBuf::from).collect(),
        );
        invocation.outputs.push(op.output_path().to_path_buf());
    }

    let outputs = synthesize_outputs(&invocation, defaults)?;
    invocation.outputs.extend(outputs);

    for dir in invocation.arguments.output_dirs() {
        if dir.is_dir() {
            continue;
        }
        if dry_run {
            debug!("Would create {}", dir.display());
        } else {
            debug!("Creating output directory {}", dir.display());
            std::fs::create_dir_all(&dir)
                .map_err(|source| PrepareError::CreateDir { path: dir.clone(), source })?;
        }
    }

    Ok(invocation)
}

/// One destination per file of the primary input group
fn synthesize_outputs(
    invocation: &Invocation,
    defaults: &Defaults,
) -> Result<Vec<PathBuf>, PrepareError> {
    let Some(destination) = invocation.arguments.destination() else {
        return Ok(Vec::new());
    };
    let inputs = invocation.arguments.inputs();
    let Some((label, primary)) = inputs.first() else {
        return Ok(Vec::new());
    };
    let files = invocation.inputs.get(*label).map(Vec::as_slice).unwrap_or_default();

    let mut outputs = Vec::with_capacity(files.len());
    for file in files {
        let pattern = naming_pattern(&invocation.arguments, primary, file, defaults)?;
        let output = destination
            .destination_for(file, pattern.as_ref())
            .map_err(|source| PrepareError::Naming {
                input: file.clone(),
                source,
            })?;
        if !outputs.contains(&output) {
            outputs.push(output);
        }
    }
    Ok(outputs)
}

/// Pattern whose named groups feed the output template.
///
/// Impact calls given an explicit hazard file use the registry's hazard
/// filename pattern, when the file matches it.
fn naming_pattern(
    call: &Call,
    primary: &FileReference,
    file: &std::path::Path,
    defaults: &Defaults,
) -> Result<Option<FilePattern>, PrepareError> {
    match primary {
        FileReference::Pattern { .. } => Ok(primary.file_pattern()?),
        FileReference::Explicit(_) if call.family() == Family::Impact => {
            let pattern = FilePattern::parse(&defaults.naming.hazard_pattern)?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if pattern.is_match(&name) {
                Ok(Some(pattern))
            } else {
                debug!("{name} does not follow the hazard naming pattern");
                Ok(None)
            }
        }
        FileReference::Explicit(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::OutputSpec;
    use crate::geo::call::{CropFiles, ImpactArea, RainfallAnomaly};
    use tempfile::TempDir;

    fn touch(dir: &std::path::Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_outputs_follow_primary_group() {
        let temp = TempDir::new().unwrap();
        let current = temp.path().join("current");
        std::fs::create_dir(&current).unwrap();
        touch(&current, "chirps-v2.0.2016.01.tif");
        touch(&current, "chirps-v2.0.2016.02.tif");
        touch(&current, "readme.txt");
        let out = temp.path().join("out");

        let call = Call::RainfallAnomaly(RainfallAnomaly {
            current: FileReference::Pattern {
                dir: Some(current.clone()),
                pattern: r"^chirps-v2\.0\.(?P<year>\d{4})\.(?P<month>\d{2})\.tif$".to_string(),
            },
            longterm_avg: FileReference::Explicit(PathBuf::from("avg.tif")),
            destination: OutputSpec::Pattern {
                dir: Some(out.clone()),
                pattern: "anomaly.{year}.{month}.tif".to_string(),
            },
        });

        let invocation = prepare(4, call, &Defaults::default(), false).unwrap();
        assert_eq!(invocation.operation, "analysis.calc_rainfall_anomaly");
        assert_eq!(invocation.inputs["current"].len(), 2);
        assert_eq!(invocation.inputs["longterm_avg"], vec![PathBuf::from("avg.tif")]);
        assert_eq!(
            invocation.outputs,
            vec![out.join("anomaly.2016.01.tif"), out.join("anomaly.2016.02.tif")]
        );
        assert!(out.is_dir());
    }

    #[test]
    fn test_missing_input_directory() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("absent");
        let call = || {
            Call::RainfallAnomaly(RainfallAnomaly {
                current: FileReference::Pattern {
                    dir: Some(missing.clone()),
                    pattern: "*.tif".to_string(),
                },
                longterm_avg: FileReference::Explicit(PathBuf::from("avg.tif")),
                destination: OutputSpec::Explicit(temp.path().join("out/anomaly.tif")),
            })
        };

        let err = prepare(1, call(), &Defaults::default(), false).unwrap_err();
        assert!(matches!(
            err,
            PrepareError::Inputs {
                source: FileSetError::MissingDirectory(_),
                ..
            }
        ));

        let planned = prepare(1, call(), &Defaults::default(), true).unwrap();
        assert!(planned.inputs["current"].is_empty());
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn test_explicit_hazard_uses_registry_pattern() {
        let temp = TempDir::new().unwrap();
        let call = Call::ImpactArea(ImpactArea {
            hazard_raster: FileReference::Explicit(PathBuf::from("/data/vhi.2016.03.tif")),
            boundary: PathBuf::from("adm.shp"),
            b_field: None,
            threshold: Some(40.0),
            destination: OutputSpec::Pattern {
                dir: Some(temp.path().to_path_buf()),
                pattern: "{prefix}_impact.{year}.{month}.csv".to_string(),
            },
            start_date: None,
            end_date: None,
        });

        let invocation = prepare(1, call, &Defaults::default(), true).unwrap();
        assert_eq!(
            invocation.outputs,
            vec![temp.path().join("vhi_impact.2016.03.csv")]
        );
    }

    #[test]
    fn test_directory_calls_create_output_dir() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("cropped");
        let call = Call::CropFiles(CropFiles {
            input_dir: temp.path().to_path_buf(),
            output_dir: out.clone(),
            boundary_file: PathBuf::from("b.shp"),
            file_pattern: None,
            output_pattern: None,
            overwrite: false,
            nodata: false,
        });

        let invocation = prepare(1, call, &Defaults::default(), false).unwrap();
        assert!(invocation.inputs.is_empty());
        assert!(invocation.outputs.is_empty());
        assert!(out.is_dir());
    }
}
