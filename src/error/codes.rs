/// Error code registry for riskflow
///
/// Error codes are organized by category:
/// - 1000-1999: Job and defaults document errors
/// - 2000-2999: Step validation errors
/// - 4000-4999: Step execution errors
/// - 9000-9999: Other errors
#[allow(dead_code)]
pub struct ErrorCode;

impl ErrorCode {
    // Document errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_YAML: u16 = 1002;
    pub const CONFIG_MISSING_RUN: u16 = 1003;
    pub const CONFIG_INVALID_STEP: u16 = 1004;
    pub const CONFIG_INVALID_DEFAULTS: u16 = 1005;

    // Validation errors (2000-2999)
    pub const VALIDATION_GENERIC: u16 = 2000;
    pub const VALIDATION_MISSING_KEY: u16 = 2001;
    pub const VALIDATION_MISSING_FILE_REFERENCE: u16 = 2002;
    pub const VALIDATION_INVALID_TYPE: u16 = 2003;
    pub const VALIDATION_INVALID_VALUE: u16 = 2004;
    pub const VALIDATION_FAILED: u16 = 2005;

    // Execution errors (4000-4999)
    pub const EXEC_GENERIC: u16 = 4000;
    pub const EXEC_COLLABORATOR_FAILED: u16 = 4001;
    pub const EXEC_COLLABORATOR_NOT_FOUND: u16 = 4002;
    pub const EXEC_FILESYSTEM: u16 = 4003;
    pub const EXEC_TABLE: u16 = 4004;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        1000 => "Generic job document error",
        1001 => "Job document not found",
        1002 => "Invalid YAML syntax in job document",
        1003 => "Job document has no 'run' sequence",
        1004 => "Malformed step in job document",
        1005 => "Invalid defaults registry",

        2000 => "Generic validation error",
        2001 => "Required key is missing",
        2002 => "No explicit file or directory/pattern pair given",
        2003 => "Unknown process type",
        2004 => "Invalid value for key",
        2005 => "Job validation failed",

        4000 => "Generic step execution error",
        4001 => "Geoprocessing collaborator failed",
        4002 => "Geoprocessing collaborator not found",
        4003 => "Filesystem error while preparing step",
        4004 => "Table operation failed",

        9000 => "Generic error",

        _ => "Unknown error code",
    }
}
