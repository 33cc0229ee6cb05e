use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Upper bound for every operation that waits on the VM.
    pub operation_timeout: Duration,
    /// Directories scanned for source files when the session starts.
    pub source_roots: Vec<PathBuf>,
    /// Extension (without the dot) a file must have to take a breakpoint.
    pub source_extension: String,
    /// Class patterns that stepping never stops in.
    pub step_exclusions: Vec<String>,
    /// Bind breakpoints at the first code index of the requested line instead
    /// of the entry of the enclosing method.
    pub line_accurate_breakpoints: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(5),
            source_roots: Vec::new(),
            source_extension: "java".to_owned(),
            step_exclusions: ["java.*", "javax.*", "sun.*", "com.sun.*"]
                .map(String::from)
                .to_vec(),
            line_accurate_breakpoints: false,
        }
    }
}
