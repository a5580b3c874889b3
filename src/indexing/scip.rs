//! Structural index builder: wraps the external scip-java indexer.
//!
//! The indexer runs from the project root (it needs the build definition
//! there) and writes the SCIP file into the configured output directory under
//! the fixed `<project_name>.scip` convention the structural backend reads.

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

/// Outcome of a structural index build, so callers pattern-match instead of
/// branching on exit codes.
#[derive(Debug)]
pub enum ScipIndexOutcome {
    Success(PathBuf),
    ToolMissing,
    ToolError { code: Option<i32>, stderr: String },
}

#[derive(Debug, Clone)]
pub struct ScipIndexer {
    program: String,
    output_dir: PathBuf,
}

impl ScipIndexer {
    pub fn new(program: String, output_dir: PathBuf) -> Self {
        Self {
            program,
            output_dir,
        }
    }

    /// Fixed location of a project's structural index.
    pub fn index_path(output_dir: &Path, project_name: &str) -> PathBuf {
        output_dir.join(format!("{project_name}.scip"))
    }

    pub fn build_index(&self, project_name: &str, project_root: &Path) -> ScipIndexOutcome {
        if let Err(e) = std::fs::create_dir_all(&self.output_dir) {
            return ScipIndexOutcome::ToolError {
                code: None,
                stderr: format!(
                    "cannot create output directory '{}': {e}",
                    self.output_dir.display()
                ),
            };
        }

        let output_file = Self::index_path(&self.output_dir, project_name);
        info!(
            project = project_name,
            output = %output_file.display(),
            "running structural indexer"
        );

        let result = Command::new(&self.program)
            .arg("index")
            .arg("--output")
            .arg(&output_file)
            .current_dir(project_root)
            .output();

        match result {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ScipIndexOutcome::ToolMissing,
            Err(e) => ScipIndexOutcome::ToolError {
                code: None,
                stderr: e.to_string(),
            },
            Ok(output) if output.status.success() => ScipIndexOutcome::Success(output_file),
            Ok(output) => ScipIndexOutcome::ToolError {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
        }
    }
}
