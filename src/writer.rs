use crate::error::Result;
use crate::render::{
    RenderedArtifacts, AUDIT_LOG_FILE, STRUCTURED_OUTPUT_FILE, TEMPLATE_EXTRACT_FILE,
};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub structured: PathBuf,
    pub template: PathBuf,
    pub audit: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(output_dir: &Path) -> Self {
        Self {
            structured: output_dir.join(STRUCTURED_OUTPUT_FILE),
            template: output_dir.join(TEMPLATE_EXTRACT_FILE),
            audit: output_dir.join(AUDIT_LOG_FILE),
        }
    }
}

fn staging_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.tmp", name))
}

/// Writes all three artifacts into `output_dir`, creating it if needed.
///
/// Every artifact is staged under a hidden temporary name first; targets are only
/// replaced once all three are staged. Staged files that were not moved into place are
/// removed if staging or renaming fails.
pub fn write_artifacts(output_dir: &Path, artifacts: &RenderedArtifacts) -> Result<ArtifactPaths> {
    fs::create_dir_all(output_dir)?;
    let paths = ArtifactPaths::in_dir(output_dir);

    let plan = [
        (&paths.structured, &artifacts.structured_json),
        (&paths.template, &artifacts.template_markdown),
        (&paths.audit, &artifacts.audit_json),
    ];

    let mut staged: Vec<(PathBuf, &PathBuf)> = Vec::with_capacity(plan.len());
    for (target, contents) in plan {
        let tmp = staging_path(target);
        if let Err(e) = fs::write(&tmp, contents) {
            for (leftover, _) in &staged {
                let _ = fs::remove_file(leftover);
            }
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!("Staged {}", tmp.display());
        staged.push((tmp, target));
    }

    for (idx, (tmp, target)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(tmp, target) {
            for (leftover, _) in &staged[idx..] {
                let _ = fs::remove_file(leftover);
            }
            return Err(e.into());
        }
    }

    info!("Wrote {} artifacts to {}", staged.len(), output_dir.display());
    Ok(paths)
}
