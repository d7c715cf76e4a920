//! Output file naming and conflict handling.

use crate::error::{Error, Result};
use clap::ValueEnum;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Image file extension.
pub const OUTPUT_EXTENSION: &str = "png";

/// Governs what happens when an output file already exists.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ConflictPolicy {
    /// Replace the existing file.
    #[default]
    Overwrite,

    /// Keep the existing file and do not render.
    Skip,

    /// Render to the first free `name_NNN` variant.
    Increment,
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Overwrite => "overwrite",
            Self::Skip => "skip",
            Self::Increment => "increment",
        };
        f.write_str(s)
    }
}

/// Decision for a single output file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputTarget {
    /// False when the existing file must be kept.
    pub should_render: bool,

    /// Where the image goes (or the existing file when skipped).
    pub path: PathBuf,
}

/// Returns the image file name for a group: the literal `prefix` is removed
/// from the start of `identifier` and the extension appended. Nothing else is
/// escaped. A group named exactly `prefix` keeps its full name. An empty
/// identifier has no usable stem and is rejected.
///
/// * `identifier` - Group name.
/// * `prefix`     - Discovery prefix.
pub fn output_filename(identifier: &str, prefix: &str) -> Result<String> {
    let stem = match identifier.strip_prefix(prefix) {
        Some(rest) if !rest.is_empty() => rest,
        _ => identifier,
    };
    if stem.is_empty() {
        return Err(Error::path_unavailable(
            format!(".{OUTPUT_EXTENSION}"),
            "group name is empty",
        ));
    }
    Ok(format!("{stem}.{OUTPUT_EXTENSION}"))
}

/// Decides whether to render and where, based on what already exists on
/// disk. Only checks for existence; nothing is written.
///
/// * `base`   - Desired output path.
/// * `policy` - Conflict policy.
pub fn resolve_output(base: &Path, policy: ConflictPolicy) -> Result<OutputTarget> {
    let target = match policy {
        ConflictPolicy::Overwrite => OutputTarget {
            should_render: true,
            path: base.to_path_buf(),
        },
        ConflictPolicy::Skip => OutputTarget {
            should_render: !base.exists(),
            path: base.to_path_buf(),
        },
        ConflictPolicy::Increment => OutputTarget {
            should_render: true,
            path: next_free_path(base)?,
        },
    };
    Ok(target)
}

/// Tries `stem_001.ext`, `stem_002.ext`, ... until a free name is found.
fn next_free_path(base: &Path) -> Result<PathBuf> {
    if !base.exists() {
        return Ok(base.to_path_buf());
    }

    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| Error::path_unavailable(base, "path has no file name"))?;
    let ext = base
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter: u64 = 1;
    loop {
        let candidate = base.with_file_name(format!("{stem}_{counter:03}{ext}"));
        if !candidate.exists() {
            return Ok(candidate);
        }
        counter = counter
            .checked_add(1)
            .ok_or_else(|| Error::path_unavailable(base, "no free numbered file name"))?;
    }
}

/// Makes sure the output folder can receive files. The parent folder must
/// already exist; the folder itself is created when missing.
///
/// * `dir` - Output folder.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        return Err(Error::path_unavailable(dir, "not a directory"));
    }

    match dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            return Err(Error::path_unavailable(
                dir,
                format!("parent folder {} does not exist", parent.display()),
            ));
        }
        _ => (),
    }

    fs::create_dir_all(dir).map_err(|e| Error::path_unavailable(dir, e))?;
    info!("Created output folder {}", dir.display());
    Ok(())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::write(path, b"png").unwrap();
    }

    #[test]
    fn filename_strips_literal_prefix() {
        let name = |id, prefix| output_filename(id, prefix).unwrap();
        assert_eq!(name("RENDER_Cola_Can", "RENDER_"), "Cola_Can.png");
        assert_eq!(name("Cola_Can", "RENDER_"), "Cola_Can.png");
        assert_eq!(name("render_Can", "RENDER_"), "render_Can.png");
        assert_eq!(name("Box", ""), "Box.png");
    }

    #[test]
    fn bare_prefix_keeps_full_name() {
        assert_eq!(output_filename("RENDER_", "RENDER_").unwrap(), "RENDER_.png");

        let dir = tempdir().unwrap();
        let base = dir.path().join(output_filename("RENDER_", "RENDER_").unwrap());
        touch(&base);
        assert_eq!(
            resolve_output(&base, ConflictPolicy::Increment).unwrap().path,
            dir.path().join("RENDER__001.png")
        );
    }

    #[test]
    fn empty_name_is_unavailable() {
        assert!(matches!(
            output_filename("", "RENDER_"),
            Err(Error::PathUnavailable { .. })
        ));
        assert!(matches!(
            output_filename("", ""),
            Err(Error::PathUnavailable { .. })
        ));
    }

    #[test]
    fn overwrite_always_renders_at_base() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("Cola_Can.png");
        for _ in 0..2 {
            let target = resolve_output(&base, ConflictPolicy::Overwrite).unwrap();
            assert_eq!(
                target,
                OutputTarget {
                    should_render: true,
                    path: base.clone()
                }
            );
            touch(&base);
        }
    }

    #[test]
    fn skip_existing_file() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("Cola_Can.png");

        let target = resolve_output(&base, ConflictPolicy::Skip).unwrap();
        assert!(target.should_render);
        assert_eq!(target.path, base);

        touch(&base);
        let target = resolve_output(&base, ConflictPolicy::Skip).unwrap();
        assert!(!target.should_render);
        assert_eq!(target.path, base);
    }

    #[test]
    fn increment_finds_first_free_name() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("Cola_Can.png");

        assert_eq!(
            resolve_output(&base, ConflictPolicy::Increment).unwrap().path,
            base
        );

        touch(&base);
        assert_eq!(
            resolve_output(&base, ConflictPolicy::Increment).unwrap().path,
            dir.path().join("Cola_Can_001.png")
        );

        touch(&dir.path().join("Cola_Can_001.png"));
        let target = resolve_output(&base, ConflictPolicy::Increment).unwrap();
        assert!(target.should_render);
        assert_eq!(target.path, dir.path().join("Cola_Can_002.png"));
    }

    #[test]
    fn increment_reuses_gaps() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("Box.png");
        touch(&base);
        touch(&dir.path().join("Box_002.png"));
        assert_eq!(
            resolve_output(&base, ConflictPolicy::Increment).unwrap().path,
            dir.path().join("Box_001.png")
        );
    }

    #[test]
    fn prepare_creates_missing_folder() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("renders");
        prepare_output_dir(&out).unwrap();
        assert!(out.is_dir());
        // Already present.
        prepare_output_dir(&out).unwrap();
    }

    #[test]
    fn prepare_requires_parent() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("missing").join("renders");
        assert!(matches!(
            prepare_output_dir(&out),
            Err(Error::PathUnavailable { .. })
        ));

        let file = dir.path().join("file");
        touch(&file);
        assert!(matches!(
            prepare_output_dir(&file),
            Err(Error::PathUnavailable { .. })
        ));
    }

    #[test]
    fn policy_names() {
        assert_eq!(ConflictPolicy::Increment.to_string(), "increment");
        assert_eq!(
            ConflictPolicy::from_str("skip", true).unwrap(),
            ConflictPolicy::Skip
        );
    }
}
