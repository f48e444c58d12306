use crate::domain::{LweError, LweResult};
use crate::modules::grid::GridDimensions;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One shard file found next to a fusion destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    pub name: String,
    pub path: PathBuf,
    /// File name with the matched suffix removed, e.g. `Result0003`.
    pub stem: String,
}

/// Regular files in `directory` named `<base>…<suffix>`, sorted by full
/// name, with `exclude` left out.
pub fn discover_shards(
    directory: &Path,
    base: &str,
    suffix: &str,
    exclude: &str,
) -> LweResult<Vec<Shard>> {
    let entries = fs::read_dir(directory).map_err(|source| {
        LweError::io(
            "IO.SHARD_DISCOVERY",
            format!(
                "failed to list shard directory '{}': {}",
                directory.display(),
                source
            ),
        )
    })?;

    let mut shards = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| {
            LweError::io(
                "IO.SHARD_DISCOVERY",
                format!(
                    "failed to read entry in '{}': {}",
                    directory.display(),
                    source
                ),
            )
        })?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name == exclude || !name.starts_with(base) || !name.ends_with(suffix) {
            continue;
        }
        if !entry.file_type().is_ok_and(|kind| kind.is_file()) {
            continue;
        }
        let stem = name[..name.len() - suffix.len()].to_string();
        shards.push(Shard {
            path: entry.path(),
            stem,
            name,
        });
    }
    shards.sort_by(|left, right| left.name.cmp(&right.name));

    if shards.is_empty() {
        return Err(LweError::missing_resource(format!(
            "no shards named '{base}*{suffix}' found in '{}'",
            directory.display()
        )));
    }
    debug!(
        base,
        suffix,
        count = shards.len(),
        "discovered shards"
    );
    Ok(shards)
}

/// Tracks the grid of the first validated shard and rejects any later shard
/// whose integer extents differ.
#[derive(Debug, Default)]
pub struct ShardGridCheck {
    reference: Option<(String, GridDimensions)>,
}

impl ShardGridCheck {
    pub fn check(&mut self, shard: &str, grid: GridDimensions) -> LweResult<()> {
        if let Some((reference, expected)) = &self.reference {
            if !expected.same_shape(&grid) {
                return Err(LweError::shard_mismatch(format!(
                    "shard '{shard}' has grid {}x{}x{} but '{reference}' has {}x{}x{}",
                    grid.ntime,
                    grid.nspace,
                    grid.nspace2,
                    expected.ntime,
                    expected.nspace,
                    expected.nspace2
                )));
            }
            return Ok(());
        }
        self.reference = Some((shard.to_string(), grid));
        Ok(())
    }
}
