// Persisted fitted statistics, one JSON file per model version
use anyhow::{anyhow, bail, Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use rankprep_schema::FittedSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const ARTIFACT_EXTENSION: &str = "stats.json";
const FORMAT_VERSION: u32 = 1;

/// Artifact description for listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDescription {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub size: u64,
    pub checksum: String,
}

#[derive(Serialize)]
struct ArtifactRef<'a> {
    format_version: u32,
    name: &'a str,
    created_at: DateTime<Utc>,
    checksum: &'a str,
    schema: &'a FittedSchema,
}

#[derive(Deserialize)]
struct ArtifactFile {
    format_version: u32,
    name: String,
    created_at: DateTime<Utc>,
    checksum: String,
    schema: FittedSchema,
}

fn checksum(schema: &FittedSchema) -> Result<String> {
    let payload = serde_json::to_vec(schema)?;
    Ok(format!("{:x}", Sha256::digest(&payload)))
}

fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid {
        bail!(
            "Invalid artifact name '{}': use ASCII letters, digits, '-', '_' or '.'",
            name
        );
    }
    Ok(())
}

/// Directory of fitted schemas keyed by model version name
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create artifact directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn artifact_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, ARTIFACT_EXTENSION))
    }

    pub fn exists(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.artifact_path(name).exists()
    }

    /// Write `schema` under `name`, replacing any previous version atomically
    pub fn save(&self, name: &str, schema: &FittedSchema) -> Result<ArtifactDescription> {
        validate_name(name)?;
        let checksum = checksum(schema)?;
        let created_at = Utc::now();
        let data = serde_json::to_vec_pretty(&ArtifactRef {
            format_version: FORMAT_VERSION,
            name,
            created_at,
            checksum: &checksum,
            schema,
        })?;

        let path = self.artifact_path(name);
        AtomicFile::new(&path, OverwriteBehavior::AllowOverwrite)
            .write(|f| f.write_all(&data))
            .with_context(|| format!("Failed to write artifact {}", path.display()))?;

        Ok(ArtifactDescription {
            name: name.to_string(),
            created_at,
            size: data.len() as u64,
            checksum,
        })
    }

    fn read(&self, name: &str) -> Result<(ArtifactFile, u64)> {
        validate_name(name)?;
        let path = self.artifact_path(name);
        if !path.exists() {
            return Err(anyhow!("Artifact '{}' not found in {}", name, self.dir.display()));
        }

        let data = fs::read(&path)
            .with_context(|| format!("Failed to read artifact {}", path.display()))?;
        let artifact: ArtifactFile = serde_json::from_slice(&data)
            .with_context(|| format!("Invalid artifact {}", path.display()))?;

        if artifact.format_version != FORMAT_VERSION {
            bail!(
                "Unsupported artifact format version {} in {}",
                artifact.format_version,
                path.display()
            );
        }
        let actual = checksum(&artifact.schema)?;
        if actual != artifact.checksum {
            bail!(
                "Checksum mismatch for artifact '{}': expected {}, got {}",
                name,
                artifact.checksum,
                actual
            );
        }
        Ok((artifact, data.len() as u64))
    }

    /// Load and verify a fitted schema
    pub fn load(&self, name: &str) -> Result<FittedSchema> {
        let (artifact, _) = self.read(name)?;
        if artifact.name != name {
            bail!(
                "Artifact file for '{}' holds '{}'",
                name,
                artifact.name
            );
        }
        Ok(artifact.schema)
    }

    /// Every stored artifact, sorted by name
    pub fn list(&self) -> Result<Vec<ArtifactDescription>> {
        let suffix = format!(".{}", ARTIFACT_EXTENSION);
        let mut artifacts = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let Some(name) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_suffix(&suffix))
            else {
                continue;
            };

            let (artifact, size) = self.read(name)?;
            artifacts.push(ArtifactDescription {
                name: name.to_string(),
                created_at: artifact.created_at,
                size,
                checksum: artifact.checksum,
            });
        }
        artifacts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(artifacts)
    }

    pub fn delete(&self, name: &str) -> Result<bool> {
        validate_name(name)?;
        let path = self.artifact_path(name);
        if path.exists() {
            fs::remove_file(&path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
