//! Export/import orchestration
//!
//! A [`TransferSession`] is built per invocation around a host and a config.
//! Export: capture -> encode -> overwrite gate -> write.
//! Import: read -> decode -> validate -> apply.

use std::path::{Path, PathBuf};

use crate::apply::{apply, ApplyReport};
use crate::capture::capture;
use crate::codec::{self, DocumentSummary};
use crate::config::{SessionConfig, PROJECT_TOKEN};
use crate::error::{CaptureError, ExportError, ImportError};
use crate::host::{FixedAnswer, OverwritePrompt, SkinHost};
use crate::model::{ExportDocument, Metadata};
use crate::validate::{check_normalized, validate_import};

pub struct TransferSession<'h, H: SkinHost + ?Sized> {
    host: &'h mut H,
    config: SessionConfig,
}

impl<'h, H: SkinHost + ?Sized> TransferSession<'h, H> {
    pub fn new(host: &'h mut H, config: SessionConfig) -> Self {
        Self { host, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Bindings available for export or import
    pub fn list_candidate_bindings(&self) -> Vec<String> {
        self.host.list_bindings()
    }

    /// Substitute the `{project}/` token with the host's project root.
    ///
    /// An empty root drops the token, leaving a path relative to the working
    /// directory.
    pub fn resolve_path(&self, raw: &str) -> PathBuf {
        if !raw.contains(PROJECT_TOKEN) {
            return PathBuf::from(raw);
        }
        let mut root = self.host.project_root().to_string_lossy().into_owned();
        if !root.is_empty() && !root.ends_with('/') && !root.ends_with('\\') {
            root.push('/');
        }
        PathBuf::from(raw.replace(PROJECT_TOKEN, &root))
    }

    /// `<dir>/<name>.json`, with `name` defaulting to the binding id.
    ///
    /// `dir` defaults to the configured export directory.
    pub fn export_path(&self, dir: Option<&str>, name: Option<&str>, binding_id: &str) -> PathBuf {
        let dir = dir.unwrap_or(&self.config.export_dir);
        let name = name.filter(|n| !n.is_empty()).unwrap_or(binding_id);
        self.resolve_path(dir).join(format!("{}.json", name))
    }

    /// Export without asking: an existing file is only replaced when `force`
    /// is set.
    pub fn export(
        &mut self,
        binding_id: &str,
        output_path: &str,
        creator: &str,
        force: bool,
    ) -> Result<PathBuf, ExportError> {
        self.export_with_prompt(binding_id, output_path, creator, force, &mut FixedAnswer(false))
    }

    /// Export, asking `prompt` before replacing an existing file unless
    /// `force` is set.
    pub fn export_with_prompt(
        &mut self,
        binding_id: &str,
        output_path: &str,
        creator: &str,
        force: bool,
        prompt: &mut dyn OverwritePrompt,
    ) -> Result<PathBuf, ExportError> {
        if self.host.resolve_binding(binding_id).is_none() {
            return Err(CaptureError::BindingNotFound(binding_id.to_string()).into());
        }

        let path = self.resolve_path(output_path);
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.is_dir() {
            return Err(ExportError::DirectoryNotFound(dir));
        }

        if path.exists() {
            if force {
                tracing::warn!("Overwriting {}", path.display());
            } else if prompt.confirm_overwrite(&path) {
                tracing::info!("Overwrite of {} confirmed", path.display());
            } else {
                tracing::warn!("Not overwriting {}", path.display());
                return Err(ExportError::FileAlreadyExists(path));
            }
        }

        let snapshot = capture(&*self.host, binding_id)?;
        let doc = ExportDocument::new(
            Metadata::now(creator, self.host.platform_version()),
            snapshot,
        );
        let bytes = if self.config.pretty {
            codec::encode_pretty(&doc)?
        } else {
            codec::encode(&doc)?
        };

        write_replacing(&path, &bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!(
            "Exported '{}' ({} vertices, {} influences) -> {}",
            binding_id,
            doc.snapshot.vertex_count,
            doc.snapshot.influences.len(),
            path.display()
        );
        Ok(path)
    }

    /// Read and validate a document against `target_binding_id` without
    /// writing any weights.
    pub fn check_import(
        &self,
        target_binding_id: &str,
        input_path: &str,
    ) -> Result<ExportDocument, ImportError> {
        let target = self
            .host
            .resolve_binding(target_binding_id)
            .ok_or_else(|| ImportError::BindingNotFound(target_binding_id.to_string()))?;

        let path = self.resolve_path(input_path);
        let bytes = read_document(&path, self.config.max_document_bytes)?;
        let doc = codec::decode(&bytes)?;

        validate_import(&doc.snapshot, &target)?;
        if let Some(tolerance) = self.config.normalization_tolerance {
            check_normalized(&doc.snapshot, tolerance)?;
        }
        Ok(doc)
    }

    /// Restore the weights in `input_path` onto `target_binding_id`.
    pub fn import(
        &mut self,
        target_binding_id: &str,
        input_path: &str,
    ) -> Result<ApplyReport, ImportError> {
        let doc = self.check_import(target_binding_id, input_path)?;
        let report = apply(&mut *self.host, target_binding_id, &doc.snapshot)?;

        tracing::info!(
            "Imported '{}' (by {}, {}) onto '{}': {} influences, {} weights",
            doc.snapshot.binding_id,
            doc.meta.creator,
            doc.meta.created_at,
            target_binding_id,
            report.influences,
            report.writes
        );
        Ok(report)
    }

    /// Metadata and header of a document, for display before import.
    pub fn inspect(&self, input_path: &str) -> Result<DocumentSummary, ImportError> {
        let path = self.resolve_path(input_path);
        let bytes = read_document(&path, self.config.max_document_bytes)?;
        Ok(codec::decode_summary(&bytes)?)
    }
}

/// Read a document into memory with a size cap.
fn read_document(path: &Path, max_bytes: u64) -> Result<Vec<u8>, ImportError> {
    let io_err = |source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > max_bytes {
        return Err(ImportError::TooLarge {
            path: path.to_path_buf(),
            size,
            max: max_bytes,
        });
    }
    std::fs::read(path).map_err(io_err)
}

/// Write through a sibling temp file so a failed write never truncates an
/// existing document.
fn write_replacing(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path).inspect_err(|_| {
        let _ = std::fs::remove_file(&tmp);
    })
}
