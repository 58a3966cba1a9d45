use std::path::{Path, PathBuf};

use tracing::info;

use super::domain::SaveMarkdownResponse;

pub const DEFAULT_FILENAME: &str = "investment-report.md";

/// Server-side archive for rendered markdown reports.
#[derive(Debug, Clone)]
pub struct MarkdownArchive {
    dir: PathBuf,
    enabled: bool,
}

impl MarkdownArchive {
    pub fn new(dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            dir: dir.into(),
            enabled,
        }
    }

    pub fn disabled() -> Self {
        Self::new("outputs", false)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn save(
        &self,
        content: &str,
        filename: Option<&str>,
    ) -> Result<SaveMarkdownResponse, std::io::Error> {
        if !self.enabled {
            return Ok(SaveMarkdownResponse {
                saved: false,
                path: None,
                disabled: true,
                message: "server-side saving is disabled".to_string(),
            });
        }

        let name = sanitize_filename(filename);
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&name);
        tokio::fs::write(&path, content).await?;
        info!(path = %path.display(), bytes = content.len(), "markdown report saved");

        Ok(SaveMarkdownResponse {
            saved: true,
            path: Some(path.display().to_string()),
            disabled: false,
            message: format!("saved {name}"),
        })
    }
}

/// Reduces a client-supplied name to a bare `.md` file name inside the archive.
pub fn sanitize_filename(filename: Option<&str>) -> String {
    let base = filename
        .map(|name| name.replace('\\', "/"))
        .and_then(|name| {
            name.rsplit('/')
                .map(str::trim)
                .find(|segment| !segment.is_empty() && *segment != "..")
                .map(str::to_string)
        })
        .filter(|name| name != ".")
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());

    if base.to_ascii_lowercase().ends_with(".md") {
        base
    } else {
        format!("{base}.md")
    }
}
