use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub mod events;
pub mod report;

pub use events::{EventSink, MemorySink, NoopSink, SseSink, WorkflowEvent};
pub use report::GenerationReport;

pub trait Outlet {
    async fn save(&self, report: &GenerationReport) -> Result<()>;
}

/// 把报告以 JSON 写入磁盘
pub struct DiskOutlet {
    path: PathBuf,
}

impl DiskOutlet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Outlet for DiskOutlet {
    async fn save(&self, report: &GenerationReport) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(report)?;
        tokio::fs::write(&self.path, content)
            .await
            .with_context(|| format!("failed to write report to {}", self.path.display()))?;

        tracing::info!("💾 报告已保存到 {}", self.path.display());
        Ok(())
    }
}
