use crate::types::{DocMetadata, FileCategory, ProjectAnalysis};

impl DocMetadata {
    /// Counts straight from the analysis, so every rendered variant agrees
    pub fn from_analysis(analysis: &ProjectAnalysis) -> Self {
        Self {
            file_count: analysis.files.len(),
            component_count: analysis.files_in(FileCategory::Component).count(),
            service_count: analysis.files_in(FileCategory::Service).count(),
            total_lines: analysis.total_lines(),
        }
    }

    /// One-line form used by the dense variant
    pub fn compact(&self) -> String {
        format!(
            "files={} components={} services={} lines={}",
            self.file_count, self.component_count, self.service_count, self.total_lines
        )
    }
}
