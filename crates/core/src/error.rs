use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

pub type PnResult<T> = Result<T, PnError>;

#[derive(Debug, Error, Diagnostic)]
pub enum PnError {
    #[error("storage error for key '{key}': {message}")]
    #[diagnostic(code("pn.storage"))]
    Storage { key: String, message: String },
    #[error("override blob is malformed: {message}")]
    #[diagnostic(code("pn.override_format"))]
    OverrideFormat {
        message: String,
        #[source_code]
        src: String,
        #[label("here")]
        span: SourceSpan,
    },
    #[error("story has no scenes")]
    #[diagnostic(code("pn.empty_story"))]
    EmptyStory,
    #[error("scene index {index} out of range (story has {len} scenes)")]
    #[diagnostic(code("pn.scene_index"))]
    SceneIndex { index: usize, len: usize },
    #[error("serialization error: {0}")]
    #[diagnostic(code("pn.serialization"))]
    Serialization(String),
}

impl PnError {
    /// Builds a format error pointing at the line/column reported by serde_json.
    pub(crate) fn override_format(src: &str, err: &serde_json::Error) -> Self {
        let offset = offset_of(src, err.line(), err.column());
        Self::OverrideFormat {
            message: err.to_string(),
            src: src.to_string(),
            span: (offset, 0).into(),
        }
    }

    /// Well-formed JSON carrying a value the scene model cannot hold.
    pub(crate) fn override_value(src: &str, message: String) -> Self {
        Self::OverrideFormat {
            message,
            src: src.to_string(),
            span: (0, src.len()).into(),
        }
    }
}

fn offset_of(src: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(src.len())
}
