use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the scan/generate pipeline. Every variant is fatal:
/// the run stops at the first error, files already written stay on disk.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to discover input files for `{pattern}`: {detail}")]
    Discovery { pattern: String, detail: String },

    #[error("failed to parse {file:?}: {message}")]
    Parse { file: PathBuf, message: String },

    #[error("unexpected type declaration in {file:?}: {detail}")]
    MalformedDeclaration { file: PathBuf, detail: String },

    #[error("unsupported base type `{base}` for enum type `{type_name}`")]
    UnsupportedBaseType { type_name: String, base: String },

    #[error("invalid enum member in `{type_name}`: {detail}")]
    InvalidMember { type_name: String, detail: String },

    #[error("failed to write {path:?}")]
    GenerationIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render enum template")]
    Render {
        #[from]
        source: minijinja::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
