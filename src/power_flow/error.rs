use thiserror::Error;

/// Fatal topology and input failures. Advisory problems go to `EngineResult::warnings`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Root node '{root_id}' not found: invalid topology")]
    MissingRoot { root_id: String },

    #[error("Cyclic dependency detected in network topology involving node {node_id}")]
    CyclicTopology { node_id: String },

    #[error("Duplicate node id {node_id}")]
    DuplicateNode { node_id: String },

    #[error("Cable catalog is empty; node {node_id} has no cable to compute with")]
    EmptyCableCatalog { node_id: String },
}

impl EngineError {
    /// Generic text for end users; `Display` carries the diagnostic detail.
    pub fn user_message(&self) -> &'static str {
        "calculation failed"
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            EngineError::MissingRoot { .. } => "MissingRoot",
            EngineError::CyclicTopology { .. } => "CyclicTopology",
            EngineError::DuplicateNode { .. } => "DuplicateNode",
            EngineError::EmptyCableCatalog { .. } => "EmptyCableCatalog",
        }
    }
}

pub type CalcResult<T> = Result<T, EngineError>;
