//! Error types for the va-app service layer.

/// Application error type that wraps errors from the backend crates and
/// gives the CLI a single error surface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No model loaded: the model base name is empty")]
    NoModel,

    #[error("Solver was killed; sweep aborted")]
    SolverKilled,

    #[error("A sweep is already in progress")]
    SweepInProgress,

    #[error("Unable to find result named {0}")]
    CantFindName(String),

    #[error("Project error: {0}")]
    Project(String),

    #[error("Settings validation failed: {0}")]
    Validation(String),

    #[error("Setup error: {0}")]
    Setup(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for va-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<va_project::ProjectError> for AppError {
    fn from(err: va_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<va_project::ValidationError> for AppError {
    fn from(err: va_project::ValidationError) -> Self {
        match err {
            va_project::ValidationError::MissingModel => AppError::NoModel,
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl From<va_setup::SetupError> for AppError {
    fn from(err: va_setup::SetupError) -> Self {
        AppError::Setup(err.to_string())
    }
}

impl From<va_parse::ParseError> for AppError {
    fn from(err: va_parse::ParseError) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<va_solver::SolverError> for AppError {
    fn from(err: va_solver::SolverError) -> Self {
        match err {
            va_solver::SolverError::Busy => AppError::SweepInProgress,
            other => AppError::Solver(other.to_string()),
        }
    }
}

impl From<va_results::ResultsError> for AppError {
    fn from(err: va_results::ResultsError) -> Self {
        match err {
            va_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}
