use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown {what}: {value}")]
    UnknownName { what: &'static str, value: String },

    #[error("Invalid id: {0}")]
    InvalidId(String),
}
