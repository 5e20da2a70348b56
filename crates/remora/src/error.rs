#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("oriented rectangle up vector must have a non-zero length")]
    DegenerateUpVector,
}

pub type Result<T> = std::result::Result<T, Error>;
