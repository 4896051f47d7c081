use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShashkiErrors {
    #[error("invalid square coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("no legal move available for the side to move")]
    NoLegalMoves,
}
