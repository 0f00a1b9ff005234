use thiserror::Error;

pub type Result<T> = std::result::Result<T, SynthError>;

#[derive(Debug, Error)]
pub enum SynthError {
    #[error("Parsing Error: {0}")]
    Parse(String),
    #[error("Config Error: {0}")]
    Config(String),
    #[error("File Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Audio Error: {0}")]
    Audio(String),
    #[error("Wav Error: {0}")]
    Wav(#[from] hound::Error),
    #[error("Invalid Pattern Error: {0}")]
    InvalidPattern(String),
    #[error("Invalid Instrument Error: {0}")]
    InvalidInstrument(String),
}
