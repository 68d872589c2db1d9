use thiserror::Error;

#[derive(Error, Debug)]
pub enum KSpaceError {
    #[error("malformed header: {0}")]
    MalformedHeader(String),
    #[error("acquisition source yielded no acquisitions")]
    EmptyAcquisition,
    #[error("acquisition {index} declares shape {found:?} (channels, samples) and carries {len} samples, expected {expected:?}")]
    ShapeMismatch {
        index: usize,
        expected: (usize, usize),
        found: (usize, usize),
        len: usize,
    },
    #[error("acquisition {index} has encoding index {coord:?} outside of the header extents {extents:?}")]
    IndexOutOfRange {
        index: usize,
        coord: [usize; 3],
        extents: [usize; 3],
    },
    #[error("acquisition {index} duplicates encoding index {coord:?}")]
    DuplicateIndex { index: usize, coord: [usize; 3] },
    #[error("{missing} of {total} encoding indices were never acquired (first missing: {first:?})")]
    IncompleteAcquisition {
        missing: usize,
        total: usize,
        first: [usize; 3],
    },
    #[error("channel {channel} is out of range for a volume with {n_channels} channels")]
    ChannelOutOfRange { channel: usize, n_channels: usize },
    #[error("volume of shape {shape:?} cannot hold {len} elements")]
    VolumeSize { shape: [usize; 5], len: usize },
    #[error("volume of shape {shape:?} is too large to allocate")]
    TooLarge { shape: [usize; 5] },
    #[error("figure error: {0}")]
    Figure(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "io-json")]
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "io-cfl")]
    #[error("cfl error: {0}")]
    Cfl(String),
    #[cfg(feature = "io-nifti")]
    #[error("nifti error: {0}")]
    Nifti(#[from] nifti::NiftiError),
    #[cfg(feature = "io-nifti")]
    #[error("image shape error: {0}")]
    ImageShape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, KSpaceError>;
