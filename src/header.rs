use serde::{Deserialize, Serialize};
use crate::error::{KSpaceError, Result};


/// Acquisition geometry. Field names follow the ISMRMRD XML header schema.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionHeader {
    #[serde(default)]
    pub encoding: Vec<Encoding>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encoding {
    #[serde(default)]
    pub encoded_space: EncodingSpace,
    #[serde(default)]
    pub recon_space: Option<EncodingSpace>,
    #[serde(default)]
    pub encoding_limits: EncodingLimits,
    #[serde(default)]
    pub trajectory: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodingSpace {
    #[serde(default)]
    pub matrix_size: MatrixSize,
    #[serde(default, rename = "fieldOfView_mm")]
    pub field_of_view_mm: Option<FieldOfView>,
}

/// missing entries deserialize to 0 and are rejected where they are needed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixSize {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOfView {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Optional bounds on each encoding counter. An absent limit means the counter is unused.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingLimits {
    pub kspace_encoding_step_1: Option<Limit>,
    pub kspace_encoding_step_2: Option<Limit>,
    pub average: Option<Limit>,
    pub slice: Option<Limit>,
    pub contrast: Option<Limit>,
    pub phase: Option<Limit>,
    pub repetition: Option<Limit>,
    pub set: Option<Limit>,
    pub segment: Option<Limit>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    #[serde(default)]
    pub minimum: u16,
    pub maximum: u16,
    #[serde(default)]
    pub center: u16,
}

impl Limit {
    /// limit spanning 0..=maximum
    pub fn up_to(maximum:u16) -> Self {
        Self { minimum: 0, maximum, center: maximum / 2 }
    }

    /// number of counter values covered, starting from zero
    pub fn count(&self) -> usize {
        self.maximum as usize + 1
    }
}

/// Array extents of the phase-encode, slice and time axes derived from a header
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingExtents {
    pub n_phase1: usize,
    pub n_slices: usize,
    pub n_times: usize,
}

impl EncodingExtents {

    /// Only the first encoding is considered.
    /// The phase-encode extent comes from the encoded matrix size, not the encoding step limit.
    pub fn from_header(header:&AcquisitionHeader) -> Result<Self> {
        let enc = header.encoding.first().ok_or_else(||
            KSpaceError::MalformedHeader(String::from("header has no encoding"))
        )?;
        let n_phase1 = enc.encoded_space.matrix_size.y as usize;
        if n_phase1 == 0 {
            return Err(KSpaceError::MalformedHeader(String::from("encodedSpace.matrixSize.y must be positive")));
        }
        let limits = &enc.encoding_limits;
        Ok(Self {
            n_phase1,
            n_slices: limits.slice.map_or(1, |l| l.count()),
            n_times: limits.repetition.map_or(1, |l| l.count()),
        })
    }

    pub fn as_array(&self) -> [usize;3] {
        [self.n_phase1,self.n_slices,self.n_times]
    }

    /// number of encoding cells, or None if it overflows
    pub fn checked_numel(&self) -> Option<usize> {
        self.n_phase1.checked_mul(self.n_slices)?.checked_mul(self.n_times)
    }

    pub fn contains(&self, phase1:usize, slice:usize, time:usize) -> bool {
        phase1 < self.n_phase1 && slice < self.n_slices && time < self.n_times
    }
}

impl TryFrom<&AcquisitionHeader> for EncodingExtents {
    type Error = KSpaceError;
    fn try_from(header: &AcquisitionHeader) -> Result<Self> {
        Self::from_header(header)
    }
}
