use num_complex::Complex32;
use serde::{Deserialize, Serialize};
use crate::error::{KSpaceError, Result};


/// Encoding counters of a single acquisition, as in the ISMRMRD acquisition header
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingCounters {
    pub kspace_encode_step_1: u16,
    pub kspace_encode_step_2: u16,
    pub average: u16,
    pub slice: u16,
    pub contrast: u16,
    pub phase: u16,
    pub repetition: u16,
    pub set: u16,
    pub segment: u16,
}

impl EncodingCounters {
    pub fn new(kspace_encode_step_1:u16, slice:u16, contrast:u16) -> Self {
        Self {
            kspace_encode_step_1,
            slice,
            contrast,
            ..Default::default()
        }
    }

    /// destination (phase_encode_1, slice, time) of the readout block
    pub fn destination(&self) -> [usize;3] {
        [self.kspace_encode_step_1 as usize, self.slice as usize, self.contrast as usize]
    }
}

/// One readout for all active receive channels.
/// Samples are stored channel-major: `[active_channels, number_of_samples]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Acquisition {
    pub idx: EncodingCounters,
    active_channels: usize,
    number_of_samples: usize,
    data: Vec<Complex32>,
}

impl Acquisition {

    pub fn new(idx:EncodingCounters, active_channels:usize, number_of_samples:usize, data:Vec<Complex32>) -> Result<Self> {
        let acq = Self {
            idx,
            active_channels,
            number_of_samples,
            data,
        };
        acq.check(0)?;
        Ok(acq)
    }

    /// build an acquisition by evaluating `f(channel, sample)`
    pub fn from_fn<F>(idx:EncodingCounters, active_channels:usize, number_of_samples:usize, f:F) -> Self
    where F: Fn(usize,usize) -> Complex32
    {
        let mut data = Vec::with_capacity(active_channels * number_of_samples);
        for c in 0..active_channels {
            for r in 0..number_of_samples {
                data.push(f(c,r));
            }
        }
        Self { idx, active_channels, number_of_samples, data }
    }

    /// (channels, samples)
    pub fn shape(&self) -> (usize,usize) {
        (self.active_channels,self.number_of_samples)
    }

    pub fn data(&self) -> &[Complex32] {
        &self.data
    }

    /// samples of one channel, or None if `channel` is not active
    pub fn channel(&self, channel:usize) -> Option<&[Complex32]> {
        if channel >= self.active_channels {
            return None;
        }
        let n = self.number_of_samples;
        self.data.get(channel * n..(channel + 1) * n)
    }

    /// verify the sample buffer matches the declared shape. `index` is the position in the
    /// acquisition stream reported on failure
    pub fn check(&self, index:usize) -> Result<()> {
        let expected = self.active_channels.checked_mul(self.number_of_samples);
        if expected != Some(self.data.len()) {
            return Err(KSpaceError::ShapeMismatch {
                index,
                expected: self.shape(),
                found: self.shape(),
                len: self.data.len(),
            });
        }
        Ok(())
    }
}

/// Index-addressed collection of acquisitions, typically backed by a file
pub trait AcquisitionSource {

    fn number_of_acquisitions(&self) -> usize;

    fn read_acquisition(&mut self, index:usize) -> Result<Acquisition>;

    /// read every acquisition once, in index order
    fn acquisitions(&mut self) -> Acquisitions<'_,Self> where Self: Sized {
        let end = self.number_of_acquisitions();
        Acquisitions { source: self, next: 0, end }
    }
}

/// Forward-only iterator over an [AcquisitionSource]
pub struct Acquisitions<'a,S:AcquisitionSource> {
    source: &'a mut S,
    next: usize,
    end: usize,
}

impl<S:AcquisitionSource> Iterator for Acquisitions<'_,S> {
    type Item = Result<Acquisition>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let acq = self.source.read_acquisition(self.next);
        self.next += 1;
        Some(acq)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.next;
        (n,Some(n))
    }
}

impl AcquisitionSource for Vec<Acquisition> {
    fn number_of_acquisitions(&self) -> usize {
        self.len()
    }

    fn read_acquisition(&mut self, index:usize) -> Result<Acquisition> {
        self.get(index).cloned().ok_or_else(|| {
            KSpaceError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("acquisition {index} requested from a source of {}",self.len()),
            ))
        })
    }
}
