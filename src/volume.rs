use std::fmt::Debug;
use num_complex::{Complex32, Complex64};
use num_traits::Zero;
use crate::ArrayDim;
use crate::error::{KSpaceError, Result};


/// Complex sample types a volume can be assembled into
pub trait KSpaceSample: Copy + Zero + Debug + PartialEq + Send + Sync + 'static {
    fn from_complex32(value:Complex32) -> Self;
    fn magnitude(&self) -> f32;
    fn phase(&self) -> f32;
}

impl KSpaceSample for Complex32 {
    fn from_complex32(value:Complex32) -> Self {
        value
    }
    fn magnitude(&self) -> f32 {
        self.norm()
    }
    fn phase(&self) -> f32 {
        self.arg()
    }
}

impl KSpaceSample for Complex64 {
    fn from_complex32(value:Complex32) -> Self {
        Complex64::new(value.re as f64,value.im as f64)
    }
    fn magnitude(&self) -> f32 {
        self.norm() as f32
    }
    fn phase(&self) -> f32 {
        self.arg() as f32
    }
}

/// Dense k-space array of shape `[channel, readout, phase_encode_1, slice, time]`.
/// Memory is row-major: the time axis varies fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct KSpaceVolume<T = Complex32> {
    dims: ArrayDim,
    data: Vec<T>,
}

impl<T:KSpaceSample> KSpaceVolume<T> {

    /// zero-filled volume. Fails with [KSpaceError::TooLarge] instead of aborting when the
    /// shape cannot be allocated
    pub fn zeros(shape:[usize;5]) -> Result<Self> {
        let dims = ArrayDim::row_major(&shape);
        let data = dims.try_alloc(T::zero()).ok_or(KSpaceError::TooLarge { shape })?;
        Ok(Self { dims, data })
    }

    pub fn from_vec(shape:[usize;5], data:Vec<T>) -> Result<Self> {
        let dims = ArrayDim::row_major(&shape);
        if dims.checked_numel() != Some(data.len()) {
            return Err(KSpaceError::VolumeSize { shape, len: data.len() });
        }
        Ok(Self { dims, data })
    }

    pub fn shape(&self) -> [usize;5] {
        let s = self.dims.shape();
        [s[0],s[1],s[2],s[3],s[4]]
    }

    pub fn dims(&self) -> &ArrayDim {
        &self.dims
    }

    pub fn n_channels(&self) -> usize {
        self.dims.size(0)
    }

    pub fn n_slices(&self) -> usize {
        self.dims.size(3)
    }

    pub fn n_times(&self) -> usize {
        self.dims.size(4)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, idx:[usize;5]) -> Option<&T> {
        let shape = self.shape();
        if idx.iter().zip(shape.iter()).any(|(i,n)| i >= n) {
            return None;
        }
        self.data.get(self.dims.calc_addr(&idx))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Copy a channel-major `[channels, samples]` block to `[:, :, phase1, slice, time]`.
    /// Bounds are the caller's responsibility.
    pub(crate) fn write_block(&mut self, phase1:usize, slice:usize, time:usize, block:&[Complex32], n_samples:usize) {
        let base = self.dims.calc_addr(&[0,0,phase1,slice,time]);
        let c_stride = self.dims.stride(0);
        let r_stride = self.dims.stride(1);
        for (i,&sample) in block.iter().enumerate() {
            let (c,r) = (i / n_samples, i % n_samples);
            self.data[base + c * c_stride + r * r_stride] = T::from_complex32(sample);
        }
    }
}

impl<T:KSpaceSample> std::ops::Index<[usize;5]> for KSpaceVolume<T> {
    type Output = T;
    fn index(&self, idx:[usize;5]) -> &T {
        self.get(idx).unwrap_or_else(|| panic!("index {:?} out of bounds for volume of shape {:?}",idx,self.shape()))
    }
}
