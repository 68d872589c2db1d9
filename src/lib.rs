/*
    Reordering of raw MR acquisitions into dense k-space arrays.
    Acquisitions are scattered into a 5-D volume [channel, readout, phase_encode_1, slice, time]
    that can be projected into a grid of slice/time images for inspection.
    Array addressing uses a static number of dimensions for cheap address calculations.
 */
pub mod error;
pub mod header;
pub mod acquisition;
pub mod volume;
pub mod assemble;
pub mod figure;
pub mod project;

#[cfg(feature = "io-json")]
pub mod io_json;

#[cfg(feature = "io-cfl")]
pub mod io_cfl;

#[cfg(feature = "io-nifti")]
pub mod io_nifti;

pub use error::{KSpaceError, Result};
pub use header::{AcquisitionHeader, EncodingExtents};
pub use acquisition::{Acquisition, AcquisitionSource, EncodingCounters};
pub use volume::{KSpaceSample, KSpaceVolume};
pub use assemble::{AssembleOptions, KSpaceAssembler};
pub use figure::{Figure, Image2D, Mosaic};
pub use project::{ChannelSelector, GridLayout, ProjectionOptions, Projector, Quantity};

const N_DIMS:usize = 16;


/// memory layout of an array
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum MemoryOrder {
    /// first axis varies fastest (cfl, NIfTI)
    ColumnMajor,
    /// last axis varies fastest
    RowMajor,
}

#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct ArrayDim {
    shape: [usize; N_DIMS],
    strides: [usize; N_DIMS],
    order: MemoryOrder,
}

impl Default for ArrayDim {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrayDim {

    pub fn new() -> ArrayDim {
        ArrayDim{
            shape: [1;N_DIMS],
            strides: [1;N_DIMS],
            order: MemoryOrder::ColumnMajor,
        }
    }

    /// column-major dimensions from a shape
    pub fn from_shape(shape: &[usize]) -> ArrayDim {
        Self::with_order(shape,MemoryOrder::ColumnMajor)
    }

    /// row-major dimensions from a shape
    pub fn row_major(shape: &[usize]) -> ArrayDim {
        Self::with_order(shape,MemoryOrder::RowMajor)
    }

    fn with_order(shape: &[usize], order: MemoryOrder) -> ArrayDim {
        assert!(shape.len() <= N_DIMS,"only axes of up to 16 are supported");
        let mut dims = [1;N_DIMS];
        for (d,s) in dims.iter_mut().zip(shape.iter()) {
            *d = *s;
        }
        let mut arr_dim = Self {
            shape: dims,
            strides: [1;N_DIMS],
            order,
        };
        arr_dim.update_strides();
        arr_dim
    }

    pub fn order(&self) -> MemoryOrder {
        self.order
    }

    /// return the shape with all singleton dimensions intact
    pub fn shape(&self) -> &[usize; N_DIMS] {
        &self.shape
    }

    /// return the shape with trailing singleton dimensions removed
    pub fn shape_ns(&self) -> &[usize] {
        if let Some(i) = self.shape.iter().rev().position(|&dim| dim != 1) {
            let new_len = self.shape.len() - i;
            &self.shape[..new_len]
        } else {
            &[1]
        }
    }

    pub fn size(&self, dim:usize) -> usize {
        assert!(dim < N_DIMS);
        self.shape[dim]
    }

    pub fn stride(&self, dim:usize) -> usize {
        assert!(dim < N_DIMS);
        self.strides[dim]
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// number of elements, or None if it overflows
    pub fn checked_numel(&self) -> Option<usize> {
        self.shape.iter().try_fold(1usize,|n,&d| n.checked_mul(d))
    }

    pub fn with_dim(mut self,axis:usize,dim:usize) -> ArrayDim {
        assert!(axis < N_DIMS,"only axes of up to 16 are supported");
        self.shape[axis] = dim;
        self.update_strides();
        self
    }

    /// the first `ndim` axes in reverse order with the opposite memory order.
    /// Both describe the same buffer, so a row-major array can be handed to column-major
    /// writers without moving any data.
    pub fn reversed(&self,ndim:usize) -> ArrayDim {
        assert!(ndim <= N_DIMS);
        let mut shape = self.shape[..ndim].to_vec();
        shape.reverse();
        match self.order {
            MemoryOrder::ColumnMajor => Self::row_major(&shape),
            MemoryOrder::RowMajor => Self::from_shape(&shape),
        }
    }

    fn update_strides(&mut self) {
        let mut stride = 1;
        match self.order {
            MemoryOrder::ColumnMajor => {
                for (dim,s) in self.shape.iter().zip(self.strides.iter_mut()) {
                    *s = stride;
                    stride = stride.saturating_mul(*dim);
                }
            }
            MemoryOrder::RowMajor => {
                for (dim,s) in self.shape.iter().zip(self.strides.iter_mut()).rev() {
                    *s = stride;
                    stride = stride.saturating_mul(*dim);
                }
            }
        }
    }

    #[inline]
    /// calculate the element address from the index (subscripts)
    pub fn calc_addr(&self,idx: &[usize]) -> usize {
        let mut offset = 0;
        for (i,stride) in idx.iter().zip(self.strides.iter()) {
            offset += i * stride;
        }
        offset
    }

    #[inline]
    /// calculate the element index (subscript) from the address
    pub fn calc_idx(&self,addr:usize) -> [usize;N_DIMS] {
        let mut addr = addr;
        debug_assert!(addr < self.numel(), "offset {} exceeds total number of elements {}", addr, self.numel());
        let mut idx = [0usize; N_DIMS];
        match self.order {
            MemoryOrder::ColumnMajor => {
                for k in 0..N_DIMS {
                    idx[k] = addr % self.shape[k];
                    addr /= self.shape[k];
                }
            }
            MemoryOrder::RowMajor => {
                for k in (0..N_DIMS).rev() {
                    idx[k] = addr % self.shape[k];
                    addr /= self.shape[k];
                }
            }
        }
        idx
    }

    /// allocates a vector of values the size of dims
    pub fn alloc<T:Sized + Clone>(&self,value:T) -> Vec<T> {
        vec![value;self.numel()]
    }

    /// like [ArrayDim::alloc], but returns None instead of aborting when the
    /// element count overflows or the memory cannot be reserved
    pub fn try_alloc<T:Sized + Clone>(&self,value:T) -> Option<Vec<T>> {
        try_alloc(self.checked_numel()?,value)
    }

}

/// allocate `n` copies of `value` without aborting on allocation failure
pub(crate) fn try_alloc<T:Clone>(n:usize,value:T) -> Option<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(n).ok()?;
    v.resize(n,value);
    Some(v)
}
