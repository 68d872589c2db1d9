use log::{debug, info};
use serde::{Deserialize, Serialize};
use crate::{ArrayDim, try_alloc};
use crate::acquisition::{Acquisition, AcquisitionSource};
use crate::error::{KSpaceError, Result};
use crate::header::{AcquisitionHeader, EncodingExtents};
use crate::volume::{KSpaceSample, KSpaceVolume};


#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembleOptions {
    /// reject duplicate encoding indices and encoding indices that were never acquired
    #[serde(default)]
    pub strict: bool,
}

/// Scatters a time-ordered acquisition stream into a dense [KSpaceVolume]
#[derive(Clone, Debug, Default)]
pub struct KSpaceAssembler {
    options: AssembleOptions,
}

impl KSpaceAssembler {

    pub fn new(options:AssembleOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AssembleOptions {
        &self.options
    }

    /// Assemble a volume of shape `[channels, samples, n_phase1, n_slices, n_times]`.
    ///
    /// The stream is consumed once, in order. The first acquisition determines the number of
    /// channels and readout samples. Each block lands at
    /// `[:, :, kspace_encode_step_1, slice, contrast]`; later acquisitions overwrite earlier ones
    /// with the same encoding index, and encoding indices never acquired stay zero.
    pub fn assemble<T,I,E>(&self, header:&AcquisitionHeader, acquisitions:I) -> Result<KSpaceVolume<T>>
    where
        T: KSpaceSample,
        I: IntoIterator<Item = std::result::Result<Acquisition,E>>,
        KSpaceError: From<E>,
    {
        let extents = EncodingExtents::from_header(header)?;
        let mut acquisitions = acquisitions.into_iter();

        let first = acquisitions.next().ok_or(KSpaceError::EmptyAcquisition)??;
        let (n_channels,n_samples) = first.shape();

        let shape = [n_channels,n_samples,extents.n_phase1,extents.n_slices,extents.n_times];
        info!("allocating k-space volume of shape {:?}",shape);
        let volume = KSpaceVolume::zeros(shape)?;
        let acquired = extents.checked_numel()
            .and_then(|n| try_alloc(n,false))
            .ok_or(KSpaceError::TooLarge { shape })?;
        let mut scatter = Scatter {
            volume,
            extents,
            shape: (n_channels,n_samples),
            acquired,
            strict: self.options.strict,
        };

        scatter.place(0,&first)?;
        let mut count = 1;
        for (index,acq) in acquisitions.enumerate() {
            scatter.place(index + 1,&acq?)?;
            count += 1;
        }
        info!("placed {} acquisitions",count);

        let missing = scatter.acquired.iter().filter(|a| !**a).count();
        if missing > 0 {
            let dims = ArrayDim::row_major(&extents.as_array());
            let addr = scatter.acquired.iter().position(|a| !*a).unwrap_or_default();
            let idx = dims.calc_idx(addr);
            if self.options.strict {
                return Err(KSpaceError::IncompleteAcquisition {
                    missing,
                    total: scatter.acquired.len(),
                    first: [idx[0],idx[1],idx[2]],
                });
            }
            debug!("{} of {} encoding indices were not acquired, first at {:?}",missing,scatter.acquired.len(),&idx[0..3]);
        }

        Ok(scatter.volume)
    }

    /// assemble from acquisitions already in memory
    pub fn assemble_all<T,I>(&self, header:&AcquisitionHeader, acquisitions:I) -> Result<KSpaceVolume<T>>
    where
        T: KSpaceSample,
        I: IntoIterator<Item = Acquisition>,
    {
        self.assemble(header,acquisitions.into_iter().map(Ok::<_,KSpaceError>))
    }

    /// assemble from an index-addressed source, reading indices 0..n once
    pub fn assemble_source<T,S>(&self, header:&AcquisitionHeader, source:&mut S) -> Result<KSpaceVolume<T>>
    where
        T: KSpaceSample,
        S: AcquisitionSource,
    {
        self.assemble(header,source.acquisitions())
    }
}

struct Scatter<T> {
    volume: KSpaceVolume<T>,
    extents: EncodingExtents,
    shape: (usize,usize),
    acquired: Vec<bool>,
    strict: bool,
}

impl<T:KSpaceSample> Scatter<T> {
    fn place(&mut self, index:usize, acq:&Acquisition) -> Result<()> {
        if acq.shape() != self.shape {
            return Err(KSpaceError::ShapeMismatch { index, expected: self.shape, found: acq.shape(), len: acq.data().len() });
        }
        acq.check(index)?;

        let [y,z,t] = acq.idx.destination();
        if !self.extents.contains(y,z,t) {
            return Err(KSpaceError::IndexOutOfRange { index, coord: [y,z,t], extents: self.extents.as_array() });
        }

        let cell = (y * self.extents.n_slices + z) * self.extents.n_times + t;
        if self.acquired[cell] {
            if self.strict {
                return Err(KSpaceError::DuplicateIndex { index, coord: [y,z,t] });
            }
            debug!("acquisition {} overwrites encoding index {:?}",index,[y,z,t]);
        }
        self.acquired[cell] = true;

        self.volume.write_block(y,z,t,acq.data(),self.shape.1);
        Ok(())
    }
}
