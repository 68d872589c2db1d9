use std::path::Path;
use nifti::{IntoNdArray, NiftiObject, NiftiVolume};
use ndarray::ShapeBuilder;
use crate::error::{KSpaceError, Result};
use crate::figure::Image2D;



/// Read a 2-D float image. NIfTI axis 0 (fastest) becomes the image column axis.
pub fn read_nifti_image(file:impl AsRef<Path>) -> Result<Image2D>
{
    let nii = nifti::ReaderOptions::new().read_file(file.as_ref())?;
    let volume = nii.into_volume();
    let dims:Vec<_> = volume.dim().iter().map(|&dim| dim as usize).collect();
    if dims.iter().skip(2).any(|&d| d != 1) {
        return Err(KSpaceError::Figure(format!("expected a 2-D image, found dimensions {:?}",dims)));
    }
    let cols = dims.first().copied().unwrap_or(1);
    let rows = dims.get(1).copied().unwrap_or(1);
    let arr = volume.into_ndarray::<f32>()?;
    // column-major traversal of (cols, rows) is row-major over the image
    let data:Vec<f32> = arr.t().iter().copied().collect();
    Image2D::new(rows,cols,data)
}

/// Write a 2-D float image. The row-major image buffer is handed over as a column-major
/// `[cols, rows]` array, so viewers show image rows along the second axis.
pub fn write_nifti_image(file: impl AsRef<Path>, image:&Image2D) -> Result<()>
{
    let arr = ndarray::Array::from_shape_vec([image.cols(),image.rows()].as_slice().f(), image.data().to_vec())?;
    let writer = nifti::writer::WriterOptions::new(file.as_ref().with_extension("nii"));
    writer.write_nifti(&arr)?;
    Ok(())
}
