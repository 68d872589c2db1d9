use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use byteorder::{ByteOrder, LittleEndian};
use num_complex::Complex32;
use crate::{ArrayDim, MemoryOrder};
use crate::error::{KSpaceError, Result};
use crate::volume::KSpaceVolume;

#[cfg(test)]
mod tests {
    use num_complex::Complex32;
    use crate::ArrayDim;
    use crate::volume::KSpaceVolume;
    use super::*;

    #[test]
    fn test_cfl_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("test_complex");
        let dims = ArrayDim::from_shape(&[4,3,2]);
        let x:Vec<_> = (0..dims.numel()).map(|i| Complex32::new(i as f32,-(i as f32))).collect();
        write_cfl(&base,&x,dims).unwrap();
        let hdr = std::fs::read_to_string(base.with_extension("hdr")).unwrap();
        assert!(hdr.starts_with("# Dimensions\n4 3 2 1"));
        let (data,read_dims) = read_cfl(&base).unwrap();
        assert_eq!(read_dims.shape(),dims.shape());
        assert_eq!(data,x);
    }

    #[test]
    fn test_volume_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("kspace");
        // leading singleton channel axis must survive
        let shape = [1,4,3,1,2];
        let data:Vec<_> = (0..24).map(|i| Complex32::new(i as f32,1.)).collect();
        let vol = KSpaceVolume::from_vec(shape,data).unwrap();
        write_volume(&base,&vol).unwrap();
        let hdr = std::fs::read_to_string(base.with_extension("hdr")).unwrap();
        assert!(hdr.starts_with("# Dimensions\n2 1 3 4 1"));
        let back = read_volume(&base).unwrap();
        assert_eq!(back,vol);
    }

    #[test]
    fn test_bad_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("short");
        assert!(write_cfl(&base,&[Complex32::ZERO;3],ArrayDim::from_shape(&[2,2])).is_err());
        write_cfl(&base,&[Complex32::ZERO;4],ArrayDim::from_shape(&[2,2])).unwrap();
        std::fs::write(base.with_extension("hdr"),"# Dimensions\n2 3\n").unwrap();
        assert!(matches!(read_cfl(&base),Err(KSpaceError::Cfl(_))));
        // more than five non-singleton axes cannot be a volume
        std::fs::write(base.with_extension("hdr"),"# Dimensions\n1 1 1 1 1 2 2\n").unwrap();
        assert!(read_volume(&base).is_err());
    }
}

/// cfl header and data file names for a base name
pub fn cfl_paths(cfl_file_base_name:impl AsRef<Path>) -> (PathBuf,PathBuf) {
    let base = cfl_file_base_name.as_ref();
    (base.with_extension("hdr"),base.with_extension("cfl"))
}

/// read the dimensions listed in a cfl header
pub fn read_dims(cfl_file_base_name:impl AsRef<Path>) -> Result<ArrayDim> {
    let (hdr,_) = cfl_paths(cfl_file_base_name);
    let s = std::fs::read_to_string(&hdr)?;
    let mut lines = s.lines();
    while let Some(line) = lines.next() {
        if line.trim() == "# Dimensions" {
            let dims = lines.next()
                .ok_or_else(|| KSpaceError::Cfl(format!("no dimensions after header key in {:?}",hdr)))?
                .split_whitespace()
                .map(|d| d.parse::<usize>())
                .collect::<std::result::Result<Vec<_>,_>>()
                .map_err(|e| KSpaceError::Cfl(format!("bad dimension in {:?}: {e}",hdr)))?;
            if dims.len() > 16 {
                return Err(KSpaceError::Cfl(format!("{} dimensions listed, at most 16 are supported",dims.len())));
            }
            return Ok(ArrayDim::from_shape(&dims));
        }
    }
    Err(KSpaceError::Cfl(format!("no \"# Dimensions\" entry in {:?}",hdr)))
}

/// read a column-major cfl file
pub fn read_cfl(cfl_file_base_name:impl AsRef<Path>) -> Result<(Vec<Complex32>, ArrayDim)> {
    let dims = read_dims(&cfl_file_base_name)?;
    let (_,cfl) = cfl_paths(&cfl_file_base_name);
    let mut bytes = vec![];
    BufReader::new(File::open(&cfl)?).read_to_end(&mut bytes)?;
    let expected = dims.checked_numel().and_then(|n| n.checked_mul(8));
    if expected != Some(bytes.len()) {
        return Err(KSpaceError::Cfl(format!("{:?} holds {} bytes, dimensions {:?} do not match",cfl,bytes.len(),dims.shape_ns())));
    }
    let mut floats = vec![0f32;bytes.len() / 4];
    LittleEndian::read_f32_into(&bytes,&mut floats);
    let data = floats.chunks_exact(2).map(|f| Complex32::new(f[0],f[1])).collect();
    Ok((data, dims))
}

/// write a column-major cfl file
pub fn write_cfl(cfl_file_base_name:impl AsRef<Path>, data: &[Complex32], dims: ArrayDim) -> Result<()> {
    if dims.order() != MemoryOrder::ColumnMajor {
        return Err(KSpaceError::Cfl(String::from("cfl files are column-major")));
    }
    if dims.numel() != data.len() {
        return Err(KSpaceError::Cfl(format!("{} samples do not fill dimensions {:?}",data.len(),dims.shape_ns())));
    }
    let (hdr,cfl) = cfl_paths(cfl_file_base_name);

    let dim_str = dims.shape().iter().map(|d| d.to_string()).collect::<Vec<_>>().join(" ");
    let mut h = File::create(hdr)?;
    write!(h,"# Dimensions\n{}\n",dim_str)?;

    let mut floats = Vec::with_capacity(data.len() * 2);
    data.iter().for_each(|c| {
        floats.push(c.re);
        floats.push(c.im);
    });
    let mut bytes = vec![0u8;floats.len() * 4];
    LittleEndian::write_f32_into(&floats,&mut bytes);
    let mut w = BufWriter::new(File::create(cfl)?);
    w.write_all(&bytes)?;
    w.flush()?;
    Ok(())
}

/// Write a k-space volume. The row-major `[channel, readout, phase1, slice, time]` buffer is
/// written as-is, so the cfl axes read `[time, slice, phase1, readout, channel]`.
pub fn write_volume(cfl_file_base_name:impl AsRef<Path>, volume:&KSpaceVolume<Complex32>) -> Result<()> {
    write_cfl(cfl_file_base_name,volume.as_slice(),volume.dims().reversed(5))
}

/// read a volume written by [write_volume]
pub fn read_volume(cfl_file_base_name:impl AsRef<Path>) -> Result<KSpaceVolume<Complex32>> {
    let (data,dims) = read_cfl(cfl_file_base_name)?;
    if dims.shape_ns().len() > 5 {
        return Err(KSpaceError::Cfl(format!("{:?} has more than 5 dimensions",dims.shape_ns())));
    }
    let s = *dims.reversed(5).shape();
    KSpaceVolume::from_vec([s[0],s[1],s[2],s[3],s[4]],data)
}
