use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use log::info;
use crate::acquisition::Acquisition;
use crate::assemble::{AssembleOptions, KSpaceAssembler};
use crate::error::{KSpaceError, Result};
use crate::header::AcquisitionHeader;
use crate::volume::{KSpaceSample, KSpaceVolume};

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use num_complex::Complex32;
    use crate::error::KSpaceError;
    use super::*;

    const HEADER:&str = r#"{
        "encoding": [{
            "encodedSpace": {"matrixSize": {"x": 4, "y": 2, "z": 1}, "fieldOfView_mm": {"x": 200.0, "y": 200.0, "z": 5.0}},
            "reconSpace": {"matrixSize": {"x": 2, "y": 2, "z": 1}},
            "encodingLimits": {
                "kspace_encoding_step_1": {"minimum": 0, "maximum": 1, "center": 1},
                "slice": {"minimum": 0, "maximum": 1, "center": 0}
            },
            "trajectory": "cartesian"
        }]
    }"#;

    const ACQUISITIONS:&str = r#"
{"idx": {"kspace_encode_step_1": 1, "slice": 1}, "active_channels": 1, "number_of_samples": 2, "data": [[1.0, 2.0], [3.0, 4.0]]}

{"idx": {"kspace_encode_step_1": 0}, "active_channels": 1, "number_of_samples": 2, "data": [[5.0, 0.0], [6.0, 0.0]]}
"#;

    #[test]
    fn header_from_json() {
        let h:AcquisitionHeader = serde_json::from_str(HEADER).unwrap();
        let enc = &h.encoding[0];
        assert_eq!(enc.encoded_space.matrix_size.y,2);
        assert_eq!(enc.encoding_limits.slice.map(|l| l.maximum),Some(1));
        assert!(enc.encoding_limits.repetition.is_none());
        assert_eq!(enc.trajectory.as_deref(),Some("cartesian"));
    }

    #[test]
    fn stream_skips_blank_lines() {
        let acqs:Vec<_> = JsonLinesSource::new(Cursor::new(ACQUISITIONS)).collect::<Result<_>>().unwrap();
        assert_eq!(acqs.len(),2);
        assert_eq!(acqs[0].idx.slice,1);
        assert_eq!(acqs[1].idx.slice,0);
        assert_eq!(acqs[0].data(),&[Complex32::new(1.,2.),Complex32::new(3.,4.)]);
    }

    #[test]
    fn stream_reports_bad_line() {
        let mut src = JsonLinesSource::new(Cursor::new("{\"idx\": {}, \"active_channels\": 1}\n"));
        assert!(matches!(src.next(),Some(Err(KSpaceError::Json(_)))));
    }

    #[test]
    fn load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let h = dir.path().join("header.json");
        let a = dir.path().join("acquisitions.jsonl");
        std::fs::write(&h,HEADER).unwrap();
        std::fs::write(&a,ACQUISITIONS).unwrap();
        let (header,vol) = load_dataset::<Complex32>(&h,&a,AssembleOptions::default()).unwrap();
        assert_eq!(header.encoding.len(),1);
        assert_eq!(vol.shape(),[1,2,2,2,1]);
        assert_eq!(vol[[0,1,1,1,0]],Complex32::new(3.,4.));
        assert_eq!(vol[[0,0,0,0,0]],Complex32::new(5.,0.));
        assert_eq!(vol[[0,0,0,1,0]],Complex32::new(0.,0.));
        assert!(load_dataset::<Complex32>(&h,&a,AssembleOptions { strict: true }).is_err());
    }
}

/// read a JSON rendering of the acquisition header
pub fn read_header(file:impl AsRef<Path>) -> Result<AcquisitionHeader> {
    let f = File::open(file.as_ref())?;
    Ok(serde_json::from_reader(BufReader::new(f))?)
}

/// Streams acquisitions from JSON lines, one acquisition per line. Blank lines are skipped.
pub struct JsonLinesSource<R> {
    lines: Lines<R>,
}

impl<R:BufRead> JsonLinesSource<R> {
    pub fn new(reader:R) -> Self {
        Self { lines: reader.lines() }
    }
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open(file:impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(file.as_ref())?)))
    }
}

impl<R:BufRead> Iterator for JsonLinesSource<R> {
    type Item = Result<Acquisition>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(KSpaceError::from(e))),
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(serde_json::from_str(&line).map_err(KSpaceError::from));
        }
    }
}

/// Load the header and the assembled k-space of a dataset
pub fn load_dataset<T:KSpaceSample>(header_file:impl AsRef<Path>, acquisition_file:impl AsRef<Path>, options:AssembleOptions) -> Result<(AcquisitionHeader,KSpaceVolume<T>)> {
    let header = read_header(&header_file)?;
    info!("assembling {:?} with header {:?}",acquisition_file.as_ref(),header_file.as_ref());
    let acquisitions = JsonLinesSource::open(acquisition_file)?;
    let volume = KSpaceAssembler::new(options).assemble(&header,acquisitions)?;
    Ok((header,volume))
}
