use serde::{Deserialize, Serialize};
use crate::error::{KSpaceError, Result};

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(rows:usize, cols:usize, value:f32) -> Image2D {
        Image2D::new(rows,cols,vec![value;rows*cols]).unwrap()
    }

    #[test]
    fn image_sqrt() {
        let img = Image2D::new(2,2,vec![4.,9.,16.,25.]).unwrap().map(f32::sqrt);
        assert_eq!(img.data(),&[2.,3.,4.,5.]);
        assert_eq!(img.get(1,0),Some(4.));
        assert_eq!(img.get(2,0),None);
        assert!(Image2D::new(2,2,vec![0.;3]).is_err());
    }

    #[test]
    fn mosaic_tiles_row_major() {
        let mut m = Mosaic::new();
        // 2x2 grid, 1x2 panels
        m.add_subplot(2,2,1,&filled(1,2,1.),"gray").unwrap();
        m.add_subplot(2,2,4,&filled(1,2,4.),"gray").unwrap();
        let img = m.to_image();
        assert_eq!((img.rows(),img.cols()),(2,4));
        assert_eq!(img.data(),&[1.,1.,0.,0., 0.,0.,4.,4.]);
        assert_eq!(m.cmap(),Some("gray"));
        assert_eq!(m.panels().count(),2);
    }

    #[test]
    fn mosaic_rejects_inconsistent_subplots() {
        let mut m = Mosaic::new();
        m.add_subplot(1,2,1,&filled(2,2,0.),"viridis").unwrap();
        assert!(m.add_subplot(1,2,2,&filled(3,2,0.),"viridis").is_err());
        assert!(m.add_subplot(2,2,2,&filled(2,2,0.),"viridis").is_err());
        assert!(m.add_subplot(1,2,3,&filled(2,2,0.),"viridis").is_err());
        assert!(m.add_subplot(1,2,0,&filled(2,2,0.),"viridis").is_err());
    }
}

/// Real valued image stored row-major as `[rows, cols]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image2D {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Image2D {

    pub fn new(rows:usize, cols:usize, data:Vec<f32>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(KSpaceError::Figure(format!("{} pixels cannot form a {}x{} image",data.len(),rows,cols)));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn zeros(rows:usize, cols:usize) -> Self {
        Self { rows, cols, data: vec![0.;rows*cols] }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    pub fn get(&self, row:usize, col:usize) -> Option<f32> {
        (row < self.rows && col < self.cols).then(|| self.data[row * self.cols + col])
    }

    pub fn map<F:Fn(f32) -> f32>(mut self, f:F) -> Self {
        self.data.iter_mut().for_each(|x| *x = f(*x));
        self
    }
}

/// Rendering surface receiving the images of a projection.
/// `index` is the 1-based, row-major position in a `rows` x `cols` grid.
pub trait Figure {
    fn add_subplot(&mut self, rows:usize, cols:usize, index:usize, image:&Image2D, cmap:&str) -> Result<()>;
}

/// Figure that tiles subplots into a single image. Empty grid cells stay zero.
#[derive(Clone, Debug, Default)]
pub struct Mosaic {
    grid: Option<(usize,usize)>,
    panel: Option<(usize,usize)>,
    panels: Vec<(usize,Image2D)>,
    cmap: Option<String>,
}

impl Mosaic {

    pub fn new() -> Self {
        Self::default()
    }

    /// (rows, cols) of the subplot grid
    pub fn grid(&self) -> Option<(usize,usize)> {
        self.grid
    }

    pub fn cmap(&self) -> Option<&str> {
        self.cmap.as_deref()
    }

    /// subplots in the order they were added, with their 1-based index
    pub fn panels(&self) -> impl Iterator<Item = (usize,&Image2D)> {
        self.panels.iter().map(|(i,img)| (*i,img))
    }

    pub fn to_image(&self) -> Image2D {
        let (Some((grid_rows,grid_cols)),Some((p_rows,p_cols))) = (self.grid,self.panel) else {
            return Image2D::zeros(0,0);
        };
        let mut out = Image2D::zeros(grid_rows * p_rows,grid_cols * p_cols);
        if p_cols == 0 {
            return out;
        }
        for (index,panel) in &self.panels {
            let cell = index - 1;
            let (r0,c0) = ((cell / grid_cols) * p_rows,(cell % grid_cols) * p_cols);
            for (r,row) in panel.data.chunks_exact(p_cols).enumerate() {
                let start = (r0 + r) * out.cols + c0;
                out.data[start..start + p_cols].copy_from_slice(row);
            }
        }
        out
    }
}

impl Figure for Mosaic {
    fn add_subplot(&mut self, rows:usize, cols:usize, index:usize, image:&Image2D, cmap:&str) -> Result<()> {
        if index == 0 || index > rows * cols {
            return Err(KSpaceError::Figure(format!("subplot {index} outside of a {rows}x{cols} grid")));
        }
        if *self.grid.get_or_insert((rows,cols)) != (rows,cols) {
            return Err(KSpaceError::Figure(format!("subplot grid changed to {rows}x{cols}")));
        }
        let shape = (image.rows,image.cols);
        if *self.panel.get_or_insert(shape) != shape {
            return Err(KSpaceError::Figure(format!("subplot image shape changed to {:?}",shape)));
        }
        self.cmap.get_or_insert_with(|| cmap.to_string());
        self.panels.push((index,image.clone()));
        Ok(())
    }
}
