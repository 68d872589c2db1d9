use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use crate::error::{KSpaceError, Result};
use crate::figure::{Figure, Image2D};
use crate::volume::{KSpaceSample, KSpaceVolume};

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};
    use num_complex::Complex32;
    use crate::figure::{Figure, Image2D, Mosaic};
    use crate::volume::KSpaceVolume;
    use super::*;

    /// records every subplot call
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(usize,usize,usize,Image2D,String)>,
    }

    impl Figure for Recorder {
        fn add_subplot(&mut self, rows:usize, cols:usize, index:usize, image:&Image2D, cmap:&str) -> Result<()> {
            self.calls.push((rows,cols,index,image.clone(),cmap.to_string()));
            Ok(())
        }
    }

    fn volume(shape:[usize;5], f:impl Fn([usize;5]) -> Complex32) -> KSpaceVolume {
        let dims = crate::ArrayDim::row_major(&shape);
        let data = (0..dims.numel()).map(|addr| {
            let i = dims.calc_idx(addr);
            f([i[0],i[1],i[2],i[3],i[4]])
        }).collect();
        KSpaceVolume::from_vec(shape,data).unwrap()
    }

    #[test]
    fn quantity_parsing() {
        assert_eq!("angle".parse::<Quantity>().unwrap(),Quantity::Phase);
        assert_eq!("phase".parse::<Quantity>().unwrap(),Quantity::Phase);
        assert_eq!("magnitude".parse::<Quantity>().unwrap(),Quantity::Magnitude);
        assert_eq!("real".parse::<Quantity>().unwrap(),Quantity::Magnitude);
    }

    #[test]
    fn channel_parsing() {
        assert_eq!("-1".parse::<ChannelSelector>().unwrap(),ChannelSelector::All);
        assert_eq!("all".parse::<ChannelSelector>().unwrap(),ChannelSelector::All);
        assert_eq!("3".parse::<ChannelSelector>().unwrap(),ChannelSelector::Channel(3));
        assert!("-2".parse::<ChannelSelector>().is_err());
        assert_eq!(ChannelSelector::from(-1),ChannelSelector::All);
        assert_eq!(ChannelSelector::from(2),ChannelSelector::Channel(2));
    }

    #[test]
    fn grid_layout() {
        let g = GridLayout::new(3,2);
        assert_eq!(g.cols,2);
        assert_eq!(g.rows,4);
        assert_eq!(g.subplot_index(1,2),7);
        assert_eq!(g.subplot_index(0,0),1);
        let g = GridLayout::new(1,1);
        assert_eq!((g.rows,g.cols,g.subplot_index(0,0)),(1,1,1));
        let g = GridLayout::new(10,3);
        assert_eq!((g.rows,g.cols),(12,4));
        assert_eq!(g.subplot_index(2,9),2 * 16 + 10);
    }

    #[test]
    fn single_channel_magnitude_is_sqrt() {
        let values = [[4.,9.],[16.,25.]];
        let vol = volume([1,2,2,1,1],|[_,i,j,_,_]| Complex32::new(values[i][j],0.));
        let p = Projector::new(ProjectionOptions { channel: ChannelSelector::Channel(0), ..Default::default() });
        assert_eq!(p.image(&vol,0,0).unwrap().data(),&[2.,3.,4.,5.]);
    }

    #[test]
    fn combined_magnitude_sums_before_sqrt() {
        // |3+4i| = 5 and |-4| = 4 sum to 9
        let vol = volume([2,1,1,1,1],|[c,..]| if c == 0 {Complex32::new(3.,4.)} else {Complex32::new(-4.,0.)});
        let p = Projector::default();
        assert_eq!(p.image(&vol,0,0).unwrap().data(),&[3.]);
    }

    #[test]
    fn phase_projection() {
        let vol = volume([2,1,2,1,1],|[c,_,j,_,_]| match (c,j) {
            (0,0) => Complex32::new(0.,1.),
            (1,0) => Complex32::new(-1.,0.),
            (_,_) => Complex32::new(1.,0.),
        });
        let all = Projector::new(ProjectionOptions { quantity: Quantity::Phase, ..Default::default() });
        let img = all.image(&vol,0,0).unwrap();
        assert!((img.data()[0] - (FRAC_PI_2 + PI)).abs() < 1e-6);
        assert_eq!(img.data()[1],0.);
        let one = Projector::new(ProjectionOptions {
            quantity: Quantity::Phase,
            channel: ChannelSelector::Channel(1),
            ..Default::default()
        });
        assert!((one.image(&vol,0,0).unwrap().data()[0] - PI).abs() < 1e-6);
    }

    #[test]
    fn project_places_every_slice_and_time() {
        let (s,t) = (3,2);
        let vol = volume([1,2,3,s,t],|[_,_,_,z,tt]| Complex32::new((1 + z + 10 * tt) as f32,0.));
        let mut rec = Recorder::default();
        let p = Projector::new(ProjectionOptions { cmap: String::from("gray"), ..Default::default() });
        let layout = p.project(&vol,&mut rec).unwrap();
        assert_eq!(layout,GridLayout::new(s,t));
        assert_eq!(rec.calls.len(),s * t);
        let indices:Vec<_> = rec.calls.iter().map(|c| c.2).collect();
        assert_eq!(indices,vec![1,2,3,5,6,7]);
        for (rows,cols,_,img,cmap) in &rec.calls {
            assert_eq!((*rows,*cols),(4,2));
            assert_eq!((img.rows(),img.cols()),(2,3));
            assert_eq!(cmap,"gray");
        }
        // (t=1, s=2) holds sqrt(13)
        assert_eq!(rec.calls[5].3.data()[0],13f32.sqrt());
    }

    #[test]
    fn project_into_mosaic() {
        let vol = volume([2,2,2,2,1],|[c,..]| Complex32::new(c as f32 + 1.,0.));
        let mut m = Mosaic::new();
        Projector::default().project(&vol,&mut m).unwrap();
        let img = m.to_image();
        assert_eq!((img.rows(),img.cols()),(4,4));
        // two slices in the first row of the grid, second grid row empty
        assert!(img.data()[0..8].iter().all(|&x| x == 3f32.sqrt()));
        assert!(img.data()[8..].iter().all(|&x| x == 0.));
    }

    #[test]
    fn channel_out_of_range() {
        let vol = volume([2,1,1,1,1],|_| Complex32::new(1.,0.));
        let p = Projector::new(ProjectionOptions { channel: ChannelSelector::Channel(2), ..Default::default() });
        let mut rec = Recorder::default();
        assert!(matches!(p.project(&vol,&mut rec),Err(KSpaceError::ChannelOutOfRange{channel:2,n_channels:2})));
        assert!(rec.calls.is_empty());
    }
}

/// Quantity displayed for each pixel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    #[default]
    Magnitude,
    Phase,
}

/// "angle" and "phase" select the phase, everything else the magnitude
impl FromStr for Quantity {
    type Err = Infallible;
    fn from_str(s:&str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "angle" | "phase" => Quantity::Phase,
            _ => Quantity::Magnitude,
        })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f:&mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Magnitude => write!(f,"magnitude"),
            Quantity::Phase => write!(f,"phase"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelSelector {
    /// combine all channels
    #[default]
    All,
    Channel(usize),
}

/// negative values select all channels
impl From<i64> for ChannelSelector {
    fn from(value:i64) -> Self {
        usize::try_from(value).map_or(ChannelSelector::All, ChannelSelector::Channel)
    }
}

impl FromStr for ChannelSelector {
    type Err = String;
    fn from_str(s:&str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" | "-1" => Ok(ChannelSelector::All),
            _ => s.parse::<usize>()
                .map(ChannelSelector::Channel)
                .map_err(|_| format!("expected a channel index, \"all\" or -1, got \"{s}\"")),
        }
    }
}

impl fmt::Display for ChannelSelector {
    fn fmt(&self, f:&mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelSelector::All => write!(f,"all"),
            ChannelSelector::Channel(c) => write!(f,"{c}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionOptions {
    #[serde(default)]
    pub quantity: Quantity,
    #[serde(default)]
    pub channel: ChannelSelector,
    /// colormap name handed to the figure
    #[serde(default = "default_cmap")]
    pub cmap: String,
}

fn default_cmap() -> String {
    String::from("viridis")
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            quantity: Quantity::default(),
            channel: ChannelSelector::default(),
            cmap: default_cmap(),
        }
    }
}

/// Subplot grid for a slice/time projection.
/// Each time point gets a block of `cols * cols` cells, filled row-major with its slices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub n_slices: usize,
    pub n_times: usize,
}

impl GridLayout {

    pub fn new(n_slices:usize, n_times:usize) -> Self {
        let cols = ceil_sqrt(n_slices);
        Self {
            rows: cols * n_times,
            cols,
            n_slices,
            n_times,
        }
    }

    /// 1-based subplot position of slice `s` at time `t`
    pub fn subplot_index(&self, t:usize, s:usize) -> usize {
        t * (self.rows * self.cols / self.n_times) + s + 1
    }
}

fn ceil_sqrt(n:usize) -> usize {
    let mut r = (n as f64).sqrt() as usize;
    while r * r < n {
        r += 1;
    }
    while r > 0 && (r - 1) * (r - 1) >= n {
        r -= 1;
    }
    r
}

/// Reduces the channel axis of a `[channel, dim0, dim1, slice, time]` volume and lays the
/// resulting images out on a figure
#[derive(Clone, Debug, Default)]
pub struct Projector {
    options: ProjectionOptions,
}

impl Projector {

    pub fn new(options:ProjectionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ProjectionOptions {
        &self.options
    }

    pub fn layout<T:KSpaceSample>(&self, volume:&KSpaceVolume<T>) -> GridLayout {
        GridLayout::new(volume.n_slices(),volume.n_times())
    }

    /// Image of slice `s` at time `t`.
    ///
    /// Combining channels sums the per-channel phase, or takes the square root of the summed
    /// magnitudes. A single channel yields its phase or the square root of its magnitude.
    pub fn image<T:KSpaceSample>(&self, volume:&KSpaceVolume<T>, s:usize, t:usize) -> Result<Image2D> {
        let [n_channels,n0,n1,n_slices,n_times] = volume.shape();
        assert!(s < n_slices && t < n_times,"slice {s} time {t} out of bounds for volume of shape {:?}",volume.shape());

        let channels = match self.options.channel {
            ChannelSelector::All => 0..n_channels,
            ChannelSelector::Channel(c) if c < n_channels => c..c + 1,
            ChannelSelector::Channel(channel) => return Err(KSpaceError::ChannelOutOfRange { channel, n_channels }),
        };

        let dims = volume.dims();
        let c_stride = dims.stride(0);
        let base = dims.calc_addr(&[0,0,0,s,t]);
        let (s0,s1) = (dims.stride(1),dims.stride(2));
        let samples = volume.as_slice();
        let quantity = self.options.quantity;

        let mut pixels = vec![0f32;n0 * n1];
        pixels.par_iter_mut().enumerate().for_each(|(p,px)| {
            let addr = base + (p / n1) * s0 + (p % n1) * s1;
            let sum:f32 = channels.clone().map(|c| {
                let v = &samples[addr + c * c_stride];
                match quantity {
                    Quantity::Phase => v.phase(),
                    Quantity::Magnitude => v.magnitude(),
                }
            }).sum();
            *px = match quantity {
                Quantity::Phase => sum,
                Quantity::Magnitude => sum.sqrt(),
            };
        });

        Image2D::new(n0,n1,pixels)
    }

    /// Render one image per (slice, time) into `figure`, time-major
    pub fn project<T,F>(&self, volume:&KSpaceVolume<T>, figure:&mut F) -> Result<GridLayout>
    where
        T: KSpaceSample,
        F: Figure + ?Sized,
    {
        let layout = self.layout(volume);
        for t in 0..layout.n_times {
            for s in 0..layout.n_slices {
                let image = self.image(volume,s,t)?;
                figure.add_subplot(layout.rows,layout.cols,layout.subplot_index(t,s),&image,&self.options.cmap)?;
            }
        }
        Ok(layout)
    }
}
