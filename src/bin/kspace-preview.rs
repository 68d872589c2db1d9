use std::path::PathBuf;
use clap::Parser;
use log::info;
use kspace_array::{ChannelSelector, Mosaic, ProjectionOptions, Projector, Quantity};
use kspace_array::io_cfl::read_volume;
use kspace_array::io_nifti::write_nifti_image;

/// Project a [channel, dim0, dim1, slice, time] volume into a slice/time mosaic
#[derive(Parser)]
struct Args {
    /// cfl base name of a volume written by mrd-to-cfl
    cfl_file:PathBuf,
    /// output nifti file
    nifti_file:PathBuf,
    /// "phase" or "angle" for phase images, anything else for magnitude
    #[clap(short, long, default_value = "magnitude")]
    quantity:Quantity,
    /// channel index, or "all" / -1 to combine channels
    #[clap(short, long, default_value = "all", allow_hyphen_values = true)]
    coil:ChannelSelector,
    /// colormap name recorded with the figure
    #[clap(long, default_value = "viridis")]
    cmap:String,
}

fn main() -> Result<(), kspace_array::KSpaceError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let volume = read_volume(&args.cfl_file)?;
    let projector = Projector::new(ProjectionOptions {
        quantity: args.quantity,
        channel: args.coil,
        cmap: args.cmap,
    });
    let mut mosaic = Mosaic::new();
    let layout = projector.project(&volume,&mut mosaic)?;
    info!("{} x {} grid of {} slices and {} time points",layout.rows,layout.cols,layout.n_slices,layout.n_times);
    write_nifti_image(&args.nifti_file,&mosaic.to_image())?;
    Ok(())
}
