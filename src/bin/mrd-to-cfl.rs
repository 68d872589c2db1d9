use std::path::PathBuf;
use clap::Parser;
use log::info;
use num_complex::Complex32;
use kspace_array::AssembleOptions;
use kspace_array::io_cfl::write_volume;
use kspace_array::io_json::load_dataset;

/// Assemble an acquisition stream into a [channel, readout, phase1, slice, time] k-space volume
#[derive(Parser)]
struct Args {
    /// acquisition header rendered as json
    header_file:PathBuf,
    /// acquisitions, one json object per line
    acquisition_file:PathBuf,
    /// output cfl base name
    cfl_file:PathBuf,
    /// fail on duplicate or missing encoding indices
    #[clap(short, long)]
    strict:bool,
}

fn main() -> Result<(), kspace_array::KSpaceError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let options = AssembleOptions { strict: args.strict };
    let (_,volume) = load_dataset::<Complex32>(&args.header_file,&args.acquisition_file,options)?;
    write_volume(&args.cfl_file,&volume)?;
    info!("wrote volume of shape {:?} to {:?}",volume.shape(),args.cfl_file);
    Ok(())
}
