extern crate ghl;

use clap::Parser;
use ghl::output::FileOutput;
use ghl::read_weather_file::weather_data_to_vec;
use ghl::{run_project, ProjectFlags};
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct GhlArgs {
    input_file: String,
    #[arg(long, short, help = "Path to hourly weather data in .csv format")]
    weather_file: String,
    #[arg(long, default_value_t = false)]
    summary_only: bool,
    #[arg(long, default_value_t = false, help = "Also write monthly mean daily profiles")]
    profiles: bool,
    #[arg(long, default_value_t = false)]
    log_spans: bool,
}

impl From<&GhlArgs> for ProjectFlags {
    fn from(args: &GhlArgs) -> Self {
        let mut flags = ProjectFlags::SUMMARY_OUTPUT;
        if !args.summary_only {
            flags.insert(ProjectFlags::HOURLY_OUTPUT);
        }
        if args.profiles {
            flags.insert(ProjectFlags::PROFILE_OUTPUT);
        }
        flags
    }
}

fn main() -> anyhow::Result<()> {
    let args = GhlArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(tracing::Level::DEBUG);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)?;

    let input_file = args.input_file.as_str();
    let input_file_ext = Path::new(input_file).extension().and_then(OsStr::to_str);
    let input_file_stem = match input_file_ext {
        Some(ext) => &input_file[..(input_file.len() - ext.len() - 1)],
        None => input_file,
    };
    let input_file_stem = PathBuf::from(input_file_stem);

    let output_path = PathBuf::from(format!("{}__results", input_file_stem.display()));
    fs::create_dir_all(&output_path)?;
    let input_file_name = input_file_stem
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("greenhouse");
    let file_output = FileOutput::new(
        output_path.clone(),
        format!("{input_file_name}__{{}}.{{}}"),
    );

    let weather = weather_data_to_vec(BufReader::new(File::open(&args.weather_file)?))?;
    info!("Read {} hours of weather data", weather.len());

    let project_flags = (&args).into();

    let results = run_project(
        BufReader::new(File::open(Path::new(input_file))?),
        &file_output,
        weather,
        &project_flags,
    )?;

    info!(
        heating_demand_kwh = results.summary.heating_demand,
        cooling_demand_kwh = results.summary.cooling_demand,
        "Results written to {}",
        output_path.display()
    );

    Ok(())
}
