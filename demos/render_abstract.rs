use clap::Parser;

use std::path::PathBuf;

use abstractr::error::Error;

#[derive(Parser, Debug)]
#[command(version, long_about = None)]
struct CliArguments {
    #[arg(short = 't', long = "title", value_name = "text")]
    title: String,
    #[arg(long = "abstract", value_name = "text")]
    abstract_text: String,
    #[arg(short = 'a', long = "author", value_name = "name")]
    authors: Vec<String>,
    #[arg(short = 'o', long = "output", value_name = "file_path")]
    output_file_path: PathBuf,
}

fn main() {
    if let Err(error) = fallible_main() {
        log::error!("{}", error);
        std::process::exit(1);
    }
}

fn fallible_main() -> Result<(), Error> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();
    let arguments = CliArguments::parse();
    log::debug!("{:?}", arguments);

    let pdf_bytes = abstractr::render::render(
        &arguments.title,
        &arguments.abstract_text,
        &arguments.authors,
    )?;
    std::fs::write(&arguments.output_file_path, &pdf_bytes).map_err(|error| {
        Error::OutputWrite {
            path: arguments.output_file_path.clone(),
            source: error,
        }
    })?;
    log::info!(
        "Saved the output file to the path: {:?}",
        arguments.output_file_path
    );

    Ok(())
}
