use clap::Parser;

use std::path::PathBuf;

use abstractr::error::Error;
use abstractr::request::{AbstractSource, DocumentRequest};

#[derive(Parser, Debug)]
#[command(version, long_about = None)]
struct CliArguments {
    #[arg(short = 'r', long = "request", value_name = "json_file")]
    request_path: PathBuf,
    #[arg(short = 'o', long = "output-directory", value_name = "directory", default_value = ".")]
    output_directory: PathBuf,
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

    let request = DocumentRequest::from_path(&arguments.request_path)?;
    if let Err(validation_error) = request.validate() {
        log::warn!("{}", validation_error);
        return Ok(());
    }

    let AbstractSource::Manual { text } = &request.abstract_source else {
        log::error!("This demo only renders manual abstracts, use the abstractr binary to generate one");
        std::process::exit(1);
    };

    let pdf_bytes = abstractr::render::render(&request.title, text, &request.authors)?;
    let pdf_path = arguments.output_directory.join(request.pdf_file_name());
    std::fs::write(&pdf_path, &pdf_bytes).map_err(|error| Error::OutputWrite {
        path: pdf_path.clone(),
        source: error,
    })?;
    log::info!("Saved the document to the path: {:?}", pdf_path);

    Ok(())
}
