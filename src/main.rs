use clap::Parser;

use std::path::PathBuf;

use abstractr::config::{Configuration, GenerationSettings};
use abstractr::error::{Error, RequestError};
use abstractr::generate::Generator;
use abstractr::render;
use abstractr::request::{AbstractSource, DocumentRequest};

#[derive(Parser, Debug)]
#[command(version, long_about = None)]
struct CliArguments {
    #[arg(short = 't', long = "title", value_name = "text")]
    title: Option<String>,
    #[arg(short = 'a', long = "author", value_name = "name")]
    authors: Vec<String>,
    #[arg(long = "abstract", value_name = "text")]
    abstract_text: Option<String>,
    #[arg(long = "abstract-file", value_name = "text_file")]
    abstract_file_path: Option<PathBuf>,
    #[arg(short = 'g', long = "generate")]
    generate: bool,
    #[arg(short = 'r', long = "request", value_name = "json_file")]
    request_path: Option<PathBuf>,
    #[arg(long = "api-key", value_name = "key")]
    api_key: Option<String>,
    #[arg(short = 'c', long = "configuration", value_name = "json_file")]
    configuration_path: Option<PathBuf>,
    #[arg(short = 'o', long = "output-directory", value_name = "directory", default_value = ".")]
    output_directory: PathBuf,
    #[arg(long = "save-abstract")]
    save_abstract: bool,
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

    run(arguments)?;
    Ok(())
}

/// Carries out one invocation and returns the paths written, in the order they were
/// written. A request with missing fields is reported as a warning and writes nothing.
fn run(arguments: CliArguments) -> Result<Vec<PathBuf>, Error> {
    let request = build_request(&arguments)?;
    // Missing fields are a warning, not a failure: nothing has been rendered yet
    if let Err(validation_error) = request.validate() {
        log::warn!("{}", validation_error);
        return Ok(Vec::new());
    }

    let abstract_text = match &request.abstract_source {
        AbstractSource::Manual { text } => text.clone(),
        AbstractSource::Generated => {
            let configuration = Configuration::load(arguments.configuration_path.as_deref())?;
            let settings = GenerationSettings::resolve(arguments.api_key.clone(), &configuration)?;
            let generator = Generator::new(settings)?;
            log::info!("Generating the abstract for the title {:?}", request.title);
            generator.generate(&request.title)?
        }
    };

    let mut written_paths = Vec::new();
    // The abstract is saved before rendering, so a failed render does not discard the
    // text a generation call already paid for
    if arguments.save_abstract {
        let abstract_path = arguments.output_directory.join(request.abstract_file_name());
        std::fs::write(&abstract_path, &abstract_text).map_err(|error| Error::OutputWrite {
            path: abstract_path.clone(),
            source: error,
        })?;
        log::info!("Saved the abstract to the path: {:?}", abstract_path);
        written_paths.push(abstract_path);
    }

    let pdf_bytes = render::render(&request.title, &abstract_text, &request.authors)?;
    let pdf_path = arguments.output_directory.join(request.pdf_file_name());
    std::fs::write(&pdf_path, &pdf_bytes).map_err(|error| Error::OutputWrite {
        path: pdf_path.clone(),
        source: error,
    })?;
    log::info!("Saved the document to the path: {:?}", pdf_path);
    written_paths.push(pdf_path);

    Ok(written_paths)
}

/// Builds the document request for this invocation: from the request file when one is
/// given, from the individual arguments otherwise.
fn build_request(arguments: &CliArguments) -> Result<DocumentRequest, Error> {
    if let Some(request_path) = &arguments.request_path {
        return Ok(DocumentRequest::from_path(request_path)?);
    }

    let abstract_source = if arguments.generate {
        AbstractSource::Generated
    } else if let Some(abstract_file_path) = &arguments.abstract_file_path {
        let text = std::fs::read_to_string(abstract_file_path).map_err(|error| {
            RequestError::Unreadable {
                path: abstract_file_path.clone(),
                source: error,
            }
        })?;
        AbstractSource::Manual { text }
    } else {
        AbstractSource::Manual {
            text: arguments.abstract_text.clone().unwrap_or_default(),
        }
    };

    Ok(DocumentRequest {
        title: arguments.title.clone().unwrap_or_default(),
        abstract_source,
        authors: arguments.authors.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_directory(name: &str) -> PathBuf {
        let directory = std::env::temp_dir().join(name);
        std::fs::remove_dir_all(&directory).ok();
        std::fs::create_dir_all(&directory).unwrap();
        directory
    }

    #[test]
    fn an_incomplete_request_warns_and_writes_nothing() {
        let directory = scratch_directory("abstractr_cli_incomplete");
        // No author is given, so validation must stop the invocation
        let arguments = CliArguments::parse_from([
            "abstractr",
            "--title",
            "Test Paper",
            "--abstract",
            "An abstract.",
            "--output-directory",
            directory.to_str().unwrap(),
        ]);

        let written_paths = run(arguments).unwrap();

        assert!(written_paths.is_empty());
        assert_eq!(std::fs::read_dir(&directory).unwrap().count(), 0);
        std::fs::remove_dir_all(&directory).ok();
    }

    #[test]
    fn a_complete_request_writes_the_artifacts_it_names() {
        let directory = scratch_directory("abstractr_cli_complete");
        let arguments = CliArguments::parse_from([
            "abstractr",
            "--title",
            "Test Paper",
            "--abstract",
            "An abstract.",
            "--author",
            "Alice",
            "--author",
            "Bob",
            "--save-abstract",
            "--output-directory",
            directory.to_str().unwrap(),
        ]);

        let written_paths = run(arguments).unwrap();

        assert_eq!(
            written_paths,
            vec![
                directory.join("test_paper_abstract.txt"),
                directory.join("test_paper.pdf"),
            ]
        );
        let pdf_bytes = std::fs::read(directory.join("test_paper.pdf")).unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF-"));
        assert_eq!(
            std::fs::read_to_string(directory.join("test_paper_abstract.txt")).unwrap(),
            "An abstract."
        );
        std::fs::remove_dir_all(&directory).ok();
    }
}
