use serde::{Deserialize, Serialize};

use std::path::Path;

use crate::error::RequestError;
use crate::render::output_file_stem;

/// The description of one document to produce: the title, where its abstract comes from and
/// the authors to name in the signature block. A request is built either from command line
/// arguments or from a JSON file via [`DocumentRequest::from_path`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    /// The title of the document, also the source of the output file names.
    pub title: String,
    /// Where the abstract paragraph comes from.
    pub abstract_source: AbstractSource,
    /// The authors of the document, in the order they are to appear.
    #[serde(default)]
    pub authors: Vec<String>,
}

/// The source of the abstract paragraph: typed by hand or produced by the text generation
/// service from the title.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AbstractSource {
    /// The abstract was provided as-is.
    #[serde(rename_all = "camelCase")]
    Manual { text: String },
    /// The abstract is to be generated from the title.
    Generated,
}

impl DocumentRequest {
    /// Loads a request from a JSON file.
    pub fn from_path(request_path: &Path) -> Result<DocumentRequest, RequestError> {
        let request_content =
            std::fs::read_to_string(request_path).map_err(|error| RequestError::Unreadable {
                path: request_path.to_path_buf(),
                source: error,
            })?;
        let request: DocumentRequest =
            serde_json::from_str(&request_content).map_err(|error| RequestError::Malformed {
                path: request_path.to_path_buf(),
                detail: error.to_string(),
            })?;

        Ok(request)
    }

    /// Checks that everything required for rendering is present: a non-blank title, a
    /// non-blank abstract when it is provided by hand, and at least one non-blank author.
    /// Every absent field is reported in a single error.
    pub fn validate(&self) -> Result<(), RequestError> {
        let mut missing_fields = Vec::new();
        if self.title.trim().is_empty() {
            missing_fields.push("title");
        }
        if let AbstractSource::Manual { text } = &self.abstract_source {
            if text.trim().is_empty() {
                missing_fields.push("abstract");
            }
        }
        if !self.authors.iter().any(|author| !author.trim().is_empty()) {
            missing_fields.push("at least one author");
        }

        if missing_fields.is_empty() {
            Ok(())
        } else {
            Err(RequestError::MissingFields {
                fields: missing_fields,
            })
        }
    }

    /// The file name of the PDF artifact, derived from the title.
    pub fn pdf_file_name(&self) -> String {
        format!("{}.pdf", output_file_stem(&self.title))
    }

    /// The file name of the plain-text artifact holding the abstract.
    pub fn abstract_file_name(&self) -> String {
        format!("{}_abstract.txt", output_file_stem(&self.title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_request(title: &str, text: &str, authors: &[&str]) -> DocumentRequest {
        DocumentRequest {
            title: title.to_owned(),
            abstract_source: AbstractSource::Manual {
                text: text.to_owned(),
            },
            authors: authors.iter().map(|author| author.to_string()).collect(),
        }
    }

    #[test]
    fn a_manual_request_parses_from_camel_case_json() {
        let request: DocumentRequest = serde_json::from_str(
            r#"{
                "title": "Test Paper",
                "abstractSource": { "type": "manual", "text": "An abstract." },
                "authors": ["Alice", "Bob"]
            }"#,
        )
        .unwrap();

        assert_eq!(request.title, "Test Paper");
        assert_eq!(request.authors, vec!["Alice", "Bob"]);
        match request.abstract_source {
            AbstractSource::Manual { ref text } => assert_eq!(text, "An abstract."),
            AbstractSource::Generated => panic!("the source should be manual"),
        }
    }

    #[test]
    fn a_generated_request_parses_without_an_authors_list() {
        let request: DocumentRequest = serde_json::from_str(
            r#"{
                "title": "Test Paper",
                "abstractSource": { "type": "generated" }
            }"#,
        )
        .unwrap();

        assert!(request.authors.is_empty());
        assert!(matches!(request.abstract_source, AbstractSource::Generated));
    }

    #[test]
    fn a_complete_request_validates() {
        let request = manual_request("Test Paper", "An abstract.", &["Alice"]);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn every_missing_field_is_reported_at_once() {
        let request = manual_request("  ", " ", &["", "   "]);
        let error = request.validate().unwrap_err();
        match &error {
            RequestError::MissingFields { fields } => {
                assert_eq!(*fields, vec!["title", "abstract", "at least one author"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            error.to_string(),
            "Please fill in all required fields: title, abstract, at least one author"
        );
    }

    #[test]
    fn a_generated_request_does_not_require_an_abstract() {
        let request = DocumentRequest {
            title: "Test Paper".to_owned(),
            abstract_source: AbstractSource::Generated,
            authors: vec!["Alice".to_owned()],
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn the_artifact_names_derive_from_the_title() {
        let request = manual_request("Test Paper", "An abstract.", &["Alice"]);
        assert_eq!(request.pdf_file_name(), "test_paper.pdf");
        assert_eq!(request.abstract_file_name(), "test_paper_abstract.txt");
    }

    #[test]
    fn loading_a_missing_file_reports_the_path() {
        let error =
            DocumentRequest::from_path(Path::new("does_not_exist/request.json")).unwrap_err();
        assert!(matches!(error, RequestError::Unreadable { .. }));
        assert!(error.to_string().contains("does_not_exist/request.json"));
    }

    #[test]
    fn loading_a_file_with_invalid_json_reports_the_parse_failure() {
        let path = std::env::temp_dir().join("abstractr_malformed_request.json");
        std::fs::write(&path, "{ not json").unwrap();

        let error = DocumentRequest::from_path(&path).unwrap_err();
        assert!(matches!(error, RequestError::Malformed { .. }));

        std::fs::remove_file(&path).ok();
    }
}
