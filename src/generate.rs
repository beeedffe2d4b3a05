use serde::Deserialize;
use serde_json::json;

use std::time::Duration;

use crate::config::GenerationSettings;
use crate::error::GenerateError;

/// The prompt used when the configuration provides no template of its own. The `{title}`
/// placeholder is filled with the document title at call time.
///
/// The template spells out the customary structure of an academic abstract as numbered
/// rules, so changing the expected shape of the text requires editing exactly one place
/// (or overriding the template through the configuration file).
pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"Write an academic abstract for a paper titled "{title}".

Follow these rules precisely:

1. CONTEXT
   - Open with one or two sentences situating the research area of the title

2. PROBLEM
   - State the specific problem or gap the paper addresses

3. OBJECTIVE
   - State the aim of the work in one sentence

4. APPROACH
   - Summarize the method used to address the problem

5. RESULTS
   - Summarize the key findings with concrete, plausible specifics

6. CONCLUSION
   - State the main conclusion drawn from the results

7. IMPLICATIONS
   - Close with the broader significance or future directions of the work

Write a single paragraph of 150 to 250 words, with no headings, no bullet points and no
quotation marks around the text. Output only the abstract itself."#;

/// Fills the `{title}` placeholder of a prompt template.
pub fn build_prompt(prompt_template: &str, title: &str) -> String {
    prompt_template.replace("{title}", title)
}

/// A client of the text generation service, holding the resolved settings and the
/// underlying HTTP client. One blocking chat-completions call per generated abstract,
/// with no retry and no streaming.
pub struct Generator {
    client: reqwest::blocking::Client,
    settings: GenerationSettings,
}

impl Generator {
    /// Builds a generator over the given settings.
    pub fn new(settings: GenerationSettings) -> Result<Generator, GenerateError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|error| GenerateError::Network {
                detail: error.to_string(),
            })?;

        Ok(Generator { client, settings })
    }

    /// Asks the service for an abstract of the document with the given title and returns
    /// the trimmed text of the completion.
    pub fn generate(&self, title: &str) -> Result<String, GenerateError> {
        let prompt = build_prompt(&self.settings.prompt_template, title);
        let request_body = json!({
            "model": self.settings.model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(&request_body)
            .send()
            .map_err(|error| GenerateError::Network {
                detail: error.to_string(),
            })?;

        let status = response.status();
        let response_body = response.text().map_err(|error| GenerateError::Network {
            detail: error.to_string(),
        })?;
        if !status.is_success() {
            return Err(map_api_failure(status.as_u16(), response_body));
        }

        let completion: ChatCompletion =
            serde_json::from_str(&response_body).map_err(|error| {
                GenerateError::MalformedResponse {
                    detail: error.to_string(),
                }
            })?;
        let abstract_text = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default()
            .trim()
            .to_owned();
        if abstract_text.is_empty() {
            return Err(GenerateError::MalformedResponse {
                detail: "the completion carries no text".to_owned(),
            });
        }

        Ok(abstract_text)
    }
}

/// Maps a non-successful answer of the service to its error kind. The detail is the message
/// of the standard JSON error body when one can be parsed, the raw body otherwise.
fn map_api_failure(status: u16, response_body: String) -> GenerateError {
    let detail = serde_json::from_str::<ApiErrorBody>(&response_body)
        .map(|body| body.error.message)
        .unwrap_or(response_body);

    match status {
        401 | 403 => GenerateError::Authentication { detail },
        429 => GenerateError::QuotaExhausted { detail },
        _ => GenerateError::Api { status, detail },
    }
}

/// The part of a chat-completions answer this crate reads.
#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// The standard error body of the service: `{ "error": { "message": "..." } }`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_placeholder_is_replaced_with_the_title() {
        let prompt = build_prompt("Write about {title}.", "Test Paper");
        assert_eq!(prompt, "Write about Test Paper.");
    }

    #[test]
    fn the_default_template_names_the_title_exactly_once() {
        assert_eq!(DEFAULT_PROMPT_TEMPLATE.matches("{title}").count(), 1);
    }

    #[test]
    fn the_default_template_spells_out_the_seven_part_outline() {
        for rule in [
            "1. CONTEXT",
            "2. PROBLEM",
            "3. OBJECTIVE",
            "4. APPROACH",
            "5. RESULTS",
            "6. CONCLUSION",
            "7. IMPLICATIONS",
        ] {
            assert!(
                DEFAULT_PROMPT_TEMPLATE.contains(rule),
                "the template is missing the rule {rule:?}"
            );
        }
    }

    #[test]
    fn a_rejected_credential_maps_to_an_authentication_error() {
        let body = r#"{ "error": { "message": "Incorrect API key provided" } }"#.to_owned();
        match map_api_failure(401, body) {
            GenerateError::Authentication { detail } => {
                assert_eq!(detail, "Incorrect API key provided");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            map_api_failure(403, String::new()),
            GenerateError::Authentication { .. }
        ));
    }

    #[test]
    fn an_exhausted_quota_maps_to_its_own_error() {
        let body = r#"{ "error": { "message": "Rate limit reached" } }"#.to_owned();
        match map_api_failure(429, body) {
            GenerateError::QuotaExhausted { detail } => assert_eq!(detail, "Rate limit reached"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn any_other_failure_keeps_its_status_and_the_raw_body() {
        match map_api_failure(500, "server on fire".to_owned()) {
            GenerateError::Api { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail, "server on fire");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
