//! abstractr is an interface for the generation of formatted abstract pages as PDF documents
//! from three plain inputs: a title, a list of authors and the abstract text itself.
//! The abstract can either be supplied verbatim or requested from a text generation service,
//! as captured by the `DocumentRequest` struct and its `AbstractSource` variants.
//!
//! In this crate, PDF documents are represented by the struct `PdfDocument`, which offers a high-level
//! interface for direct PDF manipulation. The nitty-gritty details for the manipulation of PDF documents
//! are hidden in the implementation of this struct, but in any case, if needed, they
//! are to a certain degree exposed to the end-user. The layout rules applied on top of it
//! are deliberately fixed (A4 pages, Times faces, justified body text, a right-aligned
//! author block) so that the same request always renders to the same bytes.

/// The module where the `DocumentRequest` interface is presented.
///
/// # Introduction
///
/// The entry point of this module is the `DocumentRequest` struct. The end user can construct one
/// either from code or from a well constructed JSON document which comprises the title of the work,
/// the list of its authors and the source of the abstract: the `AbstractSource::Manual` variant
/// carries the text verbatim, while `AbstractSource::Generated` defers it to the text generation
/// service exposed by the `generate` module.
///
/// A request is validated before any rendering is attempted via the `validate` method, which
/// reports every missing required field at once. Validation is a concern of the caller: the
/// renderer itself trusts its inputs and never re-validates them.
pub mod request;

/// This module contains the error kinds returned by every fallible operation of this library.
///
/// Each stage of the pipeline owns its enum (`RequestError`, `ConfigurationError`,
/// `GenerateError`, `RenderError`) so that callers can match on the failure they care about,
/// and the umbrella `Error` type collects them for callers which only want one. None of these
/// failures is fatal: a rejected request, a failed generation or an unencodable character all
/// leave the inputs untouched so that the user can correct them and try again.
pub mod error;

/// The module where the abstract text is obtained from a text generation service.
///
/// The `Generator` struct holds a blocking HTTP client pointed at an OpenAI-compatible
/// chat completions endpoint together with the resolved credential and prompt template.
/// A single call to `generate` sends one request and extracts the completion text; there is
/// no retry, backoff or streaming logic on purpose, since the caller is an interactive tool
/// which reports the failure and lets the user decide what to do next.
pub mod generate;

/// The module where the settings for the text generation service are resolved.
///
/// The optional JSON configuration file is read with the same serde machinery used for the
/// document requests. The credential is resolved with a fixed precedence: a value passed
/// explicitly by the caller wins over the configuration file, which wins over the
/// `OPENAI_API_KEY` environment variable.
pub mod config;

/// The module where the fixed typography is applied to the request contents.
///
/// # Introduction
///
/// The `render` function is the heart of this crate: it takes the title, the abstract text and
/// the author names and lays them out onto as many A4 pages as needed, upper-casing and
/// centering the title, justifying the abstract paragraph and right-aligning the author block
/// against the right margin. The result is the finished PDF as bytes, ready to be written to a
/// file. The helpers used by the algorithm (whitespace normalization, author filtering, the
/// right-aligned block origin) are exposed so that they can be reasoned about in isolation.
pub mod render;

/// The module where text is measured and flowed into lines and pages.
///
/// The `PageLayouter` struct keeps a cursor in millimeters from the top-left corner of the
/// current page and exposes the line-oriented operations the renderer is written in terms of:
/// cells of fixed height, justified paragraphs and line breaks, with an automatic page break
/// whenever a line would cross the bottom margin.
pub mod layout;

/// The module where the built-in font faces and their metrics live.
///
/// The two faces used by the layout, `Times-Roman` and `Times-Bold`, are part of the standard
/// set every PDF reader ships, so no font program is embedded in the output. Their character
/// widths are compiled in as 256-entry tables indexed by the Latin-1 byte, which is also the
/// encoding the text is written in: any character outside of it aborts the rendering.
pub mod fonts;

/// The module where the `PdfDocument` interface for working with PDF documents is presented.
///
/// # Introduction
///
/// The main component of this module is the struct `PdfDocument`. For it, I have implemented
/// different convenience functions such as `append_new_page`, `add_font`, `write_text_to_page`,
/// `write_all` and `save_to_bytes` which allow the end user to interact with a PDF document in a
/// meaningful way, while keeping all the complexity hidden below a curtain of private methods.
///
/// All the parameters which the PDF specification leaves free have been pinned down so that the
/// produced documents are byte-for-byte reproducible: the timestamps are fixed to the Unix epoch
/// and the document ID in the trailer is derived from the document identifier instead of being
/// randomly generated.
pub mod pdf;
