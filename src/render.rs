use crate::error::RenderError;
use crate::fonts::{encode_latin1, CoreFace};
use crate::layout::{CellAlignment, PageLayouter, PAGE_WIDTH, RIGHT_MARGIN};
use crate::pdf::DocumentInformation;

/// Size of the title line, in points.
pub const TITLE_FONT_SIZE: f32 = 14.0;
/// Size of the heading, the abstract and the signature block, in points.
pub const BODY_FONT_SIZE: f32 = 12.0;
/// Height of every written line, in millimeters. With the built-in faces at body size this
/// comes out close to one-and-a-half line spacing.
pub const LINE_HEIGHT: f32 = 7.5;

/// Vertical gap after the title and after the heading, in millimeters.
const HEADING_GAP: f32 = 2.0;
/// Vertical gap between the abstract and the signature block, in millimeters.
const SIGNATURE_GAP: f32 = 10.0;

/// The heading written between the title and the abstract.
const ABSTRACT_HEADING: &str = "Abstract";
/// The opening line of the signature block.
const SIGNATURE_PREFIX: &str = "Prepared By,";

/// Renders the one-page (or more, when the abstract overflows) abstract document and returns
/// the bytes of the PDF file. The page is laid out from top to bottom: the uppercased title,
/// the "Abstract" heading, the justified abstract paragraph and a right-aligned signature
/// block naming the authors. The function fails when any of the inputs contains a character
/// which the built-in faces cannot represent.
pub fn render(title: &str, abstract_text: &str, authors: &[String]) -> Result<Vec<u8>, RenderError> {
    // Encode every input up front, so that an unsupported character surfaces before any
    // layout work happens
    let encoded_title = encode_latin1(&title.to_uppercase())?;
    let encoded_heading = encode_latin1(ABSTRACT_HEADING)?;
    let encoded_abstract = encode_latin1(&normalize_whitespace(abstract_text))?;
    let encoded_signature_lines = signature_lines(authors)
        .iter()
        .map(|line| encode_latin1(line))
        .collect::<Result<Vec<_>, _>>()?;

    let mut information = DocumentInformation {
        title: title.to_owned(),
        ..Default::default()
    };
    let authors_entry = trimmed_authors(authors).join(", ");
    if !authors_entry.is_empty() {
        information.author = authors_entry;
    }

    let mut layouter = PageLayouter::new(output_file_stem(title), information);

    // The title, uppercased and centered
    layouter.set_font(CoreFace::TimesBold, TITLE_FONT_SIZE);
    layouter.write_cell(0.0, LINE_HEIGHT, &encoded_title, CellAlignment::Center)?;
    layouter.advance_line(HEADING_GAP);

    // The heading, centered at body size
    layouter.set_font(CoreFace::TimesBold, BODY_FONT_SIZE);
    layouter.write_cell(0.0, LINE_HEIGHT, &encoded_heading, CellAlignment::Center)?;
    layouter.advance_line(HEADING_GAP);

    // The abstract, justified across the writable width
    layouter.set_font(CoreFace::TimesRoman, BODY_FONT_SIZE);
    layouter.write_justified_paragraph(LINE_HEIGHT, &encoded_abstract)?;
    layouter.advance_line(SIGNATURE_GAP);

    // The signature block: every line starts at the same horizontal position, chosen so
    // that the widest line ends at the right margin
    layouter.set_font(CoreFace::TimesRoman, BODY_FONT_SIZE);
    let block_width = encoded_signature_lines
        .iter()
        .map(|line| layouter.string_width(line))
        .fold(0.0, f32::max);
    let block_origin = right_block_origin(block_width);
    for encoded_line in &encoded_signature_lines {
        layouter.set_x(block_origin);
        layouter.write_cell(block_width, LINE_HEIGHT, encoded_line, CellAlignment::Left)?;
    }

    layouter.finish()
}

/// Collapses every run of whitespace, newlines included, into a single space and trims the
/// ends, so that the abstract flows as one paragraph no matter how it was typed or pasted.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The lines of the signature block: the opening "Prepared By," followed by every non-blank
/// author, trimmed and suffixed with a comma, in their given order.
pub fn signature_lines(authors: &[String]) -> Vec<String> {
    let mut lines = vec![SIGNATURE_PREFIX.to_owned()];
    for author in trimmed_authors(authors) {
        lines.push(format!("{author},"));
    }

    lines
}

/// The horizontal position, in millimeters from the left edge of the page, at which a block
/// of the given width must start for its right edge to touch the right margin.
pub fn right_block_origin(block_width: f32) -> f32 {
    PAGE_WIDTH - RIGHT_MARGIN - block_width
}

/// The file stem under which the document is saved: the title lowercased, with spaces
/// replaced by underscores.
pub fn output_file_stem(title: &str) -> String {
    title.to_lowercase().replace(' ', "_")
}

/// Every author with surrounding whitespace removed, skipping the blank entries.
fn trimmed_authors(authors: &[String]) -> Vec<&str> {
    authors
        .iter()
        .map(|author| author.trim())
        .filter(|author| !author.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_runs_collapse_into_single_spaces() {
        let normalized = normalize_whitespace("  A   multi-line\nabstract,\t\ttyped \r\n badly. ");
        assert_eq!(normalized, "A multi-line abstract, typed badly.");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_whitespace("spaced   out\ntext");
        assert_eq!(normalize_whitespace(&once), once);
    }

    #[test]
    fn blank_authors_are_skipped_and_the_others_trimmed() {
        let authors = vec![
            "  Alice Walker ".to_string(),
            String::new(),
            "   ".to_string(),
            "Bob".to_string(),
        ];
        let trimmed = trimmed_authors(&authors);
        assert_eq!(trimmed, vec!["Alice Walker", "Bob"]);
    }

    #[test]
    fn the_signature_block_opens_with_the_prefix_and_suffixes_each_author() {
        let authors = vec![" Alice ".to_string(), "Bob".to_string()];
        let lines = signature_lines(&authors);
        assert_eq!(lines, vec!["Prepared By,", "Alice,", "Bob,"]);
    }

    #[test]
    fn without_authors_the_signature_block_is_the_prefix_alone() {
        assert_eq!(signature_lines(&[]), vec!["Prepared By,"]);
    }

    #[test]
    fn the_block_origin_leaves_exactly_the_block_width_before_the_right_margin() {
        let origin = right_block_origin(30.0);
        assert!((origin - (210.0 - 25.4 - 30.0)).abs() < 1e-6);
    }

    #[test]
    fn the_file_stem_is_the_lowercased_title_with_underscores() {
        assert_eq!(output_file_stem("Test Paper"), "test_paper");
        assert_eq!(output_file_stem("A  Doubly  Spaced Title"), "a__doubly__spaced_title");
    }

    #[test]
    fn rendering_fails_on_a_character_outside_the_built_in_faces() {
        let authors = vec!["田中".to_string()];
        let error = render("Test Paper", "An abstract.", &authors).unwrap_err();
        match error {
            RenderError::UnsupportedCharacter { character } => assert_eq!(character, '田'),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rendering_produces_a_pdf_header() {
        let authors = vec!["Alice".to_string()];
        let bytes = render("Test Paper", "A short abstract.", &authors).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
