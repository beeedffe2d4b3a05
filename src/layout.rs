use crate::error::RenderError;
use crate::fonts::CoreFace;
use crate::pdf::{DocumentInformation, PdfDocument, MILLIMETERS_TO_POINTS};

/// Width of the A4 page in millimeters.
pub const PAGE_WIDTH: f32 = 210.0;
/// Height of the A4 page in millimeters.
pub const PAGE_HEIGHT: f32 = 297.0;
/// Distance between the left edge of the page and the text, one inch.
pub const LEFT_MARGIN: f32 = 25.4;
/// Distance between the right edge of the page and the text, one inch.
pub const RIGHT_MARGIN: f32 = 25.4;
/// Distance between the top edge of the page and the first line.
pub const TOP_MARGIN: f32 = 12.0;
/// A line whose bottom would cross this distance from the bottom edge triggers a page break.
pub const BOTTOM_MARGIN: f32 = 25.4;
/// Horizontal padding between the edge of a cell and the text inside it.
pub const CELL_PADDING: f32 = 1.0;

/// Everything is written in black.
const BLACK: [f32; 3] = [0.0, 0.0, 0.0];

/// How the text is placed inside the width of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellAlignment {
    /// Inset from the left edge of the cell by the cell padding.
    Left,
    /// Centered within the width of the cell.
    Center,
}

/// A line produced by the paragraph wrapping: its bytes and the extra width each of its
/// spaces receives so that the line ends flush with the right edge. The closing line of a
/// paragraph, and any line cut in the middle of an overlong word, carries no extra width.
#[derive(Debug, Clone, PartialEq)]
struct WrappedLine {
    bytes: Vec<u8>,
    word_spacing: f32,
}

/// A cursor in millimeters from the top-left corner of the current page, writing lines of
/// text into a `PdfDocument` below itself. All the operations advance the cursor the way a
/// typewriter would: a cell moves it down by the height of the line, and a cell which would
/// cross the bottom margin moves to the top of a fresh page first, keeping its horizontal
/// position.
pub struct PageLayouter {
    document: PdfDocument,
    roman_font_index: usize,
    bold_font_index: usize,
    font: CoreFace,
    font_size: f32,
    page_index: usize,
    x: f32,
    y: f32,
}

impl PageLayouter {
    /// Creates the layouter over a fresh single-page document with both built-in faces
    /// registered. The cursor starts at the top-left corner of the writable area.
    pub fn new(identifier: String, information: DocumentInformation) -> Self {
        let mut document = PdfDocument::new(identifier);
        document.information = information;
        let roman_font_index = document.add_font(CoreFace::TimesRoman);
        let bold_font_index = document.add_font(CoreFace::TimesBold);
        let page_index = document.append_new_page(PAGE_WIDTH, PAGE_HEIGHT);

        PageLayouter {
            document,
            roman_font_index,
            bold_font_index,
            font: CoreFace::TimesRoman,
            font_size: 12.0,
            page_index,
            x: LEFT_MARGIN,
            y: TOP_MARGIN,
        }
    }

    /// Selects the face and size, in points, used by the subsequent operations.
    pub fn set_font(&mut self, font: CoreFace, font_size: f32) {
        self.font = font;
        self.font_size = font_size;
    }

    /// Moves the cursor to the given horizontal position, in millimeters from the left edge
    /// of the page. Used by the author block, which starts every line at the same offset.
    pub fn set_x(&mut self, x: f32) {
        self.x = x;
    }

    /// Measures the given encoded text under the current face and size, in millimeters.
    pub fn string_width(&self, encoded_text: &[u8]) -> f32 {
        self.font.text_width(encoded_text, self.font_size)
    }

    /// Writes one line of text in a cell of the given width and height. A width of zero
    /// stretches the cell from the cursor to the right margin. The cursor then moves below
    /// the cell, back at the left margin.
    pub fn write_cell(
        &mut self,
        width: f32,
        height: f32,
        encoded_text: &[u8],
        alignment: CellAlignment,
    ) -> Result<(), RenderError> {
        self.emit_cell(width, height, encoded_text, alignment, 0.0, true)
    }

    /// Wraps the given encoded text into lines filling the space between the cursor and the
    /// right margin, and writes them as a justified paragraph: every line except the last
    /// distributes its leftover width across its spaces so that it ends flush with the right
    /// edge. The cursor ends below the paragraph, at the left margin.
    pub fn write_justified_paragraph(
        &mut self,
        line_height: f32,
        encoded_text: &[u8],
    ) -> Result<(), RenderError> {
        let available_width = PAGE_WIDTH - RIGHT_MARGIN - self.x;
        let wrapped_lines = wrap_paragraph(self.font, self.font_size, available_width, encoded_text);
        for line in &wrapped_lines {
            self.emit_cell(
                available_width,
                line_height,
                &line.bytes,
                CellAlignment::Left,
                line.word_spacing,
                false,
            )?;
        }
        self.x = LEFT_MARGIN;

        Ok(())
    }

    /// Moves the cursor down by the given height and back to the left margin.
    pub fn advance_line(&mut self, height: f32) {
        self.x = LEFT_MARGIN;
        self.y += height;
    }

    /// Finalizes the underlying document and returns its bytes.
    pub fn finish(mut self) -> Result<Vec<u8>, RenderError> {
        self.document.write_all()?;
        self.document.save_to_bytes()
    }

    /// Places one cell of text and advances the cursor. All the text emission funnels through
    /// here: the automatic page break, the baseline placement and the alignment inset live in
    /// one place.
    fn emit_cell(
        &mut self,
        width: f32,
        height: f32,
        encoded_text: &[u8],
        alignment: CellAlignment,
        word_spacing: f32,
        return_to_left_margin: bool,
    ) -> Result<(), RenderError> {
        // Break to a fresh page before a line which would cross the bottom margin. The
        // horizontal position survives the break, so an indented block continues at its
        // own left edge rather than at the page margin.
        if self.y + height > PAGE_HEIGHT - BOTTOM_MARGIN {
            self.page_index = self.document.append_new_page(PAGE_WIDTH, PAGE_HEIGHT);
            self.y = TOP_MARGIN;
        }

        let cell_width = if width == 0.0 {
            PAGE_WIDTH - RIGHT_MARGIN - self.x
        } else {
            width
        };

        if !encoded_text.is_empty() {
            let horizontal_inset = match alignment {
                CellAlignment::Left => CELL_PADDING,
                CellAlignment::Center => (cell_width - self.string_width(encoded_text)) / 2.0,
            };

            // The baseline sits below the vertical center of the cell by a fixed fraction
            // of the font size, which the layout reasons about in millimeters.
            let font_size_in_millimeters = self.font_size / MILLIMETERS_TO_POINTS;
            let baseline = self.y + 0.5 * height + 0.3 * font_size_in_millimeters;

            let font_index = match self.font {
                CoreFace::TimesRoman => self.roman_font_index,
                CoreFace::TimesBold => self.bold_font_index,
            };
            self.document.write_text_to_page(
                self.page_index,
                BLACK,
                encoded_text,
                font_index,
                self.font_size,
                // The PDF coordinate system grows upwards from the lower-left corner
                [self.x + horizontal_inset, PAGE_HEIGHT - baseline],
                word_spacing,
            )?;
        }

        self.y += height;
        if return_to_left_margin {
            self.x = LEFT_MARGIN;
        }

        Ok(())
    }
}

/// Greedily wraps the encoded text into lines no wider than the available width, breaking at
/// spaces, and computes for every broken line the extra width its spaces must receive for the
/// justification. A word wider than a whole line is cut in the middle. Widths are tracked in
/// thousandths of an em, the unit of the font tables, to defer the floating point scaling to
/// a single place.
fn wrap_paragraph(
    face: CoreFace,
    font_size: f32,
    available_width: f32,
    encoded_text: &[u8],
) -> Vec<WrappedLine> {
    let font_size_in_millimeters = font_size / MILLIMETERS_TO_POINTS;
    let maximum_line_units =
        (available_width - 2.0 * CELL_PADDING) * 1000.0 / font_size_in_millimeters;

    let mut wrapped_lines = Vec::new();
    let mut line_start = 0;
    let mut line_units = 0.0f32;
    let mut last_space: Option<usize> = None;
    let mut units_at_last_space = 0.0f32;
    let mut spaces_in_line = 0u32;

    let mut index = 0;
    while index < encoded_text.len() {
        let character = encoded_text[index];
        if character == b' ' {
            last_space = Some(index);
            units_at_last_space = line_units;
            spaces_in_line += 1;
        }
        line_units += f32::from(face.character_width(character));

        if line_units > maximum_line_units {
            match last_space {
                // No space to break at: the word itself is wider than the line, cut it.
                // A cut never produces an empty line, even when a single character exceeds
                // the available width.
                None => {
                    let cut = if index == line_start { index + 1 } else { index };
                    wrapped_lines.push(WrappedLine {
                        bytes: encoded_text[line_start..cut].to_vec(),
                        word_spacing: 0.0,
                    });
                    line_start = cut;
                    index = cut;
                }
                // Break at the last seen space, which is consumed by the break. The leftover
                // width is spread over the spaces remaining inside the line.
                Some(space_index) => {
                    let interior_spaces = spaces_in_line - 1;
                    let word_spacing = if interior_spaces > 0 {
                        (maximum_line_units - units_at_last_space) / 1000.0
                            * font_size_in_millimeters
                            / interior_spaces as f32
                    } else {
                        0.0
                    };
                    wrapped_lines.push(WrappedLine {
                        bytes: encoded_text[line_start..space_index].to_vec(),
                        word_spacing,
                    });
                    index = space_index + 1;
                    line_start = index;
                }
            }
            line_units = 0.0;
            last_space = None;
            units_at_last_space = 0.0;
            spaces_in_line = 0;
        } else {
            index += 1;
        }
    }

    // The closing line of the paragraph is never justified
    wrapped_lines.push(WrappedLine {
        bytes: encoded_text[line_start..].to_vec(),
        word_spacing: 0.0,
    });

    wrapped_lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::millimeters_to_points;

    // An available width whose writable span is exactly `units` thousandths of an em
    // under the given font size.
    fn width_for_units(units: f32, font_size: f32) -> f32 {
        2.0 * CELL_PADDING + units * (font_size / MILLIMETERS_TO_POINTS) / 1000.0
    }

    #[test]
    fn an_empty_paragraph_wraps_into_one_empty_line() {
        let wrapped = wrap_paragraph(CoreFace::TimesRoman, 12.0, 159.2, b"");
        assert_eq!(wrapped.len(), 1);
        assert!(wrapped[0].bytes.is_empty());
        assert_eq!(wrapped[0].word_spacing, 0.0);
    }

    #[test]
    fn a_short_paragraph_stays_on_one_unjustified_line() {
        let wrapped = wrap_paragraph(CoreFace::TimesRoman, 12.0, 159.2, b"short text");
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].bytes, b"short text");
        assert_eq!(wrapped[0].word_spacing, 0.0);
    }

    #[test]
    fn lines_break_at_spaces_and_are_justified() {
        // 'a' is 444 units wide and a space 250, so "aa aa" is 2026 units: with room
        // for 2500 the break lands on the second space
        let available_width = width_for_units(2500.0, 12.0);
        let wrapped = wrap_paragraph(CoreFace::TimesRoman, 12.0, available_width, b"aa aa aa");

        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[0].bytes, b"aa aa");
        assert_eq!(wrapped[1].bytes, b"aa");
        assert_eq!(wrapped[1].word_spacing, 0.0);

        let font_size_in_millimeters = 12.0 / MILLIMETERS_TO_POINTS;
        let expected_spacing = (2500.0 - 2026.0) / 1000.0 * font_size_in_millimeters;
        assert!((wrapped[0].word_spacing - expected_spacing).abs() < 1e-3);
    }

    #[test]
    fn an_overlong_word_is_cut_without_justification() {
        let available_width = width_for_units(2500.0, 12.0);
        let wrapped = wrap_paragraph(CoreFace::TimesRoman, 12.0, available_width, b"aaaaaaaa");

        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[0].bytes, b"aaaaa");
        assert_eq!(wrapped[1].bytes, b"aaa");
        assert!(wrapped.iter().all(|line| line.word_spacing == 0.0));
    }

    #[test]
    fn a_line_breaking_on_its_only_space_is_not_stretched() {
        // One long word, a space, another long word: the break consumes the only space,
        // leaving no interior space to stretch
        let available_width = width_for_units(3000.0, 12.0);
        let wrapped = wrap_paragraph(CoreFace::TimesRoman, 12.0, available_width, b"aaaaaa aaaaaa");

        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[0].bytes, b"aaaaaa");
        assert_eq!(wrapped[0].word_spacing, 0.0);
    }

    #[test]
    fn justified_lines_end_flush_with_the_writable_span() {
        let face = CoreFace::TimesRoman;
        let font_size = 12.0;
        let available_width = PAGE_WIDTH - LEFT_MARGIN - RIGHT_MARGIN;
        let text = b"the quick brown fox jumps over the lazy dog and keeps running until \
                     the very end of the meadow where the river bends and the light settles";
        let wrapped = wrap_paragraph(face, font_size, available_width, text);
        assert!(wrapped.len() > 1, "the text should span several lines");

        let writable_span = available_width - 2.0 * CELL_PADDING;
        for line in &wrapped[..wrapped.len() - 1] {
            let interior_spaces = line.bytes.iter().filter(|byte| **byte == b' ').count();
            let natural_width = face.text_width(&line.bytes, font_size);
            assert!(natural_width <= writable_span + 1e-3);
            if line.word_spacing > 0.0 {
                let justified_width =
                    natural_width + line.word_spacing * interior_spaces as f32;
                assert!(
                    (justified_width - writable_span).abs() < 1e-2,
                    "line {:?} fills {justified_width} of {writable_span}",
                    String::from_utf8_lossy(&line.bytes)
                );
            }
        }
    }

    #[test]
    fn cells_break_onto_a_new_page_past_the_bottom_margin() {
        let mut layouter = PageLayouter::new("page-break".into(), Default::default());
        layouter.set_font(CoreFace::TimesRoman, 12.0);
        for _ in 0..40 {
            layouter
                .write_cell(0.0, 7.5, b"line", CellAlignment::Left)
                .unwrap();
        }

        assert_eq!(layouter.document.pages.len(), 2);
        assert!(layouter.y <= PAGE_HEIGHT - BOTTOM_MARGIN);
    }

    #[test]
    fn the_horizontal_position_survives_an_automatic_page_break() {
        let mut layouter = PageLayouter::new("indented-break".into(), Default::default());
        layouter.set_font(CoreFace::TimesRoman, 12.0);
        // Fill the first page up to the break trigger
        while layouter.y + 7.5 <= PAGE_HEIGHT - BOTTOM_MARGIN {
            layouter
                .write_cell(0.0, 7.5, b"filler", CellAlignment::Left)
                .unwrap();
        }

        layouter.set_x(100.0);
        layouter
            .write_cell(40.0, 7.5, b"indented", CellAlignment::Left)
            .unwrap();

        assert_eq!(layouter.document.pages.len(), 2);
        let second_page_operations = &layouter.document.pages[1].operations;
        let position = second_page_operations
            .iter()
            .find(|operation| operation.operator == "Td")
            .expect("the indented cell should have written text");
        let x_operand = position.operands[0].as_float().unwrap();
        assert!((x_operand - millimeters_to_points(100.0 + CELL_PADDING)).abs() < 1e-2);
    }

    #[test]
    fn an_empty_cell_advances_the_cursor_without_writing() {
        let mut layouter = PageLayouter::new("empty-cell".into(), Default::default());
        layouter.set_font(CoreFace::TimesRoman, 12.0);
        layouter
            .write_cell(0.0, 7.5, b"", CellAlignment::Left)
            .unwrap();

        assert!(layouter.document.pages[0].operations.is_empty());
        assert_eq!(layouter.y, TOP_MARGIN + 7.5);
    }

    #[test]
    fn a_centered_cell_offsets_the_text_by_half_the_leftover_width() {
        let mut layouter = PageLayouter::new("centered".into(), Default::default());
        layouter.set_font(CoreFace::TimesBold, 14.0);
        let text = b"TITLE";
        let text_width = layouter.string_width(text);
        layouter
            .write_cell(0.0, 7.5, text, CellAlignment::Center)
            .unwrap();

        let operations = &layouter.document.pages[0].operations;
        let position = operations
            .iter()
            .find(|operation| operation.operator == "Td")
            .expect("the centered cell should have written text");
        let x_operand = position.operands[0].as_float().unwrap();
        let cell_width = PAGE_WIDTH - LEFT_MARGIN - RIGHT_MARGIN;
        let expected = millimeters_to_points(LEFT_MARGIN + (cell_width - text_width) / 2.0);
        assert!((x_operand - expected).abs() < 1e-2);
    }
}
