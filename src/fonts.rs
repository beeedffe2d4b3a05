use unicode_normalization::UnicodeNormalization as _;

use crate::error::RenderError;
use crate::pdf::MILLIMETERS_TO_POINTS;

/// The two built-in font faces used by the layout. Both belong to the standard set of
/// fourteen fonts which every conforming PDF reader provides by itself, so the produced
/// documents reference them by name instead of embedding a font program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoreFace {
    TimesRoman,
    TimesBold,
}

impl CoreFace {
    /// The `BaseFont` name under which the face is known to PDF readers.
    pub fn base_font(&self) -> &'static str {
        match self {
            CoreFace::TimesRoman => "Times-Roman",
            CoreFace::TimesBold => "Times-Bold",
        }
    }

    /// The width table of the face, in thousandths of an em, indexed by the Latin-1 byte.
    fn character_widths(&self) -> &'static [u16; 256] {
        match self {
            CoreFace::TimesRoman => &TIMES_ROMAN_WIDTHS,
            CoreFace::TimesBold => &TIMES_BOLD_WIDTHS,
        }
    }

    /// The advance width of a single encoded character, in thousandths of an em.
    pub fn character_width(&self, character: u8) -> u16 {
        self.character_widths()[character as usize]
    }

    /// Measures the width of an already encoded string at the given font size in points.
    /// The result is expressed in millimeters, the unit the layout reasons in.
    pub fn text_width(&self, encoded_text: &[u8], font_size: f32) -> f32 {
        let widths = self.character_widths();
        let total_units: u32 = encoded_text
            .iter()
            .map(|character| u32::from(widths[*character as usize]))
            .sum();

        total_units as f32 * font_size / (1000.0 * MILLIMETERS_TO_POINTS)
    }
}

/// Encodes the text with one byte per character in Latin-1, the encoding shared by the
/// width tables and by the `WinAnsiEncoding` the faces are registered with in the document.
/// The text is first normalized in the NFC form, so that a decomposed accent collapses into
/// its encodable precomposed equivalent before being rejected.
///
/// Control characters and any code point beyond `U+00FF` have no representation in the
/// built-in faces; encountering one aborts the encoding.
pub fn encode_latin1(text: &str) -> Result<Vec<u8>, RenderError> {
    let mut encoded_text = Vec::with_capacity(text.len());
    for character in text.nfc() {
        match u32::from(character) {
            code_point @ (0x20..=0x7E | 0xA0..=0xFF) => encoded_text.push(code_point as u8),
            _ => return Err(RenderError::UnsupportedCharacter { character }),
        }
    }

    Ok(encoded_text)
}

// Advance widths from the Adobe font metrics of the standard faces, restricted to the
// Latin-1 range. Positions which Latin-1 leaves to control characters hold a zero and are
// rejected by `encode_latin1` before any lookup.
#[rustfmt::skip]
const TIMES_ROMAN_WIDTHS: [u16; 256] = [
    // 0x00..=0x1F
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    // 0x20 space..0x2F slash
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    // 0x30 zero..0x3F question
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    // 0x40 at..0x4F O
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    // 0x50 P..0x5F underscore
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    // 0x60 grave..0x6F o
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    // 0x70 p..0x7E tilde
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541, 0,
    // 0x80..=0x9F
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    // 0xA0 nbspace..0xAF macron
    250, 333, 500, 500, 500, 500, 200, 500, 333, 760, 276, 500, 564, 333, 760, 333,
    // 0xB0 degree..0xBF questiondown
    400, 564, 300, 300, 333, 500, 453, 250, 333, 300, 310, 500, 750, 750, 750, 444,
    // 0xC0 Agrave..0xCF Idieresis
    722, 722, 722, 722, 722, 722, 889, 667, 611, 611, 611, 611, 333, 333, 333, 333,
    // 0xD0 Eth..0xDF germandbls
    722, 722, 722, 722, 722, 722, 722, 564, 722, 722, 722, 722, 722, 722, 556, 500,
    // 0xE0 agrave..0xEF idieresis
    444, 444, 444, 444, 444, 444, 667, 444, 444, 444, 444, 444, 278, 278, 278, 278,
    // 0xF0 eth..0xFF ydieresis
    500, 500, 500, 500, 500, 500, 500, 564, 500, 500, 500, 500, 500, 500, 500, 500,
];

#[rustfmt::skip]
const TIMES_BOLD_WIDTHS: [u16; 256] = [
    // 0x00..=0x1F
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    // 0x20 space..0x2F slash
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    // 0x30 zero..0x3F question
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    // 0x40 at..0x4F O
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    // 0x50 P..0x5F underscore
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    // 0x60 grave..0x6F o
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    // 0x70 p..0x7E tilde
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520, 0,
    // 0x80..=0x9F
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    // 0xA0 nbspace..0xAF macron
    250, 333, 500, 500, 500, 500, 220, 500, 333, 747, 300, 500, 570, 333, 747, 333,
    // 0xB0 degree..0xBF questiondown
    400, 570, 300, 300, 333, 556, 540, 250, 333, 300, 330, 500, 750, 750, 750, 500,
    // 0xC0 Agrave..0xCF Idieresis
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 389, 389, 389, 389,
    // 0xD0 Eth..0xDF germandbls
    722, 722, 778, 778, 778, 778, 778, 570, 778, 722, 722, 722, 722, 722, 611, 556,
    // 0xE0 agrave..0xEF idieresis
    500, 500, 500, 500, 500, 500, 722, 444, 444, 444, 444, 444, 278, 278, 278, 278,
    // 0xF0 eth..0xFF ydieresis
    500, 556, 500, 500, 500, 500, 500, 570, 500, 556, 556, 556, 556, 500, 556, 500,
];
