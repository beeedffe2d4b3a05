use lopdf::StringFormat;
use std::{collections::BTreeMap, io::BufWriter, mem};
use time::OffsetDateTime;

use crate::error::RenderError;
use crate::fonts::CoreFace;

/// The scale factor between the two units this library deals with: millimeters on the
/// layout side and points on the PDF side (72 points per inch, 25.4 millimeters per inch).
pub const MILLIMETERS_TO_POINTS: f32 = 2.834646;

/// Converts millimeters to points. This function is used in order to present the data
/// in the format required by the PDF specification, while the end user might want to work in
/// millimeters which are easier to reason about.
pub fn millimeters_to_points(millimeters: f32) -> f32 {
    millimeters * MILLIMETERS_TO_POINTS
}

/// The representation of a PDF page: its dimensions and the content stream operations
/// accumulated so far. Utility functions on `PdfDocument` fill it in and finally convert
/// it into the objects the underlying PDF document expects.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// The index of the page in the document.
    pub(crate) number: usize,
    /// Page width in points.
    pub width: f32,
    /// Page height in points.
    pub height: f32,
    /// The content stream operations of the page, in emission order.
    pub(crate) operations: Vec<lopdf::content::Operation>,
}

/// The information dictionary entries which depend on the rendered content. The remaining
/// entries (timestamps, producer, trapping) are fixed by `write_all` so that the same
/// content always produces the same bytes.
#[derive(Debug, Clone)]
pub struct DocumentInformation {
    /// The value of the `Title` entry of the information dictionary.
    pub title: String,
    /// The value of the `Author` entry of the information dictionary.
    pub author: String,
}

impl Default for DocumentInformation {
    fn default() -> Self {
        DocumentInformation {
            title: "Unknown".into(),
            author: "Unknown".into(),
        }
    }
}

/// This struct represents the actual PDF document on a high-level. It is an interface to the actual
/// underlying `lopdf::Document` with the addition of the PDF pages, the document ID and the fonts
/// used in the document.
///
/// Various convenience functions are exposed for this struct, such as `append_new_page`, `add_font`,
/// `write_text_to_page`, `write_all` and `save_to_bytes`, which make the creation of a PDF document
/// very much simplified.
pub struct PdfDocument {
    /// The association between the font IDs, the object they are represented by and their face.
    fonts: BTreeMap<String, (lopdf::ObjectId, CoreFace)>,
    /// The underlying PDF document: this is a low-level interface and shouldn't be directly
    /// interacted with unless strictly necessary, anyway this is why it is exposed to the user.
    pub inner_document: lopdf::Document,
    /// The identifier of the document, it is used in order to set the PDF `ID` tag.
    pub identifier: String,
    /// The entries of the information dictionary which the caller controls.
    pub information: DocumentInformation,
    /// The pages of the PDF document.
    pub(crate) pages: Vec<PdfPage>,
}

impl PdfDocument {
    /// Create a new `PdfDocument` by defaulting the underlying PDF document to version 1.5
    /// of the PDF specification and customly specifying the PDF identifier.
    ///
    /// # Arguments
    ///
    /// * `pdf_document_identifier` - The identifier to be given to the PDF document.
    pub fn new(pdf_document_identifier: String) -> Self {
        PdfDocument {
            fonts: BTreeMap::default(),
            inner_document: lopdf::Document::with_version("1.5"),
            identifier: pdf_document_identifier,
            information: DocumentInformation::default(),
            pages: Vec::new(),
        }
    }

    /// Adds a page of given width and height in millimeters for contents to be added to.
    /// The function returns the index of the page, which is to be passed to the other
    /// functions when calling them, such as to `write_text_to_page`. The reason why we work
    /// with indices is because it notably simplifies the handling of the pages.
    ///
    /// # Arguments
    ///
    /// * `page_width` - The width of the PDF page to be created as expressed in millimeters.
    /// * `page_height` - The height of the PDF page to be created as expressed in millimeters.
    pub fn append_new_page(&mut self, page_width: f32, page_height: f32) -> usize {
        // Creates a new PDF page correctly numbered
        let pdf_page = PdfPage {
            number: self.pages.len() + 1,
            width: millimeters_to_points(page_width), // Convert millimeters to points because this is what `lopdf` expects
            height: millimeters_to_points(page_height),
            operations: Vec::new(),
        };
        self.pages.push(pdf_page);

        // Return the page index
        self.pages.len() - 1
    }

    /// Add one of the built-in faces to the document. The function returns the index of the
    /// font which is then to be used in order to write text via the `write_text_to_page`
    /// function. Nothing is read from disk: the face is one of the standard fourteen fonts
    /// and only its name is registered in the document.
    ///
    /// # Arguments
    ///
    /// * `face` - The built-in face to be registered into the PDF document.
    pub fn add_font(&mut self, face: CoreFace) -> usize {
        let face_identifier = format!("F{}", self.fonts.len());
        // Reserve the object ID now, the dictionary itself is inserted by `write_all`
        let font_object_id = self.inner_document.new_object_id();
        self.fonts.insert(face_identifier, (font_object_id, face));

        // Return the font index
        self.fonts.len() - 1
    }

    /// Retrieve the face registered at the given font index, to let callers measure text
    /// with the same metrics the document will be written with.
    pub fn font_face(&self, font_index: usize) -> Result<CoreFace, RenderError> {
        self.get_font(font_index).map(|font| font.1)
    }

    /// Writes the text in the specified font, color and word spacing at the caret position to
    /// the given page of the PDF document. If the operation is successful, then return nothing.
    ///
    /// # Arguments
    ///
    /// * `page_index` - The index of the page to write the text to (should be previously obtained).
    /// * `color` - The RGB color employed for filling of the text.
    /// * `encoded_text` - The text to be written, already encoded with one byte per character.
    /// * `font_index` - The index of the font to be used when writing the text (should be previously obtained).
    /// * `font_size` - The size of the font in points.
    /// * `caret_position` - The position in millimeters, from the lower-left corner of the page,
    ///   where the baseline of the text begins.
    /// * `word_spacing` - The extra width in millimeters added to every space of the text, employed
    ///   for the justification of paragraphs. Zero leaves the spaces at their natural width.
    ///
    /// This function might appear to have too many arguments, but this is on purpose in order to
    /// keep the API of this library quite on the simpler side. Any external algorithm for layouting
    /// text should take into consideration the way in which text is inserted into the PDF.
    #[allow(clippy::too_many_arguments)]
    pub fn write_text_to_page(
        &mut self,
        page_index: usize,
        color: [f32; 3],
        encoded_text: &[u8],
        font_index: usize,
        font_size: f32,
        caret_position: [f32; 2],
        word_spacing: f32,
    ) -> Result<(), RenderError> {
        let face_identifier = format!("F{font_index}");
        self.get_font(font_index)?;

        // Insert the required operations for writing the text to the page. The word spacing is
        // always emitted, even when it is zero, so that no line inherits the one of the previous
        // line: the `Tw` operator is part of the text state, which persists across text sections.
        self.add_operations_to_page(
            page_index,
            vec![
                lopdf::content::Operation::new("BT", vec![]), // Begin text section
                lopdf::content::Operation::new(
                    "Tf",
                    vec![face_identifier.into(), (font_size).into()],
                ), // Set the font and the font size
                lopdf::content::Operation::new("Td", {
                    let [x, y] = caret_position;
                    vec![
                        millimeters_to_points(x).into(),
                        millimeters_to_points(y).into(),
                    ]
                }), // Set the position where the text begins to be written
                lopdf::content::Operation::new("rg", {
                    let [r, g, b] = color;
                    vec![r, g, b].into_iter().map(lopdf::Object::Real).collect()
                }), // Set the filling color of the text
                lopdf::content::Operation::new(
                    "Tw",
                    vec![millimeters_to_points(word_spacing).into()],
                ), // Set the extra width given to every space
                lopdf::content::Operation::new(
                    "Tj",
                    vec![lopdf::Object::String(
                        encoded_text.to_vec(),
                        StringFormat::Literal,
                    )],
                ), // Insert the actual text content as literal bytes
                lopdf::content::Operation::new("ET", vec![]), // End text section
            ],
        )?;

        // Return that no error has happened
        Ok(())
    }

    /// Write the operations so far specified to the PDF file and finalize it.
    ///
    /// # Disclaimer
    ///
    /// Every parameter which the PDF specification leaves free has been pinned down here: the
    /// creation and modification dates are fixed to the Unix epoch and both halves of the `ID`
    /// tag in the trailer are derived from the document identifier. This is what makes the
    /// produced documents byte-for-byte reproducible, which the test suite relies upon.
    pub fn write_all(&mut self) -> Result<(), RenderError> {
        use lopdf::Object::*;
        use lopdf::StringFormat::*;

        // Construct all the general info that the PDF document needs in order to be parsed
        // correctly and insert it into the PDF document itself
        let document_info = lopdf::Dictionary::from_iter(vec![
            ("Trapped", "False".into()),
            (
                "CreationDate",
                String(
                    to_pdf_timestamp_format(&OffsetDateTime::UNIX_EPOCH).into_bytes(),
                    Literal,
                ),
            ),
            (
                "ModDate",
                String(
                    to_pdf_timestamp_format(&OffsetDateTime::UNIX_EPOCH).into_bytes(),
                    Literal,
                ),
            ),
            (
                "Title",
                String(self.information.title.clone().into_bytes(), Literal),
            ),
            (
                "Author",
                String(self.information.author.clone().into_bytes(), Literal),
            ),
            (
                "Creator",
                String("abstractr".to_string().into_bytes(), Literal),
            ),
            (
                "Producer",
                String("abstractr".to_string().into_bytes(), Literal),
            ),
            (
                "Identifier",
                String(self.identifier.clone().into_bytes(), Literal),
            ),
            ("Keywords", String("".to_string().into_bytes(), Literal)),
        ]);
        let document_info_id = self.inner_document.add_object(Dictionary(document_info));

        // Construct the catalog, required by the PDF specification
        let pages_id = self.inner_document.new_object_id();
        let catalog = lopdf::Dictionary::from_iter(vec![
            ("Type", "Catalog".into()),
            ("PageLayout", "OneColumn".into()),
            ("PageMode", "UseNone".into()),
            ("Pages", Reference(pages_id)),
        ]);

        // Begin constructing the pages dictionary
        let mut pages = lopdf::Dictionary::from_iter(vec![
            ("Type", "Pages".into()),
            ("Count", Integer(self.pages.len() as i64)),
        ]);

        // Save the catalog after inserting it into the PDF document
        let catalog_id = self.inner_document.add_object(catalog);

        self.inner_document
            .trailer
            .set("Root", Reference(catalog_id));
        self.inner_document
            .trailer
            .set("Info", Reference(document_info_id));
        self.inner_document.trailer.set(
            "ID",
            Array(vec![
                String(self.identifier.clone().into_bytes(), Literal),
                String(self.identifier.clone().into_bytes(), Literal),
            ]),
        );

        // Load the set fonts and insert them into the PDF document
        let fonts_dictionary = self.insert_fonts_into_document();
        let fonts_dictionary_id = self.inner_document.add_object(fonts_dictionary);

        let mut page_ids = Vec::<lopdf::Object>::new();

        // For each page present in the document...
        for page in self.pages.iter_mut() {
            // Construct the dictionary which specifies all the page information
            let mut page_dictionary = lopdf::Dictionary::from_iter(vec![
                ("Type", "Page".into()),
                ("Rotate", Integer(0)),
                (
                    "MediaBox",
                    vec![0.into(), 0.into(), page.width.into(), page.height.into()].into(),
                ),
                (
                    "TrimBox",
                    vec![0.into(), 0.into(), page.width.into(), page.height.into()].into(),
                ),
                (
                    "CropBox",
                    vec![0.into(), 0.into(), page.width.into(), page.height.into()].into(),
                ),
                ("Annots", vec![].into()),
                ("Parent", Reference(pages_id)),
            ]);

            // All the pages share the same font resources
            let resource_dictionary = lopdf::Dictionary::from_iter(vec![(
                "Font",
                Reference(fonts_dictionary_id),
            )]);
            let resources_page_id = self
                .inner_document
                .add_object(Dictionary(resource_dictionary));
            page_dictionary.set("Resources", Reference(resources_page_id));

            // Wrap the operations of the page in an isolated graphics state block: in the PDF
            // specification the q/Q operator pair saves and restores the graphics state
            let mut operations = mem::take(&mut page.operations);
            operations.insert(0, lopdf::content::Operation::new("q", vec![]));
            operations.push(lopdf::content::Operation::new("Q", vec![]));

            // Encode the operations into the content stream of the page, uncompressed, so that
            // the written text remains directly visible in the output bytes
            let page_content = lopdf::content::Content { operations };
            let encoded_page_content = page_content.encode().map_err(|error| {
                RenderError::pdf(format!(
                    "failed to encode the content of page {}: {}",
                    page.number, error
                ))
            })?;
            let page_content_stream =
                lopdf::Stream::new(lopdf::Dictionary::new(), encoded_page_content)
                    .with_compression(false);
            let page_content_id = self.inner_document.add_object(page_content_stream);
            page_dictionary.set("Contents", Reference(page_content_id));

            // Inserts the page dictionary into the document and save the associated reference
            let page_id = self.inner_document.add_object(page_dictionary);
            page_ids.push(Reference(page_id))
        }

        // Use all the collected page references in order to set the "Kids" field of the PDF
        // document and then insert the pages dictionary into the document itself as a last operation
        pages.set::<_, lopdf::Object>("Kids".to_string(), page_ids.into());
        self.inner_document
            .objects
            .insert(pages_id, Dictionary(pages));

        Ok(())
    }

    /// Save the `PdfDocument` to bytes in order for it to be written to a file or further processed.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, RenderError> {
        let mut pdf_document_bytes = Vec::new();
        let mut writer = BufWriter::new(&mut pdf_document_bytes);
        self.inner_document.save_to(&mut writer).map_err(|error| {
            RenderError::pdf(format!(
                "error while saving the PDF document to bytes: {error}"
            ))
        })?;
        mem::drop(writer);

        Ok(pdf_document_bytes)
    }

    /// Converts the fonts into a dictionary and inserts them into the document. Each face is a
    /// `Type1` dictionary naming one of the standard fonts under `WinAnsiEncoding`, which agrees
    /// with Latin-1 on every code point the `fonts` module accepts; no font program is embedded.
    fn insert_fonts_into_document(&mut self) -> lopdf::Dictionary {
        use lopdf::Object::*;

        let mut font_dictionary = lopdf::Dictionary::new();

        for (font_id, (font_object_id, face)) in self.fonts.iter() {
            let face_dictionary = lopdf::Dictionary::from_iter(vec![
                ("Type", Name("Font".into())),
                ("Subtype", Name("Type1".into())),
                ("BaseFont", Name(face.base_font().into())),
                ("Encoding", Name("WinAnsiEncoding".into())),
            ]);

            self.inner_document
                .objects
                .insert(*font_object_id, lopdf::Object::Dictionary(face_dictionary));
            font_dictionary.set(font_id.clone(), lopdf::Object::Reference(*font_object_id));
        }
        font_dictionary
    }

    /// This function is responsible for adding the given operations to the specified page.
    fn add_operations_to_page(
        &mut self,
        page_index: usize,
        operations: Vec<lopdf::content::Operation>,
    ) -> Result<(), RenderError> {
        let pdf_page = self.get_mut_page(page_index)?;
        pdf_page.operations.extend(operations);

        Ok(())
    }

    // Retrieve the font at the given font index.
    fn get_font(&self, font_index: usize) -> Result<&(lopdf::ObjectId, CoreFace), RenderError> {
        self.fonts
            .get(&format!("F{font_index}"))
            .ok_or(RenderError::pdf(format!(
                "failed to find font {} into the fonts map",
                font_index
            )))
    }

    // Retrieve the specified page via its index.
    fn get_mut_page(&mut self, page_index: usize) -> Result<&mut PdfPage, RenderError> {
        self.pages
            .get_mut(page_index)
            .ok_or(RenderError::pdf(format!(
                "failed to find the page with index {}",
                page_index
            )))
    }
}

/// Formats the given time so that it matches what the PDF specification expects.
/// An example of it is the following: D:20170505150224+02'00'.
fn to_pdf_timestamp_format(date: &OffsetDateTime) -> String {
    let offset = date.offset();
    let offset_sign = if offset.is_negative() { '-' } else { '+' };
    format!(
        "D:{:04}{:02}{:02}{:02}{:02}{:02}{offset_sign}{:02}'{:02}'",
        date.year(),
        u8::from(date.month()),
        date.day(),
        date.hour(),
        date.minute(),
        date.second(),
        offset.whole_hours().abs(),
        offset.minutes_past_hour().abs(),
    )
}
