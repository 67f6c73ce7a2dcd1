#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

type FixtureResult<T> = Result<T, Box<dyn std::error::Error>>;

const FONT_SIZE: i64 = 11;
const LINE_HEIGHT: i64 = 14;
const TOP_MARGIN: i64 = 800;
const LEFT_MARGIN: i64 = 40;

/// A text-only PDF: each page is a list of lines set in a built-in font.
///
/// Built-in fonts only cover Latin text, so Persian fixtures live in unit tests.
#[derive(Default)]
pub struct TextPdf {
    pages: Vec<Vec<String>>,
}

impl TextPdf {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn page(mut self, lines: &[&str]) -> Self {
        self.pages
            .push(lines.iter().map(|line| (*line).to_string()).collect());
        self
    }

    fn page_operations(lines: &[String]) -> Vec<Operation> {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["Body".into(), FONT_SIZE.into()]),
            Operation::new("Td", vec![LEFT_MARGIN.into(), TOP_MARGIN.into()]),
        ];
        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                operations.push(Operation::new("Td", vec![0.into(), (-LINE_HEIGHT).into()]));
            }
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(line.as_str())],
            ));
        }
        operations.push(Operation::new("ET", vec![]));
        operations
    }

    fn add_page(
        doc: &mut Document,
        parent: ObjectId,
        lines: &[String],
    ) -> FixtureResult<ObjectId> {
        let content = Content {
            operations: Self::page_operations(lines),
        };
        let stream = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        Ok(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => parent,
            "Contents" => stream,
        }))
    }

    fn build(&self) -> FixtureResult<Document> {
        let mut doc = Document::with_version("1.5");
        let tree = doc.new_object_id();
        let font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources = doc.add_object(dictionary! {
            "Font" => dictionary! { "Body" => font },
        });

        let kids = self
            .pages
            .iter()
            .map(|lines| Self::add_page(&mut doc, tree, lines).map(Object::from))
            .collect::<FixtureResult<Vec<_>>>()?;
        let count = i64::try_from(kids.len())?;

        doc.objects.insert(
            tree,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => tree,
        });
        doc.trailer.set("Root", catalog);
        doc.compress();
        Ok(doc)
    }

    pub fn save(&self, path: &Path) -> FixtureResult<()> {
        self.build()?.save(path)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> FixtureResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.build()?.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

/// Every row of a worksheet as display strings.
pub fn read_sheet(path: &Path, sheet: &str) -> FixtureResult<Vec<Vec<String>>> {
    use calamine::{Reader, Xlsx, open_workbook};

    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook.worksheet_range(sheet)?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect())
}
