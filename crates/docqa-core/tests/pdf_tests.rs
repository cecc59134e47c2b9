use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tempfile::TempDir;

use docqa_core::extract::ChunkExtractor;

/// Write a PDF with one page per entry; `None` pages carry an empty content stream.
fn write_pdf(path: &Path, pages: &[Option<&str>]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = match text {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
            None => Vec::new(),
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[test]
fn pdf_page_splits_into_sentence_chunks() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("intro.pdf");
    write_pdf(&path, &[Some("AI is great. ML is powerful.")]);

    let chunks = ChunkExtractor::default().extract_file(&path).expect("extract");

    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["AI is great", "ML is powerful."]);
    assert!(chunks.iter().all(|c| c.page == 1));
    assert!(chunks[0].source.ends_with("intro.pdf"));
}

#[test]
fn pdf_pages_keep_their_numbers_and_order() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("book.pdf");
    write_pdf(&path, &[Some("First page. Still first"), None, Some("Third page")]);

    let chunks = ChunkExtractor::default().extract_file(&path).expect("extract");

    let got: Vec<(&str, u32)> = chunks.iter().map(|c| (c.text.as_str(), c.page)).collect();
    assert_eq!(got, vec![("First page", 1), ("Still first", 1), ("Third page", 3)]);
}

#[test]
fn pdf_without_text_contributes_no_chunks() {
    let tmp = TempDir::new().unwrap();
    write_pdf(&tmp.path().join("scan.pdf"), &[None, None]);

    let report = ChunkExtractor::default().extract_dir(tmp.path()).expect("extract");

    assert_eq!(report.documents, 1);
    assert!(report.chunks.is_empty());
    assert!(report.skipped.is_empty());
}

#[test]
fn pdf_and_text_documents_are_read_in_path_order() {
    let tmp = TempDir::new().unwrap();
    write_pdf(&tmp.path().join("b.pdf"), &[Some("From the pdf")]);
    std::fs::write(tmp.path().join("a.txt"), "From the text file").unwrap();

    let report = ChunkExtractor::default().extract_dir(tmp.path()).expect("extract");

    let texts: Vec<&str> = report.chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["From the text file", "From the pdf"]);
    assert_eq!(report.documents, 2);
}
