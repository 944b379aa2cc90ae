use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use lopdf::{Dictionary, Document, Object, Stream};
use pdf_photos::constants::PDF_MIMETYPE;
use pdf_photos::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .save_with_format(&path, ImageFormat::Jpeg)
        .unwrap();
    path
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    DynamicImage::ImageRgba8(RgbaImage::new(width, height))
        .save_with_format(&path, ImageFormat::Png)
        .unwrap();
    path
}

fn create_test_pdf(num_pages: usize, rotate: Option<i64>) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));
        let mut page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]);
        if let Some(rotate) = rotate {
            page.set("Rotate", Object::Integer(rotate));
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(num_pages as i64)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);
    doc
}

fn write_pdf(dir: &Path, name: &str, num_pages: usize, rotate: Option<i64>) -> PathBuf {
    let path = dir.join(name);
    create_test_pdf(num_pages, rotate).save(&path).unwrap();
    path
}

fn page_content(doc: &Document, page_number: u32) -> String {
    let page_id = doc.get_pages()[&page_number];
    String::from_utf8(doc.get_page_content(page_id).unwrap()).unwrap()
}

fn media_box(doc: &Document, page_number: u32) -> Vec<f32> {
    let page_id = doc.get_pages()[&page_number];
    doc.get_dictionary(page_id)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|obj| obj.as_float().unwrap())
        .collect()
}

#[tokio::test]
async fn test_rotated_photo_lands_on_portrait_page() {
    let dir = TempDir::new().unwrap();
    let jpeg = write_jpeg(dir.path(), "a.jpg", 800, 600);
    let output = dir.path().join("out.pdf");

    let graph = Graph::new(vec![Item::new(
        "Letter",
        vec![Photo::new(&jpeg, 800, 600, "image/jpeg").with_orientation(6)],
    )]);

    let report = export_pdf(&graph, &output, &AssembleOptions::default())
        .await
        .unwrap();
    assert_eq!(report.pages, 1);
    assert!(report.skipped.is_empty());
    assert!(!report.passthrough);

    let doc = load_pdf(&output).await.unwrap();
    assert_eq!(doc.get_pages().len(), 1);

    let mb = media_box(&doc, 1);
    assert!((mb[2] - 595.28).abs() < 0.01);
    assert!((mb[3] - 841.89).abs() < 0.01);

    let content = page_content(&doc, 1);
    assert!(content.contains("0 -1 1 0 0 0 cm"));
    assert!(content.contains("/Im0 Do"));
}

#[tokio::test]
async fn test_manual_angle_composes_with_orientation() {
    let dir = TempDir::new().unwrap();
    let jpeg = write_jpeg(dir.path(), "a.jpg", 40, 30);

    // 180 from the tag plus 90 by hand: a quarter turn counter-clockwise
    let graph = Graph::new(vec![Item::new(
        "x",
        vec![
            Photo::new(&jpeg, 40, 30, "image/jpeg")
                .with_orientation(3)
                .with_angle(90),
        ],
    )]);

    let (doc, report) = assemble(&graph, &AssembleOptions::default()).await.unwrap();
    assert_eq!(report.pages, 1);
    assert!(page_content(&doc, 1).contains("0 1 -1 0 0 0 cm"));
}

#[tokio::test]
async fn test_photos_become_pages_in_order() {
    let dir = TempDir::new().unwrap();
    let a = write_jpeg(dir.path(), "a.jpg", 30, 20);
    let b = write_png(dir.path(), "b.png", 20, 30);
    let c = write_jpeg(dir.path(), "c.jpg", 10, 10);

    let graph = Graph::new(vec![
        Item::new(
            "first",
            vec![
                Photo::new(&a, 30, 20, "image/jpeg"),
                Photo::new(&b, 20, 30, "image/png"),
            ],
        ),
        Item::new("second", vec![Photo::new(&c, 10, 10, "image/jpeg")]),
    ]);

    let (doc, report) = assemble(&graph, &AssembleOptions::default()).await.unwrap();
    assert_eq!(report.pages, 3);
    assert_eq!(doc.get_pages().len(), 3);
    for page in 1..=3 {
        assert!(page_content(&doc, page).contains("/Im0 Do"));
    }
}

#[tokio::test]
async fn test_zero_metadata_size_uses_decoded_size() {
    let dir = TempDir::new().unwrap();
    let jpeg = write_jpeg(dir.path(), "a.jpg", 64, 32);

    let graph = Graph::new(vec![Item::new(
        "x",
        vec![Photo::new(&jpeg, 0, 0, "image/jpeg")],
    )]);

    let (doc, report) = assemble(&graph, &AssembleOptions::default()).await.unwrap();
    assert_eq!(report.pages, 1);
    assert_eq!(doc.get_pages().len(), 1);
}

#[tokio::test]
async fn test_relative_paths_resolve_against_base_dir() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("images")).unwrap();
    write_jpeg(&dir.path().join("images"), "a.jpg", 10, 10);

    let graph = Graph::new(vec![Item::new(
        "x",
        vec![Photo::new("images/a.jpg", 10, 10, "image/jpeg")],
    )]);
    let options = AssembleOptions {
        base_dir: Some(dir.path().to_owned()),
        ..Default::default()
    };

    let (_, report) = assemble(&graph, &options).await.unwrap();
    assert_eq!(report.pages, 1);
}

#[tokio::test]
async fn test_single_pdf_source_is_copied_verbatim() {
    let dir = TempDir::new().unwrap();
    let source = write_pdf(dir.path(), "scan.pdf", 3, None);
    let output = dir.path().join("out.pdf");

    let graph = Graph::new(vec![Item::new(
        "Scan",
        vec![
            Photo::new(&source, 612, 792, PDF_MIMETYPE),
            Photo::new(&source, 612, 792, PDF_MIMETYPE),
            Photo::new(&source, 612, 792, PDF_MIMETYPE),
        ],
    )]);

    let report = export_pdf(&graph, &output, &AssembleOptions::default())
        .await
        .unwrap();
    assert!(report.passthrough);
    assert_eq!(
        std::fs::read(&output).unwrap(),
        std::fs::read(&source).unwrap()
    );
}

#[tokio::test]
async fn test_passthrough_item_pages_are_imported_beside_photos() {
    let dir = TempDir::new().unwrap();
    let source = write_pdf(dir.path(), "scan.pdf", 2, Some(90));
    let jpeg = write_jpeg(dir.path(), "a.jpg", 20, 10);
    let output = dir.path().join("out.pdf");

    let graph = Graph::new(vec![
        Item::new(
            "Scan",
            vec![
                Photo::new(&source, 612, 792, PDF_MIMETYPE),
                Photo::new(&source, 612, 792, PDF_MIMETYPE),
            ],
        ),
        Item::new("Photo", vec![Photo::new(&jpeg, 20, 10, "image/jpeg")]),
    ]);

    let report = export_pdf(&graph, &output, &AssembleOptions::default())
        .await
        .unwrap();
    assert!(!report.passthrough);
    assert_eq!(report.pages, 3);

    let doc = load_pdf(&output).await.unwrap();
    assert_eq!(doc.get_pages().len(), 3);

    // Imported pages keep their /Rotate as a quarter turn
    let first = page_content(&doc, 1);
    assert!(first.contains("/Fm0 Do"));
    assert!(first.contains("0 -1 1 0 0 0 cm"));
    assert!(page_content(&doc, 3).contains("/Im0 Do"));
}

#[tokio::test]
async fn test_pdf_in_mixed_item_is_skipped_as_unsupported() {
    let dir = TempDir::new().unwrap();
    let source = write_pdf(dir.path(), "scan.pdf", 2, None);
    let jpeg = write_jpeg(dir.path(), "a.jpg", 20, 10);
    let output = dir.path().join("out.pdf");

    let graph = Graph::new(vec![Item::new(
        "Mixed",
        vec![
            Photo::new(&source, 612, 792, PDF_MIMETYPE),
            Photo::new(&jpeg, 20, 10, "image/jpeg"),
        ],
    )]);

    let report = export_pdf(&graph, &output, &AssembleOptions::default())
        .await
        .unwrap();
    assert!(!report.passthrough);
    assert_eq!(report.pages, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].photo_index, 0);
    assert!(matches!(report.skipped[0].reason, SkipReason::Unsupported(_)));

    let doc = load_pdf(&output).await.unwrap();
    assert_eq!(doc.get_pages().len(), 1);
    assert!(page_content(&doc, 1).contains("/Im0 Do"));
    assert!(!page_content(&doc, 1).contains("/Fm0"));
}

#[tokio::test]
async fn test_wrong_extension_fails_before_any_io() {
    let dir = TempDir::new().unwrap();
    let jpeg = write_jpeg(dir.path(), "a.jpg", 10, 10);
    let output = dir.path().join("out.txt");

    let graph = Graph::new(vec![Item::new(
        "x",
        vec![Photo::new(&jpeg, 10, 10, "image/jpeg")],
    )]);

    let result = export_pdf(&graph, &output, &AssembleOptions::default()).await;
    assert!(matches!(
        result,
        Err(AssembleError::InvalidDestination { expected: "pdf", .. })
    ));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_unreadable_photo_is_skipped_and_reported() {
    let dir = TempDir::new().unwrap();
    let good = write_jpeg(dir.path(), "good.jpg", 10, 10);
    let missing = dir.path().join("missing.jpg");
    let output = dir.path().join("out.pdf");

    let graph = Graph::new(vec![Item::new(
        "x",
        vec![
            Photo::new(&missing, 10, 10, "image/jpeg"),
            Photo::new(&good, 10, 10, "image/jpeg"),
        ],
    )]);

    let report = export_pdf(&graph, &output, &AssembleOptions::default())
        .await
        .unwrap();
    assert_eq!(report.pages, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].photo_index, 0);
    assert_eq!(report.skipped[0].path, missing);
    assert!(matches!(report.skipped[0].reason, SkipReason::Unreadable(_)));

    let doc = load_pdf(&output).await.unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[tokio::test]
async fn test_unsupported_format_is_skipped() {
    let dir = TempDir::new().unwrap();
    let bmp = dir.path().join("a.bmp");
    DynamicImage::ImageRgb8(RgbImage::new(4, 4))
        .save_with_format(&bmp, ImageFormat::Bmp)
        .unwrap();

    let graph = Graph::new(vec![Item::new(
        "x",
        vec![Photo::new(&bmp, 4, 4, "image/bmp")],
    )]);

    let (doc, report) = assemble(&graph, &AssembleOptions::default()).await.unwrap();
    assert_eq!(report.pages, 0);
    assert_eq!(doc.get_pages().len(), 0);
    assert!(matches!(report.skipped[0].reason, SkipReason::Unsupported(_)));
}

#[tokio::test]
async fn test_remote_photo_is_skipped_without_reading() {
    let mut photo = Photo::new("/does/not/exist.jpg", 10, 10, "image/jpeg");
    photo.protocol = Some("https".to_string());
    let graph = Graph::new(vec![Item::new("x", vec![photo])]);

    let (_, report) = assemble(&graph, &AssembleOptions::default()).await.unwrap();
    assert_eq!(report.pages, 0);
    assert!(matches!(report.skipped[0].reason, SkipReason::NotLocal(_)));
}

#[tokio::test]
async fn test_empty_graph_produces_empty_document() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("empty.pdf");

    let report = export_pdf(&Graph::default(), &output, &AssembleOptions::default())
        .await
        .unwrap();
    assert_eq!(report.pages, 0);
    assert!(output.exists());
}

#[tokio::test]
async fn test_graph_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.json");

    let graph = Graph::new(vec![Item::new(
        "Letter",
        vec![
            Photo::new("/img/a.jpg", 800, 600, "image/jpeg")
                .with_checksum("abc")
                .with_title("Front"),
        ],
    )]);
    graph.save(&path).await.unwrap();

    let loaded = Graph::load(&path).await.unwrap();
    assert_eq!(loaded, graph);
}
