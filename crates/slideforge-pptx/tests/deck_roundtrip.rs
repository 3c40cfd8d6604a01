//! End-to-end: build a deck, save it, reopen the ZIP and inspect the parts.

use std::io::{Cursor, Read};

use slideforge_pptx::{
    AreaOverrides, BulletOptions, ChartSpec, ChartType, DashStyle, ElementKind, FigureSpec,
    LineSpec, PlacementSink, Presentation, Rect, ShapeSpec, SlideKind, TableSpec,
};
use tempfile::TempDir;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::new(width, height);
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = zip.by_name(name).unwrap();
    let mut text = String::new();
    file.read_to_string(&mut text).unwrap();
    text
}

fn part_names(bytes: &[u8]) -> Vec<String> {
    let zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    zip.file_names().map(String::from).collect()
}

#[test]
fn test_cover_and_content_deck() {
    let mut deck = Presentation::new().unwrap();

    let cover = deck.create_cover_slide().unwrap();
    cover.add_cover_title("Annual\nReport").unwrap();
    cover.add_cover_info("2024.03.01", "Planning team").unwrap();

    let slide = deck.create_slide().unwrap();
    slide.add_slide_title("Summary -> next steps").unwrap();
    slide
        .add_content_box()
        .unwrap()
        .add_section("Highlights")
        .unwrap()
        .add_bullet("Revenue [green]up[/green]", BulletOptions::default())
        .unwrap()
        .add_bullet("detail", BulletOptions::level(1))
        .unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("deck.pptx");
    deck.save(&path).unwrap();
    let bytes = std::fs::read(&path).unwrap();

    let names = part_names(&bytes);
    assert!(names.contains(&"ppt/slides/slide1.xml".to_string()));
    assert!(names.contains(&"ppt/slides/slide2.xml".to_string()));

    let presentation = read_part(&bytes, "ppt/presentation.xml");
    assert!(presentation.contains(r#"<p:sldId id="256""#));
    assert!(presentation.contains(r#"<p:sldId id="257""#));

    let content = read_part(&bytes, "ppt/slides/slide2.xml");
    assert!(content.contains("Highlights"));
    assert!(content.contains(r#"<a:srgbClr val="00B050"/>"#));
    assert!(content.contains(r#"<a:sym typeface="Wingdings""#));
    assert!(content.contains(r#"marL="449263""#));

    let cover_rels = read_part(&bytes, "ppt/slides/_rels/slide1.xml.rels");
    assert!(cover_rels.contains("slideLayout1.xml"));
}

#[test]
fn test_visual_area_writes_charts_tables_and_media() {
    let mut deck = Presentation::new().unwrap();
    let slide = deck.create_slide().unwrap();
    slide.add_slide_title("Visuals").unwrap();

    let placed = slide
        .visual_area()
        .unwrap()
        .add_chart(
            ChartSpec::new(ChartType::Column, ["Q1", "Q2"])
                .with_series("Rev", [10.0, 12.0])
                .with_caption("Revenue"),
            2.0,
        )
        .unwrap()
        .add_table(TableSpec::new(vec![vec!["Q", "Rev"], vec!["Q1", "10"]]), 1.0)
        .unwrap()
        .add_figure(FigureSpec::from_bytes(png(20, 10)).with_caption("Logo"), 1.0)
        .unwrap()
        .render()
        .unwrap();

    let kinds: Vec<ElementKind> = placed.iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec![ElementKind::Chart, ElementKind::Table, ElementKind::Figure]);
    assert!(placed[0].caption.is_some());
    assert!(placed[1].caption.is_none());
    // the figure keeps its 2:1 aspect ratio
    let figure = placed[2].rect;
    assert!((figure.width - figure.height * 2).abs() <= 1);

    let end = placed[2].rect.right();
    let c = &deck.style().contract.content;
    assert_eq!(end, c.left + c.width);

    let bytes = deck.to_bytes().unwrap();
    let names = part_names(&bytes);
    assert!(names.contains(&"ppt/charts/chart1.xml".to_string()));
    assert!(names.contains(&"ppt/media/image1.png".to_string()));

    let rels = read_part(&bytes, "ppt/slides/_rels/slide1.xml.rels");
    assert!(rels.contains(r#"Id="rId2""#) && rels.contains("../charts/chart1.xml"));
    assert!(rels.contains(r#"Id="rId3""#) && rels.contains("../media/image1.png"));

    let types = read_part(&bytes, "[Content_Types].xml");
    assert!(types.contains("/ppt/charts/chart1.xml"));
    assert!(types.contains(r#"Extension="png""#));
}

#[test]
fn test_shapes_lines_and_overridden_area() {
    let mut deck = Presentation::new().unwrap();
    let slide = deck.create_slide().unwrap();

    let placed = slide
        .visual_area_with(AreaOverrides {
            left: Some(0),
            width: Some(3_000),
            gap: Some(0),
            ..AreaOverrides::default()
        })
        .unwrap()
        .add_shape(ShapeSpec::named("chevron").unwrap().with_text("Step 1"), 1.0)
        .unwrap()
        .add_shape(ShapeSpec::named("chevron").unwrap().with_text("Step 2"), 1.0)
        .unwrap()
        .render()
        .unwrap();
    assert_eq!(placed[0].rect.width, 1_500);
    assert_eq!(placed[1].rect.left, 1_500);

    slide
        .place_line(&LineSpec::new((0, 100), (9_000, 100)).with_dash(DashStyle::Dash))
        .unwrap();
    slide
        .place_shape(
            &ShapeSpec::named("star").unwrap().with_fill("orange"),
            Rect::new(10, 10, 500, 500),
        )
        .unwrap();

    let bytes = deck.to_bytes().unwrap();
    let xml = read_part(&bytes, "ppt/slides/slide1.xml");
    assert_eq!(xml.matches(r#"prst="chevron""#).count(), 2);
    assert!(xml.contains(r#"<a:prstDash val="dash"/>"#));
    assert!(xml.contains(r#"prst="star5""#));
}

#[test]
fn test_unknown_selectors_list_supported_values() {
    let err = ShapeSpec::named("blob").unwrap_err().to_string();
    assert!(err.contains("rounded_rectangle") && err.contains("right_arrow"));

    let err = ChartSpec::named("gantt", ["a"]).unwrap_err().to_string();
    assert!(err.contains("radar_filled") && err.contains("bubble"));

    let err = "zigzag".parse::<DashStyle>().unwrap_err().to_string();
    assert!(err.contains("long_dash"));
}

#[test]
fn test_duplicate_and_add_on_saved_file() {
    let mut deck = Presentation::new().unwrap();
    deck.create_slide().unwrap().add_slide_title("One").unwrap();
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.pptx");
    let output = dir.path().join("out.pptx");
    deck.save(&input).unwrap();

    let part = slideforge_pptx::duplicate_slide_file(&input, Some(output.as_path()), 1).unwrap();
    assert_eq!(part, "ppt/slides/slide2.xml");
    slideforge_pptx::add_blank_slide_file(
        &output,
        None,
        SlideKind::Cover,
        &deck.style().contract,
    )
    .unwrap();

    let bytes = std::fs::read(&output).unwrap();
    let app = read_part(&bytes, "docProps/app.xml");
    assert!(app.contains("<Slides>3</Slides>"));
    assert_eq!(
        read_part(&bytes, "ppt/slides/slide1.xml"),
        read_part(&bytes, "ppt/slides/slide2.xml")
    );
}

#[test]
fn test_invalid_area_leaves_slide_untouched() {
    let mut deck = Presentation::new().unwrap();
    let slide = deck.create_slide().unwrap();
    slide.add_slide_title("Results").unwrap();
    let before = slide.to_xml();

    let err = slide
        .visual_area_with(AreaOverrides {
            gap: Some(-1_000_000),
            ..AreaOverrides::default()
        })
        .unwrap_err();
    assert!(err.to_string().contains("gap must not be negative"));

    let chart = ChartSpec::new(ChartType::Column, ["a"]).with_series("s", [1.0]);
    let err = slide
        .visual_area_with(AreaOverrides {
            height: Some(100_000),
            ..AreaOverrides::default()
        })
        .unwrap()
        .add_chart(chart.clone(), 1.0)
        .unwrap()
        .add_chart(chart.with_caption("Figure 1"), 1.0)
        .unwrap()
        .render()
        .unwrap_err();
    assert!(err.to_string().contains("does not fit"));
    assert_eq!(slide.to_xml(), before);
}
