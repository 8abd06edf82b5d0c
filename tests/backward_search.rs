//! Integration tests for backward (inverse) search (output position -> source line)

use rstest::rstest;
use synctex::synctex::error::LookupError;
use synctex::synctex::model::UNIT;
use synctex::synctex::{backward, forward, parse, BackwardResult, SyncModel};

const INTRO: &str = "/doc/chapters/intro.tex";
const THESIS: &str = "/doc/thesis.tex";

fn fixture() -> SyncModel {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/thesis.synctex");
    let text = std::fs::read_to_string(path).expect("Failed to read fixture");
    parse(&text).expect("fixture to parse")
}

fn bp(raw: i64) -> f64 {
    raw as f64 / UNIT
}

fn hit(input: &str, line: u32) -> BackwardResult {
    BackwardResult {
        input: input.to_string(),
        line,
        column: 0,
    }
}

#[test]
fn test_point_inside_single_rectangle() {
    // one record covering left=0, right=10, top=0, bottom=10 (in big points)
    let text = "\
SyncTeX Version:1
Input:1:/doc/box.tex
{1
(1,5:0,657818:657818,657818,0
x1,5:0,657818:657818
)
}1
";
    let model = parse(text).unwrap();
    assert_eq!(backward(&model, 1, 5.0, 5.0).unwrap(), hit("/doc/box.tex", 5));
}

#[rstest]
#[case::inside_thesis_line(1, bp(10_000_000), bp(7_800_000), THESIS, 10)]
#[case::inside_intro_line(1, bp(5_000_000), bp(19_900_000), INTRO, 7)]
#[case::edge_is_inclusive(1, bp(4_736_286), bp(20_000_000), INTRO, 7)]
#[case::second_page(2, bp(5_000_000), bp(5_900_000), INTRO, 12)]
fn test_containment(
    #[case] page: u32,
    #[case] x: f64,
    #[case] y: f64,
    #[case] input: &str,
    #[case] line: u32,
) {
    let model = fixture();
    assert_eq!(backward(&model, page, x, y).unwrap(), hit(input, line));
}

#[test]
fn test_nearest_rectangle_not_first_scanned() {
    let model = fixture();
    // far right of everything on page 1, level with intro line 3
    let result = backward(&model, 1, bp(40_000_000), bp(12_000_000)).unwrap();
    assert_eq!(result, hit(INTRO, 3));
}

#[test]
fn test_nearest_rectangle_below_content() {
    let model = fixture();
    // below the last record on page 2 (thesis line 24)
    let result = backward(&model, 2, bp(5_000_000), bp(30_000_000)).unwrap();
    assert_eq!(result, hit(THESIS, 24));
}

/// Two records with identical geometry, written in the given line order
fn twin_records(lines: [u32; 2]) -> String {
    let mut text = String::from("SyncTeX Version:1\nInput:1:/doc/twins.tex\n{1\n");
    for line in lines {
        text.push_str(&format!(
            "(1,{line}:0,657818:657818,657818,0\nx1,{line}:0,657818:657818\n)\n"
        ));
    }
    text.push_str("}1\n");
    text
}

#[rstest]
#[case::lower_line_first([5, 9], 5)]
#[case::higher_line_first([9, 5], 9)]
fn test_equal_distance_keeps_first_record(#[case] lines: [u32; 2], #[case] expected: u32) {
    let model = parse(&twin_records(lines)).unwrap();
    // right of both records, equally far from each
    let result = backward(&model, 1, 50.0, 5.0).unwrap();
    assert_eq!(result, hit("/doc/twins.tex", expected));
}

#[test]
fn test_round_trip_through_forward_position() {
    let model = fixture();
    let position = forward(&model, 7, INTRO).unwrap();
    assert_eq!(
        backward(&model, position.page, position.x, position.y).unwrap(),
        hit(INTRO, 7)
    );
}

#[test]
fn test_offset_is_subtracted() {
    let text = "\
SyncTeX Version:1
Input:1:a.tex
X Offset:6578176
Y Offset:6578176
{1
(1,2:0,657818:657818,657818,0
x1,2:0,657818:657818
)
(1,9:0,6578176:657818,657818,0
x1,9:0,6578176:657818
)
}1
";
    let model = parse(text).unwrap();
    // (105, 105) in output space is (5, 5) in document space
    assert_eq!(backward(&model, 1, 105.0, 105.0).unwrap(), hit("a.tex", 2));
}

#[test]
fn test_no_input_files() {
    let model = parse("SyncTeX Version:1\n{1\n}1\n").unwrap();
    assert_eq!(backward(&model, 1, 0.0, 0.0), Err(LookupError::NoInputFiles));
}

#[test]
fn test_page_without_records() {
    let model = fixture();
    assert_eq!(
        backward(&model, 3, 0.0, 0.0),
        Err(LookupError::NoPageContent { page: 3 })
    );
}
