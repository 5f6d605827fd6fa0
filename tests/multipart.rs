mod common;

use assert_matches::assert_matches;

use pocket_decoder::error::PocketError;
use pocket_decoder::multipart::{
    DEFAULT_CONTENT_TYPE, PartMarkers, extract_parts, split_parts,
};

use common::{CONTENT_TYPE, fixture, full_response, multipart_body};

#[test]
fn recognised_parts_are_extracted() {
    let parts = extract_parts(
        CONTENT_TYPE,
        &full_response(),
        DEFAULT_CONTENT_TYPE,
        &PartMarkers::default(),
    )
    .unwrap();
    assert_eq!(parts.grasp_csv, Some(fixture("grasp.csv")));
    assert_eq!(parts.p2rank_csv, Some(fixture("p2rank.csv")));
    assert_eq!(parts.structure, Some(fixture("protein.pdb")));
}

#[test]
fn closing_marker_is_not_a_part() {
    let body = String::from_utf8(multipart_body(&[("a.txt", "x"), ("b.txt", "y")])).unwrap();
    let parts = split_parts(&body, "X");
    assert_eq!(parts.len(), 2);
    assert!(parts.iter().all(|part| !part.payload.contains("--")));
}

#[test]
fn later_duplicate_part_wins() {
    let body = multipart_body(&[("grasp.csv", "first"), ("grasp.csv", "second")]);
    let parts = extract_parts(
        CONTENT_TYPE,
        &body,
        DEFAULT_CONTENT_TYPE,
        &PartMarkers::default(),
    )
    .unwrap();
    assert_eq!(parts.grasp_csv.as_deref(), Some("second"));
}

#[test]
fn content_type_problems_are_fatal() {
    let markers = PartMarkers::default();
    assert_matches!(
        extract_parts("text/html", b"", DEFAULT_CONTENT_TYPE, &markers),
        Err(PocketError::UnexpectedFormat(_))
    );
    assert_matches!(
        extract_parts("multipart/form-data; charset=utf-8", b"", DEFAULT_CONTENT_TYPE, &markers),
        Err(PocketError::MissingBoundary)
    );
}

#[test]
fn empty_multipart_body_has_no_parts() {
    let parts = extract_parts(
        CONTENT_TYPE,
        b"--X--\r\n",
        DEFAULT_CONTENT_TYPE,
        &PartMarkers::default(),
    )
    .unwrap();
    assert_eq!(parts.grasp_csv, None);
    assert_eq!(parts.p2rank_csv, None);
    assert_eq!(parts.structure, None);
}
