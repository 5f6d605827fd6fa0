#![allow(dead_code)]

use std::fs;

pub const CONTENT_TYPE: &str = "multipart/form-data; boundary=X";

pub fn fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{name}")).unwrap()
}

/// Builds a multipart body with boundary `X` from `(filename, payload)` pairs.
pub fn multipart_body(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut body = String::new();
    for (filename, payload) in parts {
        body.push_str("--X\r\n");
        body.push_str(&format!(
            "Content-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\n"
        ));
        body.push_str("Content-Type: application/octet-stream\r\n\r\n");
        body.push_str(payload);
        body.push_str("\r\n");
    }
    body.push_str("--X--\r\n");
    body.into_bytes()
}

pub fn full_response() -> Vec<u8> {
    multipart_body(&[
        ("grasp.csv", fixture("grasp.csv").as_str()),
        ("p2rank.csv", fixture("p2rank.csv").as_str()),
        ("protein.pdb", fixture("protein.pdb").as_str()),
    ])
}
