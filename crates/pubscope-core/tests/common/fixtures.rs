//! Test fixture loading utilities

use std::path::PathBuf;

use pubscope_core::store::parse_publications;
use pubscope_core::Publication;

/// Get the path to a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// Load a fixture file as a string
pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

/// The bundled sample publications
#[allow(dead_code)]
pub fn sample_publications() -> Vec<Publication> {
    parse_publications(&load_fixture("publications.json"), "publications.json")
        .expect("sample publications parse")
}

/// The three-record dataset used by the table scenarios
#[allow(dead_code)]
pub fn greek_dataset() -> Vec<Publication> {
    vec![
        Publication::new("Alpha", "https://example.org/a", "100"),
        Publication::new("Beta", "https://example.org/b", "200"),
        Publication::new("Gamma", "https://example.org/c", "300"),
    ]
}
