mod common;

use lifechart::{load_table, CompressionFormat, LoadOptions};
use std::io::Write;

#[test]
fn load_plain_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lifestyle.csv");
    common::write_lifestyle_csv(&path);

    let df = load_table(&path, &LoadOptions::new()).unwrap();
    assert_eq!(df.height(), 12);
    assert!(df.column("City").is_ok());
    assert!(df.column("Sunshine hours(City)").is_ok());
}

#[test]
fn load_semicolon_delimited() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    std::fs::write(&path, "city;hours\nOslo;1668\nMadrid;2769\n").unwrap();

    let opts = LoadOptions::new().with_delimiter(b';');
    let df = load_table(&path, &opts).unwrap();
    assert_eq!(df.height(), 2);
    assert_eq!(df.width(), 2);
    assert!(df.column("hours").is_ok());
}

#[test]
fn load_skips_leading_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    std::fs::write(
        &path,
        "# exported 2024-01-01\n# source: survey\ncity,hours\nOslo,1668\n",
    )
    .unwrap();

    let opts = LoadOptions::new().with_skip_lines(2);
    let df = load_table(&path, &opts).unwrap();
    assert_eq!(df.height(), 1);
    assert!(df.column("city").is_ok());
}

#[test]
fn load_without_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    std::fs::write(&path, "Oslo,1668\nMadrid,2769\n").unwrap();

    let opts = LoadOptions::new().with_has_header(false);
    let df = load_table(&path, &opts).unwrap();
    assert_eq!(df.height(), 2);
    assert_eq!(df.width(), 2);
}

#[test]
fn load_gzip_auto_detected_from_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv.gz");
    let file = std::fs::File::create(&path).unwrap();
    let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    encoder
        .write_all(b"city,hours\nOslo,1668\nMadrid,2769\n")
        .unwrap();
    encoder.finish().unwrap();

    let df = load_table(&path, &LoadOptions::new()).unwrap();
    assert_eq!(df.height(), 2);
    assert!(df.column("hours").is_ok());
}

#[test]
fn load_explicit_compression_overrides_extension() {
    // Gzip payload behind a non-gzip extension: auto-detection finds nothing,
    // the explicit flag still decodes it.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.bin");
    let file = std::fs::File::create(&path).unwrap();
    let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    encoder.write_all(b"city,hours\nOslo,1668\n").unwrap();
    encoder.finish().unwrap();

    let opts = LoadOptions::new().with_compression(CompressionFormat::Gzip);
    let df = load_table(&path, &opts).unwrap();
    assert_eq!(df.height(), 1);
}

#[test]
fn load_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.csv");
    assert!(load_table(&path, &LoadOptions::new()).is_err());
}
