//! The process-wide registry can be replaced once, before first use.
//!
//! Kept in its own test binary so no other test touches the global first.

mod common;

use gridio::image;
use gridio::prelude::*;

#[test]
fn test_install_before_first_use() {
    common::init_tracing();

    let options = VtkOptions {
        title: "installed".to_string(),
        ..VtkOptions::default()
    };
    FormatRegistry::install(FormatRegistry::new().with(VtkImageIO::new(options))).expect("first install");
    assert!(FormatRegistry::install(FormatRegistry::with_defaults()).is_err());
    assert_eq!(FormatRegistry::global().len(), 1);

    let (_dir, path) = common::scratch("installed.vtk");
    let descriptor = ImageDescriptor::d2(1, 1, ComponentType::Uint8).expect("descriptor");
    image::write(&path, &descriptor, &[3]).expect("Failed to write");

    let text = std::fs::read_to_string(&path).expect("file text");
    assert!(text.lines().nth(1).is_some_and(|line| line.starts_with("installed (byte order: ")));
}
