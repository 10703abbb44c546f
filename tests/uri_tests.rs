//! Resource Locator Tests
//!
//! Tests for:
//! - Uri construction, resolution against a context, append
//! - Synchronous reads: string, node description, image
//! - Result codes for missing files, undecodable data, unknown formats and
//!   unreachable servers

use std::path::PathBuf;

use drapeable::assets::{NodeDescription, ReadOptions, ResultCode, Uri, UriContext};
use drapeable::scene::Node;
use uuid::Uuid;

/// Scratch directory removed on drop.
struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("drapeable-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    fn write(&self, name: &str, bytes: &[u8]) -> String {
        let path = self.dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path.to_string_lossy().into_owned()
    }

    /// A context whose referrer is a document inside the scratch directory.
    fn context(&self) -> UriContext {
        UriContext::new(self.dir.join("index.earth").to_string_lossy().into_owned())
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

// ============================================================================
// Construction & Resolution
// ============================================================================

#[test]
fn uri_from_str_is_unresolved() {
    let uri = Uri::from("tiles/0.png");
    assert_eq!(uri.base(), "tiles/0.png");
    assert_eq!(uri.full(), "tiles/0.png");
    assert!(uri.context().is_empty());
    assert!(!uri.is_empty());
    assert!(Uri::default().is_empty());
}

#[test]
fn uri_resolves_against_context() {
    let context = UriContext::new("data/world.earth");
    let uri = Uri::new("roads/roads.json", &context);

    assert_eq!(uri.base(), "roads/roads.json");
    assert_eq!(uri.full(), "data/roads/roads.json");
    assert_eq!(uri.context(), &context);
    assert_eq!(uri.to_string(), "data/roads/roads.json");
}

#[test]
fn nested_context_resolves_relative_to_parent_document() {
    let root = UriContext::new("http://example.com/maps/world.earth");
    let layer = Uri::new("layers/roads.xml", &root);
    let tile = Uri::new("../tiles/1.png", &UriContext::from(&layer));

    assert_eq!(layer.full(), "http://example.com/maps/layers/roads.xml");
    assert_eq!(tile.full(), "http://example.com/maps/tiles/1.png");
    assert!(tile.is_remote());
}

#[test]
fn append_extends_both_forms_and_keeps_context() {
    let context = UriContext::new("data/world.earth");
    let uri = Uri::new("tiles/0", &context).append(".png");

    assert_eq!(uri.base(), "tiles/0.png");
    assert_eq!(uri.full(), "data/tiles/0.png");
    assert_eq!(uri.context(), &context);
}

// ============================================================================
// Reads
// ============================================================================

#[test]
fn read_string_from_file() {
    let scratch = Scratch::new();
    scratch.write("notes.txt", "draped labels".as_bytes());

    let uri = Uri::new("notes.txt", &scratch.context());
    let result = uri.read_string(&ReadOptions::default());

    assert_eq!(result.code(), ResultCode::Ok);
    assert!(result.succeeded());
    assert_eq!(result.data().map(String::as_str), Some("draped labels"));
    assert!(result.detail().is_none());
}

#[test]
fn read_string_reports_not_found() {
    let scratch = Scratch::new();
    let uri = Uri::new("missing.txt", &scratch.context());

    let result = uri.read_string(&ReadOptions::default());

    assert_eq!(result.code(), ResultCode::NotFound);
    assert!(result.data().is_none());
    assert!(result.detail().is_some());
}

#[test]
fn read_string_reports_invalid_utf8_as_decode_error() {
    let scratch = Scratch::new();
    let location = scratch.write("binary.txt", &[0xff, 0xfe, 0xfd]);

    let result = Uri::from(location.as_str()).read_string(&ReadOptions::default());
    assert_eq!(result.into_result().unwrap_err(), ResultCode::DecodeError);
}

#[test]
fn read_node_builds_described_graph() {
    let scratch = Scratch::new();
    let json = r#"{
        "name": "labels",
        "children": [
            { "name": "label-0" },
            { "name": "label-1", "visible": false, "children": [{ "name": "leaf" }] }
        ]
    }"#;
    scratch.write("labels.json", json.as_bytes());

    let node = Uri::new("labels.json", &scratch.context())
        .read_node(&ReadOptions::default())
        .into_data()
        .unwrap();

    assert_eq!(node.name(), "labels");
    let children = node.children();
    assert_eq!(children.len(), 2);
    assert!(children[0].is_visible());
    assert!(!children[1].is_visible());
    assert_eq!(children[1].children()[0].name(), "leaf");
    assert_eq!(children[1].children()[0].num_parents(), 1);
}

#[test]
fn node_description_round_trips_structure() {
    let root = Node::new("root");
    let child = Node::new("child");
    child.set_visible(false);
    root.add_child(&child);

    let description = NodeDescription::describe(&root);
    let rebuilt = description.build();

    assert_eq!(NodeDescription::describe(&rebuilt), description);
}

#[test]
fn read_node_rejects_unknown_format() {
    let scratch = Scratch::new();
    let location = scratch.write("model.osgb", b"not json");

    let result = Uri::from(location.as_str()).read_node(&ReadOptions::default());
    assert_eq!(result.code(), ResultCode::NoReader);
}

#[test]
fn read_node_honours_format_hint() {
    let scratch = Scratch::new();
    let location = scratch.write("model.bin", br#"{ "name": "hinted" }"#);

    let result = Uri::from(location.as_str()).read_node(&ReadOptions::new().with_format_hint("json"));
    assert_eq!(result.into_data().unwrap().name(), "hinted");
}

#[test]
fn read_node_reports_malformed_json() {
    let scratch = Scratch::new();
    let location = scratch.write("broken.json", b"{ \"name\": ");

    let result = Uri::from(location.as_str()).read_node(&ReadOptions::default());
    assert_eq!(result.code(), ResultCode::DecodeError);
}

#[test]
fn read_image_decodes_png() {
    let scratch = Scratch::new();
    let path = scratch.dir.join("swatch.png");
    image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
        .save(&path)
        .unwrap();

    let result = Uri::new("swatch.png", &scratch.context()).read_image(&ReadOptions::default());

    let image = result.into_data().unwrap();
    assert_eq!((image.width(), image.height()), (3, 2));
}

#[test]
fn read_image_reports_decode_error() {
    let scratch = Scratch::new();
    let location = scratch.write("garbage.png", b"definitely not a png");

    let result = Uri::from(location.as_str()).read_image(&ReadOptions::default());
    assert_eq!(result.code(), ResultCode::DecodeError);
}

#[test]
fn read_image_rejects_unknown_format_hint() {
    let scratch = Scratch::new();
    let location = scratch.write("tile.dat", b"");

    let result = Uri::from(location.as_str()).read_image(&ReadOptions::new().with_format_hint("nope"));
    assert_eq!(result.code(), ResultCode::NoReader);
}

// ============================================================================
// Remote reads
// ============================================================================

#[cfg(feature = "http")]
#[test]
fn read_from_unreachable_server_is_transport_error() {
    let uri = Uri::from("http://127.0.0.1:1/x.txt");
    assert!(uri.is_remote());

    let result = uri.read_string(&ReadOptions::default());

    assert_eq!(result.code(), ResultCode::TransportError);
    assert!(result.data().is_none());
    assert!(result.detail().is_some());
}

#[cfg(not(feature = "http"))]
#[test]
fn remote_read_without_http_support_has_no_reader() {
    let result = Uri::from("http://127.0.0.1:1/x.txt").read_string(&ReadOptions::default());
    assert_eq!(result.code(), ResultCode::NoReader);
}
