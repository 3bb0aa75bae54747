use bundle_core::{
    decode, from, Bundle, EncodeOptions, ErrorCode, TreeMap, WriteOptions, DEFAULT_MODE,
};
use serde_json::json;

fn full_bundle() -> Bundle {
    let mut bundle = Bundle::new();
    bundle.set_id(Some("app@1.0.0".into()));
    bundle
        .write(
            "/index.js",
            "import bar from 'bar'",
            &WriteOptions::new().main().imports(
                TreeMap::from_value(&json!({ "bar": { "asset": "/bar.txt", "default": "/bar.js" } }))
                    .unwrap(),
            ),
        )
        .unwrap()
        .write("/bar.js", "export default 1", &WriteOptions::new().alias("bar"))
        .unwrap()
        .write("/bar.txt", "plain text", &WriteOptions::new().asset())
        .unwrap()
        .write("/native.node", vec![0x7fu8, b'E', b'L', b'F'], &WriteOptions::new().addon())
        .unwrap()
        .write("/bin/cli", "#!/bin/sh", &WriteOptions::new().executable())
        .unwrap()
        .write("/empty", Vec::<u8>::new(), &WriteOptions::new())
        .unwrap();
    bundle
}

#[test]
fn test_round_trip_is_field_for_field() {
    let bundle = full_bundle();
    let decoded = decode(bundle.to_buffer(&EncodeOptions::default()).unwrap()).unwrap();

    assert_eq!(decoded, bundle);
    assert_eq!(decoded.id(), Some("app@1.0.0"));
    assert_eq!(decoded.main(), Some("/index.js"));
    assert_eq!(decoded.imports(), bundle.imports());
    assert_eq!(decoded.resolutions(), bundle.resolutions());
    assert_eq!(decoded.addons(), ["/native.node".to_string()]);
    assert_eq!(decoded.assets(), ["/bar.txt".to_string()]);
    assert_eq!(decoded.mode("/bin/cli"), 0o755);
    assert_eq!(decoded.mode("/empty"), DEFAULT_MODE);
    assert_eq!(decoded.size("/empty"), 0);
    assert_eq!(decoded.read("/empty").as_deref(), Some(&b""[..]));

    for (path, data, mode) in bundle.iter() {
        assert_eq!(decoded.read(path), Some(data), "{path}");
        assert_eq!(decoded.mode(path), mode, "{path}");
    }
}

#[test]
fn test_decoded_files_are_sorted() {
    let decoded = decode(full_bundle().to_buffer(&EncodeOptions::default()).unwrap()).unwrap();
    let keys: Vec<_> = decoded.keys().collect();
    assert_eq!(
        keys,
        vec!["/bar.js", "/bar.txt", "/bin/cli", "/empty", "/index.js", "/native.node"]
    );
}

#[test]
fn test_condition_order_survives_round_trip() {
    let mut bundle = Bundle::new();
    bundle
        .replace_imports(&json!({ "z": { "node": "/n.js", "asset": "/a.txt", "default": "/d.js" } }))
        .unwrap();

    let decoded = decode(bundle.to_buffer(&EncodeOptions::default()).unwrap()).unwrap();
    let branch = decoded.imports().get("z").and_then(|n| n.as_branch()).unwrap();
    let keys: Vec<_> = branch.keys().collect();
    assert_eq!(keys, vec!["node", "asset", "default"]);
}

#[test]
fn test_hashbang_tolerance() {
    let buffer = full_bundle().to_buffer(&EncodeOptions::default()).unwrap();

    let mut script = b"#!/usr/bin/env bare --some-flag\n".to_vec();
    script.extend_from_slice(&buffer);

    assert_eq!(from(script).unwrap(), from(buffer).unwrap());
}

#[test]
fn test_hashbang_is_not_reemitted() {
    let buffer = full_bundle().to_buffer(&EncodeOptions::default()).unwrap();
    let mut script = b"#!/usr/bin/env bare\n".to_vec();
    script.extend_from_slice(&buffer);

    let reencoded = from(script)
        .unwrap()
        .to_buffer(&EncodeOptions::default())
        .unwrap();
    assert_eq!(reencoded, buffer);
}

#[test]
fn test_indent_does_not_change_contents() {
    let bundle = full_bundle();
    let compact = bundle.to_buffer(&EncodeOptions::default()).unwrap();
    let pretty = bundle.to_buffer(&EncodeOptions::indent(4)).unwrap();

    assert!(pretty.len() > compact.len());
    assert_eq!(decode(pretty).unwrap(), decode(compact).unwrap());
}

#[test]
fn test_decode_from_str_and_slice() {
    let buffer = full_bundle().to_buffer(&EncodeOptions::default()).unwrap();
    let from_slice = from(buffer.as_slice()).unwrap();
    assert_eq!(from_slice, full_bundle());

    let text = "\n{\"files\":{\"/a.txt\":{\"offset\":0,\"length\":2,\"mode\":420}}}\n";
    let encoded = format!("{}{}hi", text.len(), text);
    let from_str = from(encoded.as_str()).unwrap();
    assert_eq!(from_str.read("/a.txt").as_deref(), Some(&b"hi"[..]));
}

#[test]
fn test_invalid_header_is_all_or_nothing() {
    // Second file is out of range: nothing is returned
    let text = "\n{\"files\":{\"/a\":{\"offset\":0,\"length\":1},\"/b\":{\"offset\":5,\"length\":1}}}\n";
    let err = from(format!("{}{}ab", text.len(), text)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidBundleHeader);
}

#[test]
fn test_error_codes_for_foreign_input() {
    for input in ["", "abc", "12", "3\n{}", "#!"] {
        let err = from(input).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidBundleHeader, "input {input:?}");
    }
}
