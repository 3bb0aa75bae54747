use bundle_core::{decode, Bundle, EncodeOptions, MountOptions, TreeMap, Url, WriteOptions};
use serde_json::json;

fn root() -> Url {
    Url::parse("file:///dir/").unwrap()
}

#[test]
fn test_mount_main_and_files() {
    let mut bundle = Bundle::new();
    bundle
        .write("/foo.js", "foo", &WriteOptions::new().main())
        .unwrap();

    let mounted = bundle.mount(&root(), &MountOptions::new()).unwrap();

    assert_eq!(mounted.main(), Some("file:///dir/foo.js"));
    assert_eq!(mounted.keys().collect::<Vec<_>>(), vec!["file:///dir/foo.js"]);
    assert_eq!(mounted.read("file:///dir/foo.js").as_deref(), Some(&b"foo"[..]));
    assert_eq!(mounted.mode("file:///dir/foo.js"), bundle.mode("/foo.js"));
}

#[test]
fn test_conditional_imports_under_mount() {
    let mut bundle = Bundle::new();
    bundle
        .write(
            "/foo.js",
            "foo",
            &WriteOptions::new()
                .imports(TreeMap::from_value(&json!({ "bar": { "asset": "/bar.txt" } })).unwrap()),
        )
        .unwrap();
    bundle.replace_imports(&json!({ "bar": "/bar.js" })).unwrap();

    let options =
        MountOptions::new().with_condition("asset", Url::parse("file:///assets/").unwrap());
    let mounted = bundle.mount(&root(), &options).unwrap();

    assert_eq!(
        mounted.imports(),
        &TreeMap::from_value(&json!({ "bar": "file:///dir/bar.js" })).unwrap()
    );
    assert_eq!(
        mounted.resolutions().get("file:///dir/foo.js"),
        Some(&TreeMap::from_value(&json!({ "bar": { "asset": "file:///assets/bar.txt" } })).unwrap())
    );
}

#[test]
fn test_mounted_bundle_round_trips() {
    let mut bundle = Bundle::new();
    bundle
        .write("/a.js", "a", &WriteOptions::new().main().alias("a"))
        .unwrap()
        .write("/b.node", "b", &WriteOptions::new().addon())
        .unwrap();

    let mounted = bundle.mount(&root(), &MountOptions::new()).unwrap();
    let decoded = decode(mounted.to_buffer(&EncodeOptions::default()).unwrap()).unwrap();

    assert_eq!(decoded, mounted);
    assert_eq!(decoded.addons(), ["file:///dir/b.node".to_string()]);
}

#[test]
fn test_unmount_restores_rooted_paths() {
    let mut bundle = Bundle::new();
    bundle
        .write(
            "/lib/foo.js",
            "foo",
            &WriteOptions::new().main().imports(
                TreeMap::from_value(&json!({ "x": { "asset": "/x.txt", "default": "/x.js" } }))
                    .unwrap(),
            ),
        )
        .unwrap()
        .write("/x.js", "x", &WriteOptions::new().alias("x"))
        .unwrap()
        .write("/x.txt", "x", &WriteOptions::new().asset())
        .unwrap();
    bundle.set_id(Some("app".into()));

    let options =
        MountOptions::new().with_condition("asset", Url::parse("https://cdn.example/a/").unwrap());
    let root = Url::parse("file:///srv/app/").unwrap();

    let mounted = bundle.mount(&root, &options).unwrap();
    assert_eq!(mounted.main(), Some("file:///srv/app/lib/foo.js"));

    let restored = mounted.unmount(&root, &options).unwrap();
    assert_eq!(restored, bundle);
}

#[test]
fn test_unmount_restores_escaped_paths() {
    let mut bundle = Bundle::new();
    bundle
        .write("/a b.js", "a", &WriteOptions::new().main())
        .unwrap()
        .write("/café/ñ.js", "n", &WriteOptions::new().addon())
        .unwrap();

    let mounted = bundle.mount(&root(), &MountOptions::new()).unwrap();
    assert_eq!(mounted.main(), Some("file:///dir/a%20b.js"));

    let restored = mounted.unmount(&root(), &MountOptions::new()).unwrap();
    let mut keys = restored.keys().collect::<Vec<_>>();
    keys.sort();
    assert_eq!(keys, vec!["/a b.js", "/café/ñ.js"]);
    assert_eq!(restored, bundle);
}

#[test]
fn test_mount_leaves_source_usable() {
    let mut bundle = Bundle::new();
    bundle.write("/a.js", "a", &WriteOptions::new()).unwrap();

    let mounted = bundle.mount(&root(), &MountOptions::new()).unwrap();
    bundle.write("/b.js", "b", &WriteOptions::new()).unwrap();

    assert_eq!(mounted.len(), 1);
    assert_eq!(bundle.len(), 2);
}
