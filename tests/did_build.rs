use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

use html_json_config::{
    extract, Blueprint, BlueprintEntry, BuildContext, Deferred, Error, JsonConfigPlugin,
    OutputDocument, PluginConfig,
};

const INTEGRITY: &str = "sha256-oqVuAfXRKap7fdgcCY5uykM6+R9GqQ8K/uxy9rx7HNQlGYl1kPzQho1wx4JwY8wC";

fn fixture_html() -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/dist/index.html");
    std::fs::read_to_string(path).unwrap()
}

/// Project root in a temp dir with the fixture page at `dist/index.html`.
fn project() -> TempDir {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir(root.path().join("dist")).unwrap();
    std::fs::write(root.path().join("dist/index.html"), fixture_html()).unwrap();
    root
}

fn context(root: &Path) -> BuildContext {
    BuildContext::new(root.join("build"), "/not/used")
}

async fn run(config: PluginConfig, root: &Path) -> html_json_config::Result<Vec<String>> {
    let mut plugin = JsonConfigPlugin::new("json-config", config);
    let context = context(root);
    plugin.configure(&context)?;
    Ok(plugin.did_build(&context).await?.dist_files)
}

fn read_output(path: PathBuf) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn relative_config(root: &Path) -> PluginConfig {
    let root: PathBuf = root.to_path_buf();
    PluginConfig::default()
        .with_dist_dir(Deferred::resolver(|_| PathBuf::from("dist")))
        .with_project_root(Deferred::resolver(move |_| root.clone()))
}

#[tokio::test]
async fn generates_index_json_from_index_html() {
    let root = project();
    run(relative_config(root.path()), root.path()).await.unwrap();

    let json = read_output(root.path().join("dist/index.json"));
    assert_eq!(json.as_object().unwrap().len(), 4);
    assert_eq!(json["base"][0], json!({ "href": "/" }));
    assert_eq!(
        json["meta"][0],
        json!({ "name": "my-app/config/environment", "content": "some-config-values" })
    );
    assert_eq!(
        json["link"][0],
        json!({ "rel": "stylesheet", "href": "assets/vendor.css", "integrity": INTEGRITY })
    );
    assert_eq!(json["link"][1], json!({ "rel": "stylesheet", "href": "assets/app.css" }));
    assert_eq!(json["link"].as_array().unwrap().len(), 2);
    assert_eq!(
        json["script"][0],
        json!({ "src": "assets/vendor.js", "integrity": INTEGRITY })
    );
    assert_eq!(json["script"][1], json!({ "src": "assets/app.js" }));
    assert_eq!(json["script"][2], json!({}));
}

#[tokio::test]
async fn output_preserves_key_and_field_order() {
    let root = project();
    run(relative_config(root.path()), root.path()).await.unwrap();

    let raw = std::fs::read_to_string(root.path().join("dist/index.json")).unwrap();
    let document: OutputDocument = serde_json::from_str(&raw).unwrap();

    assert_eq!(document.keys().collect::<Vec<_>>(), vec!["base", "meta", "link", "script"]);
    let vendor_css = &document.get("link").unwrap()[0];
    assert_eq!(vendor_css.keys().collect::<Vec<_>>(), vec!["rel", "href", "integrity"]);
    let meta = &document.get("meta").unwrap()[0];
    assert_eq!(meta.keys().collect::<Vec<_>>(), vec!["name", "content"]);
}

#[tokio::test]
async fn returns_the_output_file_name() {
    let root = project();
    let files = run(relative_config(root.path()), root.path()).await.unwrap();
    assert_eq!(files, vec!["index.json".to_string()]);
}

#[tokio::test]
async fn absolute_dist_dir_still_works() {
    let root = project();
    let config = PluginConfig::default()
        .with_dist_dir(root.path().join("dist"))
        .with_project_root("/somewhere/else");

    run(config, root.path()).await.unwrap();

    let json = read_output(root.path().join("dist/index.json"));
    assert_eq!(json.as_object().unwrap().len(), 4);
}

#[tokio::test]
async fn defaults_come_from_the_build_context() {
    let root = project();
    let mut plugin = JsonConfigPlugin::default();
    let context = BuildContext::new("dist", root.path());

    plugin.configure(&context).unwrap();
    let result = plugin.did_build(&context).await.unwrap();

    assert_eq!(result.dist_files, vec!["index.json".to_string()]);
    assert!(root.path().join("dist/index.json").is_file());
}

#[tokio::test]
async fn provides_the_contents_of_the_script_tag() {
    let root = project();
    let blueprint = Blueprint::new().with_entry(
        "script",
        BlueprintEntry::new("script").attributes(Vec::<String>::new()).include_content(true),
    );
    run(relative_config(root.path()).with_blueprint(blueprint), root.path())
        .await
        .unwrap();

    let json = read_output(root.path().join("dist/index.json"));
    assert_eq!(json.as_object().unwrap().len(), 1);
    assert_eq!(json["script"][0], json!({}));
    assert_eq!(json["script"][1], json!({}));
    assert_eq!(json["script"][2], json!({ "content": "var a = 'foo';" }));
}

#[tokio::test]
async fn custom_patterns_and_glob_input() {
    let root = project();
    let config = relative_config(root.path()).with_patterns("*.html", "meta/assets.json");

    let files = run(config, root.path()).await.unwrap();

    assert_eq!(files, vec!["meta/assets.json".to_string()]);
    let json = read_output(root.path().join("dist/meta/assets.json"));
    assert_eq!(json["script"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn missing_input_is_reported_and_nothing_written() {
    let root = project();
    let config = relative_config(root.path()).with_patterns("missing.html", "index.json");

    let err = run(config, root.path()).await.unwrap_err();

    assert!(matches!(err, Error::InputNotFound { .. }));
    assert!(!root.path().join("dist/index.json").exists());
}

#[tokio::test]
async fn bad_blueprint_fails_in_configure() {
    let root = project();
    let blueprint = Blueprint::from_json_str(r#"{"script": {"attributes": []}}"#).unwrap();

    let err = run(relative_config(root.path()).with_blueprint(blueprint), root.path())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(!root.path().join("dist/index.json").exists());
}

#[test]
fn extract_is_deterministic() {
    let html = fixture_html();
    let first = extract(&html, &Blueprint::builtin(), None).unwrap().to_json().unwrap();
    for _ in 0..5 {
        let again = extract(&html, &Blueprint::builtin(), None).unwrap().to_json().unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn override_with_attributes_and_content() {
    let html = fixture_html();
    let blueprint = Blueprint::new().with_entry(
        "script",
        BlueprintEntry::new("script").attributes(["src"]).include_content(true),
    );

    let out = extract(&html, &Blueprint::builtin(), Some(&blueprint)).unwrap();

    assert_eq!(
        out.to_json().unwrap(),
        r#"{"script":[{"src":"assets/vendor.js"},{"src":"assets/app.js"},{"content":"var a = 'foo';"}]}"#
    );
}
