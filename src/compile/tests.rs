use super::{plan, run, Change, ChangeSet, Task};
use crate::{
    config::{Config, Opts, ProjectConfig},
    ext::fs,
    pipeline::{describe, Pipeline},
    signal::{Outcome, Product, ProductSet},
};
use camino::{Utf8Path, Utf8PathBuf};
use temp_dir::TempDir;

fn utf8(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
}

/// A scratch copy of the example project
async fn fixture() -> (TempDir, Utf8PathBuf) {
    let dir = TempDir::new().unwrap();
    let root = utf8(&dir);
    let example = Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("example");
    fs::mirror(&example.join("app"), &root.join("app"))
        .await
        .unwrap();
    std::fs::copy(example.join("forge.toml"), root.join("forge.toml")).unwrap();
    (dir, root)
}

fn load(root: &Utf8Path, production: bool) -> Config {
    let opts = Opts {
        production,
        ..Default::default()
    };
    Config::load(&opts, root, Utf8Path::new("forge.toml")).unwrap()
}

fn read(path: Utf8PathBuf) -> String {
    std::fs::read_to_string(path).unwrap()
}

async fn build(conf: &Config) -> ProductSet {
    match run(conf, plan(conf, None)).await.unwrap() {
        Outcome::Success(set) => set,
        other => panic!("build did not succeed: {other:?}"),
    }
}

#[tokio::test]
async fn development_plan() {
    let (_dir, root) = fixture().await;
    let conf = load(&root, false);
    let steps = plan(&conf, None).ordered().unwrap();
    insta::assert_snapshot!(describe(&steps), @"main.css -> libs.js -> main.js -> view -> font -> image");
}

#[tokio::test]
async fn production_plan_versions_after_every_build_step() {
    let (_dir, root) = fixture().await;
    let conf = load(&root, true);
    let steps = plan(&conf, None).ordered().unwrap();
    insta::assert_snapshot!(describe(&steps), @"main.css -> libs.js -> main.js -> view -> font -> image -> compare (after main.css, libs.js, main.js, view, font, image) -> version (after compare) -> dump (after version)");
}

#[tokio::test]
async fn plan_keeps_only_changed_steps() {
    let (_dir, root) = fixture().await;
    let conf = load(&root, false);
    let mut changes = ChangeSet::default();
    changes.add(Change::Step("main.css".to_string()));
    changes.add(Change::Step("image".to_string()));
    assert_eq!(plan(&conf, Some(&changes)).names(), ["main.css", "image"]);

    changes.add(Change::All);
    assert_eq!(plan(&conf, Some(&changes)).names().len(), 6);
}

#[tokio::test]
async fn development_build_writes_the_site() {
    let (_dir, root) = fixture().await;
    let conf = load(&root, false);
    let set = build(&conf).await;

    let build_dir = root.join("target/build");
    assert_eq!(
        fs::files_under(&build_dir)
            .unwrap()
            .iter()
            .map(|f| f.strip_prefix(&build_dir).unwrap().to_string())
            .collect::<Vec<_>>(),
        [
            "about/index.html",
            "common/fonts/regular.woff",
            "common/images/logo.svg",
            "css/main.css",
            "index.html",
            "js/libs.js",
            "js/main.js",
        ]
    );
    assert!(set.contains(&Product::Style("css/main.css".to_string())));
    assert!(set.contains(&Product::Copy("view".to_string())));

    let css = read(build_dir.join("css/main.css"));
    assert!(css.find("body").unwrap() < css.find(".header").unwrap());

    let js = read(build_dir.join("js/main.js"));
    assert_eq!(
        js,
        "// app entry\nvar app = { started: false };\n\n// creative\napp.started = true;\n"
    );
    assert!(!root.join("target/production").exists());
    assert_eq!(
        read(build_dir.join("index.html")),
        read(root.join("app/index.html"))
    );
}

#[tokio::test]
async fn second_build_without_changes_produces_nothing() {
    let (_dir, root) = fixture().await;
    let conf = load(&root, false);
    assert!(!build(&conf).await.is_empty());
    assert!(build(&conf).await.is_empty());
}

#[tokio::test]
async fn production_build_versions_and_dumps() {
    let (_dir, root) = fixture().await;
    let conf = load(&root, true);
    let set = build(&conf).await;
    assert!(set.contains(&Product::Version));
    assert!(set.contains(&Product::Dump));

    let prod = root.join("target/production");
    let html = read(prod.join("index.html"));
    let versioned = regex::Regex::new(r"https://example\.com/root/css/main\.css\?(\d+)").unwrap();
    let code: u32 = versioned.captures(&html).unwrap()[1].parse().unwrap();
    assert!((1..=10000).contains(&code));
    assert!(html.contains(&format!("js/main.js?{code}")));
    assert!(html.contains(&format!("common/images/logo.svg?{code}")));

    let css = read(prod.join("css/main.css"));
    assert!(css.contains(&format!("logo.svg?{code}")));

    let dev_len = "// app entry\nvar app = { started: false };\n\n// creative\napp.started = true;\n".len();
    assert!(read(prod.join("js/main.js")).len() < dev_len);
    assert_eq!(html, read(root.join("target/build/index.html")));
}

#[tokio::test]
async fn second_dump_versions_only_changed_files() {
    let (_dir, root) = fixture().await;
    let conf = load(&root, true);
    build(&conf).await;
    let prod = root.join("target/production");
    let first_js = read(prod.join("js/main.js"));

    std::fs::write(
        root.join("app/js/app.js"),
        "// app entry\nvar app = { started: false, build: 2 };\n",
    )
    .unwrap();
    let page = read(root.join("app/index.html")).replace("js/main.js", "js/main.js?99");
    std::fs::write(root.join("app/index.html"), page).unwrap();

    let set = build(&conf).await;
    assert!(set.contains(&Product::Version));
    assert!(set.contains(&Product::Dump));

    let html = read(prod.join("index.html"));
    let versioned = regex::Regex::new(r"https://example\.com/root/js/main\.js\?(\d+)").unwrap();
    let code: u32 = versioned.captures(&html).unwrap()[1].parse().unwrap();
    assert!((1..=10000).contains(&code));
    assert!(html.contains(&format!(r#"js/main.js?{code}""#)));
    assert!(!html.contains("?99"));
    // unchanged since the first dump
    assert!(html.contains(r#"js/libs.js""#));
    assert!(html.contains(r#"common/images/logo.svg""#));

    assert_ne!(read(prod.join("js/main.js")), first_js);
    assert_eq!(html, read(root.join("target/build/index.html")));
}

#[tokio::test]
async fn missing_sources_are_skipped() {
    let dir = TempDir::new().unwrap();
    let root = utf8(&dir);
    std::fs::create_dir_all(root.join("app/js")).unwrap();
    std::fs::write(root.join("app/js/b.js"), "var b;").unwrap();

    let project = ProjectConfig::parse(
        r#"
[[bundle]]
name = "all.js"
files = ["js/a.js", "js/b.js"]

[[bundle]]
name = "none.css"
files = ["css/gone.css"]
"#,
    )
    .unwrap();
    let conf = Config::resolve(project, &root, false).unwrap();
    let set = build(&conf).await;

    assert!(set.contains(&Product::Script("all.js".to_string())));
    assert_eq!(read(root.join("build/all.js")), "var b;");
    assert!(!root.join("build/none.css").exists());
}

#[tokio::test]
async fn failing_step_is_named() {
    let (_dir, root) = fixture().await;
    let conf = load(&root, true);
    let pipeline = Pipeline::new().step("version", &[], Task::Version);
    let err = run(&conf, pipeline).await.unwrap_err();
    assert!(format!("{err:?}").contains(r#"step "version""#));
}
