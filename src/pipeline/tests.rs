use super::{describe, Pipeline};

fn names<T>(steps: &[super::Step<T>]) -> Vec<&str> {
    steps.iter().map(|s| s.name.as_str()).collect()
}

#[test]
fn independent_steps_keep_declaration_order() {
    let steps = Pipeline::new()
        .step("main.css", &[], 1)
        .step("libs.js", &[], 2)
        .step("view", &[], 3)
        .ordered()
        .unwrap();
    assert_eq!(names(&steps), ["main.css", "libs.js", "view"]);
    assert_eq!(steps[2].task, 3);
}

#[test]
fn predecessors_run_first() {
    let steps = Pipeline::new()
        .step("dump", &["version"], ())
        .step("version", &["compare"], ())
        .step("main.css", &[], ())
        .step("compare", &["main.css", "font"], ())
        .step("font", &[], ())
        .ordered()
        .unwrap();
    assert_eq!(
        names(&steps),
        ["main.css", "font", "compare", "version", "dump"]
    );
    insta::assert_snapshot!(
        describe(&steps),
        @"main.css -> font -> compare (after main.css, font) -> version (after compare) -> dump (after version)"
    );
}

#[test]
fn duplicate_names_are_rejected() {
    let err = Pipeline::new()
        .step("view", &[], ())
        .step("view", &[], ())
        .ordered()
        .unwrap_err();
    assert!(err.to_string().contains("declared twice"));
}

#[test]
fn unknown_predecessor_is_rejected() {
    let err = Pipeline::new()
        .step("version", &["compare"], ())
        .ordered()
        .unwrap_err();
    assert!(err.to_string().contains(r#"unknown step "compare""#));
}

#[test]
fn cycles_are_rejected() {
    let err = Pipeline::new()
        .step("a", &["b"], ())
        .step("b", &["a"], ())
        .step("c", &[], ())
        .ordered()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Pipeline has a dependency cycle between: a, b"
    );
}

#[test]
fn empty_pipeline_orders_to_nothing() {
    let pipeline: Pipeline<()> = Pipeline::new();
    assert!(pipeline.is_empty());
    assert!(pipeline.ordered().unwrap().is_empty());
}
