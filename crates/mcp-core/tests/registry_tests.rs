//! Integration tests for loading and rendering through the public registry API.

use mcp_insight_core::{
    Error, NameSource, PromptTemplate, Registry, Resource, extract_variables,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

struct Fixture {
    _prompts: TempDir,
    _resources: TempDir,
    registry: Registry,
}

fn fixture() -> Fixture {
    let prompts = TempDir::new().unwrap();
    let resources = TempDir::new().unwrap();

    write(prompts.path(), "greet.txt", "greet\nSays hello\nHello {{name}}!");
    write(
        prompts.path(),
        "review/model_review.txt",
        "model_review\nReview a model\nModel docs:\n{{@model}}\n\nReview {{code}} for {{ audience }}.",
    );
    write(prompts.path(), "broken.txt", "broken\nonly two lines");
    write(resources.path(), "model.txt", "field docs");
    write(resources.path(), "nested/logic.txt", "system docs");

    let mut builder = Registry::builder();
    builder.load_resources(resources.path()).unwrap();
    builder.load_templates(prompts.path()).unwrap();

    Fixture {
        _prompts: prompts,
        _resources: resources,
        registry: builder.build(),
    }
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_greet_fixture_loads() {
    let fx = fixture();
    let greet = fx.registry.get_template("greet").unwrap();

    assert_eq!(greet.name(), "greet");
    assert_eq!(greet.description(), "Says hello");
    assert_eq!(greet.variables(), ["name"]);
}

#[test]
fn test_model_fixture_loads() {
    let fx = fixture();

    assert_eq!(
        fx.registry.get_resource("model"),
        Some(&Resource::new("model", "field docs"))
    );
    assert!(fx.registry.get_resource("missing").is_none());
    assert_eq!(fx.registry.get_resource("logic").unwrap().content, "system docs");
}

#[test]
fn test_malformed_template_skipped() {
    let fx = fixture();

    assert!(fx.registry.get_template("broken").is_none());
    assert_eq!(fx.registry.template_count(), 2);
    assert_eq!(fx.registry.resource_count(), 2);
}

#[test]
fn test_load_counts_committed_entries() {
    let prompts = TempDir::new().unwrap();
    write(prompts.path(), "a.txt", "a\nA\nbody");
    write(prompts.path(), "b.txt", "b\nB\nbody");
    write(prompts.path(), "c.txt", "too short");

    let mut builder = Registry::builder();
    assert_eq!(builder.load_templates(prompts.path()).unwrap(), 2);
}

#[test]
fn test_failed_load_keeps_previous_entries() {
    let good = TempDir::new().unwrap();
    write(good.path(), "model.txt", "field docs");

    let mut builder = Registry::builder();
    builder.load_resources(good.path()).unwrap();

    let err = builder
        .load_resources(good.path().join("does-not-exist"))
        .unwrap_err();
    assert!(matches!(err, Error::LoadFailed { .. }));

    let registry = builder.build();
    assert_eq!(registry.resource_count(), 1);
    assert!(registry.get_resource("model").is_some());
}

#[test]
fn test_first_line_name_source() {
    let prompts = TempDir::new().unwrap();
    write(prompts.path(), "file.txt", "Declared\nDesc\n{{x}}");

    let mut builder = Registry::builder().name_source(NameSource::FirstLine);
    builder.load_templates(prompts.path()).unwrap();
    let registry = builder.build();

    assert!(registry.get_template("Declared").is_some());
    assert!(registry.get_template("file").is_none());
}

#[test]
fn test_file_stem_name_source_ignores_first_line() {
    let prompts = TempDir::new().unwrap();
    write(prompts.path(), "file.txt", "Declared\nDesc\n{{x}}");

    let mut builder = Registry::builder();
    builder.load_templates(prompts.path()).unwrap();
    let registry = builder.build();

    assert!(registry.get_template("file").is_some());
    assert!(registry.get_template("Declared").is_none());
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_greet_renders() {
    let fx = fixture();
    let out = fx.registry.render("greet", &vars(&[("name", "World")])).unwrap();
    assert_eq!(out, "Hello World!");
}

#[test]
fn test_full_render_leaves_no_declared_placeholders() {
    let fx = fixture();
    let template = fx.registry.get_template("model_review").unwrap();

    let supplied: HashMap<String, String> = template
        .variables()
        .iter()
        .map(|v| (v.clone(), format!("<{v}>")))
        .collect();
    let out = fx.registry.render("model_review", &supplied).unwrap();

    assert!(out.contains("field docs"));
    for variable in template.variables() {
        assert!(!out.contains(&format!("{{{{{variable}}}}}")));
    }
    assert_eq!(
        out,
        "Model docs:\nfield docs\n\nReview <code> for <audience>."
    );
}

#[test]
fn test_each_omitted_variable_fails() {
    let fx = fixture();
    let all = vars(&[("code", "x"), ("audience", "y")]);

    for omitted in ["code", "audience"] {
        let mut partial = all.clone();
        partial.remove(omitted);

        match fx.registry.render("model_review", &partial).unwrap_err() {
            Error::MissingVariable { variable, template } => {
                assert_eq!(variable, omitted);
                assert_eq!(template, "model_review");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn test_value_containing_declared_placeholder_fails() {
    let fx = fixture();
    let input = vars(&[("code", "fn f() {}"), ("audience", "readers of {{code}}")]);

    match fx.registry.render("model_review", &input).unwrap_err() {
        Error::MissingVariable { variable, template } => {
            assert_eq!(variable, "code");
            assert_eq!(template, "model_review");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_value_containing_undeclared_placeholder_kept() {
    let fx = fixture();
    let out = fx
        .registry
        .render("greet", &vars(&[("name", "{{other}} and {{@model}}")]))
        .unwrap();
    assert_eq!(out, "Hello {{other}} and {{@model}}!");
}

#[test]
fn test_embed_after_stray_open_marker() {
    let mut builder = Registry::builder();
    builder
        .insert_resource(Resource::new("model", "field docs"))
        .insert_template(PromptTemplate::new("t", "d", "a {{ b {{@model}} c"));
    let registry = builder.build();

    let out = registry.render("t", &HashMap::new()).unwrap();
    assert_eq!(out, "a {{ b field docs c");
}

#[test]
fn test_unknown_embed_reports_name() {
    let mut builder = Registry::builder();
    builder.insert_template(PromptTemplate::new("t", "d", "before {{@Unknown}} after"));
    let registry = builder.build();

    let out = registry.render("t", &HashMap::new()).unwrap();
    assert!(out.contains("Unknown"));
    assert_eq!(out, "before [Resource 'Unknown' not found] after");
}

#[test]
fn test_render_unknown_template() {
    let fx = fixture();
    let err = fx.registry.render("nope", &HashMap::new()).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_render_is_repeatable() {
    let fx = fixture();
    let input = vars(&[("name", "World")]);
    let first = fx.registry.render("greet", &input).unwrap();
    let second = fx.registry.render("greet", &input).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_concurrent_renders_share_registry() {
    let fx = fixture();
    let registry = std::sync::Arc::new(fx.registry);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = std::sync::Arc::clone(&registry);
            std::thread::spawn(move || {
                let name = format!("caller-{i}");
                registry.render("greet", &vars(&[("name", name.as_str())])).unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("Hello caller-{i}!"));
    }
}

// ============================================================================
// Scanning and descriptors
// ============================================================================

#[test]
fn test_extract_variables_order() {
    assert_eq!(extract_variables("{{b}}{{a}}{{b}}"), ["b", "a"]);
}

#[test]
fn test_prompt_descriptors_mirror_templates() {
    let fx = fixture();
    let descriptors = fx.registry.prompt_descriptors();

    assert_eq!(descriptors.len(), 2);
    let review = descriptors.iter().find(|d| d.name == "model_review").unwrap();
    assert_eq!(review.description, "Review a model");
    assert_eq!(review.arguments, vec!["code", "audience"]);
}
