//! Tests for the registry loader.

use std::fs;

use tempfile::TempDir;

use super::*;
use crate::schema::DocumentKind;

const FUNNEL_YAML: &str = r#"
apiVersion: v1
kind: FunnelSchema
metadata:
  id: meta-ecommerce
  name: Meta e-commerce
  source: meta
  vertical: ecommerce
spec:
  primary_kpi: purchase
  stages:
    - name: Impressions
      metric: impressions
      source: insights
    - name: Purchases
      metric: purchase
      source: actions
"#;

const BENCHMARKS_YAML: &str = r#"
apiVersion: v1
kind: VerticalBenchmarks
metadata:
  id: ecommerce
  name: E-commerce
  vertical: ecommerce
spec:
  stages:
    purchase:
      variance_percent: 20
"#;

fn temp_loader() -> (TempDir, RegistryLoader) {
    let dir = TempDir::new().expect("create tempdir");
    let loader = RegistryLoader::new(dir.path());
    (dir, loader)
}

fn count(results: &[LoadResult], pred: impl Fn(&LoadStatus) -> bool) -> usize {
    results.iter().filter(|r| pred(&r.status)).count()
}

#[test]
fn load_document_from_file() {
    let (dir, loader) = temp_loader();
    let path = dir.path().join("meta.yml");
    fs::write(&path, FUNNEL_YAML).unwrap();

    let doc = loader.load_file(&path).unwrap();
    assert_eq!(doc.metadata().id, "meta-ecommerce");
    assert_eq!(doc.kind(), DocumentKind::FunnelSchema);
}

#[test]
fn load_all_skips_dotfiles_and_non_yaml() {
    let (dir, mut loader) = temp_loader();
    fs::write(dir.path().join("meta.yml"), FUNNEL_YAML).unwrap();
    fs::write(dir.path().join("ecommerce.yaml"), BENCHMARKS_YAML).unwrap();
    fs::write(dir.path().join(".hidden.yml"), FUNNEL_YAML).unwrap();
    fs::write(dir.path().join("readme.txt"), "not a document").unwrap();

    let results = loader.load_all().unwrap();
    assert_eq!(count(&results, LoadStatus::is_loaded), 2);
    assert_eq!(count(&results, |s| matches!(s, LoadStatus::Skipped { .. })), 2);
    assert_eq!(count(&results, LoadStatus::is_failed), 0);

    let registry = loader.registry();
    assert!(registry.funnel("meta", "ecommerce").is_ok());
    assert!(registry.benchmarks("meta", "ecommerce").is_some());
}

#[test]
fn load_all_recurses_into_subdirectories() {
    let (dir, mut loader) = temp_loader();
    let funnels = dir.path().join("funnels");
    fs::create_dir(&funnels).unwrap();
    fs::write(funnels.join("meta.yml"), FUNNEL_YAML).unwrap();

    let results = loader.load_all().unwrap();
    assert_eq!(count(&results, LoadStatus::is_loaded), 1);
    assert!(loader.documents().contains_key("meta-ecommerce"));
}

#[test]
fn invalid_documents_fail_without_aborting() {
    let (dir, mut loader) = temp_loader();
    fs::write(dir.path().join("a-good.yml"), FUNNEL_YAML).unwrap();
    fs::write(dir.path().join("b-broken.yml"), "kind: [unterminated").unwrap();
    fs::write(
        dir.path().join("c-bad-kpi.yml"),
        FUNNEL_YAML
            .replace("id: meta-ecommerce", "id: meta-bad")
            .replace("primary_kpi: purchase", "primary_kpi: purchases"),
    )
    .unwrap();

    let results = loader.load_all().unwrap();
    assert_eq!(count(&results, LoadStatus::is_loaded), 1);
    assert_eq!(count(&results, LoadStatus::is_failed), 2);

    let bad_kpi = results
        .iter()
        .find(|r| r.path.ends_with("c-bad-kpi.yml"))
        .unwrap();
    match &bad_kpi.status {
        LoadStatus::Failed { error } => assert!(error.contains("primary_kpi"), "got: {error}"),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn duplicate_ids_keep_first_file() {
    let (dir, mut loader) = temp_loader();
    fs::write(dir.path().join("a.yml"), FUNNEL_YAML).unwrap();
    fs::write(
        dir.path().join("b.yml"),
        FUNNEL_YAML.replace("primary_kpi: purchase", "primary_kpi: impressions"),
    )
    .unwrap();

    let results = loader.load_all().unwrap();
    assert_eq!(count(&results, LoadStatus::is_loaded), 1);
    assert!(results[1].status.is_failed());

    let registry = loader.registry();
    assert_eq!(registry.funnel("meta", "ecommerce").unwrap().primary_kpi, "purchase");
}

#[test]
fn missing_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut loader = RegistryLoader::new(dir.path().join("nope"));
    assert!(matches!(loader.load_all(), Err(RegistryError::Io(_))));
}

#[test]
fn empty_id_rejected() {
    let yaml = FUNNEL_YAML.replace("id: meta-ecommerce", "id: \"\"");
    assert!(matches!(parse_document(&yaml), Err(RegistryError::Validation(_))));
}
