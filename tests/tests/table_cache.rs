use mart_core::{err, Query};
use mart_sql::{Catalog, TableCache};
use pretty_assertions::assert_eq;
use std::{num::NonZeroUsize, sync::Arc};
use tests::{fixtures, DriverOp, MockDriver};

#[tokio::test]
async fn discovers_tables_by_star_base_prefix() {
    let driver = fixtures::gene_driver();
    let cache = TableCache::default();
    let shape = fixtures::gene_query().shape();

    let tables = cache.get(&shape, &driver).await.unwrap();

    let names: Vec<_> = tables.iter().map(|table| table.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "human_gene__main",
            "human_gene__exon__dm",
            "human_gene__xref__dm",
            "human_gene__structure__dm",
        ]
    );
    assert_eq!(tables[1].columns, ["gene_id", "rank", "exon_id"]);
    assert_eq!(tables[1].shortcut, "exon__dm");

    assert_eq!(driver.connects(), 1);
    assert_eq!(
        driver.log().ops(),
        [
            DriverOp::TableNames,
            DriverOp::ColumnNames("human_gene__main".into()),
            DriverOp::ColumnNames("human_gene__exon__dm".into()),
            DriverOp::ColumnNames("human_gene__xref__dm".into()),
            DriverOp::ColumnNames("human_gene__structure__dm".into()),
        ]
    );
}

#[tokio::test]
async fn star_base_match_ignores_case() {
    let driver = MockDriver::new()
        .with_table("Human_Gene__main", &["gene_id"])
        .with_table("human_genes", &["id"])
        .with_table("hum", &["id"]);
    let cache = TableCache::default();

    let tables = cache
        .get(&fixtures::gene_query().shape(), &driver)
        .await
        .unwrap();

    let names: Vec<_> = tables.iter().map(|table| table.name.as_str()).collect();
    assert_eq!(names, ["Human_Gene__main", "human_genes"]);
}

#[tokio::test]
async fn second_lookup_is_served_from_cache() {
    let driver = fixtures::gene_driver();
    let cache = TableCache::default();
    let shape = fixtures::gene_query().shape();

    let first = cache.get(&shape, &driver).await.unwrap();
    let reads = driver.log().metadata_reads();

    let second = cache.get(&shape, &driver).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(driver.log().metadata_reads(), reads);
    assert_eq!(driver.connects(), 1);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn shapes_differing_in_key_order_are_cached_apart() {
    let driver = fixtures::gene_driver();
    let cache = TableCache::default();

    let a = Query::new()
        .with_star_bases(["human_gene"])
        .with_primary_keys(["gene_id", "transcript_id"]);
    let b = Query::new()
        .with_star_bases(["human_gene"])
        .with_primary_keys(["transcript_id", "gene_id"]);

    cache.get(&a.shape(), &driver).await.unwrap();
    cache.get(&b.shape(), &driver).await.unwrap();

    assert_eq!(driver.connects(), 2);
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn metadata_errors_propagate_and_are_not_cached() {
    let driver = fixtures::gene_driver();
    let cache = TableCache::default();
    let shape = fixtures::gene_query().shape();

    driver.fail_table_names(Some(err!("connection reset")));

    let error = cache.get(&shape, &driver).await.unwrap_err();
    assert_eq!(error.to_string(), "connection reset");
    assert!(cache.cached(&shape).is_none());

    driver.fail_table_names(None);

    let tables = cache.get(&shape, &driver).await.unwrap();
    assert_eq!(tables.len(), 4);
    assert_eq!(driver.connects(), 2);
}

#[tokio::test]
async fn least_recently_used_shape_is_evicted() {
    let driver = fixtures::gene_driver();
    let cache = TableCache::new(NonZeroUsize::new(1).unwrap());

    let human = fixtures::gene_query().shape();
    let mouse = Query::new()
        .with_star_bases(["mouse_gene"])
        .with_primary_keys(["gene_id"])
        .shape();

    cache.get(&human, &driver).await.unwrap();
    cache.get(&mouse, &driver).await.unwrap();

    assert!(cache.cached(&human).is_none());
    assert!(cache.cached(&mouse).is_some());
}

#[tokio::test]
async fn catalog_reuses_mappers_until_cleared() {
    let driver = fixtures::gene_driver();
    let catalog = Catalog::new(Arc::new(driver.clone()), NonZeroUsize::new(8).unwrap());
    let query = fixtures::gene_query().with_attribute("name");

    let first = catalog.mappers_for(&query).await.unwrap();
    let second = catalog
        .mappers_for(&query.clone().with_attribute("rank"))
        .await
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(driver.connects(), 1);
    assert_eq!(catalog.mapper_cache().len(), 1);

    catalog.clear();
    assert!(catalog.table_cache().is_empty());
    assert!(catalog.mapper_cache().is_empty());

    catalog.mappers_for(&query).await.unwrap();
    assert_eq!(driver.connects(), 2);
}

#[tokio::test]
async fn candidates_are_main_then_dimension_then_join() {
    let driver = fixtures::gene_driver();
    let catalog = Catalog::new(Arc::new(driver), NonZeroUsize::new(8).unwrap());

    let mappers = catalog.mappers_for(&fixtures::gene_query()).await.unwrap();

    let tables: Vec<Vec<&str>> = mappers
        .iter()
        .map(|mapper| mapper.tables().iter().map(String::as_str).collect())
        .collect();

    assert_eq!(
        tables,
        [
            vec!["human_gene__main"],
            vec!["human_gene__exon__dm"],
            vec!["human_gene__xref__dm"],
            vec![
                "human_gene__main",
                "human_gene__exon__dm",
                "human_gene__xref__dm",
                "human_gene__structure__dm",
            ],
        ]
    );
    assert!(mappers.iter().all(|mapper| mapper.primary_key() == "gene_id"));
}

#[tokio::test]
async fn missing_main_table_is_a_schema_error() {
    let driver = fixtures::gene_driver();
    let catalog = Catalog::new(Arc::new(driver), NonZeroUsize::new(8).unwrap());

    let query = Query::new()
        .with_star_bases(["meta"])
        .with_primary_keys(["version"])
        .with_attribute("version");

    let error = catalog.compile(query).await.unwrap_err();
    assert!(error.is_invalid_schema());
    assert!(error.to_string().contains("meta_release"));
}
