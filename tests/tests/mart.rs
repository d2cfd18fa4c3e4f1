use mart::{Config, Mart};
use pretty_assertions::assert_eq;
use tests::fixtures;

#[tokio::test]
async fn compile_shares_caches_across_clones() {
    let driver = fixtures::gene_driver();
    let mart = Mart::new(driver.clone(), Config::default());
    let other = mart.clone();

    let mut compiled = mart
        .compile(fixtures::gene_query().with_attribute("name"))
        .await
        .unwrap();
    assert_eq!(
        compiled.to_sql().unwrap(),
        "SELECT human_gene__main.name FROM human_gene__main"
    );

    other
        .compile(fixtures::gene_query().with_attribute("display_id"))
        .await
        .unwrap();
    assert_eq!(driver.connects(), 1);

    other.clear_caches();
    mart.compile(fixtures::gene_query().with_attribute("name"))
        .await
        .unwrap();
    assert_eq!(driver.connects(), 2);
}

#[tokio::test]
async fn cache_capacity_comes_from_config() {
    let driver = fixtures::gene_driver();
    let config = Config::new().cache_capacity(1.try_into().unwrap());
    let mart = Mart::new(driver.clone(), config);

    let human = fixtures::gene_query().with_attribute("name");
    let mouse = mart::Query::new()
        .with_star_bases(["mouse_gene"])
        .with_primary_keys(["gene_id"])
        .with_attribute("name");

    mart.compile(human.clone()).await.unwrap();
    mart.compile(mouse).await.unwrap();
    mart.compile(human).await.unwrap();

    assert_eq!(driver.connects(), 3);
    assert_eq!(mart.catalog().table_cache().len(), 1);
}

#[test]
fn unsupported_url_is_rejected() {
    let error = Mart::connect("oracle://localhost/mart", Config::default()).unwrap_err();
    assert!(error.is_invalid_connection_url());

    let error = Mart::connect("mysql://localhost", Config::default()).unwrap_err();
    assert!(error.is_invalid_connection_url());
}
