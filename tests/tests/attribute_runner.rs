use mart::{Config, Filter, Format, Mart, RunStats};
use mart_core::err;
use pretty_assertions::assert_eq;
use tests::fixtures::{self, rows, NULL};

const PAGE_SQL: &str = "SELECT human_gene__main.name, human_gene__main.gene_id \
                        FROM human_gene__main";

fn config() -> Config {
    Config::new()
        .batch_size(2)
        .max_batch_size(4)
        .id_list_batch_size(2)
}

async fn run(mart: &Mart, query: &mart::Query, format: &Format) -> (mart::Result<RunStats>, String) {
    let mut out = vec![];
    let result = mart.execute(query, format, &mut out).await;
    (result, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn pages_by_key_and_skips_rows_already_written() {
    let driver = fixtures::gene_driver();
    driver.push_rows(rows(&["name", "gene_id"], &[&["a", "1"], &["b", "2"]]));
    driver.push_rows(rows(
        &["name", "gene_id"],
        &[&["b", "2"], &["b2", "2"], &["c", "3"]],
    ));

    let mart = Mart::new(driver.clone(), config());
    let query = fixtures::gene_query().with_attribute("name");

    let (stats, out) = run(&mart, &query, &Format::tsv()).await;

    assert_eq!(stats.unwrap(), RunStats { rows: 4, batches: 2 });
    assert_eq!(out, "a\nb\nb2\nc\n");
    assert_eq!(
        driver.log().queries(),
        [
            (
                format!("{PAGE_SQL} ORDER BY human_gene__main.gene_id LIMIT 2"),
                vec![],
            ),
            (
                format!(
                    "{PAGE_SQL} WHERE human_gene__main.gene_id >= ? \
                     ORDER BY human_gene__main.gene_id LIMIT 4"
                ),
                vec!["2".to_string()],
            ),
        ]
    );
}

#[tokio::test]
async fn batch_size_doubles_up_to_the_maximum() {
    let driver = fixtures::gene_driver();
    driver.push_rows(rows(&["name", "gene_id"], &[&["a", "1"], &["b", "2"]]));
    driver.push_rows(rows(
        &["name", "gene_id"],
        &[&["b", "2"], &["c", "3"], &["d", "4"], &["e", "5"]],
    ));
    driver.push_rows(rows(&["name", "gene_id"], &[&["e", "5"], &["f", "6"]]));

    let mart = Mart::new(driver.clone(), config());
    let query = fixtures::gene_query().with_attribute("name");

    let (stats, out) = run(&mart, &query, &Format::tsv()).await;

    assert_eq!(stats.unwrap(), RunStats { rows: 6, batches: 3 });
    assert_eq!(out, "a\nb\nc\nd\ne\nf\n");

    let limits: Vec<_> = driver
        .log()
        .queries()
        .iter()
        .map(|(sql, _)| sql.rsplit(' ').next().unwrap().to_string())
        .collect();
    assert_eq!(limits, ["2", "4", "4"]);
}

#[tokio::test]
async fn full_batch_of_redundant_rows_ends_quietly_when_short() {
    let driver = fixtures::gene_driver();
    driver.push_rows(rows(&["name", "gene_id"], &[&["a", "1"], &["b", "2"]]));
    driver.push_rows(rows(&["name", "gene_id"], &[&["b", "2"]]));

    let mart = Mart::new(driver.clone(), config());
    let query = fixtures::gene_query().with_attribute("name");

    let (stats, out) = run(&mart, &query, &Format::tsv()).await;

    assert_eq!(stats.unwrap(), RunStats { rows: 2, batches: 2 });
    assert_eq!(out, "a\nb\n");
}

#[tokio::test]
async fn key_shared_by_a_whole_batch_is_an_error() {
    let driver = fixtures::gene_driver();
    let config = Config::new().batch_size(2).max_batch_size(2);
    driver.push_rows(rows(&["name", "gene_id"], &[&["a", "1"], &["b", "1"]]));
    driver.push_rows(rows(&["name", "gene_id"], &[&["a", "1"], &["b", "1"]]));

    let mart = Mart::new(driver, config);
    let query = fixtures::gene_query().with_attribute("name");

    let (stats, out) = run(&mart, &query, &Format::tsv()).await;

    assert!(stats.unwrap_err().is_invalid_result());
    assert_eq!(out, "a\nb\n");
}

#[tokio::test]
async fn user_limit_runs_a_single_statement() {
    let driver = fixtures::gene_driver();
    driver.push_rows(rows(
        &["name", "gene_id"],
        &[&["a", "1"], &["b", "2"], &["c", "3"]],
    ));

    let mart = Mart::new(driver.clone(), config());
    let query = fixtures::gene_query().with_attribute("name").with_limit(3);

    let (stats, out) = run(&mart, &query, &Format::tsv()).await;

    assert_eq!(stats.unwrap(), RunStats { rows: 3, batches: 1 });
    assert_eq!(out, "a\nb\nc\n");
    assert_eq!(
        driver.log().queries()[0].0,
        format!("{PAGE_SQL} ORDER BY human_gene__main.gene_id LIMIT 3")
    );
}

#[tokio::test]
async fn long_id_list_is_split_into_statements() {
    let driver = fixtures::gene_driver();
    driver.push_rows(rows(&["name", "gene_id"], &[&["a", "1"], &["b", "2"]]));
    driver.push_rows(rows(&["name", "gene_id"], &[&["c", "3"]]));

    let mart = Mart::new(driver.clone(), config());
    let query = fixtures::gene_query()
        .with_attribute("name")
        .with_filter(Filter::in_list("gene_id", ["1", "2", "3"]));

    let (stats, out) = run(&mart, &query, &Format::tsv()).await;

    assert_eq!(stats.unwrap(), RunStats { rows: 3, batches: 2 });
    assert_eq!(out, "a\nb\nc\n");
    assert_eq!(
        driver.log().queries(),
        [
            (
                format!("{PAGE_SQL} WHERE human_gene__main.gene_id IN (?, ?)"),
                vec!["1".to_string(), "2".to_string()],
            ),
            (
                format!("{PAGE_SQL} WHERE human_gene__main.gene_id IN (?)"),
                vec!["3".to_string()],
            ),
        ]
    );
}

#[tokio::test]
async fn long_id_list_with_a_limit_is_sent_whole() {
    let driver = fixtures::gene_driver();

    let mart = Mart::new(driver.clone(), config());
    let query = fixtures::gene_query()
        .with_attribute("name")
        .with_filter(Filter::in_list("gene_id", ["1", "2", "3"]))
        .with_limit(10);

    let (stats, out) = run(&mart, &query, &Format::tsv()).await;

    assert_eq!(stats.unwrap(), RunStats { rows: 0, batches: 1 });
    assert_eq!(out, "");

    let queries = driver.log().queries();
    assert_eq!(queries[0].1, ["1", "2", "3"]);
}

#[tokio::test]
async fn two_long_id_lists_are_rejected() {
    let driver = fixtures::gene_driver();

    let mart = Mart::new(driver.clone(), config());
    let query = fixtures::gene_query()
        .with_attribute("name")
        .with_filter(Filter::in_list("gene_id", ["1", "2", "3"]))
        .with_filter(Filter::in_list("chr_name", ["1", "2", "X"]));

    let (stats, _) = run(&mart, &query, &Format::tsv()).await;

    assert!(stats.unwrap_err().is_invalid_query());
    assert_eq!(driver.connects(), 0);
}

#[tokio::test]
async fn key_column_is_left_out_and_nulls_are_empty() {
    let driver = fixtures::gene_driver();
    driver.push_rows(rows(
        &["name", "chr_name", "gene_id"],
        &[&[NULL, "13", "1"], &["BRCA2", NULL, "2"]],
    ));

    let mart = Mart::new(driver, config().batch_size(10));
    let query = fixtures::gene_query()
        .with_attribute("name")
        .with_attribute("chr_name");

    let (stats, out) = run(&mart, &query, &Format::csv()).await;

    assert_eq!(stats.unwrap().rows, 2);
    assert_eq!(out, ",13\nBRCA2,\n");
}

#[tokio::test]
async fn non_integer_key_is_an_invalid_result() {
    let driver = fixtures::gene_driver();
    driver.push_rows(rows(&["name", "gene_id"], &[&["a", "ENSG1"]]));

    let mart = Mart::new(driver, config());
    let query = fixtures::gene_query().with_attribute("name");

    let (stats, out) = run(&mart, &query, &Format::tsv()).await;

    let error = stats.unwrap_err();
    assert!(error.is_invalid_result());
    assert!(error.to_string().contains("ENSG1"));
    assert_eq!(out, "");
}

#[tokio::test]
async fn query_errors_propagate() {
    let driver = fixtures::gene_driver();
    driver.push_error(err!("lost connection"));

    let mart = Mart::new(driver, config());
    let query = fixtures::gene_query().with_attribute("name");

    let (stats, _) = run(&mart, &query, &Format::tsv()).await;

    assert_eq!(stats.unwrap_err().to_string(), "lost connection");
}
