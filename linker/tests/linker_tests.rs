use linkage_core::persist::{load_meta, save_meta, IndexPaths};
use linkage_core::{NullSink, PipelineConfig};
use linker::io::read_dataset;
use linker::{build_snapshot, link, score_snapshot, PairFilter};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

const DBLP: &str = "\
id,title,authors,venue,year
conf/sigmod/Widom95,Research Problems in Data Warehousing,Jennifer Widom,SIGMOD,1995
conf/vldb/Gray81,The Transaction Concept,Jim Gray,VLDB,1981
conf/vldb/Nobody99,Untitled,,VLDB,1999
";

const ACM: &str = r#"[
  {"id": 501, "title": "Research problems in data warehousing", "authors": "J. Widom", "year": 1995},
  {"id": 502, "title": "The transaction concept: virtues and limitations", "authors": ["Jim Gray"], "year": 1981},
  {"id": 503, "title": "Something else", "authors": null}
]"#;

fn write_inputs(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let left = dir.join("dblp.csv");
    let right = dir.join("acm.json");
    fs::write(&left, DBLP).unwrap();
    fs::write(&right, ACM).unwrap();
    (left, right)
}

fn small_ngrams() -> PipelineConfig {
    PipelineConfig { ngram_size: 4, ..Default::default() }
}

#[test]
fn reads_csv_with_empty_cells_as_absent() {
    let dir = tempdir().unwrap();
    let (left, _) = write_inputs(dir.path());
    let ds = read_dataset(&left).unwrap();
    assert_eq!(ds.name(), "dblp");
    assert_eq!(ds.len(), 3);
    let authors = ds.column("authors").unwrap();
    assert_eq!(ds.value(0, authors), Some("Jennifer Widom"));
    assert_eq!(ds.value(2, authors), None);
}

#[test]
fn reads_json_and_jsonl_objects() {
    let dir = tempdir().unwrap();
    let (_, right) = write_inputs(dir.path());
    let ds = read_dataset(&right).unwrap();
    let id = ds.column("id").unwrap();
    let authors = ds.column("authors").unwrap();
    assert_eq!(ds.value(0, id), Some("501"));
    assert_eq!(ds.value(1, authors), Some("Jim Gray"));
    assert_eq!(ds.value(2, authors), None);

    let jsonl = dir.path().join("extra.jsonl");
    fs::write(&jsonl, "{\"title\": \"A\", \"authors\": \"X\"}\n\n{\"title\": \"B\"}\n").unwrap();
    let ds = read_dataset(&jsonl).unwrap();
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.value(1, ds.column("authors").unwrap()), None);
}

#[test]
fn rejects_unknown_formats() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.xml");
    fs::write(&path, "<x/>").unwrap();
    assert!(read_dataset(&path).is_err());
}

#[test]
fn link_writes_jsonl_pairs_with_external_ids() {
    let dir = tempdir().unwrap();
    let (left, right) = write_inputs(dir.path());
    let output = dir.path().join("out/pairs.jsonl");
    let filter = PairFilter { dedup: true, cross_only: true, ..Default::default() };
    let written = link(&left, &right, &output, small_ngrams(), &filter, &NullSink).unwrap();
    assert_eq!(written, 2);

    let rows: Vec<Value> = fs::read_to_string(&output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(rows.len(), 2);
    let widom = rows.iter().find(|r| r["external_a"] == "conf/sigmod/Widom95").unwrap();
    assert_eq!(widom["external_b"], "501");
    assert_eq!(widom["id_a"], 0);
    assert_eq!(widom["id_b"], 3);
    assert_eq!(widom["score"], 0.92);
}

#[test]
fn min_score_drops_weak_pairs() {
    let dir = tempdir().unwrap();
    let (left, right) = write_inputs(dir.path());
    let output = dir.path().join("pairs.csv");
    let filter = PairFilter { min_score: Some(0.9), dedup: true, cross_only: false };
    let written = link(&left, &right, &output, small_ngrams(), &filter, &NullSink).unwrap();
    assert_eq!(written, 1);

    let text = fs::read_to_string(&output).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("token,id_a,id_b,score,external_a,external_b"));
    let row = lines.next().unwrap();
    assert!(row.ends_with(",0,3,0.92,conf/sigmod/Widom95,501"), "{row}");
    assert_eq!(lines.next(), None);
}

#[test]
fn missing_authors_column_is_reported() {
    let dir = tempdir().unwrap();
    let left = dir.path().join("left.csv");
    fs::write(&left, "id,title\n1,A\n").unwrap();
    let (_, right) = write_inputs(dir.path());
    let err = link(&left, &right, &dir.path().join("o.csv"), small_ngrams(), &PairFilter::default(), &NullSink)
        .unwrap_err();
    assert!(err.to_string().contains("missing required field `authors`"));
}

#[test]
fn snapshot_scores_like_a_direct_link() {
    let dir = tempdir().unwrap();
    let (left, right) = write_inputs(dir.path());
    let snapshot = dir.path().join("index");

    let meta = build_snapshot(&left, &right, &snapshot, small_ngrams(), &NullSink).unwrap();
    assert_eq!(meta.num_records, 6);
    assert_eq!(meta.ngram_size, 4);
    assert_eq!(load_meta(&IndexPaths::new(&snapshot)).unwrap(), meta);
    assert!(OffsetDateTime::parse(&meta.created_at, &Rfc3339).is_ok(), "{}", meta.created_at);

    let direct = dir.path().join("direct.csv");
    let via_snapshot = dir.path().join("snapshot.csv");
    let filter = PairFilter::default();
    link(&left, &right, &direct, small_ngrams(), &filter, &NullSink).unwrap();
    score_snapshot(&snapshot, &via_snapshot, Some(1), &filter, &NullSink).unwrap();
    assert_eq!(fs::read_to_string(direct).unwrap(), fs::read_to_string(via_snapshot).unwrap());
}

#[test]
fn mismatched_snapshot_is_not_scored() {
    let dir = tempdir().unwrap();
    let (left, right) = write_inputs(dir.path());
    let snapshot = dir.path().join("index");

    let mut meta = build_snapshot(&left, &right, &snapshot, small_ngrams(), &NullSink).unwrap();
    meta.num_records = 3;
    save_meta(&IndexPaths::new(&snapshot), &meta).unwrap();

    let out = dir.path().join("pairs.csv");
    let err = score_snapshot(&snapshot, &out, Some(1), &PairFilter::default(), &NullSink).unwrap_err();
    assert!(format!("{err:#}").contains("inconsistent snapshot"), "{err:#}");
    assert!(!out.exists());
}
