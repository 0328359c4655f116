use anyhow::{bail, Context, Result};
use linkage_core::{CandidatePair, Corpus, Dataset, RecordId};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Load a dataset from `.csv`, `.json` (array of objects, or one object) or
/// `.jsonl`. The dataset is named after the file stem.
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("dataset").to_string();
    match path.extension().and_then(|s| s.to_str()) {
        Some("csv") => read_csv(path, name),
        Some("jsonl") => read_jsonl(path, name),
        Some("json") => read_json(path, name),
        _ => bail!("unsupported dataset format: {}", path.display()),
    }
}

fn read_csv(path: &Path, name: String) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut ds = Dataset::new(name, columns);
    for result in rdr.records() {
        let record = result.with_context(|| format!("failed to read row of {}", path.display()))?;
        // pandas reads empty cells as NaN; keep them absent
        ds.push_row(record.iter().map(|s| if s.is_empty() { None } else { Some(s.to_string()) }).collect());
    }
    Ok(ds)
}

fn read_jsonl(path: &Path, name: String) -> Result<Dataset> {
    let f = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut objects = Vec::new();
    for (lineno, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        match serde_json::from_str::<Value>(&line)? {
            Value::Object(obj) => objects.push(obj),
            _ => bail!("{}:{}: expected a JSON object", path.display(), lineno + 1),
        }
    }
    Ok(from_objects(name, objects))
}

fn read_json(path: &Path, name: String) -> Result<Dataset> {
    let f = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let json: Value = serde_json::from_reader(BufReader::new(f))?;
    let mut objects = Vec::new();
    match json {
        Value::Array(arr) => {
            for v in arr {
                match v {
                    Value::Object(obj) => objects.push(obj),
                    _ => bail!("{}: array elements must be objects", path.display()),
                }
            }
        }
        Value::Object(obj) => objects.push(obj),
        _ => bail!("{}: expected an array of objects", path.display()),
    }
    Ok(from_objects(name, objects))
}

fn from_objects(name: String, objects: Vec<Map<String, Value>>) -> Dataset {
    let mut columns: Vec<String> = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    let mut ds = Dataset::new(name, columns.clone());
    for mut obj in objects {
        ds.push_row(columns.iter().map(|c| obj.remove(c).and_then(cell_text)).collect());
    }
    ds
}

fn cell_text(v: Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s),
        // author lists given as arrays become the comma-separated form
        Value::Array(items) => {
            let parts: Vec<String> = items.into_iter().filter_map(cell_text).collect();
            Some(parts.join(", "))
        }
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Serialize)]
struct PairRow<'a> {
    token: &'a str,
    id_a: RecordId,
    id_b: RecordId,
    score: f64,
    external_a: Option<&'a str>,
    external_b: Option<&'a str>,
}

fn external(corpus: &Corpus, id: RecordId) -> Option<&str> {
    corpus.get(id).and_then(|r| r.external_id.as_deref())
}

fn rows<'a>(pairs: &'a [CandidatePair], corpus: &'a Corpus) -> impl Iterator<Item = PairRow<'a>> + 'a {
    pairs.iter().map(move |p| PairRow {
        token: &p.token,
        id_a: p.id_a,
        id_b: p.id_b,
        score: p.score,
        external_a: external(corpus, p.id_a),
        external_b: external(corpus, p.id_b),
    })
}

/// Write pairs as `.csv` or `.jsonl`, chosen by extension.
pub fn write_pairs(path: &Path, pairs: &[CandidatePair], corpus: &Corpus) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    match path.extension().and_then(|s| s.to_str()) {
        Some("csv") => {
            let mut writer = csv::Writer::from_path(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            for row in rows(pairs, corpus) {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        Some("jsonl") => {
            let f = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
            let mut out = BufWriter::new(f);
            for row in rows(pairs, corpus) {
                serde_json::to_writer(&mut out, &row)?;
                out.write_all(b"\n")?;
            }
            out.flush()?;
        }
        _ => bail!("unsupported output format: {}", path.display()),
    }
    Ok(())
}
