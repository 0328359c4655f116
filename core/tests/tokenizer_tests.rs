use linkage_core::tokenizer::{tokenize, Normalization, TokenSet, Tokenizer};

fn set(items: &[&str]) -> TokenSet {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn it_strips_punctuation_and_keeps_accents() {
    let toks = tokenize(Some("Pédram Navid, P]]dram"), 3);
    assert_eq!(toks, set(&["péd", "édr", "ram", "nav", "avi", "vid", "pdr", "dra", "amn", "mna"]));
}

#[test]
fn it_bounds_token_length_by_n() {
    let inputs = ["Jennifer Widom, Hector Garcia-Molina", "A. Ng", "", "Ö, Ä Ü", "x,y,,z"];
    for n in 1..=12 {
        for text in inputs {
            let toks = tokenize(Some(text), n);
            assert!(toks.iter().all(|t| !t.is_empty() && t.chars().count() <= n), "{text:?} n={n}");
        }
    }
}

#[test]
fn it_never_spans_two_names() {
    let toks = tokenize(Some("Abcde, Fghij"), 4);
    assert_eq!(toks, set(&["abcd", "bcde", "fghi", "ghij"]));
}

#[test]
fn it_is_deterministic() {
    let text = "Serge Abiteboul, Victor Vianu, Jennifer Widom";
    assert_eq!(tokenize(Some(text), 10), tokenize(Some(text), 10));
}

#[test]
fn it_can_preserve_punctuation() {
    let tk = Tokenizer::new(3, Normalization::Preserve).unwrap();
    let toks = tk.tokenize(Some("O'Neil"));
    assert!(toks.contains("o'n"));
    assert!(!tokenize(Some("O'Neil"), 3).contains("o'n"));
}
