use super::*;

fn tri(s: &str) -> Trigram {
    let b = s.as_bytes();
    Trigram::from_bytes(b[0], b[1], b[2])
}

#[test]
fn trigram_bytes_roundtrip() {
    for (b0, b1, b2) in [(b'a', b'b', b'c'), (0, 0, 0), (255, 1, 2)] {
        let t = Trigram::from_bytes(b0, b1, b2);
        assert_eq!(t.to_bytes(), [b0, b1, b2]);
        assert_eq!(t.as_u32() >> 24, 0, "upper byte stays clear");
    }
}

#[test]
fn index_trigrams_sliding_window() {
    let got = index_trigrams("setup");
    let mut expected = vec![tri("set"), tri("etu"), tri("tup")];
    expected.sort_unstable();
    assert_eq!(got, expected);
}

#[test]
fn index_trigrams_dedups_repeats() {
    // "aaaa" has two identical windows
    assert_eq!(index_trigrams("aaaa"), vec![tri("aaa")]);
}

#[test]
fn short_texts_have_no_trigrams() {
    for s in ["", "a", "ab"] {
        assert!(index_trigrams(s).is_empty(), "{s:?}");
        assert!(query_trigrams(s).is_empty(), "{s:?}");
    }
}

#[test]
fn query_trigrams_are_a_subset_of_index_trigrams() {
    for needle in ["steam", "commands", "setup.exe", "abc", "downloads/steamsetup2"] {
        let all = index_trigrams(needle);
        let q = query_trigrams(needle);
        assert!(!q.is_empty());
        for t in &q {
            assert!(all.binary_search(t).is_ok(), "{needle}: {t:?} not in index set");
        }
    }
}

#[test]
fn query_trigrams_cover_the_tail() {
    let mut expected = vec![tri("com"), tri("man"), tri("nds")];
    expected.sort_unstable();
    assert_eq!(query_trigrams("commands").to_vec(), expected);

    // Exact multiple of three adds no tail window
    let mut expected = vec![tri("abc"), tri("def")];
    expected.sort_unstable();
    assert_eq!(query_trigrams("abcdef").to_vec(), expected);
}

#[test]
fn multibyte_text_is_indexed_by_bytes() {
    let s = "загрузки";
    let all = index_trigrams(s);
    assert!(!all.is_empty());
    assert_eq!(all.len(), {
        let mut v: Vec<_> = s.as_bytes().windows(3).collect();
        v.sort_unstable();
        v.dedup();
        v.len()
    });
}
