//! Bulk extraction across the replies of a paginated query.
//!
//! # Design
//! An `RSet` is grown with one `push` per fetched page and only read after
//! that. Every extractor walks the replies in push order and, within a reply,
//! in document order, so results spanning several continuations come out in
//! the order the server produced them.
//!
//! The extractors are tolerant: an element lacking the requested field, or
//! carrying it with the wrong type, is skipped instead of failing the whole
//! listing. Skips are logged at `trace`.

use log::trace;

use crate::reply::Reply;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RSet {
    rl: Vec<Reply>,
}

impl RSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the reply of the next fetched page.
    pub fn push(&mut self, reply: Reply) {
        self.rl.push(reply);
    }

    pub fn len(&self) -> usize {
        self.rl.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rl.is_empty()
    }

    /// `(key1, key2)` pairs from every object nested under the object at
    /// `base`, e.g. namespace id and name from `namespaces`.
    pub fn int_string_from_jo(&self, base: &str, key1: &str, key2: &str) -> Vec<(i64, String)> {
        self.rl
            .iter()
            .flat_map(|r| r.big_json_object_get(base))
            .filter_map(|jo| match (jo.get_int(key1), jo.get_string(key2)) {
                (Some(i), Some(s)) => Some((i, s)),
                _ => {
                    trace!("skipping element of `{base}` without int `{key1}` and string `{key2}`");
                    None
                }
            })
            .collect()
    }

    /// Lazily flatten the object elements of the array at `base` across all
    /// replies. Each call starts a fresh pass.
    pub fn get_jo_of_ja_stream<'a>(&'a self, base: &'a str) -> impl Iterator<Item = Reply> + 'a {
        self.rl.iter().flat_map(move |r| r.ja_of_jo_iter(base))
    }

    /// Objects in the array at `key` of every object nested under the object
    /// at `base`, e.g. the `imageinfo` revisions of each entry in `pages`.
    pub fn get_jo_of_ja_in_jo(&self, base: &str, key: &str) -> Vec<Reply> {
        self.rl
            .iter()
            .flat_map(|r| r.big_json_object_iter(base))
            .flat_map(|jo| jo.get_ja_of_jo(key))
            .collect()
    }

    /// The string `title` of each object in the array at `base`.
    pub fn string_from_ja_of_jo(&self, base: &str, title: &str) -> Vec<String> {
        self.get_jo_of_ja_stream(base)
            .filter_map(|jo| {
                let value = jo.get_string(title);
                if value.is_none() {
                    trace!("skipping element of `{base}` without string `{title}`");
                }
                value
            })
            .collect()
    }

    /// Eager form of `get_jo_of_ja_stream`.
    pub fn get_jo_of_ja(&self, base: &str) -> Vec<Reply> {
        self.get_jo_of_ja_stream(base).collect()
    }
}

impl From<Vec<Reply>> for RSet {
    fn from(rl: Vec<Reply>) -> Self {
        Self { rl }
    }
}

impl FromIterator<Reply> for RSet {
    fn from_iter<I: IntoIterator<Item = Reply>>(iter: I) -> Self {
        Self {
            rl: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn reply(value: Value) -> Reply {
        Reply::try_from(value).unwrap()
    }

    fn two_pages() -> RSet {
        let mut set = RSet::new();
        set.push(reply(json!({"query": [{"title": "A"}, {"title": "B"}]})));
        set.push(reply(json!({"query": [{"title": "C"}]})));
        set
    }

    #[test]
    fn string_from_ja_of_jo_preserves_page_then_array_order() {
        assert_eq!(two_pages().string_from_ja_of_jo("query", "title"), vec!["A", "B", "C"]);
    }

    #[test]
    fn string_from_ja_of_jo_skips_bad_elements() {
        let set: RSet = vec![reply(json!({
            "query": [{"title": "A"}, {"ns": 0}, {"title": 7}, {"title": "D"}]
        }))]
        .into();
        assert_eq!(set.string_from_ja_of_jo("query", "title"), vec!["A", "D"]);
    }

    #[test]
    fn stream_is_restartable_and_matches_eager_form() {
        let set = two_pages();
        let first: Vec<Reply> = set.get_jo_of_ja_stream("query").collect();
        let second: Vec<Reply> = set.get_jo_of_ja_stream("query").collect();
        assert_eq!(first, second);
        assert_eq!(first, set.get_jo_of_ja("query"));
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn stream_is_lazy() {
        let set = two_pages();
        let first = set.get_jo_of_ja_stream("query").next().unwrap();
        assert_eq!(first.get_string("title").as_deref(), Some("A"));
    }

    #[test]
    fn stream_takes_from_large_arrays_without_collecting() {
        let items: Vec<Value> = (0..10_000).map(|i| json!({"title": format!("T{i}")})).collect();
        let set: RSet = vec![reply(json!({"query": items})), reply(json!({"query": [{"title": "Z"}]}))].into();
        let taken: Vec<String> = set
            .get_jo_of_ja_stream("query")
            .take(2)
            .filter_map(|jo| jo.get_string("title"))
            .collect();
        assert_eq!(taken, vec!["T0", "T1"]);
        assert_eq!(set.get_jo_of_ja_stream("query").count(), 10_001);
    }

    #[test]
    fn get_jo_of_ja_in_jo_flattens_nested_arrays() {
        let set: RSet = vec![
            reply(json!({"pages": {"1": {"imageinfo": [{"size": 1}, {"size": 2}]}, "-1": {"missing": ""}}})),
            reply(json!({"pages": {"7": {"imageinfo": [{"size": 3}]}}})),
        ]
        .into();
        let sizes: Vec<i64> = set
            .get_jo_of_ja_in_jo("pages", "imageinfo")
            .iter()
            .filter_map(|r| r.get_int("size"))
            .collect();
        assert_eq!(sizes, vec![1, 2, 3]);
    }

    #[test]
    fn int_string_from_jo_flattens_across_replies() {
        let set: RSet = [
            json!({"namespaces": {"0": {"id": 0, "name": ""}, "6": {"id": 6, "name": "File"}}}),
            json!({"namespaces": {"14": {"id": 14, "name": "Category"}, "x": {"name": "NoId"}}}),
        ]
        .into_iter()
        .map(reply)
        .collect();
        let mut pairs = set.int_string_from_jo("namespaces", "id", "name");
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                (0, String::new()),
                (6, "File".to_string()),
                (14, "Category".to_string())
            ]
        );
    }

    #[test]
    fn empty_set_extracts_nothing() {
        let set = RSet::new();
        assert!(set.is_empty());
        assert!(set.get_jo_of_ja("query").is_empty());
        assert!(set.int_string_from_jo("namespaces", "id", "name").is_empty());
    }
}
