use crate::{Reader, Result};
use stac_check::{StacObject, href::make_absolute};
use std::collections::{HashSet, VecDeque};

/// A breadth-first walk over a catalog tree.
///
/// The walk starts at a root href and follows `child` and `item` links,
/// resolved against the href of the object they came from. The root is at
/// depth one. Every href is visited at most once.
///
/// Objects that can't be read are yielded as errors, and the walk carries on
/// with the rest of the queue.
///
/// # Examples
///
/// ```
/// use stac_check_io::{Reader, Walk};
///
/// let reader = Reader::new(Vec::new()).unwrap();
/// let objects: Vec<_> = Walk::new(&reader, "../core/data/catalog.json")
///     .max_depth(1)
///     .collect();
/// assert_eq!(objects.len(), 1);
/// ```
#[derive(Debug)]
pub struct Walk<'a> {
    reader: &'a Reader,
    queue: VecDeque<(String, usize)>,
    visited: HashSet<String>,
    max_depth: Option<usize>,
}

impl<'a> Walk<'a> {
    /// Creates a new walk rooted at `href`, with no depth limit.
    pub fn new(reader: &'a Reader, href: impl ToString) -> Walk<'a> {
        let href = href.to_string();
        Walk {
            reader,
            queue: VecDeque::from([(href.clone(), 1)]),
            visited: HashSet::from([href]),
            max_depth: None,
        }
    }

    /// Stops following links once objects reach this depth.
    pub fn max_depth(mut self, max_depth: impl Into<Option<usize>>) -> Walk<'a> {
        self.max_depth = max_depth.into();
        self
    }

    fn enqueue_links(&mut self, object: &StacObject, href: &str, depth: usize) {
        if self.max_depth.is_some_and(|max_depth| depth >= max_depth) {
            return;
        }
        for link in object
            .iter_links()
            .filter(|link| matches!(link.rel, Some("child") | Some("item")))
        {
            let Some(link_href) = link.href else {
                tracing::warn!("skipping {} link without an href in {href}", link.rel.unwrap_or_default());
                continue;
            };
            match make_absolute(link_href, href) {
                Ok(absolute) => {
                    let absolute = absolute.into_owned();
                    if self.visited.insert(absolute.clone()) {
                        self.queue.push_back((absolute, depth + 1));
                    }
                }
                Err(err) => tracing::warn!("skipping link {link_href} in {href}: {err}"),
            }
        }
    }
}

impl Iterator for Walk<'_> {
    type Item = Result<StacObject>;

    fn next(&mut self) -> Option<Self::Item> {
        let (href, depth) = self.queue.pop_front()?;
        match self.reader.read(&href) {
            Ok(object) => {
                tracing::info!("got {href} (depth={depth})");
                self.enqueue_links(&object, &href, depth);
                Some(Ok(object))
            }
            Err(err) => {
                tracing::warn!("could not read {href}: {err}");
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Walk;
    use crate::Reader;
    use serde_json::json;
    use stac_check::SelfHref;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(dir: &Path, path: &str, value: serde_json::Value) {
        let path = dir.join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, serde_json::to_vec(&value).unwrap()).unwrap();
    }

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "catalog.json",
            json!({
                "type": "Catalog",
                "stac_version": "1.1.0",
                "id": "root",
                "description": "root",
                "links": [
                    {"rel": "child", "href": "./sub/catalog.json"},
                    {"rel": "item", "href": "./items/item.json"},
                    {"rel": "self", "href": "./catalog.json"}
                ]
            }),
        );
        write(
            dir.path(),
            "sub/catalog.json",
            json!({
                "type": "Catalog",
                "stac_version": "1.1.0",
                "id": "sub",
                "description": "sub",
                "links": [
                    {"rel": "parent", "href": "../catalog.json"},
                    {"rel": "item", "href": "../items/item.json"},
                    {"rel": "item", "href": "./missing.json"}
                ]
            }),
        );
        write(
            dir.path(),
            "items/item.json",
            json!({
                "type": "Feature",
                "stac_version": "1.1.0",
                "id": "item",
                "geometry": null,
                "properties": {"datetime": "2024-01-01T00:00:00Z"},
                "links": [{"rel": "parent", "href": "../catalog.json"}],
                "assets": {}
            }),
        );
        dir
    }

    #[test]
    fn walk_everything() {
        let dir = tree();
        let reader = Reader::new(Vec::new()).unwrap();
        let root = dir.path().join("catalog.json");
        let results: Vec<_> = Walk::new(&reader, root.display()).collect();
        assert_eq!(results.len(), 4);
        let ids: Vec<_> = results
            .iter()
            .filter_map(|result| result.as_ref().ok())
            .map(|object| object.id().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["root", "sub", "item"]);
        assert!(results[3].is_err());
    }

    #[test]
    fn walk_max_depth() {
        let dir = tree();
        let reader = Reader::new(Vec::new()).unwrap();
        let root = dir.path().join("catalog.json");
        let objects: Vec<_> = Walk::new(&reader, root.display())
            .max_depth(2)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(objects.len(), 3);
        assert!(
            objects[2]
                .self_href()
                .unwrap()
                .ends_with("items/item.json")
        );
    }

    #[test]
    fn walk_missing_root() {
        let reader = Reader::new(Vec::new()).unwrap();
        let results: Vec<_> = Walk::new(&reader, "not/a/catalog.json").collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
