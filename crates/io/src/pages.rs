use crate::{Error, Reader, Result};
use serde_json::Value;
use stac_check::{StacObject, href::make_absolute};
use std::collections::{HashSet, VecDeque};
use url::Url;

/// The array that holds an endpoint's objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectList {
    /// `features`, e.g. for `/collections/{id}/items` or `/search`.
    Features,

    /// `collections`, for `/collections`.
    Collections,
}

/// Iterates over the objects served by a paginated STAC API endpoint.
///
/// Each object is yielded with its url, `{page url}/{id}` (without the page's
/// query or fragment). Objects whose id has already been seen are skipped.
/// The first `next` link of each page is followed until `pages` pages have
/// been read or the link points back at the current page.
///
/// # Examples
///
/// ```no_run
/// use stac_check_io::{ObjectList, Pages, Reader};
///
/// let reader = Reader::new(Vec::new()).unwrap();
/// let url = "https://planetarycomputer.microsoft.com/api/stac/v1/collections";
/// for result in Pages::new(&reader, url, ObjectList::Collections).pages(2) {
///     let (object, url) = result.unwrap();
///     println!("{url}: {}", object.id().unwrap_or_default());
/// }
/// ```
#[derive(Debug)]
pub struct Pages<'a> {
    reader: &'a Reader,
    object_list: ObjectList,
    next: Option<String>,
    page: usize,
    pages: usize,
    seen: HashSet<Option<String>>,
    buffer: VecDeque<Result<(StacObject, String)>>,
}

impl ObjectList {
    /// Returns the key of the object array.
    pub fn key(&self) -> &'static str {
        match self {
            ObjectList::Features => "features",
            ObjectList::Collections => "collections",
        }
    }
}

impl<'a> Pages<'a> {
    /// Creates a new iterator that reads one page from `url`.
    pub fn new(reader: &'a Reader, url: impl ToString, object_list: ObjectList) -> Pages<'a> {
        Pages {
            reader,
            object_list,
            next: Some(url.to_string()),
            page: 0,
            pages: 1,
            seen: HashSet::new(),
            buffer: VecDeque::new(),
        }
    }

    /// Sets the maximum number of pages to read.
    pub fn pages(mut self, pages: usize) -> Pages<'a> {
        self.pages = pages;
        self
    }

    fn read_page(&mut self, url: String) -> Result<()> {
        let page = self.reader.read(&url)?;
        self.page += 1;
        tracing::info!("got page {} from {url}", self.page);

        let base = object_base(&url)?;
        let key = self.object_list.key();
        match page.as_object().get(key).and_then(Value::as_array) {
            Some(objects) => {
                for value in objects {
                    let id = value.get("id").and_then(Value::as_str).map(String::from);
                    if !self.seen.insert(id.clone()) {
                        tracing::debug!("skipping duplicate object id={id:?}");
                        continue;
                    }
                    let object_url = match &id {
                        Some(id) => format!("{base}/{id}"),
                        None => base.clone(),
                    };
                    let result = StacObject::new(value.clone())
                        .map(|object| (object, object_url))
                        .map_err(Error::from);
                    self.buffer.push_back(result);
                }
            }
            None => tracing::warn!("page at {url} has no {key} array"),
        }

        if self.page < self.pages {
            if let Some(href) = page
                .iter_links()
                .find(|link| link.rel == Some("next"))
                .and_then(|link| link.href)
            {
                let next = make_absolute(href, &url)?.into_owned();
                if next != url {
                    self.next = Some(next);
                }
            }
        }
        Ok(())
    }
}

impl Iterator for Pages<'_> {
    type Item = Result<(StacObject, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(result) = self.buffer.pop_front() {
                return Some(result);
            }
            let url = self.next.take()?;
            if let Err(err) = self.read_page(url) {
                return Some(Err(err));
            }
        }
    }
}

fn object_base(url: &str) -> Result<String> {
    let mut url = Url::parse(url)?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.as_str().trim_end_matches('/').to_string())
}
