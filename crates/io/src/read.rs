use crate::{Error, RealizedHref, Result};
use stac_check::StacObject;

/// Reads STAC objects from paths and urls.
///
/// Every http request carries the reader's headers, e.g. for authentication.
#[derive(Debug, Clone)]
pub struct Reader {
    headers: Vec<(String, String)>,

    #[cfg(feature = "reqwest")]
    client: reqwest::blocking::Client,
}

impl Reader {
    /// Creates a new reader that sends the given headers with every request.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_check_io::Reader;
    ///
    /// let reader = Reader::new(vec![("Authorization".to_string(), "Bearer token".to_string())]).unwrap();
    /// ```
    pub fn new(headers: Vec<(String, String)>) -> Result<Reader> {
        Ok(Reader {
            headers,
            #[cfg(feature = "reqwest")]
            client: reqwest::blocking::Client::builder()
                .user_agent(crate::user_agent())
                .build()?,
        })
    }

    /// Returns the headers sent with every request.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Reads a STAC object from an href.
    ///
    /// The href is kept as the object's self href, exactly as it was given.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_check::SelfHref;
    /// use stac_check_io::Reader;
    ///
    /// let reader = Reader::new(Vec::new()).unwrap();
    /// let object = reader.read("../core/data/core-item.json").unwrap();
    /// assert_eq!(object.self_href(), Some("../core/data/core-item.json"));
    /// ```
    pub fn read(&self, href: impl ToString) -> Result<StacObject> {
        let href = href.to_string();
        let bytes = match RealizedHref::from(href.as_str()) {
            RealizedHref::Url(url) => self.get(url)?,
            RealizedHref::PathBuf(path) => std::fs::read(&path).map_err(|io| Error::FromPath {
                io,
                path: path.to_string_lossy().into_owned(),
            })?,
        };
        let object = StacObject::from_slice(&bytes, &href)?;
        Ok(object)
    }

    #[cfg(feature = "reqwest")]
    fn get(&self, url: url::Url) -> Result<Vec<u8>> {
        tracing::debug!("getting {url}");
        let mut request = self.client.get(url.clone());
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Get {
                href: url.to_string(),
                message: status.to_string(),
            });
        }
        Ok(response.bytes()?.to_vec())
    }

    #[cfg(not(feature = "reqwest"))]
    fn get(&self, _: url::Url) -> Result<Vec<u8>> {
        Err(Error::FeatureNotEnabled("reqwest"))
    }
}

/// Reads a STAC object from an href, without any extra headers.
///
/// # Examples
///
/// ```
/// let object = stac_check_io::read("../core/data/catalog.json").unwrap();
/// assert_eq!(object.id(), Some("examples"));
/// ```
pub fn read(href: impl ToString) -> Result<StacObject> {
    Reader::new(Vec::new())?.read(href)
}
