use std::path::PathBuf;
use url::Url;

/// An href that has been realized to a path or a url.
#[derive(Debug, Clone, PartialEq)]
pub enum RealizedHref {
    /// A path buf
    PathBuf(PathBuf),

    /// A url
    Url(Url),
}

impl From<&str> for RealizedHref {
    fn from(href: &str) -> RealizedHref {
        match Url::parse(href) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(RealizedHref::PathBuf)
                .unwrap_or_else(|_| RealizedHref::Url(url)),
            Ok(url) if matches!(url.scheme(), "http" | "https") => RealizedHref::Url(url),
            // Anything else, including windows paths like `C:\data`, is a path.
            _ => RealizedHref::PathBuf(PathBuf::from(href)),
        }
    }
}
