//! Per-call and per-request options.

use std::collections::HashMap;

/// A functional option mutating [`CallOptions`].
pub type CallOption = Box<dyn FnOnce(&mut CallOptions) + Send>;

/// A functional option mutating [`RequestOptions`].
pub type RequestOption = Box<dyn FnOnce(&mut RequestOptions) + Send>;

/// Options consumed by a single `call`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Path appended to `scheme://address`, e.g. `/users/7?verbose=1`.
    pub url_path: String,
}

impl CallOptions {
    pub fn apply<I>(opts: I) -> Self
    where
        I: IntoIterator<Item = CallOption>,
    {
        let mut options = Self::default();
        for opt in opts {
            opt(&mut options);
        }
        options
    }
}

/// Options recorded on a `Request` at build time.
///
/// Dispatch never reads these.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub metadata: HashMap<String, String>,
}

impl RequestOptions {
    pub fn apply<I>(opts: I) -> Self
    where
        I: IntoIterator<Item = RequestOption>,
    {
        let mut options = Self::default();
        for opt in opts {
            opt(&mut options);
        }
        options
    }
}

/// Set the path to invoke.
pub fn url_path(path: impl Into<String>) -> CallOption {
    let path = path.into();
    Box::new(move |o| o.url_path = path)
}

/// Attach a metadata entry to the request.
pub fn metadata(key: impl Into<String>, value: impl Into<String>) -> RequestOption {
    let key = key.into();
    let value = value.into();
    Box::new(move |o| {
        o.metadata.insert(key, value);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_path_last_wins() {
        let opts = CallOptions::apply(vec![url_path("/a"), url_path("/b")]);
        assert_eq!(opts.url_path, "/b");
        assert_eq!(CallOptions::apply(Vec::new()).url_path, "");
    }

    #[test]
    fn test_metadata_accumulates() {
        let opts = RequestOptions::apply(vec![metadata("a", "1"), metadata("b", "2")]);
        assert_eq!(opts.metadata.len(), 2);
        assert_eq!(opts.metadata["a"], "1");
    }
}
