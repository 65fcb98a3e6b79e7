use crate::geohash::Geohash;
use std::fmt;

/// Prefix of all topics that carry orders of a single geohash cell.
pub const GEOHASH_TOPIC_PREFIX: &str = "geohash_";

/// The name of a pub/sub topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic(String);

impl Topic {
    pub fn for_cell(cell: &Geohash) -> Self {
        Self(format!("{GEOHASH_TOPIC_PREFIX}{cell}"))
    }

    /// The geohash cell of a cell-namespaced topic.
    pub fn cell(&self) -> Option<Geohash> {
        self.0
            .strip_prefix(GEOHASH_TOPIC_PREFIX)
            .and_then(|cell| cell.parse().ok())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for Topic {
    fn from(from: String) -> Self {
        Self(from)
    }
}

impl From<&str> for Topic {
    fn from(from: &str) -> Self {
        from.to_owned().into()
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_topic_name() {
        let cell: Geohash = "tdr1yhk".parse().unwrap();
        let topic = Topic::for_cell(&cell);
        assert_eq!(topic.as_str(), "geohash_tdr1yhk");
        assert_eq!(topic.cell(), Some(cell));
        assert_eq!(Topic::from("orders").cell(), None);
        assert_eq!(Topic::from("geohash_").cell(), None);
    }
}
