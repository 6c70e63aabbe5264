use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

const TLS_PREFIX: &str = "TLS no. ";
const UNCLASSIFIED: &str = "unclassified";

/// Name of a connected component after the minimum-size rule.
///
/// Qualifying components are numbered densely from 1 in discovery order and
/// render as `"TLS no. {k}"`; all others share the `"unclassified"` bucket.
/// Serialized as the rendered string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ClusterName {
  Tls(u32),
  Unclassified,
}

impl ClusterName {
  pub fn is_tls(&self) -> bool {
    matches!(self, ClusterName::Tls(_))
  }
}

impl fmt::Display for ClusterName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ClusterName::Tls(k) => write!(f, "{TLS_PREFIX}{k}"),
      ClusterName::Unclassified => f.write_str(UNCLASSIFIED),
    }
  }
}

impl FromStr for ClusterName {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s == UNCLASSIFIED {
      return Ok(ClusterName::Unclassified);
    }
    s.strip_prefix(TLS_PREFIX)
      .and_then(|k| k.parse::<u32>().ok())
      .filter(|&k| k >= 1)
      .map(ClusterName::Tls)
      .ok_or_else(|| format!("not a cluster name: {s:?}"))
  }
}

impl From<ClusterName> for String {
  fn from(name: ClusterName) -> Self {
    name.to_string()
  }
}

impl TryFrom<String> for ClusterName {
  type Error = String;

  fn try_from(s: String) -> Result<Self, Self::Error> {
    s.parse()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn renders_and_parses() {
    assert_eq!(ClusterName::Tls(3).to_string(), "TLS no. 3");
    assert_eq!(ClusterName::Unclassified.to_string(), "unclassified");
    assert_eq!("TLS no. 12".parse::<ClusterName>(), Ok(ClusterName::Tls(12)));
    assert!("TLS no. 0".parse::<ClusterName>().is_err());
    assert!("cluster 1".parse::<ClusterName>().is_err());
    assert!(ClusterName::Tls(1).is_tls());
    assert!(!ClusterName::Unclassified.is_tls());
  }

  #[test]
  fn orders_numerically() {
    let mut names = vec![
      ClusterName::Unclassified,
      ClusterName::Tls(10),
      ClusterName::Tls(2),
    ];
    names.sort();
    assert_eq!(
      names,
      vec![ClusterName::Tls(2), ClusterName::Tls(10), ClusterName::Unclassified]
    );
  }
}
