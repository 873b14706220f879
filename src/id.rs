use compact_str::CompactString;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct RepoId {
    value: u64,
}

/// Lookup key for a repository snapshot: the numeric id together with the name
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct RepoIdentity {
    pub id: RepoId,
    pub name: CompactString,
}

impl RepoId {
    pub fn new(id: u64) -> Self {
        Self { value: id }
    }
}

impl RepoIdentity {
    pub fn new(id: RepoId, name: impl Into<CompactString>) -> Self {
        Self { id, name: name.into() }
    }
}

impl<'de> Deserialize<'de> for RepoId {
    fn deserialize<D>(deserializer: D) -> Result<RepoId, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct RepoIdVisitor;

        impl<'de> Visitor<'de> for RepoIdVisitor {
            type Value = RepoId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a non-negative integer or numeric string repository ID")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(RepoId::new(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(RepoId::new)
                    .map_err(|_| E::custom(format!("negative repository ID: {value}")))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .parse::<u64>()
                    .map(RepoId::new)
                    .map_err(|_| E::custom(format!("invalid repository ID: {value}")))
            }
        }

        deserializer.deserialize_any(RepoIdVisitor)
    }
}

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl std::fmt::Display for RepoIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}-{}", self.id, self.name)
    }
}
