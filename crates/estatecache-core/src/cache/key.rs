use std::fmt;

use crate::api::ApiRequest;

/// Tag types attached to cached queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Owner,
    Property,
    PropertyImage,
    PropertyTrace,
    Stats,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Owner => write!(f, "Owner"),
            EntityKind::Property => write!(f, "Property"),
            EntityKind::PropertyImage => write!(f, "PropertyImage"),
            EntityKind::PropertyTrace => write!(f, "PropertyTrace"),
            EntityKind::Stats => write!(f, "Stats"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Every query over the collection.
    Kind(EntityKind),
    /// Queries for one entity.
    Entity(EntityKind, String),
}

impl Tag {
    pub fn entity(kind: EntityKind, id: &str) -> Self {
        Tag::Entity(kind, id.to_string())
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Tag::Kind(kind) | Tag::Entity(kind, _) => *kind,
        }
    }

    /// Whether invalidating `self` invalidates an entry that provides `provided`.
    ///
    /// A collection tag reaches every tag of that kind; an entity tag
    /// reaches only the same entity.
    pub fn invalidates(&self, provided: &Tag) -> bool {
        match self {
            Tag::Kind(kind) => provided.kind() == *kind,
            Tag::Entity(..) => self == provided,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Kind(kind) => write!(f, "{}", kind),
            Tag::Entity(kind, id) => write!(f, "{}:{}", kind, id),
        }
    }
}

/// Serialized (endpoint, parameters) identity of a cached read.
///
/// Parameters are sorted so equal filters produce equal keys regardless of
/// the order they were added in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    endpoint: String,
    params: Vec<(String, String)>,
}

impl CacheKey {
    pub fn new(endpoint: impl Into<String>, mut params: Vec<(String, String)>) -> Self {
        params.sort();
        Self {
            endpoint: endpoint.into(),
            params,
        }
    }

    /// Key for a value that is not a single request (e.g. derived stats).
    pub fn named(name: &str) -> Self {
        Self::new(format!("#{}", name), Vec::new())
    }

    pub fn from_request(request: &ApiRequest) -> Self {
        Self::new(request.path.clone(), request.query.clone())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint)?;
        for (i, (k, v)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, k, v)?;
        }
        Ok(())
    }
}
