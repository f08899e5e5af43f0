//! Response Payloads
//!
//! Typed values the transport decodes Restful Objects responses into. The
//! aggregation engine never sees wire bytes, only these shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const RELS_PREFIX: &str = "urn:org.restfulobjects:rels/";

/// The role a link plays relative to the representation that carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    SelfRef,
    Up,
    Invoke,
    DescribedBy,
    Layout,
    Grid,
    Details,
    Value,
    Other,
}

impl Relation {
    /// Parse a `rel` attribute. Parameterised rels such as
    /// `urn:org.restfulobjects:rels/invoke;action="findByName"` match on
    /// their base name.
    pub fn from_rel(rel: &str) -> Self {
        match rel {
            "self" => return Relation::SelfRef,
            "up" => return Relation::Up,
            "describedby" => return Relation::DescribedBy,
            _ => {}
        }
        let Some(name) = rel.strip_prefix(RELS_PREFIX) else {
            return Relation::Other;
        };
        let base = name
            .split(|c| c == ';' || c == '=')
            .next()
            .unwrap_or_default();
        match base {
            "invoke" | "invokeaction" => Relation::Invoke,
            "object-layout" => Relation::Layout,
            "grid" => Relation::Grid,
            "details" => Relation::Details,
            "value" => Relation::Value,
            _ => Relation::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Put,
    Post,
    Delete,
}

/// A link descriptor, used both to issue follow-up requests and to identify
/// which relation a link plays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(default)]
    pub method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            method: Method::Get,
            title: None,
        }
    }

    pub fn relation(&self) -> Relation {
        Relation::from_rel(&self.rel)
    }
}

fn find_link(links: &[Link], relation: Relation) -> Option<&Link> {
    links.iter().find(|l| l.relation() == relation)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyMember {
    pub id: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// A collection member of a domain object.
///
/// In summary form `value` is absent. The representation returned by the
/// collection's own link carries the listing in `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionMember {
    pub id: String,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Vec<Link>>,
}

impl CollectionMember {
    /// The link used to fetch this collection's content.
    pub fn primary_link(&self) -> Option<&Link> {
        self.links.first()
    }
}

/// An entity with named properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainObject {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub properties: Vec<PropertyMember>,
    #[serde(default)]
    pub collections: Vec<CollectionMember>,
}

impl DomainObject {
    /// An object without properties is only a reference to the full
    /// representation behind its self link.
    pub fn is_reference(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn self_link(&self) -> Option<&Link> {
        find_link(&self.links, Relation::SelfRef)
    }

    pub fn layout_link(&self) -> Option<&Link> {
        find_link(&self.links, Relation::Layout)
    }

    pub fn collection(&self, id: &str) -> Option<&CollectionMember> {
        self.collections.iter().find(|c| c.id == id)
    }

    pub fn property(&self, id: &str) -> Option<&PropertyMember> {
        self.properties.iter().find(|p| p.id == id)
    }
}

/// Wrapper around the return value of an invoked action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultObject {
    #[serde(default)]
    pub result_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<DomainObject>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// A single property value whose description is still pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyLayout {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}

/// UI arrangement descriptor mapping properties to their links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub properties: Vec<PropertyLayout>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Layout {
    pub fn grid_link(&self) -> Option<&Link> {
        find_link(&self.links, Relation::Grid)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRow {
    #[serde(default)]
    pub columns: Vec<Vec<String>>,
}

/// The resolved visual grid for a layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    #[serde(default)]
    pub rows: Vec<GridRow>,
}

/// A transport-level failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpFailure {
    pub url: String,
    pub status: u16,
    #[serde(default)]
    pub message: String,
}

/// The closed set of decoded response shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponsePayload {
    Object(DomainObject),
    ResultObject(ResultObject),
    Property(Property),
    Layout(Layout),
    Grid(Grid),
    Error(HttpFailure),
    Unrecognized {
        #[serde(default)]
        description: String,
    },
}

impl ResponsePayload {
    pub fn kind(&self) -> &'static str {
        match self {
            ResponsePayload::Object(_) => "object",
            ResponsePayload::ResultObject(_) => "result_object",
            ResponsePayload::Property(_) => "property",
            ResponsePayload::Layout(_) => "layout",
            ResponsePayload::Grid(_) => "grid",
            ResponsePayload::Error(_) => "error",
            ResponsePayload::Unrecognized { .. } => "unrecognized",
        }
    }
}
