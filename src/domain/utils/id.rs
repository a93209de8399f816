use serde::{Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Kind of network element a name refers to.
pub trait NameKind {
    /// Label used when a name is debug-printed, e.g. `LinkName("FC-FS")`.
    const LABEL: &'static str;
}

/// Human-readable name of a network element, typed by the kind of element it names so that a
/// flow name can never be looked up as a link.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct Name<K> {
    name: String,
    _kind: PhantomData<K>,
}

impl<K> Name<K> {
    pub fn new(name: impl Into<String>) -> Self {
        Name { name: name.into(), _kind: PhantomData }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl<K> fmt::Display for Name<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<K: NameKind> fmt::Debug for Name<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(K::LABEL).field(&self.name).finish()
    }
}

impl<K> Serialize for Name<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl<K> From<Name<K>> for String {
    fn from(name: Name<K>) -> Self {
        name.name
    }
}

impl<K> From<String> for Name<K> {
    fn from(name: String) -> Self {
        Name::new(name)
    }
}

impl<K> From<&str> for Name<K> {
    fn from(name: &str) -> Self {
        Name::new(name)
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct LinkKind;
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct FlowKind;
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct NodeKind;

impl NameKind for LinkKind {
    const LABEL: &'static str = "LinkName";
}

impl NameKind for FlowKind {
    const LABEL: &'static str = "FlowName";
}

impl NameKind for NodeKind {
    const LABEL: &'static str = "NodeName";
}

pub type LinkName = Name<LinkKind>;
pub type FlowName = Name<FlowKind>;
pub type NodeName = Name<NodeKind>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_the_bare_name() {
        let link = LinkName::new("FC-FS");
        assert_eq!(link.to_string(), "FC-FS");
        assert_eq!(link.as_str(), "FC-FS");
        assert_eq!(String::from(link), "FC-FS");
    }

    #[test]
    fn test_debug_names_the_element_kind() {
        assert_eq!(format!("{:?}", LinkName::new("FC-FS")), r#"LinkName("FC-FS")"#);
        assert_eq!(format!("{:?}", FlowName::from("FC-RU-1")), r#"FlowName("FC-RU-1")"#);
        assert_eq!(format!("{:?}", vec![NodeName::new("BS")]), r#"[NodeName("BS")]"#);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&vec![FlowName::new("F1"), FlowName::new("F2")]).unwrap();
        assert_eq!(json, r#"["F1","F2"]"#);
    }
}
