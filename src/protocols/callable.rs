use crate::core::TypeSet;
use crate::protocols::composite::MemberTable;
use crate::protocols::description::DescriptionBuilder;
use crate::protocols::store::{CompositeId, ProtocolStore};
use serde::Serialize;

pub const DEFAULT_CALLABLE_NAME: &str = "callable";

/// Something that can be called with the given parameter sets.
///
/// Calls are never checked against the parameters: any argument list
/// produces the configured return set.
#[derive(Debug, Clone)]
pub struct CallableCapability {
    name: String,
    parameters: Vec<TypeSet>,
    return_type: Option<TypeSet>,
}

/// Signature-help view of a callable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overload {
    pub name: String,
    pub parameters: Vec<ParameterInfo>,
    pub return_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterInfo {
    pub name: String,
    pub documentation: String,
    pub type_display: String,
}

impl CallableCapability {
    pub fn new(name: Option<&str>, parameters: Vec<TypeSet>, return_type: Option<TypeSet>) -> Self {
        Self {
            name: name.unwrap_or(DEFAULT_CALLABLE_NAME).to_string(),
            parameters,
            return_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[TypeSet] {
        &self.parameters
    }

    pub fn return_type(&self) -> Option<&TypeSet> {
        self.return_type.as_ref()
    }

    pub(crate) fn call(&self) -> Option<TypeSet> {
        self.return_type.clone()
    }

    pub(crate) fn populate_members(&self, owner: CompositeId, members: &mut MemberTable) {
        members.insert("__call__".to_string(), TypeSet::of(owner));
    }

    /// One overload with a `$i` placeholder per parameter slot
    pub fn overload(&self, store: &ProtocolStore) -> Overload {
        let parameters = self
            .parameters
            .iter()
            .enumerate()
            .map(|(i, set)| ParameterInfo {
                name: format!("${}", i),
                documentation: format!("Parameter {}", i),
                type_display: store.render_set(set),
            })
            .collect();

        let return_type = self
            .return_type
            .as_ref()
            .map(|set| store.render_set(set))
            .unwrap_or_else(|| "<unknown>".to_string());

        Overload {
            name: self.name.clone(),
            parameters,
            return_type,
        }
    }

    pub(crate) fn describe(&self, builder: &mut DescriptionBuilder) {
        builder.name(self.name.as_str()).misc("()");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Type;

    #[test]
    fn test_unnamed_callable() {
        let callable = CallableCapability::new(None, vec![], None);
        assert_eq!(callable.name(), "callable");
        assert!(callable.call().is_none());
    }

    #[test]
    fn test_overload_placeholders() {
        let store = ProtocolStore::new();
        let callable = CallableCapability::new(
            Some("f"),
            vec![TypeSet::of(Type::Int), TypeSet::empty()],
            Some(TypeSet::of(Type::Str)),
        );

        let overload = callable.overload(&store);
        assert_eq!(overload.name, "f");
        assert_eq!(overload.return_type, "str");

        let names: Vec<_> = overload.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["$0", "$1"]);
        assert_eq!(overload.parameters[0].type_display, "int");
        assert_eq!(overload.parameters[1].documentation, "Parameter 1");
        assert_eq!(overload.parameters[1].type_display, "<unknown>");
    }
}
