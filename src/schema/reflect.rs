//! Type reflector: turns a declarative [`TypeDef`] tree into the
//! flattened [`StructureType`] descriptor.
//!
//! Recursion rules: descend into nested object members to unbounded
//! depth, but stop at any member whose own definition declares an id
//! member. Such members are other structures, stored as separate
//! top-level sets, so only a foreign-id reference is indexed here.

use std::collections::HashSet;

use tracing::debug;

use crate::core::{Result, StoreError};
use crate::schema::structure_type::{IdMember, IndexableMember, StructureType};
use crate::schema::type_def::{MemberDef, MemberKind, TypeDef};
use crate::schema::validate::{validate_member_name, validate_type_name};

pub struct TypeReflector;

impl TypeReflector {
    pub fn reflect(def: &TypeDef) -> Result<StructureType> {
        validate_type_name(&def.name)?;
        if let Some((id_name, _)) = &def.id {
            validate_member_name(id_name)?;
        }

        let mut members = Vec::new();
        for member in &def.members {
            // The id member is addressed through the id accessor, never
            // through the index set.
            if Some(member.name.as_str()) == def.id_member_name() {
                continue;
            }
            Self::descend(member, "", "", false, &mut members)?;
        }

        if members.is_empty() {
            return Err(StoreError::Schema(format!(
                "type '{}' has no indexable members",
                def.name
            )));
        }
        if def.id.is_none() && !def.external_id {
            return Err(StoreError::Schema(format!(
                "type '{}' has no id member",
                def.name
            )));
        }

        let mut seen = HashSet::new();
        for member in &members {
            if !seen.insert(member.path.as_str()) {
                return Err(StoreError::Schema(format!(
                    "type '{}' declares member path '{}' more than once",
                    def.name, member.path
                )));
            }
        }

        debug!(
            type_name = %def.name,
            members = members.len(),
            "reflected structure type"
        );

        Ok(StructureType {
            name: def.name.clone(),
            id_member: def
                .id
                .as_ref()
                .map(|(name, kind)| IdMember { name: name.clone(), kind: *kind }),
            indexable_members: members,
        })
    }

    fn descend(
        member: &MemberDef,
        logical_prefix: &str,
        json_prefix: &str,
        inherited_enumerable: bool,
        out: &mut Vec<IndexableMember>,
    ) -> Result<()> {
        validate_member_name(&member.name)?;
        let logical = join_path(logical_prefix, &member.name);
        let json = join_path(json_prefix, &member.name);
        let enumerable = inherited_enumerable || member.collection;

        match &member.kind {
            MemberKind::Scalar(kind) => out.push(IndexableMember {
                path: logical,
                json_path: json,
                data_kind: *kind,
                is_enumerable: enumerable,
                uniqueness: member.uniqueness,
            }),
            MemberKind::Nested(def) => {
                if let Some((id_name, id_kind)) = &def.id {
                    validate_type_name(&def.name)?;
                    validate_member_name(id_name)?;
                    out.push(IndexableMember {
                        path: format!("{}.StructureId", logical),
                        json_path: format!("{}.{}", json, id_name),
                        data_kind: id_kind.data_kind(),
                        is_enumerable: enumerable,
                        uniqueness: member.uniqueness,
                    });
                } else {
                    for child in &def.members {
                        Self::descend(child, &logical, &json, enumerable, out)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataKind;
    use crate::schema::type_def::{IdKind, Uniqueness};

    fn customer() -> TypeDef {
        TypeDef::new("Customer")
            .with_id("Id", IdKind::Guid)
            .member(MemberDef::text("Name"))
    }

    #[test]
    fn test_reflects_simple_type() {
        let st = TypeReflector::reflect(&customer()).unwrap();
        assert_eq!(st.name, "Customer");
        assert_eq!(st.indexable_members.len(), 1);
        assert_eq!(st.indexable_members[0].path, "Name");
        assert!(!st.indexable_members[0].is_enumerable);
    }

    #[test]
    fn test_id_member_is_excluded_from_index_set() {
        let def = TypeDef::new("Customer")
            .with_id("Id", IdKind::Guid)
            .member(MemberDef::guid("Id"))
            .member(MemberDef::text("Name"));
        let st = TypeReflector::reflect(&def).unwrap();
        assert_eq!(st.indexable_members.len(), 1);
        assert_eq!(st.indexable_members[0].path, "Name");
    }

    #[test]
    fn test_missing_id_member_fails() {
        let def = TypeDef::new("Customer").member(MemberDef::text("Name"));
        let err = TypeReflector::reflect(&def).unwrap_err();
        assert!(err.to_string().contains("no id member"));
    }

    #[test]
    fn test_external_id_mode_allows_missing_id() {
        let def = TypeDef::new("Customer")
            .external_id()
            .member(MemberDef::text("Name"));
        let st = TypeReflector::reflect(&def).unwrap();
        assert!(st.id_member.is_none());
    }

    #[test]
    fn test_no_indexable_members_fails() {
        let def = TypeDef::new("Customer").with_id("Id", IdKind::Guid);
        let err = TypeReflector::reflect(&def).unwrap_err();
        assert!(err.to_string().contains("no indexable members"));
    }

    #[test]
    fn test_nested_members_are_flattened() {
        let def = TypeDef::new("Order")
            .with_id("Id", IdKind::Guid)
            .member(MemberDef::nested(
                "Shipping",
                TypeDef::new("Shipping")
                    .member(MemberDef::text("City"))
                    .member(MemberDef::integer("Zip")),
            ));
        let st = TypeReflector::reflect(&def).unwrap();
        let paths: Vec<&str> = st.indexable_members.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["Shipping.City", "Shipping.Zip"]);
    }

    #[test]
    fn test_nested_structure_stops_descent_and_keeps_reference() {
        let child = TypeDef::new("Address")
            .with_id("Id", IdKind::Guid)
            .member(MemberDef::text("City"));
        let def = TypeDef::new("Order")
            .with_id("Id", IdKind::Guid)
            .member(MemberDef::text("Number"))
            .member(MemberDef::nested("Delivery", child));
        let st = TypeReflector::reflect(&def).unwrap();
        let paths: Vec<&str> = st.indexable_members.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["Number", "Delivery.StructureId"]);

        let reference = &st.indexable_members[1];
        assert_eq!(reference.json_path, "Delivery.Id");
        assert_eq!(reference.data_kind, DataKind::Guid);
    }

    #[test]
    fn test_collections_propagate_enumerable_transitively() {
        let def = TypeDef::new("Order")
            .with_id("Id", IdKind::Identity)
            .member(MemberDef::text("Tags").collection())
            .member(MemberDef::nested(
                "Lines",
                TypeDef::new("OrderLine")
                    .member(MemberDef::text("ProductNo"))
                    .member(MemberDef::integer("Qty").collection()),
            ).collection());
        let st = TypeReflector::reflect(&def).unwrap();
        assert!(st.indexable_members.iter().all(|m| m.is_enumerable));
        let paths: Vec<&str> = st.indexable_members.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["Tags", "Lines.ProductNo", "Lines.Qty"]);
    }

    #[test]
    fn test_duplicate_paths_fail() {
        let def = TypeDef::new("Customer")
            .with_id("Id", IdKind::Guid)
            .member(MemberDef::text("Name"))
            .member(MemberDef::integer("Name"));
        let err = TypeReflector::reflect(&def).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_uniqueness_tags_survive_reflection() {
        let def = TypeDef::new("User")
            .with_id("Id", IdKind::Guid)
            .member(MemberDef::text("Email").unique_per_type())
            .member(MemberDef::text("Nick").unique_per_instance());
        let st = TypeReflector::reflect(&def).unwrap();
        assert_eq!(st.indexable_members[0].uniqueness, Uniqueness::PerType);
        assert_eq!(st.indexable_members[1].uniqueness, Uniqueness::PerInstance);
    }
}
