use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::DataKind;

/// Kind of the id member of a persisted type.
///
/// GUID ids are client-generated; identity ids are 32-bit and carry
/// auto-increment semantics, so they must be assigned before insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Guid,
    NullableGuid,
    Identity,
    NullableIdentity,
}

impl IdKind {
    pub fn is_guid(&self) -> bool {
        matches!(self, Self::Guid | Self::NullableGuid)
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity | Self::NullableIdentity)
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::NullableGuid | Self::NullableIdentity)
    }

    pub fn data_kind(&self) -> DataKind {
        if self.is_guid() { DataKind::Guid } else { DataKind::Integer }
    }
}

/// Uniqueness tag on a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Uniqueness {
    #[default]
    None,
    /// One value across all instances of the type.
    PerType,
    /// Value unique only within the owning instance's graph.
    PerInstance,
}

#[derive(Debug, Clone)]
pub enum MemberKind {
    Scalar(DataKind),
    /// Nested object. Flattened into the parent's index set unless its
    /// definition declares an id member, in which case it is stored as a
    /// foreign-id reference and not descended into.
    Nested(TypeDef),
}

/// One member of a type definition, built with the fluent constructors.
#[derive(Debug, Clone)]
pub struct MemberDef {
    pub name: String,
    pub kind: MemberKind,
    pub uniqueness: Uniqueness,
    /// The member is a collection of its kind. Index accessors below a
    /// collection return 0..N values per instance.
    pub collection: bool,
}

impl MemberDef {
    pub fn scalar(name: impl Into<String>, kind: DataKind) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Scalar(kind),
            uniqueness: Uniqueness::None,
            collection: false,
        }
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::scalar(name, DataKind::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::scalar(name, DataKind::Float)
    }

    pub fn decimal(name: impl Into<String>) -> Self {
        Self::scalar(name, DataKind::Decimal)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::scalar(name, DataKind::Text)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::scalar(name, DataKind::Boolean)
    }

    pub fn timestamp(name: impl Into<String>) -> Self {
        Self::scalar(name, DataKind::Timestamp)
    }

    pub fn guid(name: impl Into<String>) -> Self {
        Self::scalar(name, DataKind::Guid)
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::scalar(name, DataKind::Enum)
    }

    pub fn bytes(name: impl Into<String>) -> Self {
        Self::scalar(name, DataKind::Bytes)
    }

    pub fn nested(name: impl Into<String>, def: TypeDef) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Nested(def),
            uniqueness: Uniqueness::None,
            collection: false,
        }
    }

    pub fn collection(mut self) -> Self {
        self.collection = true;
        self
    }

    pub fn unique_per_type(mut self) -> Self {
        self.uniqueness = Uniqueness::PerType;
        self
    }

    pub fn unique_per_instance(mut self) -> Self {
        self.uniqueness = Uniqueness::PerInstance;
        self
    }
}

/// Declarative member tree of a persisted type.
///
/// This is the input of the type reflector. Types normally provide it
/// through [`Storable::type_def`], built once with the fluent API:
///
/// ```
/// use docustore::{IdKind, MemberDef, TypeDef};
///
/// let def = TypeDef::new("Customer")
///     .with_id("Id", IdKind::Guid)
///     .member(MemberDef::text("Name").unique_per_type())
///     .member(MemberDef::integer("Age"));
/// assert_eq!(def.members.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: String,
    /// Id member name and kind. `None` with `external_id` unset makes
    /// reflection fail for types that have indexable members.
    pub id: Option<(String, IdKind)>,
    pub members: Vec<MemberDef>,
    /// Opt-in for types whose ids are generated externally.
    pub external_id: bool,
}

impl TypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            members: Vec::new(),
            external_id: false,
        }
    }

    pub fn with_id(mut self, member: impl Into<String>, kind: IdKind) -> Self {
        self.id = Some((member.into(), kind));
        self
    }

    pub fn external_id(mut self) -> Self {
        self.external_id = true;
        self
    }

    pub fn member(mut self, member: MemberDef) -> Self {
        self.members.push(member);
        self
    }

    pub fn id_member_name(&self) -> Option<&str> {
        self.id.as_ref().map(|(name, _)| name.as_str())
    }
}

/// Implemented by types persisted through the store.
///
/// The `type_def` result is consumed once by the reflector and cached as a
/// [`crate::StructureSchema`]; accessors later walk serialized instances,
/// never the Rust values themselves.
pub trait Storable: Serialize + DeserializeOwned + Send {
    fn type_def() -> TypeDef;
}
