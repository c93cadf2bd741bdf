//! The package library model.
//!
//! A package owns its logical pads, its 3-D model references and its
//! footprints; each footprint owns the geometric primitives. The package is
//! persisted as one versioned s-expression document inside its library
//! directory, accessed through the transactional file store.

mod attribute;
mod component;
mod footprint;
mod footprint_pad;
pub mod fs;
mod package_pad;

pub use attribute::{Attribute, AttributeEvent, AttributeType, AttributeUnit};
pub use component::{ComponentSignal, ComponentSignalEvent, ComponentSymbolVariantItem,
                    ComponentSymbolVariantItemEvent, DevicePadSignalMapItem,
                    DevicePadSignalMapItemEvent, SignalRole};
pub use footprint::{Footprint, FootprintEvent};
pub use footprint_pad::{ComponentSide, FootprintPad, FootprintPadEvent, PadFunction, PadShape};
pub use package_pad::{PackagePad, PackagePadEvent};

use std::fmt;

use tracing::debug;
use uuid::Uuid;

use crate::error::{EditorError, EditorResult};
use crate::list::{ListItem, ObjectList};
use crate::sexp::{parser, writer, SExpr};
use crate::signal::Signal;
use crate::types::{parse_uuid, Version};

use self::fs::TransactionalFs;

/// File name of the package document within its directory.
pub const PACKAGE_FILE: &str = "package.lp";

/// Root tag of the package document.
const PACKAGE_TAG: &str = "package";

/// How a package is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AssemblyType {
    /// Detect from the pads.
    #[default]
    Auto,
    /// Through-hole assembly.
    Tht,
    /// Surface-mount assembly.
    Smt,
    /// Mixed through-hole and surface-mount.
    Mixed,
    /// Something else (e.g. mechanical).
    Other,
}

impl AssemblyType {
    const fn token(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Tht => "tht",
            Self::Smt => "smt",
            Self::Mixed => "mixed",
            Self::Other => "other",
        }
    }

    fn from_token(token: &str) -> EditorResult<Self> {
        match token {
            "auto" => Ok(Self::Auto),
            "tht" => Ok(Self::Tht),
            "smt" => Ok(Self::Smt),
            "mixed" => Ok(Self::Mixed),
            "other" => Ok(Self::Other),
            other => Err(EditorError::invalid_value("AssemblyType", other)),
        }
    }
}

impl fmt::Display for AssemblyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Field-change events of a [`PackageModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageModelEvent {
    /// The uuid was reassigned.
    UuidChanged,
    /// The name changed.
    NameChanged,
}

/// Reference to a 3-D model file of the package.
#[derive(Debug)]
pub struct PackageModel {
    uuid: Uuid,
    name: String,
    on_edited: Signal<PackageModelEvent>,
}

impl PackageModel {
    /// Creates a model reference.
    #[must_use]
    pub fn new(uuid: Uuid, name: String) -> Self {
        Self {
            uuid,
            name,
            on_edited: Signal::new(),
        }
    }

    /// The display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the name. Returns whether the value changed.
    pub fn set_name(&mut self, name: String) -> bool {
        if name == self.name {
            return false;
        }
        self.name = name;
        self.on_edited.notify(&PackageModelEvent::NameChanged);
        true
    }
}

impl Clone for PackageModel {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            name: self.name.clone(),
            on_edited: Signal::new(),
        }
    }
}

impl PartialEq for PackageModel {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid && self.name == other.name
    }
}

impl ListItem for PackageModel {
    const TAG: &'static str = "3d_model";
    type Event = PackageModelEvent;

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn name_key(&self) -> Option<String> {
        Some(self.name.clone())
    }

    fn on_edited(&self) -> &Signal<PackageModelEvent> {
        &self.on_edited
    }

    fn serialize(&self, root: &mut SExpr) {
        root.push_token(self.uuid);
        root.push_text(self.name.clone());
    }

    fn deserialize(node: &SExpr, _format: &Version) -> EditorResult<Self> {
        let uuid = parse_uuid(node.first_value()?)?;
        let name = node
            .value(1)
            .ok_or_else(|| EditorError::invalid_element("3d_model", "missing name token"))?
            .to_string();
        Ok(Self::new(uuid, name))
    }
}

/// Field-change events of a [`Package`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageEvent {
    /// The name changed.
    NameChanged,
    /// The description changed.
    DescriptionChanged,
    /// The version changed.
    VersionChanged,
    /// The author changed.
    AuthorChanged,
    /// The deprecated flag changed.
    DeprecatedChanged,
    /// The generator id changed.
    GeneratedByChanged,
    /// The assembly type changed.
    AssemblyTypeChanged,
}

/// A reusable package element of the library.
#[derive(Debug)]
pub struct Package {
    uuid: Uuid,
    name: String,
    description: String,
    version: Version,
    author: String,
    deprecated: bool,
    generated_by: String,
    assembly_type: AssemblyType,
    pads: ObjectList<PackagePad>,
    models: ObjectList<PackageModel>,
    footprints: ObjectList<Footprint>,
    on_edited: Signal<PackageEvent>,
}

impl Package {
    /// Creates an empty package.
    #[must_use]
    pub fn new(uuid: Uuid, name: String, version: Version) -> Self {
        Self {
            uuid,
            name,
            description: String::new(),
            version,
            author: String::new(),
            deprecated: false,
            generated_by: String::new(),
            assembly_type: AssemblyType::Auto,
            pads: ObjectList::new(),
            models: ObjectList::new(),
            footprints: ObjectList::new(),
            on_edited: Signal::new(),
        }
    }

    /// The identity of the package.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The element version.
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The author.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Whether the package is deprecated.
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    /// Id of the generator that created this package (empty for manual).
    #[must_use]
    pub fn generated_by(&self) -> &str {
        &self.generated_by
    }

    /// The assembly type.
    #[must_use]
    pub fn assembly_type(&self) -> AssemblyType {
        self.assembly_type
    }

    /// The change-event stream for the scalar fields.
    #[must_use]
    pub fn on_edited(&self) -> &Signal<PackageEvent> {
        &self.on_edited
    }

    /// The logical pads.
    #[must_use]
    pub fn pads(&self) -> &ObjectList<PackagePad> {
        &self.pads
    }

    /// The 3-D model references.
    #[must_use]
    pub fn models(&self) -> &ObjectList<PackageModel> {
        &self.models
    }

    /// The footprints.
    #[must_use]
    pub fn footprints(&self) -> &ObjectList<Footprint> {
        &self.footprints
    }

    /// Sets the name. Returns whether the value changed.
    pub fn set_name(&mut self, name: String) -> bool {
        if name == self.name {
            return false;
        }
        self.name = name;
        self.on_edited.notify(&PackageEvent::NameChanged);
        true
    }

    /// Sets the description. Returns whether the value changed.
    pub fn set_description(&mut self, description: String) -> bool {
        if description == self.description {
            return false;
        }
        self.description = description;
        self.on_edited.notify(&PackageEvent::DescriptionChanged);
        true
    }

    /// Sets the version. Returns whether the value changed.
    pub fn set_version(&mut self, version: Version) -> bool {
        if version == self.version {
            return false;
        }
        self.version = version;
        self.on_edited.notify(&PackageEvent::VersionChanged);
        true
    }

    /// Sets the author. Returns whether the value changed.
    pub fn set_author(&mut self, author: String) -> bool {
        if author == self.author {
            return false;
        }
        self.author = author;
        self.on_edited.notify(&PackageEvent::AuthorChanged);
        true
    }

    /// Sets the deprecated flag. Returns whether the value changed.
    pub fn set_deprecated(&mut self, deprecated: bool) -> bool {
        if deprecated == self.deprecated {
            return false;
        }
        self.deprecated = deprecated;
        self.on_edited.notify(&PackageEvent::DeprecatedChanged);
        true
    }

    /// Sets the generator id. Returns whether the value changed.
    pub fn set_generated_by(&mut self, generated_by: String) -> bool {
        if generated_by == self.generated_by {
            return false;
        }
        self.generated_by = generated_by;
        self.on_edited.notify(&PackageEvent::GeneratedByChanged);
        true
    }

    /// Sets the assembly type. Returns whether the value changed.
    pub fn set_assembly_type(&mut self, assembly_type: AssemblyType) -> bool {
        if assembly_type == self.assembly_type {
            return false;
        }
        self.assembly_type = assembly_type;
        self.on_edited.notify(&PackageEvent::AssemblyTypeChanged);
        true
    }

    /// Serializes the package into its document root node.
    #[must_use]
    pub fn serialize(&self) -> SExpr {
        let mut root = SExpr::new(PACKAGE_TAG);
        root.push_token(self.uuid);
        root.push_value_child("format_version", Version::current_file_format());
        root.push_text_child("name", self.name.clone());
        root.push_text_child("description", self.description.clone());
        root.push_value_child("version", &self.version);
        root.push_text_child("author", self.author.clone());
        root.push_value_child("deprecated", self.deprecated);
        root.push_text_child("generated_by", self.generated_by.clone());
        root.push_value_child("assembly_type", self.assembly_type);
        self.pads.serialize_into(&mut root);
        self.models.serialize_into(&mut root);
        self.footprints.serialize_into(&mut root);
        root
    }

    /// Deserializes a package from its document root node.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation error on malformed content.
    pub fn deserialize(root: &SExpr) -> EditorResult<Self> {
        if root.name() != PACKAGE_TAG {
            return Err(EditorError::invalid_element(
                PACKAGE_TAG,
                format!("unexpected root tag ({})", root.name()),
            ));
        }
        let format = Version::parse(root.child_value("format_version")?)?;
        if format > Version::current_file_format() {
            return Err(EditorError::user(format!(
                "The file format {format} is newer than the supported format"
            )));
        }
        let mut package = Self::new(
            parse_uuid(root.first_value()?)?,
            root.child_value("name")?.to_string(),
            Version::parse(root.child_value("version")?)?,
        );
        package.description = root.child("description")?.value(0).unwrap_or_default().to_string();
        package.author = root.child("author")?.value(0).unwrap_or_default().to_string();
        package.deprecated = SExpr::parse_bool(root.child_value("deprecated")?)?;
        package.generated_by = root
            .child("generated_by")?
            .value(0)
            .unwrap_or_default()
            .to_string();
        package.assembly_type = AssemblyType::from_token(root.child_value("assembly_type")?)?;
        package.pads = ObjectList::deserialize_from(root, &format)?;
        package.models = ObjectList::deserialize_from(root, &format)?;
        package.footprints = ObjectList::deserialize_from(root, &format)?;
        Ok(package)
    }

    /// Opens a package from the file store's directory.
    ///
    /// # Errors
    ///
    /// Returns read, parse or validation errors.
    pub fn open(fs: &TransactionalFs) -> EditorResult<Self> {
        let content = fs.read(PACKAGE_FILE)?;
        let text = String::from_utf8(content).map_err(|_| {
            EditorError::invalid_element(PACKAGE_TAG, "document is not valid UTF-8")
        })?;
        let root = parser::parse(&text)?;
        let package = Self::deserialize(&root)?;
        debug!(uuid = %package.uuid, name = %package.name, "opened package");
        Ok(package)
    }

    /// Serializes the package into the file store (pending until the store
    /// is saved).
    pub fn write_to(&self, fs: &mut TransactionalFs) {
        fs.write(PACKAGE_FILE, writer::write(&self.serialize()).into_bytes());
    }

    /// Copies all content from `other`: scalar fields through setters, the
    /// lists via [`ObjectList::assign`].
    pub fn assign(&mut self, other: &Self) {
        self.uuid = other.uuid;
        self.set_name(other.name.clone());
        self.set_description(other.description.clone());
        self.set_version(other.version.clone());
        self.set_author(other.author.clone());
        self.set_deprecated(other.deprecated);
        self.set_generated_by(other.generated_by.clone());
        self.set_assembly_type(other.assembly_type);
        self.pads.assign(&other.pads);
        self.models.assign(&other.models);
        self.footprints.assign(&other.footprints);
    }
}

impl Clone for Package {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            name: self.name.clone(),
            description: self.description.clone(),
            version: self.version.clone(),
            author: self.author.clone(),
            deprecated: self.deprecated,
            generated_by: self.generated_by.clone(),
            assembly_type: self.assembly_type,
            pads: self.pads.deep_copy(),
            models: self.models.deep_copy(),
            footprints: self.footprints.deep_copy(),
            on_edited: Signal::new(),
        }
    }
}

impl PartialEq for Package {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.name == other.name
            && self.description == other.description
            && self.version == other.version
            && self.author == other.author
            && self.deprecated == other.deprecated
            && self.generated_by == other.generated_by
            && self.assembly_type == other.assembly_type
            && self.pads == other.pads
            && self.models == other.models
            && self.footprints == other.footprints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared;
    use crate::types::CircuitIdentifier;

    fn package() -> Package {
        let mut package = Package::new(
            Uuid::new_v4(),
            "SOT-23".to_string(),
            Version::parse("0.1").unwrap(),
        );
        package.set_description("Small outline transistor".to_string());
        package.set_assembly_type(AssemblyType::Smt);
        for name in ["1", "2", "3"] {
            package.pads().append(shared(PackagePad::new(
                Uuid::new_v4(),
                CircuitIdentifier::new(name).unwrap(),
            )));
        }
        package
            .footprints()
            .append(shared(Footprint::new(Uuid::new_v4(), "default".to_string())));
        package
    }

    #[test]
    fn document_roundtrip() {
        let package = package();
        let text = writer::write(&package.serialize());
        let restored = Package::deserialize(&parser::parse(&text).unwrap()).unwrap();
        assert_eq!(restored, package);
    }

    #[test]
    fn open_and_save_through_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let package = package();
        let mut fs = TransactionalFs::open(dir.path());
        package.write_to(&mut fs);
        fs.save().unwrap();
        let restored = Package::open(&fs).unwrap();
        assert_eq!(restored, package);
    }

    #[test]
    fn newer_format_is_rejected() {
        let package = package();
        let text = writer::write(&package.serialize()).replace("(format_version 0.2)", "(format_version 99.0)");
        assert!(Package::deserialize(&parser::parse(&text).unwrap()).is_err());
    }
}
