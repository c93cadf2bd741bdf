//! Edit command for attributes.

use crate::error::{EditorError, EditorResult};
use crate::library::{Attribute, AttributeType, AttributeUnit};
use crate::list::ObjectList;
use crate::types::AttributeKey;
use crate::undo::{CommandMeta, UndoCommand};
use crate::Shared;

/// Reversible edit of an [`Attribute`], validating the type/value/unit
/// combination and key uniqueness within the owning list.
pub struct CmdAttributeEdit {
    meta: CommandMeta,
    attribute: Shared<Attribute>,
    list: ObjectList<Attribute>,
    old_key: AttributeKey,
    new_key: AttributeKey,
    old_type: AttributeType,
    new_type: AttributeType,
    old_value: String,
    new_value: String,
    old_unit: Option<AttributeUnit>,
    new_unit: Option<AttributeUnit>,
}

impl CmdAttributeEdit {
    /// Snapshots `attribute` for editing within `list`.
    #[must_use]
    pub fn new(attribute: Shared<Attribute>, list: ObjectList<Attribute>) -> Self {
        let snapshot = attribute.borrow().clone();
        Self {
            meta: CommandMeta::new("Edit attribute"),
            old_key: snapshot.key().clone(),
            new_key: snapshot.key().clone(),
            old_type: snapshot.attribute_type(),
            new_type: snapshot.attribute_type(),
            old_value: snapshot.value().to_string(),
            new_value: snapshot.value().to_string(),
            old_unit: snapshot.unit(),
            new_unit: snapshot.unit(),
            attribute,
            list,
        }
    }

    /// Sets the key.
    pub fn set_key(&mut self, key: AttributeKey) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_key = key;
    }

    /// Sets type, value and unit together.
    pub fn set_type_value_unit(
        &mut self,
        attribute_type: AttributeType,
        value: String,
        unit: Option<AttributeUnit>,
    ) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_type = attribute_type;
        self.new_value = value;
        self.new_unit = unit;
    }
}

impl UndoCommand for CmdAttributeEdit {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        self.new_type.check(&self.new_value, self.new_unit)?;
        if self.new_key != self.old_key {
            let taken = self
                .list
                .find_by_name(self.new_key.as_str())
                .is_some_and(|other| !Shared::ptr_eq(&other, &self.attribute));
            if taken {
                return Err(EditorError::user(format!(
                    "There is already an attribute with the key \"{}\"",
                    self.new_key
                )));
            }
        }
        self.perform_redo()?;
        Ok(self.new_key != self.old_key
            || self.new_type != self.old_type
            || self.new_value != self.old_value
            || self.new_unit != self.old_unit)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        let mut attribute = self.attribute.borrow_mut();
        attribute.set_key(self.old_key.clone());
        attribute.set_type_value_unit(self.old_type, self.old_value.clone(), self.old_unit)?;
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        let mut attribute = self.attribute.borrow_mut();
        attribute.set_key(self.new_key.clone());
        attribute.set_type_value_unit(self.new_type, self.new_value.clone(), self.new_unit)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared;

    fn attribute(key: &str) -> Shared<Attribute> {
        shared(
            Attribute::new(
                AttributeKey::new(key).unwrap(),
                AttributeType::Resistance,
                "100".to_string(),
                Some(AttributeUnit::Ohm),
            )
            .unwrap(),
        )
    }

    #[test]
    fn invalid_value_for_type_is_a_user_error() {
        let list = ObjectList::new();
        let a = attribute("R");
        list.append(Shared::clone(&a));
        let mut cmd = CmdAttributeEdit::new(Shared::clone(&a), list);
        cmd.set_type_value_unit(
            AttributeType::Resistance,
            "lots".to_string(),
            Some(AttributeUnit::Ohm),
        );
        assert!(matches!(cmd.execute(), Err(EditorError::UserError { .. })));
        assert_eq!(a.borrow().value(), "100");
    }

    #[test]
    fn duplicate_key_is_a_user_error() {
        let list = ObjectList::new();
        let a = attribute("R");
        let b = attribute("C");
        list.append(Shared::clone(&a));
        list.append(Shared::clone(&b));
        let mut cmd = CmdAttributeEdit::new(Shared::clone(&b), list);
        cmd.set_key(AttributeKey::new("R").unwrap());
        assert!(matches!(cmd.execute(), Err(EditorError::UserError { .. })));
    }

    #[test]
    fn edit_undo_redo() {
        let list = ObjectList::new();
        let a = attribute("R");
        list.append(Shared::clone(&a));
        let mut cmd = CmdAttributeEdit::new(Shared::clone(&a), list);
        cmd.set_type_value_unit(
            AttributeType::Resistance,
            "220".to_string(),
            Some(AttributeUnit::KiloOhm),
        );
        assert!(cmd.execute().unwrap());
        assert_eq!(a.borrow().value(), "220");
        assert_eq!(a.borrow().unit(), Some(AttributeUnit::KiloOhm));
        cmd.undo().unwrap();
        assert_eq!(a.borrow().value(), "100");
        cmd.redo().unwrap();
        cmd.undo().unwrap();
    }
}
