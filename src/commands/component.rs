//! Edit commands for component-level library items.

use uuid::Uuid;

use crate::error::{EditorError, EditorResult};
use crate::library::{ComponentSignal, ComponentSymbolVariantItem, DevicePadSignalMapItem,
                     SignalRole};
use crate::list::ObjectList;
use crate::types::{Angle, CircuitIdentifier, Point};
use crate::undo::{CommandMeta, UndoCommand};
use crate::Shared;

/// Reversible edit of a [`ComponentSignal`], enforcing name uniqueness
/// within the owning list.
pub struct CmdComponentSignalEdit {
    meta: CommandMeta,
    signal: Shared<ComponentSignal>,
    list: ObjectList<ComponentSignal>,
    old_name: CircuitIdentifier,
    new_name: CircuitIdentifier,
    old_role: SignalRole,
    new_role: SignalRole,
    old_required: bool,
    new_required: bool,
    old_negated: bool,
    new_negated: bool,
    old_clock: bool,
    new_clock: bool,
    old_forced_net_name: String,
    new_forced_net_name: String,
}

impl CmdComponentSignalEdit {
    /// Snapshots `signal` for editing within `list`.
    #[must_use]
    pub fn new(signal: Shared<ComponentSignal>, list: ObjectList<ComponentSignal>) -> Self {
        let snapshot = signal.borrow().clone();
        Self {
            meta: CommandMeta::new("Edit component signal"),
            old_name: snapshot.name().clone(),
            new_name: snapshot.name().clone(),
            old_role: snapshot.role(),
            new_role: snapshot.role(),
            old_required: snapshot.is_required(),
            new_required: snapshot.is_required(),
            old_negated: snapshot.is_negated(),
            new_negated: snapshot.is_negated(),
            old_clock: snapshot.is_clock(),
            new_clock: snapshot.is_clock(),
            old_forced_net_name: snapshot.forced_net_name().to_string(),
            new_forced_net_name: snapshot.forced_net_name().to_string(),
            signal,
            list,
        }
    }

    /// Sets the name.
    pub fn set_name(&mut self, name: CircuitIdentifier) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_name = name;
    }

    /// Sets the role.
    pub fn set_role(&mut self, role: SignalRole) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_role = role;
    }

    /// Sets the required flag.
    pub fn set_required(&mut self, required: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_required = required;
    }

    /// Sets the negated flag.
    pub fn set_negated(&mut self, negated: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_negated = negated;
    }

    /// Sets the clock flag.
    pub fn set_clock(&mut self, clock: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_clock = clock;
    }

    /// Sets the forced net name.
    pub fn set_forced_net_name(&mut self, name: String) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_forced_net_name = name;
    }
}

impl UndoCommand for CmdComponentSignalEdit {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        if self.new_name != self.old_name {
            let taken = self
                .list
                .find_by_name(self.new_name.as_str())
                .is_some_and(|other| !Shared::ptr_eq(&other, &self.signal));
            if taken {
                return Err(EditorError::user(format!(
                    "There is already a signal with the name \"{}\"",
                    self.new_name
                )));
            }
        }
        self.perform_redo()?;
        Ok(self.new_name != self.old_name
            || self.new_role != self.old_role
            || self.new_required != self.old_required
            || self.new_negated != self.old_negated
            || self.new_clock != self.old_clock
            || self.new_forced_net_name != self.old_forced_net_name)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        let mut signal = self.signal.borrow_mut();
        signal.set_name(self.old_name.clone());
        signal.set_role(self.old_role);
        signal.set_required(self.old_required);
        signal.set_negated(self.old_negated);
        signal.set_clock(self.old_clock);
        signal.set_forced_net_name(self.old_forced_net_name.clone());
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        let mut signal = self.signal.borrow_mut();
        signal.set_name(self.new_name.clone());
        signal.set_role(self.new_role);
        signal.set_required(self.new_required);
        signal.set_negated(self.new_negated);
        signal.set_clock(self.new_clock);
        signal.set_forced_net_name(self.new_forced_net_name.clone());
        Ok(())
    }
}

/// Reversible edit of a [`ComponentSymbolVariantItem`].
pub struct CmdComponentSymbolVariantItemEdit {
    meta: CommandMeta,
    item: Shared<ComponentSymbolVariantItem>,
    old_symbol: Uuid,
    new_symbol: Uuid,
    old_position: Point,
    new_position: Point,
    old_rotation: Angle,
    new_rotation: Angle,
    old_mirrored: bool,
    new_mirrored: bool,
    old_required: bool,
    new_required: bool,
    old_suffix: String,
    new_suffix: String,
}

impl CmdComponentSymbolVariantItemEdit {
    /// Snapshots `item` for editing.
    #[must_use]
    pub fn new(item: Shared<ComponentSymbolVariantItem>) -> Self {
        let snapshot = item.borrow().clone();
        Self {
            meta: CommandMeta::new("Edit gate"),
            old_symbol: snapshot.symbol(),
            new_symbol: snapshot.symbol(),
            old_position: snapshot.position(),
            new_position: snapshot.position(),
            old_rotation: snapshot.rotation(),
            new_rotation: snapshot.rotation(),
            old_mirrored: snapshot.is_mirrored(),
            new_mirrored: snapshot.is_mirrored(),
            old_required: snapshot.is_required(),
            new_required: snapshot.is_required(),
            old_suffix: snapshot.suffix().to_string(),
            new_suffix: snapshot.suffix().to_string(),
            item,
        }
    }

    /// Sets the symbol reference.
    pub fn set_symbol(&mut self, symbol: Uuid) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_symbol = symbol;
    }

    /// Sets the placement position.
    pub fn set_position(&mut self, position: Point) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_position = position;
    }

    /// Sets the placement rotation.
    pub fn set_rotation(&mut self, rotation: Angle) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_rotation = rotation;
    }

    /// Sets the mirror flag.
    pub fn set_mirrored(&mut self, mirrored: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_mirrored = mirrored;
    }

    /// Sets the required flag.
    pub fn set_required(&mut self, required: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_required = required;
    }

    /// Sets the designator suffix.
    pub fn set_suffix(&mut self, suffix: String) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_suffix = suffix;
    }
}

impl UndoCommand for CmdComponentSymbolVariantItemEdit {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        self.perform_redo()?;
        Ok(self.new_symbol != self.old_symbol
            || self.new_position != self.old_position
            || self.new_rotation != self.old_rotation
            || self.new_mirrored != self.old_mirrored
            || self.new_required != self.old_required
            || self.new_suffix != self.old_suffix)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        let mut item = self.item.borrow_mut();
        item.set_symbol(self.old_symbol);
        item.set_position(self.old_position);
        item.set_rotation(self.old_rotation);
        item.set_mirrored(self.old_mirrored);
        item.set_required(self.old_required);
        item.set_suffix(self.old_suffix.clone());
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        let mut item = self.item.borrow_mut();
        item.set_symbol(self.new_symbol);
        item.set_position(self.new_position);
        item.set_rotation(self.new_rotation);
        item.set_mirrored(self.new_mirrored);
        item.set_required(self.new_required);
        item.set_suffix(self.new_suffix.clone());
        Ok(())
    }
}

/// Reversible edit of a [`DevicePadSignalMapItem`].
pub struct CmdDevicePadSignalMapItemEdit {
    meta: CommandMeta,
    item: Shared<DevicePadSignalMapItem>,
    old_signal: Option<Uuid>,
    new_signal: Option<Uuid>,
}

impl CmdDevicePadSignalMapItemEdit {
    /// Snapshots `item` for editing.
    #[must_use]
    pub fn new(item: Shared<DevicePadSignalMapItem>) -> Self {
        let signal = item.borrow().signal();
        Self {
            meta: CommandMeta::new("Edit pad/signal mapping"),
            old_signal: signal,
            new_signal: signal,
            item,
        }
    }

    /// Sets the mapped signal.
    pub fn set_signal(&mut self, signal: Option<Uuid>) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_signal = signal;
    }
}

impl UndoCommand for CmdDevicePadSignalMapItemEdit {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        self.perform_redo()?;
        Ok(self.new_signal != self.old_signal)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        self.item.borrow_mut().set_signal(self.old_signal);
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        self.item.borrow_mut().set_signal(self.new_signal);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared;

    #[test]
    fn duplicate_signal_name_is_a_user_error() {
        let list = ObjectList::new();
        let first = shared(ComponentSignal::new(
            Uuid::new_v4(),
            CircuitIdentifier::new("A").unwrap(),
            SignalRole::Passive,
            false,
            false,
            false,
            String::new(),
        ));
        let second = shared(ComponentSignal::new(
            Uuid::new_v4(),
            CircuitIdentifier::new("B").unwrap(),
            SignalRole::Passive,
            false,
            false,
            false,
            String::new(),
        ));
        list.append(Shared::clone(&first));
        list.append(Shared::clone(&second));
        let mut cmd = CmdComponentSignalEdit::new(Shared::clone(&second), list);
        cmd.set_name(CircuitIdentifier::new("A").unwrap());
        assert!(matches!(cmd.execute(), Err(EditorError::UserError { .. })));
    }

    #[test]
    fn pad_signal_map_edit_roundtrip() {
        let item = shared(DevicePadSignalMapItem::new(Uuid::new_v4(), None));
        let signal = Uuid::new_v4();
        let mut cmd = CmdDevicePadSignalMapItemEdit::new(Shared::clone(&item));
        cmd.set_signal(Some(signal));
        assert!(cmd.execute().unwrap());
        assert_eq!(item.borrow().signal(), Some(signal));
        cmd.undo().unwrap();
        assert_eq!(item.borrow().signal(), None);
        cmd.redo().unwrap();
        cmd.undo().unwrap();
    }
}
