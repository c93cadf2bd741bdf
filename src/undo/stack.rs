//! The undo stack: linear history with clean mark and command groups.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error, warn};

use super::{UndoCommand, UndoCommandGroup};
use crate::error::{EditorError, EditorResult};
use crate::signal::Signal;

/// Notifications emitted by the [`UndoStack`].
#[derive(Debug, Clone)]
pub enum UndoStackEvent {
    /// The undo menu text changed.
    UndoTextChanged(String),
    /// The redo menu text changed.
    RedoTextChanged(String),
    /// Whether undo is possible changed.
    CanUndoChanged(bool),
    /// Whether redo is possible changed.
    CanRedoChanged(bool),
    /// Whether the stack is at the clean mark changed.
    CleanChanged(bool),
    /// A command group was committed.
    CommandGroupEnded,
    /// A command group was aborted.
    CommandGroupAborted,
    /// Something was modified (fired on every state-changing operation).
    StateModified,
}

enum StackEntry {
    Command(Box<dyn UndoCommand>),
    Group(UndoCommandGroup),
}

impl StackEntry {
    fn as_command_mut(&mut self) -> &mut dyn UndoCommand {
        match self {
            Self::Command(command) => command.as_mut(),
            Self::Group(group) => group,
        }
    }

    fn text(&self) -> &str {
        match self {
            Self::Command(command) => command.text(),
            Self::Group(group) => group.text(),
        }
    }
}

/// A linear undo/redo history.
///
/// Commands in `[0, current_index)` are applied; the rest are redoable. A
/// command group opened with [`Self::begin_cmd_group`] sits at the top of
/// the stack while commands are appended to it; until it is committed or
/// aborted, no other command may execute and undo is suppressed.
pub struct UndoStack {
    commands: Vec<StackEntry>,
    current_index: usize,
    /// `None` after the clean state was cut off the redoable tail.
    clean_index: Option<usize>,
    group_active: bool,
    on_changed: Signal<UndoStackEvent>,
}

impl UndoStack {
    /// Creates an empty stack in clean state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            current_index: 0,
            clean_index: Some(0),
            group_active: false,
            on_changed: Signal::new(),
        }
    }

    /// The notification signal.
    #[must_use]
    pub fn on_changed(&self) -> &Signal<UndoStackEvent> {
        &self.on_changed
    }

    /// Whether undo is currently possible.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.current_index > 0 && !self.group_active
    }

    /// Whether redo is currently possible.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.current_index < self.commands.len()
    }

    /// The undo menu text, e.g. `Undo: Add footprint circle`.
    #[must_use]
    pub fn undo_text(&self) -> String {
        if self.can_undo() {
            format!("Undo: {}", self.commands[self.current_index - 1].text())
        } else {
            "Undo".to_string()
        }
    }

    /// The redo menu text.
    #[must_use]
    pub fn redo_text(&self) -> String {
        if self.can_redo() {
            format!("Redo: {}", self.commands[self.current_index].text())
        } else {
            "Redo".to_string()
        }
    }

    /// Whether the stack is at the position of the last [`Self::set_clean`].
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.clean_index == Some(self.current_index)
    }

    /// Whether a command group is currently active.
    #[must_use]
    pub fn is_command_group_active(&self) -> bool {
        self.group_active
    }

    /// Number of commands in the history (applied and redoable).
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Marks the current position as the clean (saved) state.
    pub fn set_clean(&mut self) {
        if self.is_clean() {
            return;
        }
        self.clean_index = Some(self.current_index);
        self.emit(UndoStackEvent::CleanChanged(true));
    }

    /// Executes a command and pushes it onto the stack.
    ///
    /// A command reporting that it did nothing is discarded (unless
    /// `force_keep` is set). The redoable tail is cut off; if the clean mark
    /// was inside that tail it becomes unreachable.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ActiveTransaction`] while a command group is
    /// active, or the command's execution error. On error the stack is
    /// unchanged and the command is dropped.
    pub fn exec_cmd(&mut self, cmd: Box<dyn UndoCommand>, force_keep: bool) -> EditorResult<bool> {
        if self.group_active {
            return Err(EditorError::ActiveTransaction);
        }
        let mut cmd = cmd;
        let done_something = cmd.execute()?;
        if done_something || force_keep {
            self.push_executed(StackEntry::Command(cmd));
            Ok(done_something)
        } else {
            // Make sure a no-op command really left no traces behind.
            cmd.undo()?;
            Ok(false)
        }
    }

    fn push_executed(&mut self, entry: StackEntry) {
        // The clean state is gone if it was above the current position.
        if let Some(clean) = self.clean_index {
            if clean > self.current_index {
                self.clean_index = None;
            }
        }
        // Cut off the redoable tail, newest first.
        while self.commands.len() > self.current_index {
            self.commands.pop();
        }
        let text = entry.text().to_string();
        self.commands.push(entry);
        self.current_index += 1;
        self.emit(UndoStackEvent::UndoTextChanged(format!("Undo: {text}")));
        self.emit(UndoStackEvent::RedoTextChanged("Redo".to_string()));
        self.emit(UndoStackEvent::CanUndoChanged(true));
        self.emit(UndoStackEvent::CanRedoChanged(false));
        self.emit(UndoStackEvent::CleanChanged(false));
        self.emit(UndoStackEvent::StateModified);
    }

    /// Opens a new command group at the top of the stack.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ActiveTransaction`] if a group is already
    /// active.
    pub fn begin_cmd_group(&mut self, text: impl Into<String>) -> EditorResult<()> {
        if self.group_active {
            return Err(EditorError::ActiveTransaction);
        }
        let text = text.into();
        debug!(group = %text, "beginning command group");
        let mut group = UndoCommandGroup::new(text);
        // An empty group does nothing, so executing it cannot fail.
        group.execute()?;
        self.push_executed(StackEntry::Group(group));
        self.group_active = true;
        self.emit(UndoStackEvent::CanUndoChanged(false));
        Ok(())
    }

    /// Executes a command as a child of the active group.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::LogicError`] without an active group, or the
    /// child's execution error.
    pub fn append_to_cmd_group(&mut self, cmd: Box<dyn UndoCommand>) -> EditorResult<bool> {
        if !self.group_active {
            return Err(EditorError::logic("no command group active"));
        }
        debug_assert_eq!(self.current_index, self.commands.len());
        let Some(StackEntry::Group(group)) = self.commands.last_mut() else {
            return Err(EditorError::logic("active command group is not on top"));
        };
        let done_something = group.append_child(cmd)?;
        self.emit(UndoStackEvent::StateModified);
        Ok(done_something)
    }

    /// Commits the active command group. A group without effective children
    /// is aborted instead.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::LogicError`] without an active group.
    pub fn commit_cmd_group(&mut self) -> EditorResult<bool> {
        if !self.group_active {
            return Err(EditorError::logic("no command group active"));
        }
        let child_count = match self.commands.last() {
            Some(StackEntry::Group(group)) => group.child_count(),
            _ => return Err(EditorError::logic("active command group is not on top")),
        };
        if child_count == 0 {
            self.abort_cmd_group()?;
            return Ok(false);
        }
        debug!(children = child_count, "committed command group");
        self.group_active = false;
        self.emit(UndoStackEvent::CanUndoChanged(self.can_undo()));
        self.emit(UndoStackEvent::CommandGroupEnded);
        Ok(true)
    }

    /// Aborts the active command group, reverting all its children.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::LogicError`] without an active group, or the
    /// group's undo error (the group then stays active).
    pub fn abort_cmd_group(&mut self) -> EditorResult<()> {
        if !self.group_active {
            return Err(EditorError::logic("no command group active"));
        }
        debug_assert_eq!(self.current_index, self.commands.len());
        let Some(StackEntry::Group(group)) = self.commands.last_mut() else {
            return Err(EditorError::logic("active command group is not on top"));
        };
        if let Err(e) = group.undo() {
            error!(%e, "undo of the active command group failed");
            return Err(e);
        }
        self.group_active = false;
        self.current_index -= 1;
        self.commands.pop();
        self.emit(UndoStackEvent::UndoTextChanged(self.undo_text()));
        self.emit(UndoStackEvent::RedoTextChanged("Redo".to_string()));
        self.emit(UndoStackEvent::CanUndoChanged(self.can_undo()));
        self.emit(UndoStackEvent::CanRedoChanged(false));
        self.emit(UndoStackEvent::CleanChanged(self.is_clean()));
        self.emit(UndoStackEvent::CommandGroupAborted);
        self.emit(UndoStackEvent::StateModified);
        Ok(())
    }

    /// Undoes the newest applied command. No-op while a command group is
    /// active or when there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns the command's undo error; the stack position is only moved on
    /// success.
    pub fn undo(&mut self) -> EditorResult<()> {
        if !self.can_undo() {
            return Ok(());
        }
        if let Err(e) = self.commands[self.current_index - 1].as_command_mut().undo() {
            error!(%e, "undo failed");
            return Err(e);
        }
        self.current_index -= 1;
        self.emit_position_changed();
        Ok(())
    }

    /// Redoes the next redoable command, if any.
    ///
    /// # Errors
    ///
    /// Returns the command's redo error; the stack position is only moved on
    /// success.
    pub fn redo(&mut self) -> EditorResult<()> {
        if !self.can_redo() {
            return Ok(());
        }
        if let Err(e) = self.commands[self.current_index].as_command_mut().redo() {
            error!(%e, "redo failed");
            return Err(e);
        }
        self.current_index += 1;
        self.emit_position_changed();
        Ok(())
    }

    /// Destroys the whole history, newest command first. An active command
    /// group is aborted first (best effort).
    pub fn clear(&mut self) {
        if self.commands.is_empty() {
            return;
        }
        if self.group_active {
            if let Err(e) = self.abort_cmd_group() {
                warn!(%e, "could not abort the active command group");
            }
        }
        while self.commands.pop().is_some() {}
        self.current_index = 0;
        self.clean_index = Some(0);
        self.group_active = false;
        self.emit(UndoStackEvent::UndoTextChanged("Undo".to_string()));
        self.emit(UndoStackEvent::RedoTextChanged("Redo".to_string()));
        self.emit(UndoStackEvent::CanUndoChanged(false));
        self.emit(UndoStackEvent::CanRedoChanged(false));
        self.emit(UndoStackEvent::CleanChanged(true));
    }

    fn emit_position_changed(&self) {
        self.emit(UndoStackEvent::UndoTextChanged(self.undo_text()));
        self.emit(UndoStackEvent::RedoTextChanged(self.redo_text()));
        self.emit(UndoStackEvent::CanUndoChanged(self.can_undo()));
        self.emit(UndoStackEvent::CanRedoChanged(self.can_redo()));
        self.emit(UndoStackEvent::CleanChanged(self.is_clean()));
        self.emit(UndoStackEvent::StateModified);
    }

    fn emit(&self, event: UndoStackEvent) {
        self.on_changed.notify(&event);
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for UndoStack {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for UndoStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoStack")
            .field("commands", &self.commands.len())
            .field("current_index", &self.current_index)
            .field("clean_index", &self.clean_index)
            .field("group_active", &self.group_active)
            .finish()
    }
}

/// Scoped guard for a command group on a shared [`UndoStack`].
///
/// Dropping an unfinished transaction aborts the group (best effort); an
/// abort failure at that point indicates serious corruption and is logged
/// loudly.
pub struct UndoStackTransaction {
    stack: Rc<RefCell<UndoStack>>,
    active: bool,
}

impl UndoStackTransaction {
    /// Opens a command group on `stack`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ActiveTransaction`] if a group is already
    /// active.
    pub fn new(stack: Rc<RefCell<UndoStack>>, text: impl Into<String>) -> EditorResult<Self> {
        stack.borrow_mut().begin_cmd_group(text)?;
        Ok(Self {
            stack,
            active: true,
        })
    }

    /// Executes a command as part of the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::LogicError`] after commit/abort, or the
    /// command's execution error.
    pub fn append(&mut self, cmd: Box<dyn UndoCommand>) -> EditorResult<bool> {
        if !self.active {
            return Err(EditorError::logic("append to a finished transaction"));
        }
        self.stack.borrow_mut().append_to_cmd_group(cmd)
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::LogicError`] after commit/abort, or the
    /// stack's commit error.
    pub fn commit(mut self) -> EditorResult<bool> {
        if !self.active {
            return Err(EditorError::logic("commit of a finished transaction"));
        }
        self.active = false;
        self.stack.borrow_mut().commit_cmd_group()
    }

    /// Aborts the transaction, reverting all appended commands.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::LogicError`] after commit/abort, or the
    /// stack's abort error.
    pub fn abort(mut self) -> EditorResult<()> {
        if !self.active {
            return Err(EditorError::logic("abort of a finished transaction"));
        }
        self.active = false;
        self.stack.borrow_mut().abort_cmd_group()
    }
}

impl Drop for UndoStackTransaction {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = self.stack.borrow_mut().abort_cmd_group() {
                error!(%e, "aborting a dangling transaction failed; undo stack may be corrupt");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::CommandMeta;
    use super::*;
    use std::cell::Cell;

    struct AddCommand {
        meta: CommandMeta,
        value: Rc<Cell<i32>>,
        delta: i32,
    }

    impl AddCommand {
        fn boxed(value: &Rc<Cell<i32>>, delta: i32) -> Box<Self> {
            Box::new(Self {
                meta: CommandMeta::new(format!("Add {delta}")),
                value: Rc::clone(value),
                delta,
            })
        }
    }

    impl UndoCommand for AddCommand {
        fn meta(&self) -> &CommandMeta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut CommandMeta {
            &mut self.meta
        }

        fn perform_execute(&mut self) -> EditorResult<bool> {
            self.perform_redo()?;
            Ok(self.delta != 0)
        }

        fn perform_undo(&mut self) -> EditorResult<()> {
            self.value.set(self.value.get() - self.delta);
            Ok(())
        }

        fn perform_redo(&mut self) -> EditorResult<()> {
            self.value.set(self.value.get() + self.delta);
            Ok(())
        }
    }

    #[test]
    fn exec_undo_redo_moves_the_position() {
        let value = Rc::new(Cell::new(0));
        let mut stack = UndoStack::new();
        stack.exec_cmd(AddCommand::boxed(&value, 1), false).unwrap();
        stack.exec_cmd(AddCommand::boxed(&value, 2), false).unwrap();
        assert_eq!(value.get(), 3);
        assert_eq!(stack.undo_text(), "Undo: Add 2");
        stack.undo().unwrap();
        assert_eq!(value.get(), 1);
        assert!(stack.can_redo());
        stack.redo().unwrap();
        assert_eq!(value.get(), 3);
    }

    #[test]
    fn no_op_commands_are_discarded() {
        let value = Rc::new(Cell::new(0));
        let mut stack = UndoStack::new();
        stack.exec_cmd(AddCommand::boxed(&value, 0), false).unwrap();
        assert!(stack.is_empty());
        assert!(!stack.can_undo());
    }

    #[test]
    fn clean_mark_invalidated_by_tail_cut() {
        let value = Rc::new(Cell::new(0));
        let mut stack = UndoStack::new();
        stack.exec_cmd(AddCommand::boxed(&value, 1), false).unwrap();
        stack.exec_cmd(AddCommand::boxed(&value, 2), false).unwrap();
        stack.set_clean();
        assert!(stack.is_clean());
        stack.undo().unwrap();
        stack.undo().unwrap();
        // Executing below the clean mark cuts it off for good.
        stack.exec_cmd(AddCommand::boxed(&value, 5), false).unwrap();
        assert!(!stack.is_clean());
        stack.undo().unwrap();
        assert!(!stack.is_clean());
        stack.redo().unwrap();
        assert!(!stack.is_clean());
    }

    #[test]
    fn group_blocks_exec_and_undo() {
        let value = Rc::new(Cell::new(0));
        let mut stack = UndoStack::new();
        stack.exec_cmd(AddCommand::boxed(&value, 1), false).unwrap();
        stack.begin_cmd_group("Group").unwrap();
        assert!(matches!(
            stack.exec_cmd(AddCommand::boxed(&value, 2), false),
            Err(EditorError::ActiveTransaction)
        ));
        assert!(!stack.can_undo());
        stack.undo().unwrap(); // no-op
        assert_eq!(value.get(), 1);
        stack.append_to_cmd_group(AddCommand::boxed(&value, 2)).unwrap();
        assert_eq!(value.get(), 3);
        stack.commit_cmd_group().unwrap();
        assert!(stack.can_undo());
        stack.undo().unwrap();
        assert_eq!(value.get(), 1);
    }

    #[test]
    fn abort_reverts_and_removes_the_group() {
        let value = Rc::new(Cell::new(0));
        let mut stack = UndoStack::new();
        let before = stack.len();
        stack.begin_cmd_group("Group").unwrap();
        stack.append_to_cmd_group(AddCommand::boxed(&value, 2)).unwrap();
        stack.append_to_cmd_group(AddCommand::boxed(&value, 3)).unwrap();
        stack.abort_cmd_group().unwrap();
        assert_eq!(value.get(), 0);
        assert_eq!(stack.len(), before);
        assert!(!stack.is_command_group_active());
    }

    #[test]
    fn empty_group_commit_behaves_like_abort() {
        let mut stack = UndoStack::new();
        stack.begin_cmd_group("Empty").unwrap();
        assert!(!stack.commit_cmd_group().unwrap());
        assert!(stack.is_empty());
        assert!(!stack.is_command_group_active());
    }

    #[test]
    fn transaction_drop_aborts() {
        let value = Rc::new(Cell::new(0));
        let stack = Rc::new(RefCell::new(UndoStack::new()));
        {
            let mut tx = UndoStackTransaction::new(Rc::clone(&stack), "Tx").unwrap();
            tx.append(AddCommand::boxed(&value, 7)).unwrap();
            assert_eq!(value.get(), 7);
        }
        assert_eq!(value.get(), 0);
        assert!(!stack.borrow().is_command_group_active());
        assert!(stack.borrow().is_empty());
    }

    #[test]
    fn transaction_commit_keeps_changes() {
        let value = Rc::new(Cell::new(0));
        let stack = Rc::new(RefCell::new(UndoStack::new()));
        let mut tx = UndoStackTransaction::new(Rc::clone(&stack), "Tx").unwrap();
        tx.append(AddCommand::boxed(&value, 7)).unwrap();
        assert!(tx.commit().unwrap());
        assert_eq!(value.get(), 7);
        stack.borrow_mut().undo().unwrap();
        assert_eq!(value.get(), 0);
    }

    #[test]
    fn clear_aborts_active_group_and_empties() {
        let value = Rc::new(Cell::new(0));
        let mut stack = UndoStack::new();
        stack.exec_cmd(AddCommand::boxed(&value, 1), false).unwrap();
        stack.begin_cmd_group("Group").unwrap();
        stack.append_to_cmd_group(AddCommand::boxed(&value, 2)).unwrap();
        stack.clear();
        assert!(stack.is_empty());
        assert!(!stack.is_command_group_active());
        // The aborted group reverted its child; the executed command stays
        // applied because clearing does not undo history.
        assert_eq!(value.get(), 1);
    }
}
