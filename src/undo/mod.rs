//! The undo command protocol.
//!
//! A command is executed exactly once, then toggled between undone and
//! redone. The protocol driver lives in the trait's provided methods; the
//! concrete command only implements the `perform_*` hooks. Calling the
//! operations out of order is a [`LogicError`](crate::error::EditorError).

mod group;
mod stack;

pub use group::UndoCommandGroup;
pub use stack::{UndoStack, UndoStackEvent, UndoStackTransaction};

use crate::error::{EditorError, EditorResult};

/// Bookkeeping shared by all undo commands: the description text and the
/// execute/undo/redo counters driving the protocol checks.
#[derive(Debug)]
pub struct CommandMeta {
    text: String,
    is_executed: bool,
    redo_count: u32,
    undo_count: u32,
}

impl CommandMeta {
    /// Creates command metadata with a description text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_executed: false,
            redo_count: 0,
            undo_count: 0,
        }
    }

    /// The description shown in undo/redo menu entries.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether [`UndoCommand::execute`] ran successfully.
    #[must_use]
    pub const fn was_ever_executed(&self) -> bool {
        self.redo_count > 0
    }

    /// Whether [`UndoCommand::undo`] ran at least once.
    #[must_use]
    pub const fn was_ever_reverted(&self) -> bool {
        self.undo_count > 0
    }

    /// Whether the command's changes are currently applied.
    #[must_use]
    pub const fn is_currently_executed(&self) -> bool {
        self.redo_count > self.undo_count
    }
}

impl Drop for CommandMeta {
    fn drop(&mut self) {
        // A balanced command is either fully applied or fully reverted.
        if !std::thread::panicking() {
            debug_assert!(
                self.redo_count.abs_diff(self.undo_count) <= 1,
                "undo command '{}' dropped with unbalanced counters ({} redos, {} undos)",
                self.text,
                self.redo_count,
                self.undo_count
            );
        }
    }
}

/// A reversible operation on the library model.
///
/// Implementors provide the three `perform_*` hooks and the metadata
/// accessors; the `execute`/`undo`/`redo` drivers enforce the protocol.
pub trait UndoCommand {
    /// The command's bookkeeping.
    fn meta(&self) -> &CommandMeta;

    /// Mutable access to the command's bookkeeping.
    fn meta_mut(&mut self) -> &mut CommandMeta;

    /// Applies the command the first time.
    ///
    /// Returns whether the command changed anything; a `false` lets the
    /// stack discard it. On error the model must be left in its pre-call
    /// state.
    ///
    /// # Errors
    ///
    /// Implementation-specific; commonly [`EditorError::UserError`].
    fn perform_execute(&mut self) -> EditorResult<bool>;

    /// Reverts the command's changes.
    ///
    /// # Errors
    ///
    /// Implementation-specific.
    fn perform_undo(&mut self) -> EditorResult<()>;

    /// Re-applies the command's changes.
    ///
    /// # Errors
    ///
    /// Implementation-specific.
    fn perform_redo(&mut self) -> EditorResult<()>;

    /// The description shown in undo/redo menu entries.
    fn text(&self) -> &str {
        self.meta().text()
    }

    /// Executes the command. Must only be called once.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::LogicError`] when called twice, or whatever
    /// [`Self::perform_execute`] fails with.
    fn execute(&mut self) -> EditorResult<bool> {
        if self.meta().is_executed {
            return Err(EditorError::logic("command executed twice"));
        }
        // Set the flag before performing so a throwing implementation
        // cannot be executed again.
        self.meta_mut().is_executed = true;
        let done_something = self.perform_execute()?;
        self.meta_mut().redo_count += 1;
        Ok(done_something)
    }

    /// Undoes the command.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::LogicError`] if the command is not currently
    /// executed, or whatever [`Self::perform_undo`] fails with.
    fn undo(&mut self) -> EditorResult<()> {
        if !self.meta().is_currently_executed() {
            return Err(EditorError::logic("undo of a command that is not executed"));
        }
        self.perform_undo()?;
        self.meta_mut().undo_count += 1;
        Ok(())
    }

    /// Redoes the command.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::LogicError`] if the command was never executed
    /// or is already applied, or whatever [`Self::perform_redo`] fails with.
    fn redo(&mut self) -> EditorResult<()> {
        if !self.meta().was_ever_executed() || self.meta().is_currently_executed() {
            return Err(EditorError::logic("redo of a command that is not undone"));
        }
        self.perform_redo()?;
        self.meta_mut().redo_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CounterCommand {
        meta: CommandMeta,
        value: Rc<Cell<i32>>,
        done: bool,
    }

    impl CounterCommand {
        fn new(value: Rc<Cell<i32>>, done: bool) -> Self {
            Self {
                meta: CommandMeta::new("Increment"),
                value,
                done,
            }
        }
    }

    impl UndoCommand for CounterCommand {
        fn meta(&self) -> &CommandMeta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut CommandMeta {
            &mut self.meta
        }

        fn perform_execute(&mut self) -> EditorResult<bool> {
            if self.done {
                self.value.set(self.value.get() + 1);
            }
            Ok(self.done)
        }

        fn perform_undo(&mut self) -> EditorResult<()> {
            if self.done {
                self.value.set(self.value.get() - 1);
            }
            Ok(())
        }

        fn perform_redo(&mut self) -> EditorResult<()> {
            if self.done {
                self.value.set(self.value.get() + 1);
            }
            Ok(())
        }
    }

    #[test]
    fn protocol_happy_path() {
        let value = Rc::new(Cell::new(0));
        let mut cmd = CounterCommand::new(Rc::clone(&value), true);
        assert!(cmd.execute().unwrap());
        assert_eq!(value.get(), 1);
        cmd.undo().unwrap();
        assert_eq!(value.get(), 0);
        cmd.redo().unwrap();
        assert_eq!(value.get(), 1);
        cmd.undo().unwrap();
    }

    #[test]
    fn double_execute_is_a_logic_error() {
        let mut cmd = CounterCommand::new(Rc::new(Cell::new(0)), true);
        cmd.execute().unwrap();
        assert!(matches!(
            cmd.execute(),
            Err(EditorError::LogicError { .. })
        ));
        cmd.undo().unwrap();
    }

    #[test]
    fn double_undo_is_a_logic_error() {
        let mut cmd = CounterCommand::new(Rc::new(Cell::new(0)), true);
        cmd.execute().unwrap();
        cmd.undo().unwrap();
        assert!(matches!(cmd.undo(), Err(EditorError::LogicError { .. })));
    }

    #[test]
    fn redo_before_execute_is_a_logic_error() {
        let mut cmd = CounterCommand::new(Rc::new(Cell::new(0)), true);
        assert!(matches!(cmd.redo(), Err(EditorError::LogicError { .. })));
        // Leave the command balanced for the drop assertion.
        cmd.execute().unwrap();
    }
}
