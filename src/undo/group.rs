//! Ordered composition of undo commands.

use tracing::error;

use super::{CommandMeta, UndoCommand};
use crate::error::{EditorError, EditorResult};

/// A command composed of child commands executed in insertion order.
///
/// If a child fails during execute or redo, the already applied children are
/// rolled back in reverse order so the group either applies completely or
/// not at all.
pub struct UndoCommandGroup {
    meta: CommandMeta,
    children: Vec<Box<dyn UndoCommand>>,
}

impl UndoCommandGroup {
    /// Creates an empty group.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            meta: CommandMeta::new(text),
            children: Vec::new(),
        }
    }

    /// Number of retained children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Appends a child command.
    ///
    /// If the group was already executed, the child is executed immediately;
    /// a child that reports having done nothing is undone again and not
    /// retained. Appending after the group was reverted once is a logic
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::LogicError`] on protocol misuse, or the
    /// child's execution error.
    pub fn append_child(&mut self, mut child: Box<dyn UndoCommand>) -> EditorResult<bool> {
        if self.meta.was_ever_reverted() {
            return Err(EditorError::logic("append to a reverted command group"));
        }
        if self.meta.was_ever_executed() {
            let done_something = child.execute()?;
            if done_something {
                self.children.push(child);
            } else {
                // Make sure a no-op child has really left no traces behind.
                child.undo()?;
            }
            Ok(done_something)
        } else {
            self.children.push(child);
            Ok(false)
        }
    }

    fn rollback(children: &mut [Box<dyn UndoCommand>], applied: usize) {
        for child in children[..applied].iter_mut().rev() {
            if let Err(rollback_error) = child.undo() {
                error!(%rollback_error, "rollback of a command group child failed");
            }
        }
    }

    fn roll_forward(children: &mut [Box<dyn UndoCommand>], reverted_from_end: usize) {
        let count = children.len();
        for child in children[count - reverted_from_end..].iter_mut() {
            if let Err(rollback_error) = child.redo() {
                error!(%rollback_error, "roll-forward of a command group child failed");
            }
        }
    }
}

impl UndoCommand for UndoCommandGroup {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        for i in 0..self.children.len() {
            if let Err(e) = self.children[i].execute() {
                Self::rollback(&mut self.children, i);
                return Err(e);
            }
        }
        Ok(!self.children.is_empty())
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        let count = self.children.len();
        for i in (0..count).rev() {
            if let Err(e) = self.children[i].undo() {
                Self::roll_forward(&mut self.children, count - 1 - i);
                return Err(e);
            }
        }
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        for i in 0..self.children.len() {
            if let Err(e) = self.children[i].redo() {
                Self::rollback(&mut self.children, i);
                return Err(e);
            }
        }
        Ok(())
    }
}

impl Drop for UndoCommandGroup {
    fn drop(&mut self) {
        // Children are destroyed in reverse insertion order.
        while self.children.pop().is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct PushCommand {
        meta: CommandMeta,
        log: Rc<RefCell<Vec<String>>>,
        id: &'static str,
        fail_on_execute: bool,
    }

    impl PushCommand {
        fn new(log: &Rc<RefCell<Vec<String>>>, id: &'static str, fail_on_execute: bool) -> Box<Self> {
            Box::new(Self {
                meta: CommandMeta::new(id),
                log: Rc::clone(log),
                id,
                fail_on_execute,
            })
        }
    }

    impl UndoCommand for PushCommand {
        fn meta(&self) -> &CommandMeta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut CommandMeta {
            &mut self.meta
        }

        fn perform_execute(&mut self) -> EditorResult<bool> {
            if self.fail_on_execute {
                return Err(EditorError::user("boom"));
            }
            self.log.borrow_mut().push(format!("+{}", self.id));
            Ok(true)
        }

        fn perform_undo(&mut self) -> EditorResult<()> {
            self.log.borrow_mut().push(format!("-{}", self.id));
            Ok(())
        }

        fn perform_redo(&mut self) -> EditorResult<()> {
            self.log.borrow_mut().push(format!("+{}", self.id));
            Ok(())
        }
    }

    #[test]
    fn children_run_in_order_and_undo_in_reverse() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut group = UndoCommandGroup::new("Group");
        group.append_child(PushCommand::new(&log, "a", false)).unwrap();
        group.append_child(PushCommand::new(&log, "b", false)).unwrap();
        assert!(group.execute().unwrap());
        group.undo().unwrap();
        group.redo().unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["+a", "+b", "-b", "-a", "+a", "+b"]
        );
        group.undo().unwrap();
    }

    #[test]
    fn failing_child_rolls_back_executed_children() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut group = UndoCommandGroup::new("Group");
        group.append_child(PushCommand::new(&log, "a", false)).unwrap();
        group.append_child(PushCommand::new(&log, "b", true)).unwrap();
        assert!(group.execute().is_err());
        // "a" ran and was rolled back; "b" never applied.
        assert_eq!(*log.borrow(), vec!["+a", "-a"]);
    }

    #[test]
    fn append_to_executed_group_runs_immediately() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut group = UndoCommandGroup::new("Group");
        group.execute().unwrap();
        assert!(group.append_child(PushCommand::new(&log, "a", false)).unwrap());
        assert_eq!(group.child_count(), 1);
        assert_eq!(*log.borrow(), vec!["+a"]);
        group.undo().unwrap();
    }

    #[test]
    fn append_after_revert_is_a_logic_error() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut group = UndoCommandGroup::new("Group");
        group.append_child(PushCommand::new(&log, "a", false)).unwrap();
        group.execute().unwrap();
        group.undo().unwrap();
        assert!(matches!(
            group.append_child(PushCommand::new(&log, "b", false)),
            Err(EditorError::LogicError { .. })
        ));
    }

    #[test]
    fn empty_group_reports_no_changes() {
        let mut group = UndoCommandGroup::new("Empty");
        assert!(!group.execute().unwrap());
    }
}
