//! Generic list-level undo commands: insert, remove, swap.

use crate::error::{EditorError, EditorResult};
use crate::list::{ListItem, ObjectList};
use crate::undo::{CommandMeta, UndoCommand};
use crate::Shared;

/// Inserts an element into a list; undo removes it again.
pub struct CmdListElementInsert<T: ListItem> {
    meta: CommandMeta,
    list: ObjectList<T>,
    element: Shared<T>,
    index: Option<usize>,
}

impl<T: ListItem> CmdListElementInsert<T> {
    /// Creates the command. Without an `index` the element is appended.
    #[must_use]
    pub fn new(list: ObjectList<T>, element: Shared<T>, index: Option<usize>) -> Self {
        Self {
            meta: CommandMeta::new(format!("Add {}", T::TAG)),
            list,
            element,
            index,
        }
    }
}

impl<T: ListItem> UndoCommand for CmdListElementInsert<T> {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        if self.index.is_none() {
            self.index = Some(self.list.len());
        }
        self.perform_redo()?;
        Ok(true)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        let index = self.index.ok_or_else(|| EditorError::logic("insert without index"))?;
        self.list.remove(index)?;
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        let index = self.index.ok_or_else(|| EditorError::logic("insert without index"))?;
        self.index = Some(self.list.insert(index, Shared::clone(&self.element)));
        Ok(())
    }
}

/// Removes an element from a list; undo re-inserts it at its old index.
///
/// The command keeps the element alive while it is removed, so an undo can
/// resurrect the very same object other commands still reference.
pub struct CmdListElementRemove<T: ListItem> {
    meta: CommandMeta,
    list: ObjectList<T>,
    element: Shared<T>,
    index: Option<usize>,
}

impl<T: ListItem> CmdListElementRemove<T> {
    /// Creates the command for an element currently contained in `list`.
    #[must_use]
    pub fn new(list: ObjectList<T>, element: Shared<T>) -> Self {
        Self {
            meta: CommandMeta::new(format!("Remove {}", T::TAG)),
            list,
            element,
            index: None,
        }
    }
}

impl<T: ListItem> UndoCommand for CmdListElementRemove<T> {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        let index = self
            .list
            .index_of(&self.element)
            .ok_or_else(|| EditorError::logic("element to remove is not in the list"))?;
        self.index = Some(index);
        self.perform_redo()?;
        Ok(true)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        let index = self.index.ok_or_else(|| EditorError::logic("remove without index"))?;
        self.list.insert(index, Shared::clone(&self.element));
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        let index = self.index.ok_or_else(|| EditorError::logic("remove without index"))?;
        let removed = self.list.remove(index)?;
        debug_assert!(Shared::ptr_eq(&removed, &self.element));
        Ok(())
    }
}

/// Swaps two elements of a list.
pub struct CmdListElementsSwap<T: ListItem> {
    meta: CommandMeta,
    list: ObjectList<T>,
    i: usize,
    j: usize,
}

impl<T: ListItem> CmdListElementsSwap<T> {
    /// Creates the command.
    #[must_use]
    pub fn new(list: ObjectList<T>, i: usize, j: usize) -> Self {
        Self {
            meta: CommandMeta::new(format!("Move {}", T::TAG)),
            list,
            i,
            j,
        }
    }
}

impl<T: ListItem> UndoCommand for CmdListElementsSwap<T> {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        self.perform_redo()?;
        Ok(true)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        self.list.swap(self.j, self.i)
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        self.list.swap(self.i, self.j)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Circle;
    use crate::shared;
    use crate::types::{GraphicsLayerName, Point, PositiveLength, UnsignedLength};
    use uuid::Uuid;

    fn circle() -> Shared<Circle> {
        shared(Circle::new(
            Uuid::new_v4(),
            GraphicsLayerName::top_legend(),
            UnsignedLength::ZERO,
            false,
            false,
            Point::ORIGIN,
            PositiveLength::from_nm(1).unwrap(),
        ))
    }

    #[test]
    fn insert_appends_and_undo_removes() {
        let list = ObjectList::<Circle>::new();
        let element = circle();
        let mut cmd = CmdListElementInsert::new(list.clone(), Shared::clone(&element), None);
        assert!(cmd.execute().unwrap());
        assert_eq!(list.len(), 1);
        cmd.undo().unwrap();
        assert_eq!(list.len(), 0);
        cmd.redo().unwrap();
        assert_eq!(list.len(), 1);
        cmd.undo().unwrap();
    }

    #[test]
    fn remove_memorizes_index() {
        let list = ObjectList::<Circle>::new();
        let first = circle();
        let second = circle();
        list.append(Shared::clone(&first));
        list.append(Shared::clone(&second));
        let mut cmd = CmdListElementRemove::new(list.clone(), Shared::clone(&first));
        cmd.execute().unwrap();
        assert_eq!(list.len(), 1);
        cmd.undo().unwrap();
        assert_eq!(list.index_of(&first), Some(0));
        cmd.redo().unwrap();
    }

    #[test]
    fn removing_a_foreign_element_fails() {
        let list = ObjectList::<Circle>::new();
        let mut cmd = CmdListElementRemove::new(list, circle());
        assert!(cmd.execute().is_err());
    }

    #[test]
    fn swap_is_symmetric() {
        let list = ObjectList::<Circle>::new();
        let first = circle();
        let second = circle();
        list.append(Shared::clone(&first));
        list.append(Shared::clone(&second));
        let mut cmd = CmdListElementsSwap::new(list.clone(), 0, 1);
        cmd.execute().unwrap();
        assert_eq!(list.index_of(&first), Some(1));
        cmd.undo().unwrap();
        assert_eq!(list.index_of(&first), Some(0));
        cmd.redo().unwrap();
        cmd.undo().unwrap();
        assert_eq!(list.index_of(&second), Some(1));
    }
}
