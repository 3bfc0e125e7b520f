//! The operation log: applied operations plus an undo stack.

use crate::operation::{Operation, OperationId};
use crate::shapes::ShapeId;

/// Ordered store of operations with undo/redo.
///
/// `active` holds applied operations in application order. `undone` holds
/// operations removed by undo, most recent last. An id lives in at most one
/// of the two.
#[derive(Debug, Clone, Default)]
pub struct OperationLog {
    active: Vec<Operation>,
    undone: Vec<Operation>,
}

impl OperationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation.
    ///
    /// Appending an id that is already active is a no-op and returns false,
    /// so replays are safe. An id that sits on the undo stack is taken off it
    /// first.
    pub fn append(&mut self, operation: Operation) -> bool {
        if self.contains(operation.id) {
            return false;
        }
        self.undone.retain(|o| o.id != operation.id);
        self.active.push(operation);
        true
    }

    /// Delete an active operation. Does not touch the undo stack.
    pub fn remove(&mut self, id: OperationId) -> Option<Operation> {
        let pos = self.position(id)?;
        Some(self.active.remove(pos))
    }

    /// Move the most recent operation (by timestamp) to the undo stack.
    pub fn undo(&mut self) -> Option<&Operation> {
        // Stable: equal timestamps keep application order.
        self.active.sort_by_key(|o| o.timestamp);
        let operation = self.active.pop()?;
        self.undone.push(operation);
        self.undone.last()
    }

    /// Re-apply the most recently undone operation at the end of `active`.
    pub fn redo(&mut self) -> Option<&Operation> {
        let operation = self.undone.pop()?;
        self.active.push(operation);
        self.active.last()
    }

    /// Mutate an active operation in place.
    pub fn update<F>(&mut self, id: OperationId, mutator: F) -> Option<&Operation>
    where
        F: FnOnce(&mut Operation),
    {
        let pos = self.position(id)?;
        let operation = &mut self.active[pos];
        mutator(operation);
        // The id is the log's key; a mutator must not change it.
        operation.id = id;
        Some(&self.active[pos])
    }

    /// Drop everything, including the undo stack.
    pub fn clear(&mut self) {
        self.active.clear();
        self.undone.clear();
    }

    pub fn get(&self, id: OperationId) -> Option<&Operation> {
        self.active.iter().find(|o| o.id == id)
    }

    pub fn contains(&self, id: OperationId) -> bool {
        self.position(id).is_some()
    }

    /// Whether the id is waiting on the undo stack.
    pub fn is_undone(&self, id: OperationId) -> bool {
        self.undone.iter().any(|o| o.id == id)
    }

    /// Find the active operation placing the given path or shape.
    pub fn find_by_shape(&self, shape_id: ShapeId) -> Option<&Operation> {
        self.active.iter().find(|o| o.shape_id() == shape_id)
    }

    /// Most recently applied stroke authored by `user`.
    pub fn last_stroke_by(&self, user: Option<&str>) -> Option<&Operation> {
        self.active
            .iter()
            .rev()
            .find(|o| o.is_draw() && o.is_authored_by(user))
    }

    /// Applied operations, in application order.
    pub fn active(&self) -> &[Operation] {
        &self.active
    }

    /// Undone operations, most recent last.
    pub fn undone(&self) -> &[Operation] {
        &self.undone
    }

    pub fn can_undo(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    fn position(&self, id: OperationId) -> Option<usize> {
        self.active.iter().position(|o| o.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Path, SerializableColor, TextShape};
    use kurbo::{Point, Size};
    use uuid::Uuid;

    fn op(timestamp: u64) -> Operation {
        let path = Path::from_points(
            Uuid::new_v4(),
            SerializableColor::black(),
            2.0,
            vec![Point::new(0.0, 0.0)],
        );
        Operation::draw(path, Size::new(100.0, 100.0), None).with_timestamp(timestamp)
    }

    #[test]
    fn test_log_creation() {
        let log = OperationLog::new();
        assert!(log.is_empty());
        assert!(!log.can_undo());
        assert!(!log.can_redo());
    }

    #[test]
    fn test_append_is_idempotent() {
        let mut log = OperationLog::new();
        let a = op(1);
        assert!(log.append(a.clone()));
        assert!(!log.append(a.clone()));
        assert_eq!(log.len(), 1);
        assert!(log.undone().is_empty());
    }

    #[test]
    fn test_undo_picks_latest_timestamp() {
        let mut log = OperationLog::new();
        let ops = [op(10), op(30), op(20)];
        for o in &ops {
            log.append(o.clone());
        }

        let undone = log.undo().unwrap();
        assert_eq!(undone.timestamp, 30);
        assert_eq!(undone.id, ops[1].id);
        assert_eq!(log.len(), 2);
        assert!(log.is_undone(ops[1].id));
        assert!(!log.contains(ops[1].id));
    }

    #[test]
    fn test_undo_redo_restores_membership() {
        let mut log = OperationLog::new();
        for t in [5, 1, 3] {
            log.append(op(t));
        }
        let before: Vec<_> = {
            let mut ids: Vec<_> = log.active().iter().map(|o| o.id).collect();
            ids.sort();
            ids
        };

        let undone_id = log.undo().unwrap().id;
        let redone_id = log.redo().unwrap().id;
        assert_eq!(undone_id, redone_id);

        let mut after: Vec<_> = log.active().iter().map(|o| o.id).collect();
        after.sort();
        assert_eq!(before, after);
        assert!(!log.can_redo());
    }

    #[test]
    fn test_redo_appends_at_end() {
        let mut log = OperationLog::new();
        let a = op(1);
        let b = op(2);
        log.append(a.clone());
        log.append(b.clone());

        log.undo();
        log.undo();
        assert_eq!(log.redo().unwrap().id, a.id);
        assert_eq!(log.redo().unwrap().id, b.id);
        assert_eq!(log.active()[0].id, a.id);
        assert_eq!(log.active()[1].id, b.id);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut log = OperationLog::new();
        assert!(log.undo().is_none());
        assert!(log.redo().is_none());
    }

    #[test]
    fn test_append_of_undone_id_leaves_undo_stack() {
        let mut log = OperationLog::new();
        let a = op(1);
        log.append(a.clone());
        log.undo();
        assert!(log.append(a.clone()));
        assert!(log.contains(a.id));
        assert!(!log.is_undone(a.id));
        assert!(log.redo().is_none());
    }

    #[test]
    fn test_remove() {
        let mut log = OperationLog::new();
        let a = op(1);
        log.append(a.clone());
        assert_eq!(log.remove(a.id).map(|o| o.id), Some(a.id));
        assert!(log.remove(a.id).is_none());
        assert!(log.is_empty());
        assert!(log.undone().is_empty());
    }

    #[test]
    fn test_update() {
        let mut log = OperationLog::new();
        let text = TextShape::new("x", Point::new(1.0, 1.0), Size::new(10.0, 10.0));
        let shape_id = text.id;
        let o = Operation::text(text, None);
        let id = o.id;
        log.append(o);

        let updated = log
            .update(id, |o| {
                if let Some(t) = o.as_text_mut() {
                    t.rotate = 1.0;
                }
                o.id = Uuid::new_v4();
            })
            .unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(updated.as_text().unwrap().rotate, 1.0);
        assert_eq!(log.find_by_shape(shape_id).map(|o| o.id), Some(id));

        assert!(log.update(Uuid::new_v4(), |o| o.timestamp = 0).is_none());
    }

    #[test]
    fn test_last_stroke_by() {
        let mut log = OperationLog::new();
        let mut mine = op(1);
        mine.user_id = Some("me".into());
        let mut theirs = op(2);
        theirs.user_id = Some("them".into());
        log.append(mine.clone());
        log.append(theirs);

        assert_eq!(log.last_stroke_by(Some("me")).map(|o| o.id), Some(mine.id));
        assert!(log.last_stroke_by(None).is_none());
    }

    #[test]
    fn test_clear() {
        let mut log = OperationLog::new();
        log.append(op(1));
        log.append(op(2));
        log.undo();
        log.clear();
        assert!(log.is_empty());
        assert!(!log.can_redo());
    }
}
