use crate::spec::Form;

/// Linear undo/redo over whole-form snapshots.
///
/// `index` is `None` while no form is being edited. Recording after an undo
/// discards every snapshot past the cursor.
#[derive(Debug, Clone, Default)]
pub struct History {
    snapshots: Vec<Form>,
    index: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session whose only snapshot is `form`.
    pub fn reset(&mut self, form: Form) {
        self.snapshots = vec![form];
        self.index = Some(0);
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.index = None;
    }

    pub fn record(&mut self, form: Form) {
        let keep = self.index.map(|index| index + 1).unwrap_or(0);
        self.snapshots.truncate(keep);
        self.snapshots.push(form);
        self.index = Some(self.snapshots.len() - 1);
    }

    /// Swaps the snapshot under the cursor for `form` without adding a step.
    pub fn rebase(&mut self, form: Form) {
        if let Some(slot) = self.index.and_then(|index| self.snapshots.get_mut(index)) {
            *slot = form;
        }
    }

    pub fn undo(&mut self) -> Option<&Form> {
        let index = self.index.filter(|index| *index > 0)? - 1;
        self.index = Some(index);
        self.snapshots.get(index)
    }

    pub fn redo(&mut self) -> Option<&Form> {
        let index = self.index? + 1;
        if index >= self.snapshots.len() {
            return None;
        }
        self.index = Some(index);
        self.snapshots.get(index)
    }

    pub fn can_undo(&self) -> bool {
        self.index.is_some_and(|index| index > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.index
            .is_some_and(|index| index + 1 < self.snapshots.len())
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn current(&self) -> Option<&Form> {
        self.index.and_then(|index| self.snapshots.get(index))
    }
}
