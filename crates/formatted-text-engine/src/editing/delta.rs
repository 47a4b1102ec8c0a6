use log::{debug, warn};

use crate::models::{Block, Line};

/// A single per-line change within a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    /// Replace the line at `index`.
    Modify { index: usize, line: Line },
    /// Drop the line at `index`.
    Remove { index: usize },
    /// Insert `line` so that it ends up at `index` once removals are done
    /// and lower insertions have been made.
    Insert { index: usize, line: Line },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeltaError {
    #[error("line {index} does not exist in a block of {lines} lines")]
    NoSuchLine { index: usize, lines: usize },
    #[error("line {index} is removed more than once")]
    DuplicateRemoval { index: usize },
    #[error("insertion index {index} is out of range, at most {max} is allowed")]
    InsertOutOfRange { index: usize, max: usize },
}

/// A set of line actions describing a change to one block.
///
/// Indices of modifications and removals refer to the block as it was before
/// the delta; insertion indices refer to the block after removals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    actions: Vec<LineAction>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modify(mut self, index: usize, line: Line) -> Self {
        self.actions.push(LineAction::Modify { index, line });
        self
    }

    pub fn remove(mut self, index: usize) -> Self {
        self.actions.push(LineAction::Remove { index });
        self
    }

    pub fn insert(mut self, index: usize, line: Line) -> Self {
        self.actions.push(LineAction::Insert { index, line });
        self
    }

    pub fn actions(&self) -> &[LineAction] {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Applies every action to `block`: modifications first, then removals
    /// from the highest index down, then insertions from the lowest index up.
    ///
    /// The whole delta is checked before the block is touched, so on error
    /// the block is unchanged.
    pub fn apply(&self, block: &mut Block) -> Result<(), DeltaError> {
        let plan = self.plan(block.lines().len()).inspect_err(|err| {
            warn!("rejecting delta: {err}");
        })?;
        debug!(
            "applying delta: {} modified, {} removed, {} inserted",
            plan.modified.len(),
            plan.removed.len(),
            plan.inserted.len()
        );

        let lines = block.lines_mut();
        for (index, line) in plan.modified {
            lines[index] = line.clone();
        }
        for index in plan.removed {
            lines.remove(index);
        }
        for (index, line) in plan.inserted {
            lines.insert(index, line.clone());
        }
        block.ensure_line();
        Ok(())
    }

    fn plan(&self, lines: usize) -> Result<Plan<'_>, DeltaError> {
        let mut plan = Plan::default();
        for action in &self.actions {
            match action {
                LineAction::Modify { index, line } => {
                    check_line(*index, lines)?;
                    plan.modified.push((*index, line));
                }
                LineAction::Remove { index } => {
                    check_line(*index, lines)?;
                    plan.removed.push(*index);
                }
                LineAction::Insert { index, line } => plan.inserted.push((*index, line)),
            }
        }

        plan.removed.sort_unstable_by(|a, b| b.cmp(a));
        if let Some(pair) = plan.removed.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(DeltaError::DuplicateRemoval { index: pair[0] });
        }

        plan.inserted.sort_by_key(|(index, _)| *index);
        let remaining = lines - plan.removed.len();
        for (inserted, (index, _)) in plan.inserted.iter().enumerate() {
            let max = remaining + inserted;
            if *index > max {
                return Err(DeltaError::InsertOutOfRange { index: *index, max });
            }
        }
        Ok(plan)
    }
}

#[derive(Default)]
struct Plan<'a> {
    modified: Vec<(usize, &'a Line)>,
    removed: Vec<usize>,
    inserted: Vec<(usize, &'a Line)>,
}

fn check_line(index: usize, lines: usize) -> Result<(), DeltaError> {
    if index < lines {
        Ok(())
    } else {
        Err(DeltaError::NoSuchLine { index, lines })
    }
}
