//! Bounded step index over a gesture's instruction list.

/// How a step relates to the cursor, for rendering the instruction list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Done,
    Current,
    Upcoming,
}

/// Index into `[0, step_count - 1]`, moved only by `next`/`previous`/`reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionCursor {
    index: usize,
    step_count: usize,
}

impl InstructionCursor {
    /// `step_count` is clamped to at least one step.
    #[must_use]
    pub fn new(step_count: usize) -> Self {
        Self {
            index: 0,
            step_count: step_count.max(1),
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.step_count
    }

    /// Advance one step. Returns `false` (and does nothing) on the last step.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Go back one step. Returns `false` (and does nothing) on the first step.
    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    #[must_use]
    pub fn step_status(&self, step: usize) -> StepStatus {
        match step.cmp(&self.index) {
            std::cmp::Ordering::Less => StepStatus::Done,
            std::cmp::Ordering::Equal => StepStatus::Current,
            std::cmp::Ordering::Greater => StepStatus::Upcoming,
        }
    }
}
