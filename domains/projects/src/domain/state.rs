//! State machine for travel project status
//!
//! A project is `Completed` exactly when it holds at least one place and
//! every place is visited. The status is not recomputed on reads; callers
//! reconcile it after each mutation that can change it.

pub use voyage_common::StateError;

// ============================================================================
// Project State Machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectState {
    Active,
    Completed,
}

impl ProjectState {
    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [ProjectState] {
        match self {
            Self::Active => &[Self::Completed],
            Self::Completed => &[Self::Active],
        }
    }
}

impl std::fmt::Display for ProjectState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Events that trigger project state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectEvent {
    /// Every place has been visited
    Complete,
    /// A place was added, removed or marked unvisited
    Reopen,
}

impl std::fmt::Display for ProjectEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Reopen => write!(f, "reopen"),
        }
    }
}

/// Project state machine
pub struct ProjectStateMachine;

impl ProjectStateMachine {
    /// Attempt a state transition
    pub fn transition(
        current: ProjectState,
        event: ProjectEvent,
    ) -> Result<ProjectState, StateError> {
        match (&current, &event) {
            (ProjectState::Active, ProjectEvent::Complete) => Ok(ProjectState::Completed),
            (ProjectState::Completed, ProjectEvent::Reopen) => Ok(ProjectState::Active),
            _ => Err(StateError::InvalidTransition {
                from: current.to_string(),
                event: event.to_string(),
            }),
        }
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: ProjectState, event: &ProjectEvent) -> bool {
        Self::transition(current, event.clone()).is_ok()
    }
}

// ============================================================================
// Status synchronization
// ============================================================================

/// Derives project status from the visited flags of its places.
pub struct ProjectStatusSync;

impl ProjectStatusSync {
    /// Status the collection calls for. An empty collection is `Active`.
    pub fn target<I>(visited: I) -> ProjectState
    where
        I: IntoIterator<Item = bool>,
    {
        let mut any = false;
        for flag in visited {
            if !flag {
                return ProjectState::Active;
            }
            any = true;
        }
        if any {
            ProjectState::Completed
        } else {
            ProjectState::Active
        }
    }

    /// The state to persist, or `None` when `current` already matches.
    pub fn reconcile<I>(current: ProjectState, visited: I) -> Result<Option<ProjectState>, StateError>
    where
        I: IntoIterator<Item = bool>,
    {
        let target = Self::target(visited);
        if target == current {
            return Ok(None);
        }

        let event = match target {
            ProjectState::Completed => ProjectEvent::Complete,
            ProjectState::Active => ProjectEvent::Reopen,
        };
        ProjectStateMachine::transition(current, event).map(Some)
    }
}

// ============================================================================
// Tests
// ============================================================================
