use ng_types::ViewerState;

/// Transactional access to the viewer's state.
///
/// A command takes a snapshot, edits it privately and commits the whole
/// result. Nothing is written when the command fails.
pub trait StateStore {
    fn snapshot(&self) -> ViewerState;

    fn commit(&mut self, state: ViewerState);
}

/// State kept in process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: ViewerState,
    commits: u64,
}

impl MemoryStore {
    pub fn new(state: ViewerState) -> Self {
        Self { state, commits: 0 }
    }

    /// Number of commits so far.
    pub fn commits(&self) -> u64 {
        self.commits
    }
}

impl StateStore for MemoryStore {
    fn snapshot(&self) -> ViewerState {
        self.state.clone()
    }

    fn commit(&mut self, state: ViewerState) {
        self.state = state;
        self.commits += 1;
    }
}
