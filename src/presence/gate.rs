use super::PresentationState;

/// Lets a state through only when it differs from the last one let through.
#[derive(Debug, Default)]
pub struct ChangeGate {
    last_published: Option<PresentationState>,
}

impl ChangeGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true, and remembers `state`, when it should be published.
    pub fn admit(&mut self, state: &PresentationState) -> bool {
        if self.last_published.as_ref() == Some(state) {
            return false;
        }
        self.last_published = Some(state.clone());
        true
    }

    pub fn last_published(&self) -> Option<&PresentationState> {
        self.last_published.as_ref()
    }
}
