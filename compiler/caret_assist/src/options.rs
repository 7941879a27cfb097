/// Tuning knobs for a [`ParseSession`](crate::ParseSession).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SessionOptions {
    /// Resumptions allowed before the session stops and reports the
    /// partial tree as not resumable. Every round resumes strictly later
    /// in the source, so the default never binds.
    pub max_recovery_rounds: u32,
    /// Skip method bodies when resuming with the header goal.
    pub diet_after_recovery: bool,
    /// Rebuild the enclosing tree once a completion node is found.
    pub continue_after_completion: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            max_recovery_rounds: u32::MAX,
            diet_after_recovery: true,
            continue_after_completion: true,
        }
    }
}

impl SessionOptions {
    #[must_use]
    pub fn with_max_recovery_rounds(mut self, rounds: u32) -> Self {
        self.max_recovery_rounds = rounds;
        self
    }

    #[must_use]
    pub fn with_diet_after_recovery(mut self, diet: bool) -> Self {
        self.diet_after_recovery = diet;
        self
    }

    #[must_use]
    pub fn with_continue_after_completion(mut self, rebuild: bool) -> Self {
        self.continue_after_completion = rebuild;
        self
    }
}
