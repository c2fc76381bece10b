use std::sync::Arc;

use crate::detection::{
    DetectionOutcome, FALLBACK_CONFIDENCE, MediaKind, ViolationCategory, ViolationSet,
};
use crate::ports::random::{RandomSource, ThreadRandom};

const MAX_SIMULATED_VIOLATIONS: usize = 2;
// Upper bound on category draws so a degenerate source still terminates.
const MAX_CATEGORY_DRAWS: usize = 32;

/// Stand-in result used whenever the inference service cannot be reached.
/// Never fails.
#[derive(Clone)]
pub struct FallbackSimulator {
    random: Arc<dyn RandomSource>,
}

impl Default for FallbackSimulator {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandom))
    }
}

impl FallbackSimulator {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Draws a target count from `{0, 1, 2}` then distinct categories until
    /// the count is reached. The media kind does not influence the draw.
    pub fn simulate(&self, _media_kind: MediaKind) -> DetectionOutcome {
        let target = self.draw(MAX_SIMULATED_VIOLATIONS + 1);
        let mut violations = ViolationSet::new();
        let mut draws = 0;
        while violations.len() < target && draws < MAX_CATEGORY_DRAWS {
            let index = self.draw(ViolationCategory::ALL.len());
            violations.insert(ViolationCategory::ALL[index]);
            draws += 1;
        }
        DetectionOutcome::from_violations(violations, FALLBACK_CONFIDENCE)
    }

    fn draw(&self, upper: usize) -> usize {
        self.random.below(upper) % upper
    }
}
