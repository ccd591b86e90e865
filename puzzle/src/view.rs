use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameView {
    #[default]
    Playing,
    /// Solved; the last swap and the solve pulse are still playing out.
    Celebrating,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameViewEvent {
    Solved,
    /// Animations finished and the pulse ran out.
    Settled,
    Restart,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameViewEffect {
    None,
    TriggerSolvePulse,
    ResetLevel,
    AdvanceLevel,
}

impl GameView {
    /// Pure transition function.
    ///
    /// Side effects on the grid and level index are returned as `GameViewEffect` for the
    /// controller to apply.
    pub fn handle(self, event: GameViewEvent) -> (GameView, GameViewEffect) {
        match (self, event) {
            (GameView::Playing, GameViewEvent::Solved) => {
                (GameView::Celebrating, GameViewEffect::TriggerSolvePulse)
            }
            (GameView::Playing, GameViewEvent::Restart) => {
                (GameView::Playing, GameViewEffect::ResetLevel)
            }

            (GameView::Celebrating, GameViewEvent::Settled) => {
                (GameView::Complete, GameViewEffect::None)
            }

            (GameView::Complete, GameViewEvent::Restart) => {
                (GameView::Playing, GameViewEffect::ResetLevel)
            }
            (GameView::Complete, GameViewEvent::Next) => {
                (GameView::Playing, GameViewEffect::AdvanceLevel)
            }

            // Ignore irrelevant events in the current state.
            (state, _) => (state, GameViewEffect::None),
        }
    }

    pub fn accepts_grid_taps(self) -> bool {
        matches!(self, GameView::Playing)
    }

    pub fn shows_completion_panel(self) -> bool {
        matches!(self, GameView::Complete)
    }
}
