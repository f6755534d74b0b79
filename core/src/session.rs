use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Setup,
    Playing,
    Won,
    Lost,
}

impl SessionState {
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Setup
    }
}

/// When a session gives up on the player.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LossPolicy {
    /// Never declare a loss; the player can always remove, undo, or retry.
    #[default]
    Never,
    /// Lose once the budget is spent, the beam misses the target, and there is no
    /// mirror left to remove and nothing to undo or redo.
    BudgetExhausted,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionConfig {
    pub loss_policy: LossPolicy,
}

/// One attempt at a level. Owns the board and its history exclusively.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Session {
    board: Board,
    history: History,
    beam: BeamPath,
    state: SessionState,
    config: SessionConfig,
}

impl Session {
    pub fn new(level: Level) -> core::result::Result<Self, MalformedLevel> {
        Self::with_config(level, SessionConfig::default())
    }

    pub fn with_config(
        level: Level,
        config: SessionConfig,
    ) -> core::result::Result<Self, MalformedLevel> {
        level.validate().into_result()?;

        let board = Board::new(level);
        let beam = trace(&board);
        let mut session = Self {
            board,
            history: History::new(),
            beam,
            state: SessionState::Setup,
            config,
        };
        session.begin();
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn level(&self) -> &Level {
        self.board.level()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Beam for the current board; recomputed after every accepted action.
    pub fn beam(&self) -> &BeamPath {
        &self.beam
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_session(self)
    }

    pub fn place_mirror(&mut self, position: Coord2, mirror: Mirror) -> Result<SessionState> {
        self.apply(Move::Place { position, mirror })
    }

    pub fn remove_mirror(&mut self, position: Coord2) -> Result<SessionState> {
        self.apply(Move::Remove { position })
    }

    pub fn flip_mirror(&mut self, position: Coord2) -> Result<SessionState> {
        self.apply(Move::Flip { position })
    }

    pub fn apply(&mut self, mv: Move) -> Result<SessionState> {
        self.check_playing()?;
        self.history.apply(&mut self.board, mv)?;
        Ok(self.refresh())
    }

    pub fn undo(&mut self) -> Result<SessionState> {
        self.check_playing()?;
        self.history.undo(&mut self.board)?;
        Ok(self.refresh())
    }

    pub fn redo(&mut self) -> Result<SessionState> {
        self.check_playing()?;
        self.history.redo(&mut self.board)?;
        Ok(self.refresh())
    }

    /// Throws away the board and history, starting over on the same level.
    pub fn restart(&mut self) {
        let level = self.board.level().clone();
        self.board = Board::new(level);
        self.history.clear();
        self.beam = trace(&self.board);
        self.state = SessionState::Setup;
        self.begin();
    }

    fn begin(&mut self) {
        self.transition(SessionState::Playing);
        if self.beam.outcome().is_win() {
            log::warn!(
                "Level {:?} is solved before any mirror is placed",
                self.level().name()
            );
        }
        self.evaluate();
    }

    fn refresh(&mut self) -> SessionState {
        self.beam = trace(&self.board);
        self.evaluate();
        self.state
    }

    fn evaluate(&mut self) {
        if !self.state.is_playing() {
            return;
        }

        if self.beam.outcome().is_win() {
            self.transition(SessionState::Won);
        } else if self.is_stuck() {
            self.transition(SessionState::Lost);
        }
    }

    fn is_stuck(&self) -> bool {
        match self.config.loss_policy {
            LossPolicy::Never => false,
            LossPolicy::BudgetExhausted => {
                self.board.is_budget_exhausted()
                    && self.board.mirrors_placed() == 0
                    && !self.history.can_undo()
                    && !self.history.can_redo()
            }
        }
    }

    fn transition(&mut self, state: SessionState) {
        if self.state != state {
            log::info!(
                "Session on {:?}: {:?} -> {state:?}",
                self.level().name(),
                self.state
            );
            self.state = state;
        }
    }

    fn check_playing(&self) -> Result<()> {
        if self.state.is_playing() {
            Ok(())
        } else {
            Err(GameError::AlreadyEnded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(grid: &str, max_mirrors: CellCount) -> Level {
        let text = alloc::format!(
            "name: t\ndifficulty: easy\nmax_mirrors: {max_mirrors}\n---\n{grid}"
        );
        format::parse(&text).unwrap()
    }

    #[test]
    fn new_session_is_playing() {
        let session = Session::new(level(">..\n...\n..*\n", 1)).unwrap();

        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.beam().outcome(), Outcome::ExitedBounds);
    }

    #[test]
    fn hitting_the_target_wins() {
        let mut session = Session::new(level(">..\n...\n..*\n", 1)).unwrap();

        let state = session.place_mirror((2, 0), Mirror::BackSlash).unwrap();

        assert_eq!(state, SessionState::Won);
        assert_eq!(session.beam().outcome(), Outcome::HitTarget);
        assert_eq!(session.remove_mirror((2, 0)), Err(GameError::AlreadyEnded));
        assert_eq!(session.undo(), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn rejected_actions_keep_state() {
        let mut session = Session::new(level(">..\n...\n..*\n", 1)).unwrap();

        assert_eq!(
            session.place_mirror((0, 0), Mirror::BackSlash),
            Err(GameError::CellOccupied)
        );
        assert_eq!(session.undo(), Err(GameError::NothingToUndo));
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.board().moves_used(), 0);
    }

    #[test]
    fn never_policy_keeps_playing_with_budget_spent() {
        let mut session = Session::new(level(">..\n...\n..*\n", 1)).unwrap();

        let state = session.place_mirror((1, 0), Mirror::ForwardSlash).unwrap();

        assert_eq!(state, SessionState::Playing);
        assert_eq!(
            session.place_mirror((2, 0), Mirror::BackSlash),
            Err(GameError::BudgetExceeded)
        );
        assert_eq!(session.undo().unwrap(), SessionState::Playing);
        assert_eq!(
            session.place_mirror((2, 0), Mirror::BackSlash).unwrap(),
            SessionState::Won
        );
    }

    const STRICT: SessionConfig = SessionConfig {
        loss_policy: LossPolicy::BudgetExhausted,
    };

    #[test]
    fn budget_policy_keeps_recovery_open() {
        let mut session = Session::with_config(level(">..\n...\n..*\n", 1), STRICT).unwrap();

        let state = session.place_mirror((1, 0), Mirror::ForwardSlash).unwrap();
        assert_eq!(state, SessionState::Playing);
        assert!(session.board().is_budget_exhausted());

        assert_eq!(session.undo().unwrap(), SessionState::Playing);
        assert_eq!(session.redo().unwrap(), SessionState::Playing);
        assert_eq!(session.remove_mirror((1, 0)).unwrap(), SessionState::Playing);
        assert_eq!(
            session.place_mirror((2, 0), Mirror::BackSlash).unwrap(),
            SessionState::Won
        );
    }

    #[test]
    fn budget_policy_loses_without_any_recovery() {
        let session = Session::with_config(level(">..\n..*\n", 0), STRICT).unwrap();

        assert_eq!(session.state(), SessionState::Lost);
        assert!(session.is_finished());
        assert_eq!(session.beam().outcome(), Outcome::ExitedBounds);
    }

    #[test]
    fn solved_level_wins_immediately() {
        let session = Session::new(level(">.*\n", 0)).unwrap();
        assert_eq!(session.state(), SessionState::Won);
    }

    #[test]
    fn restart_resets_board_and_history() {
        let mut session = Session::new(level(">..\n...\n..*\n", 2)).unwrap();
        session.place_mirror((1, 0), Mirror::ForwardSlash).unwrap();
        session.remove_mirror((1, 0)).unwrap();

        session.restart();

        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.board().moves_used(), 0);
        assert_eq!(session.board().mirrors_placed(), 0);
        assert!(!session.history().can_undo());
        assert_eq!(session.beam(), &trace(session.board()));
    }
}
