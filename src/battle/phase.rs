//! Battle phases and the inputs each one accepts

use serde::Serialize;

/// The current stage of an encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for a roll
    PlayerTurn,
    /// Dice are on the table, waiting for a commit
    PlayerThinking,
    /// Resolving a roll or a commit
    Processing,
    /// Enemy is about to act
    EnemyTurn,
    /// Enemy defeated; a reward offer may be open
    Victory,
    /// Player defeated
    Defeat,
}

impl Phase {
    /// Which inputs are open. Depends only on the phase and whether a reward
    /// offer is waiting for a pick.
    pub fn affordances(self, offer_open: bool) -> InputAffordances {
        match self {
            Phase::PlayerTurn => InputAffordances {
                roll: true,
                toggle: true,
                restart: true,
                ..Default::default()
            },
            Phase::PlayerThinking => InputAffordances {
                commit: true,
                toggle: true,
                restart: true,
                ..Default::default()
            },
            Phase::Victory => InputAffordances {
                pick_reward: offer_open,
                ..Default::default()
            },
            Phase::Defeat => InputAffordances {
                restart: true,
                ..Default::default()
            },
            Phase::Processing | Phase::EnemyTurn => InputAffordances::default(),
        }
    }

    /// Defeat ends the run
    pub fn is_terminal(self) -> bool {
        self == Phase::Defeat
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::PlayerTurn => "player turn",
            Phase::PlayerThinking => "player thinking",
            Phase::Processing => "processing",
            Phase::EnemyTurn => "enemy turn",
            Phase::Victory => "victory",
            Phase::Defeat => "defeat",
        };
        write!(f, "{}", s)
    }
}

/// Inputs the presentation layer should enable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InputAffordances {
    pub roll: bool,
    pub commit: bool,
    pub toggle: bool,
    pub pick_reward: bool,
    /// Start the current level over
    pub restart: bool,
}

/// Something the controller was asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Roll,
    Commit,
    Toggle,
    PickReward,
    EnemyTimer,
    Restart,
}

impl Intent {
    /// Whether this intent may run in the given phase
    pub fn allowed_in(self, phase: Phase, offer_open: bool) -> bool {
        let open = phase.affordances(offer_open);
        match self {
            Intent::Roll => open.roll,
            Intent::Commit => open.commit,
            Intent::Toggle => open.toggle,
            Intent::PickReward => open.pick_reward,
            Intent::EnemyTimer => phase == Phase::EnemyTurn,
            Intent::Restart => open.restart,
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Intent::Roll => "roll",
            Intent::Commit => "commit",
            Intent::Toggle => "toggle",
            Intent::PickReward => "reward pick",
            Intent::EnemyTimer => "enemy timer",
            Intent::Restart => "restart",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Phase; 6] = [
        Phase::PlayerTurn,
        Phase::PlayerThinking,
        Phase::Processing,
        Phase::EnemyTurn,
        Phase::Victory,
        Phase::Defeat,
    ];

    #[test]
    fn test_affordances_by_phase() {
        let turn = Phase::PlayerTurn.affordances(false);
        assert!(turn.roll && turn.toggle && !turn.commit && !turn.pick_reward);

        let thinking = Phase::PlayerThinking.affordances(false);
        assert!(thinking.commit && thinking.toggle && !thinking.roll);

        assert!(Phase::Victory.affordances(true).pick_reward);
        assert!(!Phase::Victory.affordances(false).pick_reward);

        for phase in [Phase::Processing, Phase::EnemyTurn] {
            assert_eq!(phase.affordances(true), InputAffordances::default());
        }
        let defeat = Phase::Defeat.affordances(false);
        assert!(defeat.restart && !defeat.roll && !defeat.toggle);
    }

    #[test]
    fn test_restart_never_interrupts_enemy_or_reward() {
        for phase in ALL {
            let expected = matches!(
                phase,
                Phase::PlayerTurn | Phase::PlayerThinking | Phase::Defeat
            );
            assert_eq!(Intent::Restart.allowed_in(phase, true), expected);
            assert_eq!(Intent::Restart.allowed_in(phase, false), expected);
        }
    }

    #[test]
    fn test_commit_only_while_thinking() {
        for phase in ALL {
            assert_eq!(
                Intent::Commit.allowed_in(phase, true),
                phase == Phase::PlayerThinking
            );
        }
    }

    #[test]
    fn test_enemy_timer_only_in_enemy_turn() {
        for phase in ALL {
            assert_eq!(
                Intent::EnemyTimer.allowed_in(phase, false),
                phase == Phase::EnemyTurn
            );
        }
    }

    #[test]
    fn test_only_defeat_is_terminal() {
        assert_eq!(ALL.iter().filter(|p| p.is_terminal()).count(), 1);
        assert!(Phase::Defeat.is_terminal());
    }
}
