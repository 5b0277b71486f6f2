use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameId {
    Gomoku,
    Chess,
    Match3,
    Snake,
    Tetris,
    Puzzle,
}

impl GameId {
    pub fn as_str(self) -> &'static str {
        match self {
            GameId::Gomoku => "gomoku",
            GameId::Chess => "chess",
            GameId::Match3 => "match3",
            GameId::Snake => "snake",
            GameId::Tetris => "tetris",
            GameId::Puzzle => "puzzle",
        }
    }

    /// Whether the game advances on a timer rather than only on input.
    pub fn is_realtime(self) -> bool {
        matches!(self, GameId::Snake | GameId::Tetris | GameId::Puzzle)
    }

    pub fn info(self) -> &'static GameInfo {
        CATALOG
            .iter()
            .find(|info| info.id == self)
            .unwrap_or(&CATALOG[0])
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGame(pub String);

impl fmt::Display for UnknownGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown game '{}'", self.0)
    }
}

impl std::error::Error for UnknownGame {}

impl FromStr for GameId {
    type Err = UnknownGame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CATALOG
            .iter()
            .map(|info| info.id)
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownGame(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameInfo {
    pub id: GameId,
    pub name: &'static str,
    pub description: &'static str,
}

pub const CATALOG: [GameInfo; 6] = [
    GameInfo {
        id: GameId::Gomoku,
        name: "Gomoku",
        description: "Classic five-in-a-row for two players",
    },
    GameInfo {
        id: GameId::Chess,
        name: "Chess-lite",
        description: "Xiangqi pieces with simplified moves",
    },
    GameInfo {
        id: GameId::Match3,
        name: "Match-3",
        description: "Swap gems to line up three of a kind",
    },
    GameInfo {
        id: GameId::Snake,
        name: "Snake",
        description: "Eat food and grow without hitting a wall",
    },
    GameInfo {
        id: GameId::Tetris,
        name: "Tetris",
        description: "Classic falling blocks",
    },
    GameInfo {
        id: GameId::Puzzle,
        name: "Puzzle",
        description: "Swap tiles back into place",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_parse_back() {
        for info in &CATALOG {
            assert_eq!(info.id.as_str().parse::<GameId>(), Ok(info.id));
            assert_eq!(info.id.info().name, info.name);
        }
        assert!("solitaire".parse::<GameId>().is_err());
    }
}
