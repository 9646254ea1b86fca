//! Piece ranks
//!
//! Ranks are ordered by size. Two equal ranks merge into the next one, up to
//! the terminal rank which has no successor.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Static description of a rank
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankInfo {
    pub name: &'static str,
    pub radius: f32,
    /// Points awarded when a merge produces this rank
    pub points: u64,
    /// Fill colour as 0xRRGGBB
    pub color: u32,
}

/// The rank table, smallest first
pub const RANKS: [RankInfo; 11] = [
    RankInfo { name: "Puppy", radius: 20.0, points: 1, color: 0xFF0000 },
    RankInfo { name: "Small Dog", radius: 30.0, points: 2, color: 0xFF3366 },
    RankInfo { name: "Medium Dog", radius: 40.0, points: 3, color: 0x9400D3 },
    RankInfo { name: "Large Dog", radius: 50.0, points: 4, color: 0xFFA500 },
    RankInfo { name: "Extra Large Dog", radius: 60.0, points: 5, color: 0xFF8C00 },
    RankInfo { name: "Giant Dog", radius: 70.0, points: 6, color: 0x00AA00 },
    RankInfo { name: "Huge Dog", radius: 80.0, points: 7, color: 0xADFF2F },
    RankInfo { name: "Colossal Dog", radius: 90.0, points: 8, color: 0xFFC0CB },
    RankInfo { name: "Legendary Dog", radius: 100.0, points: 9, color: 0xFFD700 },
    RankInfo { name: "Mythic Dog", radius: 110.0, points: 10, color: 0x32CD32 },
    RankInfo { name: "Dog King", radius: 120.0, points: 11, color: 0x008000 },
];

/// Raised when a rank index falls outside the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankError(pub u8);

impl fmt::Display for RankError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rank {} out of range (max {})", self.0, RANKS.len() - 1)
    }
}

impl std::error::Error for RankError {}

/// Index into [`RANKS`]; always valid once constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rank(u8);

impl Rank {
    pub const SMALLEST: Rank = Rank(0);
    pub const TERMINAL: Rank = Rank(RANKS.len() as u8 - 1);

    pub fn new(index: u8) -> Result<Self, RankError> {
        if (index as usize) < RANKS.len() {
            Ok(Self(index))
        } else {
            Err(RankError(index))
        }
    }

    #[inline]
    pub fn index(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn info(self) -> &'static RankInfo {
        &RANKS[self.0 as usize]
    }

    #[inline]
    pub fn radius(self) -> f32 {
        self.info().radius
    }

    #[inline]
    pub fn points(self) -> u64 {
        self.info().points
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// The rank two of these merge into, `None` for the terminal rank
    pub fn successor(self) -> Option<Rank> {
        Rank::new(self.0 + 1).ok()
    }

    pub fn is_terminal(self) -> bool {
        self == Self::TERMINAL
    }
}

impl TryFrom<u8> for Rank {
    type Error = RankError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rank::new(value)
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> u8 {
        rank.0
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_table_is_ordered() {
        for pair in RANKS.windows(2) {
            assert!(pair[0].radius < pair[1].radius);
            assert!(pair[0].points < pair[1].points);
        }
        // Points are rank index + 1
        for (i, info) in RANKS.iter().enumerate() {
            assert_eq!(info.points, i as u64 + 1);
        }
    }

    #[test]
    fn test_successor_chain_ends_at_terminal() {
        let mut rank = Rank::SMALLEST;
        let mut steps = 0;
        while let Some(next) = rank.successor() {
            assert!(next > rank);
            rank = next;
            steps += 1;
        }
        assert_eq!(steps, RANKS.len() - 1);
        assert!(rank.is_terminal());
        assert_eq!(rank, Rank::TERMINAL);
    }

    #[test]
    fn test_out_of_range_rank_rejected() {
        assert!(Rank::new(10).is_ok());
        assert_eq!(Rank::new(11), Err(RankError(11)));
        assert!(Rank::try_from(255).is_err());
    }

    #[test]
    fn test_rank_serde_validates() {
        let rank: Rank = serde_json::from_str("2").unwrap();
        assert_eq!(rank.radius(), 40.0);
        assert_eq!(serde_json::to_string(&rank).unwrap(), "2");
        assert!(serde_json::from_str::<Rank>("42").is_err());
    }
}
