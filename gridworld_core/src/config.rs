use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Smallest allowed extent on either axis.
pub const MIN_SIDE: usize = 2;

/// Number of distinct cells reset has to fill.
pub const PIECE_COUNT: usize = 4;

/// Construction parameters for a [`GridWorld`](crate::environment::GridWorld).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    /// Seed for the environment's random source. Unseeded environments draw
    /// from the operating system.
    pub seed: Option<u64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            width: 4,
            height: 4,
            seed: None,
        }
    }
}

impl GridConfig {
    pub fn new(width: usize, height: usize) -> Self {
        GridConfig {
            width,
            height,
            seed: None,
        }
    }

    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks that the board can hold one of every piece.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, value) in [("width", self.width), ("height", self.height)] {
            if value < MIN_SIDE {
                return Err(ConfigError::DimensionTooSmall {
                    axis,
                    value,
                    min: MIN_SIDE,
                });
            }
        }
        match self.width.checked_mul(self.height) {
            Some(cells) if cells >= PIECE_COUNT => Ok(()),
            _ => Err(ConfigError::TooFewCells {
                width: self.width,
                height: self.height,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(GridConfig::default().validate().is_ok());
        assert!(GridConfig::square(2).validate().is_ok());
        assert!(GridConfig::new(2, 7).validate().is_ok());
    }

    #[test]
    fn test_rejects_narrow_board() {
        assert_eq!(
            GridConfig::new(1, 10).validate(),
            Err(ConfigError::DimensionTooSmall {
                axis: "width",
                value: 1,
                min: 2
            })
        );
        assert_eq!(
            GridConfig::new(3, 0).validate(),
            Err(ConfigError::DimensionTooSmall {
                axis: "height",
                value: 0,
                min: 2
            })
        );
    }

    #[test]
    fn test_rejects_overflowing_area() {
        assert_eq!(
            GridConfig::new(usize::MAX, 2).validate(),
            Err(ConfigError::TooFewCells {
                width: usize::MAX,
                height: 2
            })
        );
    }

    #[test]
    fn test_with_seed() {
        let config = GridConfig::square(3).with_seed(42);
        assert_eq!(config.seed, Some(42));
        assert_eq!((config.width, config.height), (3, 3));
    }
}
