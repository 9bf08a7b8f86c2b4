use std::fmt;

/// Result code of a move check or a path search.
///
/// Codes are bit flags. Success codes are positive and share the [`OK`]
/// bit; failure codes have the high bit ([`NOT_AVAILABLE`]) set, which makes
/// them negative as `i16`.
///
/// [`OK`]: PathStatus::OK
/// [`NOT_AVAILABLE`]: PathStatus::NOT_AVAILABLE
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathStatus(pub i16);

const NA: i16 = i16::MIN;

impl PathStatus {
    /// Generic success.
    pub const OK: Self = Self(1);
    /// A single move step is possible.
    pub const CAN_MOVE: Self = Self(1 | (1 << 1));
    /// A path was found.
    pub const PATH_OK: Self = Self(1 | (1 << 2));
    /// The move crosses triggers that must be run (informational, may be absent).
    pub const NEED_RUN_TRIGGERS: Self = Self(1 | (1 << 3));

    /// Generic failure.
    pub const NOT_AVAILABLE: Self = Self(NA);
    /// The moving object cannot move at all.
    pub const IS_NOT_MOVABLE: Self = Self(NA | (1 << 1));
    /// No ground under the point.
    pub const GROUND_NOT_FOUND: Self = Self(NA | (1 << 2));
    /// No free space at the target position.
    pub const NO_FREE_SPACE_ON_TARGET: Self = Self(NA | (1 << 3));
    /// The search ran out of iterations.
    pub const TOO_MANY_STEPS: Self = Self(NA | (1 << 4));
    /// The slope is too steep.
    pub const TOO_STEEP: Self = Self(NA | (1 << 5));
    /// Collision with another actor.
    pub const ACTOR_COLLISION: Self = Self(NA | (1 << 6));
    /// Collision with a world object that is not an actor.
    pub const WORLD_OBJECT_COLLISION: Self = Self(NA | (1 << 7));
    /// Collision with any collision-flagged object (actor or world object).
    pub const OBJECT_COLLISION: Self = Self(NA | (1 << 8));
    /// A trigger does not allow crossing.
    pub const TRIGGER_NO_ACCESS: Self = Self(NA | (1 << 9));
    /// The search was cancelled by its caller.
    pub const CANCELLED: Self = Self(NA | (1 << 10));

    /// Success codes are positive.
    #[inline]
    pub const fn is_ok(self) -> bool {
        self.0 > 0
    }

    /// Failure codes carry the high bit.
    #[inline]
    pub const fn is_err(self) -> bool {
        self.0 & NA != 0
    }

    /// Whether every bit of `flag` is set.
    #[inline]
    pub const fn contains(self, flag: PathStatus) -> bool {
        self.0 & flag.0 == flag.0
    }

    /// Raw bits as unsigned.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0 as u16
    }

    /// Symbolic name, or `None` for combined or unknown codes.
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::OK => "OK",
            Self::CAN_MOVE => "CAN_MOVE",
            Self::PATH_OK => "PATH_OK",
            Self::NEED_RUN_TRIGGERS => "NEED_RUN_TRIGGERS",
            Self::NOT_AVAILABLE => "NOT_AVAILABLE",
            Self::IS_NOT_MOVABLE => "IS_NOT_MOVABLE",
            Self::GROUND_NOT_FOUND => "GROUND_NOT_FOUND",
            Self::NO_FREE_SPACE_ON_TARGET => "NO_FREE_SPACE_ON_TARGET",
            Self::TOO_MANY_STEPS => "TOO_MANY_STEPS",
            Self::TOO_STEEP => "TOO_STEEP",
            Self::ACTOR_COLLISION => "ACTOR_COLLISION",
            Self::WORLD_OBJECT_COLLISION => "WORLD_OBJECT_COLLISION",
            Self::OBJECT_COLLISION => "OBJECT_COLLISION",
            Self::TRIGGER_NO_ACCESS => "TRIGGER_NO_ACCESS",
            Self::CANCELLED => "CANCELLED",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for PathStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({:#06x})", self.bits()),
            None => write!(f, "{:#06x}", self.bits()),
        }
    }
}

impl fmt::Debug for PathStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
