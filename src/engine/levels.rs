//! XP and Level system
//!
//! Levels are linear in XP: `level = floor(total_xp / xp_per_level) + 1`.
//! Titles are attached to level bands.

/// Default XP needed per level
pub const XP_PER_LEVEL: u32 = 100;

/// Title band: applies from `from_level` up to the next band
#[derive(Debug, Clone)]
pub struct Title {
    pub from_level: u32,
    pub title: &'static str,
}

/// All title bands (must be sorted by level)
pub static TITLES: &[Title] = &[
    Title {
        from_level: 1,
        title: "Novice",
    },
    Title {
        from_level: 3,
        title: "Apprentice",
    },
    Title {
        from_level: 6,
        title: "Practitioner",
    },
    Title {
        from_level: 10,
        title: "ML Engineer",
    },
    Title {
        from_level: 20,
        title: "Researcher",
    },
    Title {
        from_level: 35,
        title: "Grandmaster",
    },
];

/// Level for a given XP total
pub fn level_for_xp(total_xp: u64, xp_per_level: u32) -> u32 {
    let per_level = u64::from(xp_per_level.max(1));
    u32::try_from(total_xp / per_level)
        .unwrap_or(u32::MAX - 1)
        .saturating_add(1)
}

/// Title for a level
pub fn title_for_level(level: u32) -> &'static str {
    TITLES
        .iter()
        .rev()
        .find(|t| level >= t.from_level)
        .unwrap_or(&TITLES[0])
        .title
}

/// Level position derived from an XP total
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: u32,
    pub title: &'static str,
    /// XP earned since the current level started
    pub xp_into_level: u64,
    /// XP still missing for the next level
    pub xp_to_next_level: u64,
}

impl LevelProgress {
    pub fn new(total_xp: u64, xp_per_level: u32) -> Self {
        let per_level = u64::from(xp_per_level.max(1));
        let level = level_for_xp(total_xp, xp_per_level);
        let xp_into_level = total_xp % per_level;
        Self {
            level,
            title: title_for_level(level),
            xp_into_level,
            xp_to_next_level: per_level - xp_into_level,
        }
    }

    /// Progress to next level (0.0 - 1.0)
    pub fn progress_to_next(&self) -> f32 {
        let span = self.xp_into_level + self.xp_to_next_level;
        if span == 0 {
            1.0
        } else {
            self.xp_into_level as f32 / span as f32
        }
    }
}
