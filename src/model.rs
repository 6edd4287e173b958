use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Stage {
    Egg,
    Baby,
    Child,
    Teen,
    Adult,
    Special,
}

impl Stage {
    pub(crate) const ALL: [Stage; 6] = [
        Stage::Egg,
        Stage::Baby,
        Stage::Child,
        Stage::Teen,
        Stage::Adult,
        Stage::Special,
    ];

    pub(crate) fn next(self) -> Option<Stage> {
        match self {
            Stage::Egg => Some(Stage::Baby),
            Stage::Baby => Some(Stage::Child),
            Stage::Child => Some(Stage::Teen),
            Stage::Teen => Some(Stage::Adult),
            Stage::Adult => Some(Stage::Special),
            Stage::Special => None,
        }
    }

    /// Stages with sprites and rules behind them. Teen and later are
    /// reserved names only.
    pub(crate) fn is_playable(self) -> bool {
        matches!(self, Stage::Egg | Stage::Baby | Stage::Child)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Egg => "egg",
            Stage::Baby => "baby",
            Stage::Child => "child",
            Stage::Teen => "teen",
            Stage::Adult => "adult",
            Stage::Special => "special",
        };
        f.write_str(s)
    }
}

/// Needs counters plus growth stage. Death lives in [`Activity::Dead`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PetState {
    pub(crate) hunger: i32,
    pub(crate) energy: i32,
    pub(crate) waste: i32,
    pub(crate) age: i32,
    pub(crate) happiness: i32,
    pub(crate) stage: Stage,
}

impl PetState {
    pub(crate) fn hatchling(rules: &Rules) -> Self {
        Self {
            hunger: 0,
            energy: rules.energy_max,
            waste: 0,
            age: 0,
            happiness: 0,
            stage: Stage::Egg,
        }
    }
}

/// What the pet is busy with. At most one at a time; `Dead` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Activity {
    Idle,
    Eating,
    Cleaning,
    Sleeping,
    Dead,
}

/// Passive warnings shown while idle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Alert {
    Stink,
    Exclaim,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Overlay {
    Exclaim,
    Stink,
    Zzz,
    Eat,
    Clean,
    Dead,
}

impl Overlay {
    pub(crate) const ALL: [Overlay; 6] = [
        Overlay::Exclaim,
        Overlay::Stink,
        Overlay::Zzz,
        Overlay::Eat,
        Overlay::Clean,
        Overlay::Dead,
    ];
}

impl fmt::Display for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Overlay::Exclaim => "OVERLAY_EXCLAIM",
            Overlay::Stink => "OVERLAY_STINK",
            Overlay::Zzz => "OVERLAY_ZZZ",
            Overlay::Eat => "EAT/apple",
            Overlay::Clean => "OVERLAY_CLEAN",
            Overlay::Dead => "OVERLAY_DEAD",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Pose {
    Idle,
    Sleep,
}

/// Key into the base animation table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct AnimKey {
    pub(crate) stage: Stage,
    pub(crate) pose: Pose,
}

impl AnimKey {
    pub(crate) fn idle(stage: Stage) -> Self {
        Self {
            stage,
            pose: Pose::Idle,
        }
    }

    pub(crate) fn sleep(stage: Stage) -> Self {
        Self {
            stage,
            pose: Pose::Sleep,
        }
    }
}

impl fmt::Display for AnimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pose = match self.pose {
            Pose::Idle => "idle",
            Pose::Sleep => "sleep",
        };
        write!(f, "{}/{}", self.stage, pose)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AnimationState {
    pub(crate) current: AnimKey,
    pub(crate) frame: usize,
    pub(crate) overlay_frame: usize,
    pub(crate) offset: i32,
}

impl AnimationState {
    pub(crate) fn new() -> Self {
        Self {
            current: AnimKey::idle(Stage::Egg),
            frame: 0,
            overlay_frame: 0,
            offset: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum StatPage {
    Hunger,
    Age,
    Waste,
    Energy,
    Back,
}

impl StatPage {
    pub(crate) const ALL: [StatPage; 5] = [
        StatPage::Hunger,
        StatPage::Age,
        StatPage::Waste,
        StatPage::Energy,
        StatPage::Back,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            StatPage::Hunger => 0,
            StatPage::Age => 1,
            StatPage::Waste => 2,
            StatPage::Energy => 3,
            StatPage::Back => 4,
        }
    }

    pub(crate) fn from_index(i: usize) -> Self {
        Self::ALL[i % Self::ALL.len()]
    }

    pub(crate) fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub(crate) fn prev(self) -> Self {
        Self::from_index(self.index() + Self::ALL.len() - 1)
    }
}

impl fmt::Display for StatPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatPage::Hunger => "DISPLAY_HUNGER",
            StatPage::Age => "DISPLAY_AGE",
            StatPage::Waste => "DISPLAY_WASTE",
            StatPage::Energy => "DISPLAY_ENERGY",
            StatPage::Back => "DISPLAY_BACK",
        };
        f.write_str(s)
    }
}

pub(crate) const BUTTON_COUNT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Button {
    Feed,
    Clean,
    Stats,
    Sleep,
}

impl Button {
    pub(crate) fn from_index(i: usize) -> Self {
        match i % BUTTON_COUNT {
            0 => Button::Feed,
            1 => Button::Clean,
            2 => Button::Stats,
            _ => Button::Sleep,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct UiState {
    pub(crate) selected_button: usize,
    pub(crate) stats_mode: bool,
    pub(crate) stats_page: StatPage,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            selected_button: 0,
            stats_mode: false,
            stats_page: StatPage::Hunger,
        }
    }
}

/// Canonical threshold table. One table drives every build of the game.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub(crate) struct Rules {
    pub(crate) age_hatch: i32,
    pub(crate) age_child: i32,
    pub(crate) age_teen: i32,
    pub(crate) age_adult: i32,
    pub(crate) age_special: i32,
    pub(crate) age_death_natural_causes: i32,
    pub(crate) hunger_needs_to_eat: i32,
    pub(crate) hunger_dead_from_not_eating: i32,
    pub(crate) energy_max: i32,
    pub(crate) energy_can_sleep: i32,
    pub(crate) energy_tired: i32,
    pub(crate) energy_pass_out: i32,
    pub(crate) energy_sleep_gain: i32,
    pub(crate) waste_expunge: i32,
    pub(crate) pass_out_penalty: i32,
    pub(crate) clean_sweep_end: i32,
    pub(crate) dead_offset: i32,
    pub(crate) tick_ms: u64,
    pub(crate) clean_tick_ms: u64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            age_hatch: 128,
            age_child: 816,
            age_teen: 1408,
            age_adult: 2584,
            age_special: 5048,
            age_death_natural_causes: 8192,
            hunger_needs_to_eat: 128,
            hunger_dead_from_not_eating: 512,
            energy_max: 256,
            energy_can_sleep: 150,
            energy_tired: 64,
            energy_pass_out: 8,
            energy_sleep_gain: 8,
            waste_expunge: 256,
            pass_out_penalty: 64,
            clean_sweep_end: -33,
            dead_offset: 3,
            tick_ms: 1000,
            clean_tick_ms: 100,
        }
    }
}

impl Rules {
    /// Age the pet must exceed to leave `stage`.
    pub(crate) fn growth_age(&self, stage: Stage) -> Option<i32> {
        match stage {
            Stage::Egg => Some(self.age_hatch),
            Stage::Baby => Some(self.age_child),
            Stage::Child => Some(self.age_teen),
            Stage::Teen => Some(self.age_adult),
            Stage::Adult => Some(self.age_special),
            Stage::Special => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_pages_wrap_both_ways() {
        assert_eq!(StatPage::Back.next(), StatPage::Hunger);
        assert_eq!(StatPage::Hunger.prev(), StatPage::Back);
        assert_eq!(StatPage::Age.prev(), StatPage::Hunger);
    }

    #[test]
    fn rules_fill_missing_fields_from_defaults() {
        let r: Rules = serde_json::from_str(r#"{ "age_child": 796 }"#).unwrap();
        assert_eq!(r.age_child, 796);
        assert_eq!(r.age_hatch, 128);
        assert_eq!(r.tick_ms, 1000);
    }

    #[test]
    fn only_first_three_stages_are_playable() {
        let playable: Vec<Stage> = Stage::ALL.into_iter().filter(|s| s.is_playable()).collect();
        assert_eq!(playable, vec![Stage::Egg, Stage::Baby, Stage::Child]);
        assert!(Stage::Egg < Stage::Baby && Stage::Baby < Stage::Child);
    }
}
