use crate::model::{PetState, Rules, Stage};
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Source of uniform integers for the simulation step. Rendering never
/// draws from it.
pub(crate) trait RandomSource {
    /// Uniform integer in `lo..=hi`.
    fn between(&mut self, lo: i32, hi: i32) -> i32;
}

pub(crate) struct SeededDice {
    rng: SmallRng,
}

impl SeededDice {
    pub(crate) fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_entropy(),
        };
        Self { rng }
    }
}

impl RandomSource for SeededDice {
    fn between(&mut self, lo: i32, hi: i32) -> i32 {
        self.rng.gen_range(lo..=hi)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Need {
    Hunger,
    Energy,
    Waste,
    Happiness,
}

/// Energy and happiness are twice as likely to be picked.
const EVENT_TABLE: [Need; 6] = [
    Need::Hunger,
    Need::Energy,
    Need::Energy,
    Need::Waste,
    Need::Happiness,
    Need::Happiness,
];
const EVENT_DIE: i32 = 32;
const EVENT_HITS: i32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NeedEvent {
    pub(crate) need: Need,
    pub(crate) delta: i32,
}

/// Draw order: gate (0..=31), then label (0..=5), then sign (0..=1).
/// Label and sign are only drawn when the gate hits.
pub(crate) fn roll_event<R: RandomSource + ?Sized>(rng: &mut R) -> Option<NeedEvent> {
    if rng.between(0, EVENT_DIE - 1) >= EVENT_HITS {
        return None;
    }
    let last = EVENT_TABLE.len() as i32 - 1;
    let need = EVENT_TABLE[rng.between(0, last).clamp(0, last) as usize];
    let heads = rng.between(0, 1) == 1;
    let delta = match need {
        Need::Hunger | Need::Waste => {
            if heads {
                2
            } else {
                -2
            }
        }
        // never a bonus for these two
        Need::Energy | Need::Happiness => {
            if heads {
                0
            } else {
                -2
            }
        }
    };
    Some(NeedEvent { need, delta })
}

/// One tick of needs drift. The caller skips this while cleaning or dead.
pub(crate) fn advance<R: RandomSource + ?Sized>(pet: &mut PetState, rules: &Rules, rng: &mut R) {
    pet.age += 2;
    // TODO: babies should burn through needs faster than children once
    // per-stage drift rates exist in Rules.
    if pet.stage == Stage::Egg {
        return;
    }

    let event = roll_event(rng);
    let chosen = event.map(|e| e.need);
    if let Some(e) = event {
        match e.need {
            Need::Hunger => pet.hunger += e.delta,
            Need::Energy => pet.energy += e.delta,
            Need::Waste => pet.waste += e.delta,
            Need::Happiness => pet.happiness += e.delta,
        }
    }

    if chosen != Some(Need::Hunger) {
        pet.hunger += 1;
    }
    if chosen != Some(Need::Waste) {
        pet.waste += 1;
    }
    if chosen != Some(Need::Energy) {
        pet.energy -= 1;
    }

    pet.hunger = pet.hunger.max(0);
    pet.waste = pet.waste.max(0);
    pet.energy = pet.energy.clamp(0, rules.energy_max);

    if pet.waste >= rules.waste_expunge {
        pet.happiness -= 1;
    }
}
