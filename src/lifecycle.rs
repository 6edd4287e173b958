use crate::model::{Activity, AnimKey, PetState, Rules, Stage};

/// New activity and base animation, applied together by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Transition {
    pub(crate) activity: Activity,
    pub(crate) animation: AnimKey,
}

pub(crate) fn enter_sleep(stage: Stage) -> Transition {
    Transition {
        activity: Activity::Sleeping,
        animation: AnimKey::sleep(stage),
    }
}

pub(crate) fn enter_death(stage: Stage) -> Transition {
    Transition {
        activity: Activity::Dead,
        animation: AnimKey::sleep(stage),
    }
}

pub(crate) fn wake(stage: Stage) -> Transition {
    Transition {
        activity: Activity::Idle,
        animation: AnimKey::idle(stage),
    }
}

/// Base animation matching an activity at a given stage.
pub(crate) fn pose_for(activity: Activity, stage: Stage) -> AnimKey {
    match activity {
        Activity::Sleeping | Activity::Dead => AnimKey::sleep(stage),
        Activity::Idle | Activity::Eating | Activity::Cleaning => AnimKey::idle(stage),
    }
}

/// Next stage once age strictly exceeds the current stage's threshold.
/// Growth stops before any stage that is not playable yet.
pub(crate) fn grown_stage(pet: &PetState, rules: &Rules) -> Option<Stage> {
    let next = pet.stage.next()?;
    if !next.is_playable() {
        return None;
    }
    let threshold = rules.growth_age(pet.stage)?;
    (pet.age > threshold).then_some(next)
}

pub(crate) fn should_die(pet: &PetState, rules: &Rules) -> bool {
    pet.hunger >= rules.hunger_dead_from_not_eating || pet.age >= rules.age_death_natural_causes
}

pub(crate) fn should_pass_out(pet: &PetState, rules: &Rules) -> bool {
    pet.stage > Stage::Egg && pet.energy < rules.energy_pass_out
}
