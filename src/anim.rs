use crate::model::{Activity, Alert, Overlay, PetState, Rules};

/// Passive warning for an idle pet. Stink outranks the exclamation mark.
pub(crate) fn select_alert(pet: &PetState, rules: &Rules) -> Option<Alert> {
    if pet.waste >= rules.waste_expunge {
        return Some(Alert::Stink);
    }
    // 256 - 256/3 is fractional; compare in f64 so 170 stays quiet and 171 warns.
    let expunge = f64::from(rules.waste_expunge);
    let waste_warning = expunge - expunge / 3.0;
    if pet.energy <= rules.energy_tired
        || pet.hunger >= rules.hunger_needs_to_eat
        || f64::from(pet.waste) >= waste_warning
    {
        return Some(Alert::Exclaim);
    }
    None
}

/// Overlay on screen for a given activity. Alerts only show while idle.
pub(crate) fn overlay_for(activity: Activity, alert: Option<Alert>) -> Option<Overlay> {
    match activity {
        Activity::Eating => Some(Overlay::Eat),
        Activity::Cleaning => Some(Overlay::Clean),
        Activity::Sleeping => Some(Overlay::Zzz),
        Activity::Dead => Some(Overlay::Dead),
        Activity::Idle => alert.map(|a| match a {
            Alert::Stink => Overlay::Stink,
            Alert::Exclaim => Overlay::Exclaim,
        }),
    }
}

pub(crate) fn next_frame(len: usize, current: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (current + 1) % len
}
