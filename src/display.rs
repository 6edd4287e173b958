use crate::art::{BAR_HEIGHT, BAR_LEFT, BAR_TOP};
use crate::model::{Activity, AnimationState, Overlay, PetState, Rules, StatPage, UiState};
use crate::sprites::{AssetError, Bitmap, SpriteSheet};

/// Widest stats bar, in LCD pixels.
pub(crate) const BAR_MAX: i32 = 27;

/// Everything the simulation exposes after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub(crate) pet: PetState,
    pub(crate) activity: Activity,
    pub(crate) overlay: Option<Overlay>,
    pub(crate) anim: AnimationState,
    pub(crate) ui: UiState,
}

/// What the renderer draws this frame. Built fresh from a [`Snapshot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DisplayState {
    pub(crate) lcd: Bitmap,
    pub(crate) offset: i32,
    pub(crate) selected_button: usize,
    pub(crate) stats_mode: bool,
    pub(crate) stats_page: StatPage,
    pub(crate) bar: i32,
    pub(crate) pet: PetState,
    pub(crate) activity: Activity,
}

fn ratio(value: i32, full: i32) -> f64 {
    if full <= 0 {
        return 0.0;
    }
    f64::from(value) / f64::from(full)
}

/// Stats bar length for a page: computed in floating point, then floored
/// once and clamped to `0..=27`.
pub(crate) fn bar_value(page: StatPage, pet: &PetState, rules: &Rules) -> i32 {
    let fraction = match page {
        StatPage::Hunger => ratio(pet.hunger, rules.hunger_needs_to_eat),
        StatPage::Age => ratio(pet.age, rules.age_death_natural_causes),
        StatPage::Waste if rules.waste_expunge > 0 => {
            ratio(pet.waste.rem_euclid(rules.waste_expunge), rules.waste_expunge)
        }
        StatPage::Waste => 0.0,
        StatPage::Energy => ratio(pet.energy, rules.energy_max),
        StatPage::Back => 0.0,
    };
    ((fraction * f64::from(BAR_MAX)).floor() as i32).clamp(0, BAR_MAX)
}

pub(crate) fn compose(
    snap: &Snapshot,
    rules: &Rules,
    sprites: &SpriteSheet,
) -> Result<DisplayState, AssetError> {
    let ui = snap.ui;
    let (lcd, offset, bar) = if ui.stats_mode {
        let bar = bar_value(ui.stats_page, &snap.pet, rules);
        let mut page = *sprites.page(ui.stats_page)?;
        page.fill_rect(BAR_LEFT, BAR_TOP, bar, BAR_HEIGHT, true);
        (page, 0, bar)
    } else {
        let base = sprites
            .animation(snap.anim.current)?
            .frame(snap.anim.frame)?;
        let layered = match snap.overlay {
            Some(o) => base.or(sprites.overlay(o)?.frame(snap.anim.overlay_frame)?),
            None => *base,
        };
        (layered.shifted(snap.anim.offset), snap.anim.offset, 0)
    };

    Ok(DisplayState {
        lcd,
        offset,
        selected_button: ui.selected_button,
        stats_mode: ui.stats_mode,
        stats_page: ui.stats_page,
        bar,
        pet: snap.pet,
        activity: snap.activity,
    })
}
