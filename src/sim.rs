use crate::anim::{next_frame, overlay_for, select_alert};
use crate::display::Snapshot;
use crate::lifecycle::{self, Transition};
use crate::model::{
    Activity, Alert, AnimationState, Button, Overlay, PetState, Rules, Stage, UiState,
    BUTTON_COUNT,
};
use crate::needs::{self, RandomSource};
use crate::scheduler::TickRate;
use crate::sprites::{AssetError, SpriteSheet};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Idle wobble range for the horizontal offset.
const WOBBLE_MIN: i32 = -3;
const WOBBLE_MAX: i32 = 2;

/// The three logical buttons every input device maps onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Control {
    Prev,
    Activate,
    Next,
}

/// Pet actions. Queued on press and started at the next tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlayerAction {
    Feed,
    Clean,
    Sleep,
}

pub(crate) struct Engine<R> {
    rules: Rules,
    sprites: Rc<SpriteSheet>,
    rng: R,
    pet: PetState,
    activity: Activity,
    alert: Option<Alert>,
    anim: AnimationState,
    ui: UiState,
    pending: Option<PlayerAction>,
    ticks: u64,
}

impl<R: RandomSource> Engine<R> {
    pub(crate) fn new(rules: Rules, sprites: Rc<SpriteSheet>, rng: R) -> Self {
        let pet = PetState::hatchling(&rules);
        Self {
            rules,
            sprites,
            rng,
            pet,
            activity: Activity::Idle,
            alert: None,
            anim: AnimationState::new(),
            ui: UiState::default(),
            pending: None,
            ticks: 0,
        }
    }

    pub(crate) fn rules(&self) -> &Rules {
        &self.rules
    }

    pub(crate) fn overlay(&self) -> Option<Overlay> {
        overlay_for(self.activity, self.alert)
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            pet: self.pet,
            activity: self.activity,
            overlay: self.overlay(),
            anim: self.anim,
            ui: self.ui,
        }
    }

    /// Cleaning runs the clock ten times faster, starting as soon as the
    /// clean is queued.
    pub(crate) fn tick_rate(&self) -> TickRate {
        if self.activity == Activity::Cleaning || self.pending == Some(PlayerAction::Clean) {
            TickRate::Fast
        } else {
            TickRate::Normal
        }
    }

    pub(crate) fn press(&mut self, control: Control) {
        match control {
            Control::Prev => {
                if self.ui.stats_mode {
                    self.ui.stats_page = self.ui.stats_page.prev();
                } else {
                    self.ui.selected_button =
                        (self.ui.selected_button + BUTTON_COUNT - 1) % BUTTON_COUNT;
                }
            }
            Control::Next => {
                if self.ui.stats_mode {
                    self.ui.stats_page = self.ui.stats_page.next();
                } else {
                    self.ui.selected_button = (self.ui.selected_button + 1) % BUTTON_COUNT;
                }
            }
            Control::Activate => match Button::from_index(self.ui.selected_button) {
                Button::Stats => self.ui.stats_mode = !self.ui.stats_mode,
                Button::Feed => self.apply(PlayerAction::Feed),
                Button::Clean => self.apply(PlayerAction::Clean),
                Button::Sleep => self.apply(PlayerAction::Sleep),
            },
        }
    }

    fn allows(&self, action: PlayerAction) -> bool {
        if self.pet.stage == Stage::Egg || self.activity != Activity::Idle {
            return false;
        }
        match action {
            PlayerAction::Feed | PlayerAction::Clean => true,
            PlayerAction::Sleep => self.pet.energy <= self.rules.energy_can_sleep,
        }
    }

    /// Queue an action for the next tick if the pet can take it now.
    pub(crate) fn apply(&mut self, action: PlayerAction) {
        if !self.allows(action) {
            debug!(?action, stage = %self.pet.stage, activity = ?self.activity, "action ignored");
            return;
        }
        self.pending = Some(action);
    }

    fn start(&mut self, action: PlayerAction) {
        info!(tick = self.ticks, ?action, "action started");
        match action {
            PlayerAction::Feed => {
                self.activity = Activity::Eating;
                self.anim.overlay_frame = 0;
            }
            PlayerAction::Clean => {
                self.activity = Activity::Cleaning;
                self.anim.overlay_frame = 0;
                self.anim.offset = 0;
            }
            PlayerAction::Sleep => self.enter(lifecycle::enter_sleep(self.pet.stage)),
        }
    }

    fn enter(&mut self, t: Transition) {
        self.activity = t.activity;
        if self.anim.current != t.animation {
            self.anim.current = t.animation;
            self.anim.frame = 0;
        }
        self.anim.overlay_frame = 0;
    }

    /// One simulation step. Everything it changes is settled before it returns.
    pub(crate) fn tick_fixed_step(&mut self) -> Result<(), AssetError> {
        self.ticks += 1;

        if let Some(action) = self.pending.take() {
            if self.allows(action) {
                self.start(action);
            }
        }
        let overlay_before = self.overlay();

        if !matches!(self.activity, Activity::Cleaning | Activity::Dead) {
            let len = self.sprites.animation(self.anim.current)?.len();
            self.anim.frame = next_frame(len, self.anim.frame);
            self.anim.offset = self.rng.between(WOBBLE_MIN, WOBBLE_MAX);
            needs::advance(&mut self.pet, &self.rules, &mut self.rng);
        }

        self.progress_activity()?;

        if self.activity == Activity::Idle && lifecycle::should_pass_out(&self.pet, &self.rules) {
            self.pet.happiness -= self.rules.pass_out_penalty;
            warn!(tick = self.ticks, energy = self.pet.energy, "pet passed out");
            self.enter(lifecycle::enter_sleep(self.pet.stage));
        }

        self.grow();

        if self.activity == Activity::Idle {
            self.alert = select_alert(&self.pet, &self.rules);
            if lifecycle::should_die(&self.pet, &self.rules) {
                warn!(
                    tick = self.ticks,
                    age = self.pet.age,
                    hunger = self.pet.hunger,
                    stage = %self.pet.stage,
                    "pet died"
                );
                self.alert = None;
                self.anim.offset = self.rules.dead_offset;
                self.enter(lifecycle::enter_death(self.pet.stage));
            }
        }

        let overlay = self.overlay();
        if overlay != overlay_before {
            self.anim.overlay_frame = 0;
        } else if let Some(o) = overlay {
            let len = self.sprites.overlay(o)?.len();
            self.anim.overlay_frame = next_frame(len, self.anim.overlay_frame);
        }
        Ok(())
    }

    fn progress_activity(&mut self) -> Result<(), AssetError> {
        match self.activity {
            Activity::Eating => {
                let last = self.sprites.overlay(Overlay::Eat)?.len() - 1;
                if self.anim.overlay_frame >= last {
                    self.pet.hunger = 0;
                    self.activity = Activity::Idle;
                    info!(tick = self.ticks, "finished eating");
                }
            }
            Activity::Sleeping => {
                self.pet.energy =
                    (self.pet.energy + self.rules.energy_sleep_gain).min(self.rules.energy_max);
                if self.pet.energy >= self.rules.energy_max {
                    info!(tick = self.ticks, "woke up");
                    self.enter(lifecycle::wake(self.pet.stage));
                }
            }
            Activity::Cleaning => {
                self.anim.offset -= 1;
                if self.anim.offset <= self.rules.clean_sweep_end {
                    self.anim.offset = 0;
                    self.pet.waste = 0;
                    self.activity = Activity::Idle;
                    info!(tick = self.ticks, "finished cleaning");
                }
            }
            Activity::Idle | Activity::Dead => {}
        }
        Ok(())
    }

    fn grow(&mut self) {
        let Some(next) = lifecycle::grown_stage(&self.pet, &self.rules) else {
            return;
        };
        info!(tick = self.ticks, age = self.pet.age, from = %self.pet.stage, to = %next, "stage transition");
        self.pet.stage = next;
        let pose = lifecycle::pose_for(self.activity, next);
        if pose != self.anim.current {
            self.anim.current = pose;
            self.anim.frame = 0;
        }
        if self.activity == Activity::Idle {
            self.alert = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnimKey, StatPage};
    use crate::needs::testing::Scripted;
    use crate::needs::SeededDice;

    fn engine() -> Engine<Scripted> {
        let sprites = Rc::new(SpriteSheet::builtin().unwrap());
        Engine::new(Rules::default(), sprites, Scripted::quiet())
    }

    fn baby() -> Engine<Scripted> {
        let mut e = engine();
        e.pet.stage = Stage::Baby;
        e.pet.age = 200;
        e.anim.current = AnimKey::idle(Stage::Baby);
        e
    }

    fn select(e: &mut Engine<impl RandomSource>, button: usize) {
        e.ui.selected_button = button;
    }

    #[test]
    fn age_advances_by_two_each_tick() {
        let mut e = baby();
        for i in 1..=20 {
            e.tick_fixed_step().unwrap();
            assert_eq!(e.pet.age, 200 + 2 * i);
        }
    }

    #[test]
    fn egg_hatches_on_tick_65() {
        let mut e = engine();
        for _ in 0..64 {
            e.tick_fixed_step().unwrap();
        }
        assert_eq!(e.pet.stage, Stage::Egg);
        assert_eq!(e.pet.age, 128);
        e.tick_fixed_step().unwrap();
        assert_eq!(e.pet.age, 130);
        assert_eq!(e.pet.stage, Stage::Baby);
        assert_eq!(e.anim.current, AnimKey::idle(Stage::Baby));
        assert_eq!(e.overlay(), None);
    }

    #[test]
    fn stages_only_move_forward_once_each() {
        let mut e = engine();
        let mut transitions = Vec::new();
        for tick in 1..=450 {
            let before = e.pet.stage;
            e.tick_fixed_step().unwrap();
            assert!(e.pet.stage >= before);
            if e.pet.stage != before {
                transitions.push((tick, before, e.pet.stage));
            }
        }
        assert_eq!(
            transitions,
            vec![(65, Stage::Egg, Stage::Baby), (409, Stage::Baby, Stage::Child)]
        );
    }

    #[test]
    fn feeding_finishes_after_six_ticks() {
        let mut e = baby();
        e.pet.hunger = 100;
        select(&mut e, 0);
        e.press(Control::Activate);
        assert_eq!(e.activity, Activity::Idle, "queued until the next tick");
        for _ in 0..5 {
            e.tick_fixed_step().unwrap();
            assert_eq!(e.activity, Activity::Eating);
            assert_eq!(e.overlay(), Some(Overlay::Eat));
        }
        e.tick_fixed_step().unwrap();
        assert_eq!(e.activity, Activity::Idle);
        assert_eq!(e.pet.hunger, 0);
        assert_eq!(e.overlay(), None);
    }

    #[test]
    fn cleaning_sweeps_for_33_fast_ticks() {
        let mut e = baby();
        e.pet.waste = 200;
        let age = e.pet.age;
        select(&mut e, 1);
        e.press(Control::Activate);
        assert_eq!(e.tick_rate(), TickRate::Fast);
        for i in 1..=32 {
            e.tick_fixed_step().unwrap();
            assert_eq!(e.activity, Activity::Cleaning);
            assert_eq!(e.anim.offset, -i);
            assert_eq!(e.tick_rate(), TickRate::Fast);
        }
        e.tick_fixed_step().unwrap();
        assert_eq!(e.anim.offset, 0);
        assert_eq!(e.pet.waste, 0);
        assert_eq!(e.activity, Activity::Idle);
        assert_eq!(e.tick_rate(), TickRate::Normal);
        assert_eq!(e.pet.age, age, "needs pause while cleaning");
    }

    #[test]
    fn starvation_kills_and_freezes_the_pet() {
        let mut e = baby();
        e.pet.hunger = 512;
        e.tick_fixed_step().unwrap();
        assert_eq!(e.activity, Activity::Dead);
        assert_eq!(e.overlay(), Some(Overlay::Dead));
        assert_eq!(e.anim.current, AnimKey::sleep(Stage::Baby));

        let frozen = e.pet;
        let frame = e.anim.frame;
        for _ in 0..20 {
            e.tick_fixed_step().unwrap();
            assert_eq!(e.pet, frozen);
            assert_eq!(e.overlay(), Some(Overlay::Dead));
            assert_eq!(e.anim.frame, frame);
            assert_eq!(e.anim.offset, 3);
        }
    }

    #[test]
    fn old_age_kills() {
        let mut e = baby();
        e.pet.stage = Stage::Child;
        e.pet.age = 8190;
        e.anim.current = AnimKey::idle(Stage::Child);
        e.tick_fixed_step().unwrap();
        assert_eq!(e.activity, Activity::Dead);
    }

    #[test]
    fn pass_out_costs_happiness_once() {
        let mut e = baby();
        e.pet.energy = 7;
        e.tick_fixed_step().unwrap();
        assert_eq!(e.activity, Activity::Sleeping);
        assert_eq!(e.pet.happiness, -64);
        assert_eq!(e.anim.current, AnimKey::sleep(Stage::Baby));
        for _ in 0..5 {
            e.tick_fixed_step().unwrap();
            assert_eq!(e.activity, Activity::Sleeping);
            assert_eq!(e.pet.happiness, -64);
        }
    }

    #[test]
    fn sleep_ends_at_full_energy() {
        let mut e = baby();
        e.pet.energy = 150;
        select(&mut e, 3);
        e.press(Control::Activate);
        let mut woke = false;
        for _ in 0..40 {
            e.tick_fixed_step().unwrap();
            assert!((0..=256).contains(&e.pet.energy));
            if e.activity == Activity::Idle {
                woke = true;
                break;
            }
            assert_eq!(e.overlay(), Some(Overlay::Zzz));
        }
        assert!(woke);
        assert_eq!(e.pet.energy, 256);
        assert_eq!(e.anim.current, AnimKey::idle(Stage::Baby));
    }

    #[test]
    fn sleep_needs_a_tired_pet() {
        let mut e = baby();
        e.pet.energy = 151;
        select(&mut e, 3);
        e.press(Control::Activate);
        e.tick_fixed_step().unwrap();
        assert_eq!(e.activity, Activity::Idle);
    }

    #[test]
    fn eggs_only_allow_stats() {
        let mut e = engine();
        for button in [0, 1, 3] {
            select(&mut e, button);
            e.press(Control::Activate);
            assert_eq!(e.pending, None);
        }
        select(&mut e, 2);
        e.press(Control::Activate);
        assert!(e.ui.stats_mode);
    }

    #[test]
    fn busy_pet_ignores_new_actions() {
        let mut e = baby();
        select(&mut e, 0);
        e.press(Control::Activate);
        e.tick_fixed_step().unwrap();
        select(&mut e, 1);
        e.press(Control::Activate);
        assert_eq!(e.pending, None);
        assert_eq!(e.tick_rate(), TickRate::Normal);
    }

    #[test]
    fn navigation_wraps_buttons_and_pages() {
        let mut e = engine();
        e.press(Control::Prev);
        assert_eq!(e.ui.selected_button, 3);
        e.press(Control::Next);
        assert_eq!(e.ui.selected_button, 0);

        select(&mut e, 2);
        e.press(Control::Activate);
        e.press(Control::Prev);
        assert_eq!(e.ui.stats_page, StatPage::Back);
        assert_eq!(e.ui.selected_button, 2, "buttons stay put in stats mode");
        for _ in 0..5 {
            e.press(Control::Next);
        }
        assert_eq!(e.ui.stats_page, StatPage::Back);
        e.press(Control::Activate);
        assert!(!e.ui.stats_mode);
    }

    #[test]
    fn exclaim_shows_when_hungry_and_frames_cycle() {
        let mut e = baby();
        e.pet.hunger = 200;
        e.tick_fixed_step().unwrap();
        assert_eq!(e.overlay(), Some(Overlay::Exclaim));
        assert_eq!(e.anim.overlay_frame, 0);
        e.tick_fixed_step().unwrap();
        assert_eq!(e.anim.overlay_frame, 1);
        e.tick_fixed_step().unwrap();
        assert_eq!(e.anim.overlay_frame, 0);
    }

    #[test]
    fn long_random_run_keeps_invariants() {
        let sprites = Rc::new(SpriteSheet::builtin().unwrap());
        let mut e = Engine::new(Rules::default(), sprites.clone(), SeededDice::new(Some(99)));
        for tick in 0..3000u32 {
            if tick % 97 == 0 {
                select(&mut e, (tick as usize / 97) % 4);
                e.press(Control::Activate);
            }
            let before = e.pet;
            let was_dead = e.activity == Activity::Dead;
            let sweeping = e.tick_rate() == TickRate::Fast;
            e.tick_fixed_step().unwrap();

            assert!((0..=256).contains(&e.pet.energy));
            assert!(e.pet.stage >= before.stage);
            let base = sprites.animation(e.anim.current).unwrap();
            assert!(e.anim.frame < base.len());
            if let Some(o) = e.overlay() {
                assert!(e.anim.overlay_frame < sprites.overlay(o).unwrap().len());
            }
            if was_dead {
                assert_eq!(e.pet, before);
            } else if !sweeping {
                assert_eq!(e.pet.age, before.age + 2);
            }
        }
    }
}
