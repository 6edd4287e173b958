//! Built-in sprite art. Pets are drawn at half resolution and doubled;
//! overlays and stat pages are drawn at full resolution.

use crate::model::{AnimKey, Overlay, Pose, Stage, StatPage};
use crate::sprites::Bitmap;

const EGG: [&str; 16] = [
    "................",
    "......####......",
    ".....#....#.....",
    "....#......#....",
    "...#..#.....#...",
    "...#.....#..#...",
    "..#..........#..",
    "..#...#......#..",
    "..#.......#..#..",
    "..#..#.......#..",
    "...#.....#..#...",
    "...#........#...",
    "....##....##....",
    "......####......",
    "................",
    "................",
];

const BABY_IDLE: [&str; 16] = [
    "................",
    "................",
    "................",
    "................",
    "................",
    "......####......",
    "....##....##....",
    "...#........#...",
    "...#..#..#..#...",
    "..#..........#..",
    "..#...#..#...#..",
    "..#....##....#..",
    "...#........#...",
    "....########....",
    "................",
    "................",
];

const BABY_SLEEP: [&str; 16] = [
    "................",
    "................",
    "................",
    "................",
    "................",
    "................",
    "................",
    "......####......",
    "....##....##....",
    "...#........#...",
    "..#.##..##...#..",
    "..#..........#..",
    "..#....##....#..",
    "...##########...",
    "................",
    "................",
];

const CHILD_IDLE: [&str; 16] = [
    "................",
    "................",
    "................",
    ".....######.....",
    "....#......#....",
    "...#........#...",
    "...#.#....#.#...",
    "...#........#...",
    "...#..#..#..#...",
    "...#...##...#...",
    "#..#........#..#",
    ".###........###.",
    "...#........#...",
    "....#......#....",
    "....##....##....",
    "................",
];

const CHILD_SLEEP: [&str; 16] = [
    "................",
    "................",
    "................",
    "................",
    "................",
    ".....######.....",
    "....#......#....",
    "...#........#...",
    "...#.##..##.#...",
    "...#........#...",
    "...#...##...#...",
    "...#........#...",
    "..##........##..",
    "..#..........#..",
    "...##########...",
    "................",
];

const EXCLAIM: [&str; 7] = [
    "...##...", "...##...", "...##...", "...##...", "........", "...##...", "...##...",
];

const Z_SMALL: [&str; 4] = ["####", "..#.", ".#..", "####"];
const Z_BIG: [&str; 5] = ["#####", "...#.", "..#..", ".#...", "#####"];

const STINK: [&str; 5] = [".#..#..#", "#..#..#.", ".#..#..#", "..#..#..", ".#..#..#"];

const GHOST: [&str; 7] = [
    "..####..", ".#....#.", "#.#..#.#", "#......#", "#......#", "#.#..#.#", ".#.##.#.",
];

const APPLE: [&str; 8] = [
    "....#...", "...#....", ".######.", "########", "########", "########", ".######.",
    "..####..",
];

const WAVE: [&str; 4] = [
    "..##....##....##....##....##....",
    ".#..#..#..#..#..#..#..#..#..#..#",
    "#....##....##....##....##....##.",
    "################################",
];

const FONT: [(char, [&str; 5]); 14] = [
    ('A', [".#.", "#.#", "###", "#.#", "#.#"]),
    ('B', ["##.", "#.#", "##.", "#.#", "##."]),
    ('C', ["###", "#..", "#..", "#..", "###"]),
    ('E', ["###", "#..", "##.", "#..", "###"]),
    ('G', ["###", "#..", "#.#", "#.#", "###"]),
    ('H', ["#.#", "#.#", "###", "#.#", "#.#"]),
    ('K', ["#.#", "#.#", "##.", "#.#", "#.#"]),
    ('N', ["##.", "#.#", "#.#", "#.#", "#.#"]),
    ('R', ["##.", "#.#", "##.", "#.#", "#.#"]),
    ('S', ["###", "#..", "###", "..#", "###"]),
    ('T', ["###", ".#.", ".#.", ".#.", ".#."]),
    ('U', ["#.#", "#.#", "#.#", "#.#", "###"]),
    ('W', ["#.#", "#.#", "#.#", "###", "#.#"]),
    ('Y', ["#.#", "#.#", ".#.", ".#.", ".#."]),
];

const ARROW_LEFT: [&str; 7] = [
    "...#......", "..##......", ".#########", "##########", ".#########", "..##......",
    "...#......",
];

/// Rows the stats bar occupies inside the page frame.
pub(crate) const BAR_TOP: i32 = 22;
pub(crate) const BAR_HEIGHT: i32 = 3;
pub(crate) const BAR_LEFT: i32 = 2;

fn pet(art: &[&str], bob: i32) -> Bitmap {
    let mut bm = Bitmap::blank();
    bm.stamp(art, 0, bob, 2);
    bm
}

fn two_step(art: &[&str]) -> Vec<Bitmap> {
    vec![pet(art, 0), pet(art, 1)]
}

pub(crate) fn pose_frames(key: AnimKey) -> Option<Vec<Bitmap>> {
    let art: &[&str] = match (key.stage, key.pose) {
        (Stage::Egg, _) => &EGG,
        (Stage::Baby, Pose::Idle) => &BABY_IDLE,
        (Stage::Baby, Pose::Sleep) => &BABY_SLEEP,
        (Stage::Child, Pose::Idle) => &CHILD_IDLE,
        (Stage::Child, Pose::Sleep) => &CHILD_SLEEP,
        _ => return None,
    };
    Some(two_step(art))
}

fn stamped(art: &[&str], x: i32, y: i32) -> Bitmap {
    let mut bm = Bitmap::blank();
    bm.stamp(art, x, y, 1);
    bm
}

pub(crate) fn overlay_frames(overlay: Overlay) -> Vec<Bitmap> {
    match overlay {
        Overlay::Exclaim => vec![stamped(&EXCLAIM, 24, 1), stamped(&EXCLAIM, 24, 0)],
        Overlay::Stink => vec![stamped(&STINK, 1, 2), stamped(&STINK, 2, 2)],
        Overlay::Dead => vec![stamped(&GHOST, 24, 1), stamped(&GHOST, 24, 0)],
        Overlay::Zzz => {
            let small = stamped(&Z_SMALL, 22, 6);
            let mut both = small;
            both.stamp(&Z_BIG, 27, 0, 1);
            vec![small, both]
        }
        Overlay::Eat => (0..6)
            .map(|bites| {
                let mut bm = stamped(&APPLE, 1, 1);
                // each bite takes a column off the right; the stem survives
                if bites > 0 {
                    bm.fill_rect(9 - bites, 3, bites, 6, false);
                }
                bm
            })
            .collect(),
        Overlay::Clean => vec![stamped(&WAVE, 0, 28)],
    }
}

fn text(bm: &mut Bitmap, s: &str, x: i32, y: i32) {
    let mut cx = x;
    for ch in s.chars() {
        if let Some((_, glyph)) = FONT.iter().find(|(c, _)| *c == ch) {
            bm.stamp(glyph, cx, y, 1);
        }
        cx += 4;
    }
}

/// Page title plus, except for "back", an empty bar frame the display
/// fills in.
pub(crate) fn stat_page(page: StatPage) -> Bitmap {
    let mut bm = Bitmap::blank();
    let title = match page {
        StatPage::Hunger => "HUNGER",
        StatPage::Age => "AGE",
        StatPage::Waste => "WASTE",
        StatPage::Energy => "ENERGY",
        StatPage::Back => "BACK",
    };
    let width = title.len() as i32 * 4 - 1;
    text(&mut bm, title, (32 - width) / 2, 6);

    if page == StatPage::Back {
        bm.stamp(&ARROW_LEFT, 11, 18, 1);
        return bm;
    }
    let (top, bottom) = (BAR_TOP - 2, BAR_TOP + BAR_HEIGHT + 1);
    bm.fill_rect(0, top, 32, 1, true);
    bm.fill_rect(0, bottom, 32, 1, true);
    bm.fill_rect(0, top, 1, bottom - top + 1, true);
    bm.fill_rect(31, top, 1, bottom - top + 1, true);
    bm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_bite_removes_more_apple() {
        let frames = overlay_frames(Overlay::Eat);
        assert_eq!(frames.len(), 6);
        for pair in frames.windows(2) {
            assert!(pair[1].count() < pair[0].count());
        }
        assert!(frames[5].get(5, 1), "stem stays");
    }

    #[test]
    fn pages_differ_and_have_a_bar_frame() {
        let hunger = stat_page(StatPage::Hunger);
        let age = stat_page(StatPage::Age);
        assert_ne!(hunger, age);
        assert!(hunger.get(0, (BAR_TOP - 2) as usize));
        assert!(!hunger.get(BAR_LEFT as usize, BAR_TOP as usize));
        assert!(!stat_page(StatPage::Back).get(0, (BAR_TOP - 2) as usize));
    }

    #[test]
    fn reserved_stages_have_no_art() {
        assert!(pose_frames(AnimKey::idle(Stage::Adult)).is_none());
        assert_eq!(pose_frames(AnimKey::sleep(Stage::Egg)).map(|f| f.len()), Some(2));
    }
}
