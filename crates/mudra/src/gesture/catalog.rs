//! The standard gesture catalog.

use std::path::Path;

use super::{DynamicGestureTemplate, GestureTemplate};

/// Names of the standard static gestures.
pub mod names {
    pub const OPEN_HAND: &str = "Open hand";
    pub const POINTER: &str = "Pointer";
    pub const FIST: &str = "Fist";
    pub const PEACE: &str = "Peace";
    pub const SPOCK: &str = "Spock";
    pub const ROCK_N_ROLL: &str = "Rock'n'roll!";
    pub const THUMBS_UP: &str = "Thumbs up!";

    pub const HELLO: &str = "Hello!";
    pub const ONE_FINGER_WAVE: &str = "One finger wave";
    pub const FLASH_FOR_ATTENTION: &str = "Flash for attention";
}

/// `(name, file name, finger count)` of every standard static gesture, in matching order.
pub const STATIC_GESTURES: &[(&str, &str, u32)] = &[
    (names::OPEN_HAND, "open_hand.jpg", 5),
    (names::POINTER, "pointer.jpg", 1),
    (names::FIST, "fist.jpg", 0),
    (names::PEACE, "peace.jpg", 2),
    (names::SPOCK, "spock.jpg", 4),
    (names::ROCK_N_ROLL, "rocknroll.jpg", 5),
    (names::THUMBS_UP, "thumbs_up.jpg", 1),
];

/// Loads the reference masks of all standard static gestures from `dir`.
pub fn load_static<P: AsRef<Path>>(dir: P) -> anyhow::Result<Vec<GestureTemplate>> {
    let dir = dir.as_ref();
    STATIC_GESTURES
        .iter()
        .map(|&(name, file, fingers)| {
            let path = dir.join(file);
            log::debug!("loading gesture '{}' from {}", name, path.display());
            GestureTemplate::load(name, path, fingers)
        })
        .collect()
}

/// Loads the full standard catalog: the static gestures from `dir` and the dynamic gestures
/// built on them.
pub fn standard<P: AsRef<Path>>(
    dir: P,
) -> anyhow::Result<(Vec<GestureTemplate>, Vec<DynamicGestureTemplate>)> {
    Ok((load_static(dir)?, dynamic()))
}

/// Returns the standard dynamic gestures, in detection order.
pub fn dynamic() -> Vec<DynamicGestureTemplate> {
    vec![
        DynamicGestureTemplate::wave(names::HELLO, names::OPEN_HAND),
        DynamicGestureTemplate::wave(names::ONE_FINGER_WAVE, names::POINTER),
        DynamicGestureTemplate::alternation(
            names::FLASH_FOR_ATTENTION,
            names::OPEN_HAND,
            names::FIST,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::HandShape;

    #[test]
    fn test_load_static() {
        let dir = std::env::temp_dir().join(format!("mudra-catalog-{}", fastrand::u64(..)));
        std::fs::create_dir_all(&dir).unwrap();

        assert!(load_static(&dir).is_err());

        let luma = HandShape::open().mask().to_luma();
        for &(_, file, _) in STATIC_GESTURES {
            luma.save(dir.join(file)).unwrap();
        }
        let (templates, dynamic) = standard(&dir).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(dynamic.len(), 3);
        assert_eq!(templates.len(), STATIC_GESTURES.len());
        assert_eq!(templates[0].name(), names::OPEN_HAND);
        assert_eq!(templates[2].fingers(), 0);
        assert_eq!(templates[6].name(), names::THUMBS_UP);
    }

    #[test]
    fn test_dynamic_references_static() {
        for template in dynamic() {
            for gesture in template.gestures() {
                assert!(
                    STATIC_GESTURES.iter().any(|(name, ..)| name == gesture),
                    "{gesture} is not a standard gesture"
                );
            }
        }
    }
}
