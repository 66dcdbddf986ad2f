use crate::shared::MAX_VOLUME;

// round(individual * master / 100). Every gain handed to the engine goes
// through here; a sound at master 0 still counts as on.
pub fn effective(individual: u8, master: u8) -> u8 {
    let individual = individual.min(MAX_VOLUME) as u32;
    let master = master.min(MAX_VOLUME) as u32;
    // integer round-half-up
    ((individual * master + 50) / 100) as u8
}

/// Clamp a signed slider value into the volume range.
pub fn clamp(volume: i16) -> u8 {
    volume.clamp(0, MAX_VOLUME as i16) as u8
}

pub fn to_gain(volume: u8) -> f32 {
    volume.min(MAX_VOLUME) as f32 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_on_either_side_is_silent() {
        for v in 0..=100 {
            assert_eq!(effective(0, v), 0);
            assert_eq!(effective(v, 0), 0);
        }
    }

    #[test]
    fn rounds_halves_up() {
        assert_eq!(effective(80, 50), 40);
        assert_eq!(effective(40, 50), 20);
        assert_eq!(effective(1, 50), 1); // 0.5
        assert_eq!(effective(1, 49), 0); // 0.49
        assert_eq!(effective(100, 100), 100);
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        assert_eq!(effective(200, 100), 100);
        assert_eq!(clamp(-5), 0);
        assert_eq!(clamp(105), 100);
    }
}
