//! Static XP tables from the 5e encounter-building guidelines

/// Per-character XP thresholds `[easy, medium, hard, deadly]` for levels 1-20
const XP_THRESHOLDS: [[u32; 4]; 20] = [
    [25, 50, 75, 100],
    [50, 100, 150, 200],
    [75, 150, 225, 400],
    [125, 250, 375, 500],
    [250, 500, 750, 1100],
    [300, 600, 900, 1400],
    [350, 750, 1100, 1700],
    [450, 900, 1400, 2100],
    [550, 1100, 1600, 2400],
    [600, 1200, 1900, 2800],
    [800, 1600, 2400, 3600],
    [1000, 2000, 3000, 4500],
    [1100, 2200, 3400, 5100],
    [1250, 2500, 3800, 5700],
    [1400, 2800, 4300, 6400],
    [1600, 3200, 4800, 7200],
    [2000, 3900, 5900, 8800],
    [2100, 4200, 6300, 9500],
    [2400, 4900, 7300, 10900],
    [2800, 5700, 8500, 12700],
];

const CHALLENGE_RATING_XP: &[(&str, u32)] = &[
    ("0", 10),
    ("1/8", 25),
    ("1/4", 50),
    ("1/2", 100),
    ("1", 200),
    ("2", 450),
    ("3", 700),
    ("4", 1100),
    ("5", 1800),
    ("6", 2300),
    ("7", 2900),
    ("8", 3900),
    ("9", 5000),
    ("10", 5900),
    ("11", 7200),
    ("12", 8400),
    ("13", 10000),
    ("14", 11500),
    ("15", 13000),
    ("16", 15000),
    ("17", 18000),
    ("18", 20000),
    ("19", 22000),
    ("20", 25000),
    ("21", 33000),
    ("22", 41000),
    ("23", 50000),
    ("24", 62000),
    ("25", 75000),
    ("26", 90000),
    ("27", 105000),
    ("28", 120000),
    ("29", 135000),
    ("30", 155000),
];

/// Thresholds for a single character; levels outside 1-20 are clamped
pub fn xp_thresholds_for_level(level: u8) -> [u32; 4] {
    let index = usize::from(level.clamp(1, 20)) - 1;
    XP_THRESHOLDS[index]
}

/// XP awarded for a monster of the given challenge rating ("1/4", "0.5", "3")
pub fn xp_for_challenge_rating(rating: &str) -> Option<u32> {
    let rating = match rating.trim() {
        "0.125" => "1/8",
        "0.25" => "1/4",
        "0.5" => "1/2",
        other => other,
    };
    CHALLENGE_RATING_XP
        .iter()
        .find(|(cr, _)| *cr == rating)
        .map(|(_, xp)| *xp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_clamp_level() {
        assert_eq!(xp_thresholds_for_level(0), [25, 50, 75, 100]);
        assert_eq!(xp_thresholds_for_level(1), [25, 50, 75, 100]);
        assert_eq!(xp_thresholds_for_level(5), [250, 500, 750, 1100]);
        assert_eq!(xp_thresholds_for_level(20), [2800, 5700, 8500, 12700]);
        assert_eq!(xp_thresholds_for_level(99), [2800, 5700, 8500, 12700]);
    }

    #[test]
    fn test_thresholds_increase_with_level() {
        for level in 1..20u8 {
            let lower = xp_thresholds_for_level(level);
            let higher = xp_thresholds_for_level(level + 1);
            assert!(lower.iter().zip(higher.iter()).all(|(l, h)| l < h));
        }
    }

    #[test]
    fn test_challenge_rating_lookup() {
        assert_eq!(xp_for_challenge_rating("1/4"), Some(50));
        assert_eq!(xp_for_challenge_rating("0.5"), Some(100));
        assert_eq!(xp_for_challenge_rating(" 5 "), Some(1800));
        assert_eq!(xp_for_challenge_rating("31"), None);
    }
}
