/// Achievement table and evaluator.
///
/// The table is static data: each entry pairs an id with a plain `fn`
/// predicate over an immutable profile. Table order is display order.
/// Unlocks are one-shot; the evaluator only ever inserts into
/// `unlocked_achievements`.

use super::language::Language;
use super::profile::PlayerProfile;

pub struct AchievementDef {
    pub id: &'static str,
    pub icon: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub unlocked_when: fn(&PlayerProfile) -> bool,
}

impl std::fmt::Debug for AchievementDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AchievementDef").field("id", &self.id).finish()
    }
}

pub static ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        id: "first_win",
        icon: "🎯",
        name: "First Blood",
        description: "Win your first game",
        unlocked_when: |p| p.wins >= 1,
    },
    AchievementDef {
        id: "flawless",
        icon: "✨",
        name: "Flawless",
        description: "Win with zero mistakes",
        unlocked_when: |p| p.perfect_last_win,
    },
    AchievementDef {
        id: "on_fire",
        icon: "🔥",
        name: "On Fire",
        description: "Win 3 games in a row",
        unlocked_when: |p| p.current_streak >= 3,
    },
    AchievementDef {
        id: "lightning",
        icon: "⚡",
        name: "Lightning",
        description: "Win 5 games in a row",
        unlocked_when: |p| p.current_streak >= 5,
    },
    AchievementDef {
        id: "half_grand",
        icon: "💰",
        name: "Half a Grand",
        description: "Reach 500 points",
        unlocked_when: |p| p.points >= 500,
    },
    AchievementDef {
        id: "millie",
        icon: "👑",
        name: "Millionaire",
        description: "Reach 1000 points",
        unlocked_when: |p| p.points >= 1000,
    },
    AchievementDef {
        id: "no_hints",
        icon: "🧠",
        name: "No Cheating",
        description: "Win 5 games without hints",
        unlocked_when: |p| p.hint_free_wins >= 5,
    },
    AchievementDef {
        id: "speed",
        icon: "🚀",
        name: "Speed Runner",
        description: "Win in under 20 seconds",
        unlocked_when: |p| p.best_win_time_seconds.is_some_and(|t| t <= 20.0),
    },
    AchievementDef {
        id: "bilingual",
        icon: "🌍",
        name: "Bilingual",
        description: "Win in both languages",
        unlocked_when: |p| p.wins_in(Language::Ar) > 0 && p.wins_in(Language::En) > 0,
    },
    AchievementDef {
        id: "veteran",
        icon: "🏅",
        name: "Veteran",
        description: "Play 20 games",
        unlocked_when: |p| p.games_played() >= 20,
    },
    AchievementDef {
        id: "comeback",
        icon: "🦅",
        name: "Comeback King",
        description: "Win after 3 losses in a row",
        unlocked_when: |p| p.comeback_flag,
    },
    AchievementDef {
        id: "collect5",
        icon: "🎁",
        name: "Collector",
        description: "Unlock 5 achievements",
        unlocked_when: |p| p.unlocked_achievements.len() >= 5,
    },
    AchievementDef {
        id: "two_k",
        icon: "💎",
        name: "Diamond",
        description: "Reach 2000 points",
        unlocked_when: |p| p.points >= 2000,
    },
    AchievementDef {
        id: "streak10",
        icon: "🌟",
        name: "Tornado",
        description: "Win 10 games in a row",
        unlocked_when: |p| p.current_streak >= 10,
    },
];

pub fn find(id: &str) -> Option<&'static AchievementDef> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Unlock every achievement whose predicate now holds.
///
/// Walks the table in order; an entry sees unlocks made earlier in the
/// same pass (this is how `collect5` can trigger together with the fifth).
/// Returns only the entries unlocked by this call.
pub fn evaluate(profile: &mut PlayerProfile) -> Vec<&'static AchievementDef> {
    let mut fresh = Vec::new();
    for def in ACHIEVEMENTS {
        if profile.unlocked_achievements.contains(def.id) {
            continue;
        }
        if (def.unlocked_when)(profile) {
            profile.unlocked_achievements.insert(def.id.to_string());
            fresh.push(def);
        }
    }
    fresh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(defs: &[&AchievementDef]) -> Vec<&'static str> {
        defs.iter().map(|d| d.id).collect()
    }

    #[test]
    fn ids_are_unique() {
        for (i, a) in ACHIEVEMENTS.iter().enumerate() {
            assert!(ACHIEVEMENTS[i + 1..].iter().all(|b| b.id != a.id), "{}", a.id);
        }
    }

    #[test]
    fn fresh_profile_unlocks_nothing() {
        let mut p = PlayerProfile::default();
        assert!(evaluate(&mut p).is_empty());
        assert!(p.unlocked_achievements.is_empty());
    }

    #[test]
    fn first_win_unlocks_once() {
        let mut p = PlayerProfile::default();
        p.wins = 1;
        assert_eq!(ids(&evaluate(&mut p)), vec!["first_win"]);
        assert!(evaluate(&mut p).is_empty());
        p.wins = 2;
        assert!(evaluate(&mut p).is_empty());
        assert!(p.unlocked_achievements.contains("first_win"));
    }

    #[test]
    fn unlocks_survive_when_predicate_turns_false() {
        let mut p = PlayerProfile::default();
        p.current_streak = 3;
        assert_eq!(ids(&evaluate(&mut p)), vec!["on_fire"]);
        p.current_streak = 0;
        assert!(evaluate(&mut p).is_empty());
        assert!(p.unlocked_achievements.contains("on_fire"));
    }

    #[test]
    fn result_follows_table_order() {
        let mut p = PlayerProfile::default();
        p.points = 2500;
        p.wins = 1;
        assert_eq!(ids(&evaluate(&mut p)), vec!["first_win", "half_grand", "millie", "two_k"]);
    }

    #[test]
    fn collector_sees_unlocks_from_the_same_pass() {
        let mut p = PlayerProfile::default();
        p.wins = 1;
        p.perfect_last_win = true;
        p.current_streak = 5;
        p.points = 500;
        let got = ids(&evaluate(&mut p));
        assert_eq!(got, vec!["first_win", "flawless", "on_fire", "lightning", "half_grand", "collect5"]);
    }

    #[test]
    fn speed_needs_a_recorded_win_time() {
        let mut p = PlayerProfile::default();
        assert!(!(find("speed").unwrap().unlocked_when)(&p));
        p.best_win_time_seconds = Some(19.5);
        assert!((find("speed").unwrap().unlocked_when)(&p));
    }

    #[test]
    fn bilingual_requires_both_banks() {
        let mut p = PlayerProfile::default();
        p.wins_by_language.insert(Language::En, 2);
        let bilingual = find("bilingual").unwrap();
        assert!(!(bilingual.unlocked_when)(&p));
        p.wins_by_language.insert(Language::Ar, 1);
        assert!((bilingual.unlocked_when)(&p));
    }
}
