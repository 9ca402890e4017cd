//! Static content behind the Home, Workout, and Leaderboard tabs, plus the
//! tab layout itself. These screens hold no state; the webview renders
//! whatever this module serves, initialized once and never mutated.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabConfig {
    pub name: &'static str,
    pub icon: &'static str,
}

const TABS: [TabConfig; 4] = [
    TabConfig {
        name: "Home",
        icon: "home",
    },
    TabConfig {
        name: "Workout",
        icon: "heartbeat",
    },
    TabConfig {
        name: "Leaderboard",
        icon: "bar-chart",
    },
    TabConfig {
        name: "StepCounter",
        icon: "tachometer",
    },
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeContent {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub image: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub name: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub name: &'static str,
    pub steps: u64,
}

#[tauri::command]
pub fn get_tab_config() -> Vec<TabConfig> {
    TABS.to_vec()
}

#[tauri::command]
pub fn get_home_content() -> HomeContent {
    HomeContent {
        title: "Welcome!",
        subtitle: "Your fitness journey starts here.",
        image: "https://via.placeholder.com/150.png?text=Welcome+Home",
    }
}

#[tauri::command]
pub fn list_workout_plans() -> Vec<WorkoutPlan> {
    vec![
        WorkoutPlan {
            name: "10-Minute Stretch",
        },
        WorkoutPlan {
            name: "30-Minute Cardio",
        },
        WorkoutPlan {
            name: "Full-Body Workout",
        },
    ]
}

#[tauri::command]
pub fn get_leaderboard() -> Vec<LeaderboardEntry> {
    vec![
        LeaderboardEntry {
            rank: 1,
            name: "John",
            steps: 10_000,
        },
        LeaderboardEntry {
            rank: 2,
            name: "Jane",
            steps: 8_500,
        },
        LeaderboardEntry {
            rank: 3,
            name: "You",
            steps: 0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_tabs_with_the_step_counter_last() {
        let tabs = get_tab_config();
        assert_eq!(tabs.len(), 4);
        assert_eq!(tabs[3].name, "StepCounter");
    }

    #[test]
    fn leaderboard_is_ordered_by_steps_descending() {
        let entries = get_leaderboard();
        assert!(entries.windows(2).all(|pair| pair[0].steps >= pair[1].steps));
        assert!(entries
            .windows(2)
            .all(|pair| pair[0].rank < pair[1].rank));
    }
}
