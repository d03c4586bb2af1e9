/// Initial state construction.

use std::collections::BTreeMap;

use crate::domain::{CompanySize, EngineConfig, GameState, SustainabilityRating};

/// Create a fresh small-company state for a new player: level 1, zero XP,
/// every roster stakeholder at neutral satisfaction, no challenges and no
/// trend history.
pub fn create_initial_state(
    id: &str,
    player_id: &str,
    company_name: &str,
    config: &EngineConfig,
) -> GameState {
    let stakeholder_satisfaction: BTreeMap<String, f64> = config
        .stakeholder_roster
        .iter()
        .map(|name| (name.clone(), 50.0))
        .collect();

    GameState {
        id: id.to_string(),
        player_id: player_id.to_string(),
        company_name: company_name.to_string(),
        company_size: CompanySize::Small,
        level: 1,
        experience_points: 0,
        financial_resources: config.starting_capital,
        reputation_points: config.initial_reputation,
        market_share: config.initial_market_share,
        sustainability_rating: SustainabilityRating::C,
        stakeholder_satisfaction,
        active_challenges: Vec::new(),
        financial_trend: None,
        reputation_trend: None,
        market_share_trend: None,
        sustainability_trend: None,
    }
}
