use std::collections::HashSet;

use crate::roster::types::{CampaignInfo, CharacterPayload, Roster, RosterMember};

/// Project the API payload onto the fields the roster needs.
pub fn campaign_from_payload(payload: CharacterPayload) -> CampaignInfo {
    let seed_name = payload.data.name.unwrap_or_default();

    match payload.data.campaign {
        Some(campaign) => CampaignInfo {
            name: campaign.name.unwrap_or_default(),
            seed_name,
            members: campaign
                .characters
                .into_iter()
                .map(|c| {
                    RosterMember::new(c.character_id.to_string(), c.character_name.unwrap_or_default())
                })
                .collect(),
        },
        None => CampaignInfo {
            name: String::new(),
            seed_name,
            members: Vec::new(),
        },
    }
}

/// Build the cycle roster: the seed first, then every campaign member not already present.
///
/// When the seed is also listed in the campaign, the listing's name is used
/// only if the API did not report a name for the seed itself.
pub fn build_roster(seed_id: &str, campaign: &CampaignInfo) -> Roster {
    let listed_seed_name = campaign
        .members
        .iter()
        .find(|m| m.id == seed_id)
        .map(|m| m.name.as_str());

    let seed_name = if campaign.seed_name.is_empty() {
        listed_seed_name.unwrap_or_default()
    } else {
        campaign.seed_name.as_str()
    };

    let mut seen = HashSet::new();
    let mut members = Vec::with_capacity(campaign.members.len() + 1);

    seen.insert(seed_id.to_string());
    members.push(RosterMember::new(seed_id, seed_name));

    for member in &campaign.members {
        if seen.insert(member.id.clone()) {
            members.push(member.clone());
        }
    }

    Roster::from_unique(members)
}
