use serde::{Deserialize, Serialize};

/// Top-level body of the character API response.
///
/// Only the fields the roster needs are modeled; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CharacterPayload {
    pub data: CharacterData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterData {
    #[serde(default)]
    pub name: Option<String>,
    /// `null` when the character is not part of a campaign.
    #[serde(default)]
    pub campaign: Option<CampaignPayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPayload {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub characters: Vec<CampaignCharacter>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignCharacter {
    pub character_id: u64,
    #[serde(default)]
    pub character_name: Option<String>,
}

/// One character tracked in a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterMember {
    pub id: String,
    pub name: String,
}

impl RosterMember {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// What the resolver learned about the seed character's campaign.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CampaignInfo {
    /// Empty when the seed is not in a campaign.
    pub name: String,
    /// The seed character's own name.
    pub seed_name: String,
    /// Campaign characters in API order. May or may not include the seed.
    pub members: Vec<RosterMember>,
}

/// The immutable set of characters fetched in one cycle.
///
/// Built fresh every cycle; the seed always comes first and ids are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    members: Vec<RosterMember>,
}

impl Roster {
    pub(crate) fn from_unique(members: Vec<RosterMember>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[RosterMember] {
        &self.members
    }

    pub fn into_members(self) -> Vec<RosterMember> {
        self.members
    }
}
