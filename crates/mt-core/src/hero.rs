//! Hero candidates supplied by the host.
//!
//! The host decides which of its characters may join a montage test, who owns
//! them, and whether they carry the human Determination perk. [`HeroCandidate`]
//! is that contract; [`HeroRecord`] is a plain-data implementation for hosts
//! that export characters as JSON.

use serde::{Deserialize, Serialize};

use crate::domain::{Participant, ParticipantId, UserId};

/// Character kind accepted into montage tests.
pub const HERO_KIND: &str = "hero";

/// Ruleset a hero must belong to.
pub const HERO_RULESET: &str = "draw-steel";

/// A character the host offers as a possible participant.
pub trait HeroCandidate {
    /// Host identifier of the character.
    fn id(&self) -> ParticipantId;

    /// Display name.
    fn name(&self) -> String;

    /// Whether the character may take part (a hero of the right ruleset).
    fn is_eligible_hero(&self) -> bool;

    /// The non-privileged user who owns the character, if any.
    fn owner(&self) -> Option<UserId>;

    /// Human ancestry together with the Determination perk.
    fn has_determination_perk(&self) -> bool;

    /// Seat this candidate as a participant.
    fn to_participant(&self) -> Participant {
        Participant {
            actor_id: self.id(),
            actor_name: self.name(),
            player_id: self.owner(),
            has_human_assist_perk: self.has_determination_perk(),
        }
    }
}

/// An item on a hero's sheet. Only ancestries and perks matter here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroItem {
    /// Item type, e.g. `ancestry`, `perk`, `kit`.
    pub kind: String,
    /// Display name.
    pub name: String,
    /// Stable rules identifier, when the host has one.
    #[serde(default)]
    pub tag: Option<String>,
}

/// A user with ownership of a hero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroOwner {
    /// Host user identifier.
    pub user: UserId,
    /// Privileged users (the director) never count as the hero's player.
    #[serde(default)]
    pub privileged: bool,
}

/// Plain-data hero exported by a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroRecord {
    /// Host identifier.
    pub id: ParticipantId,
    /// Display name.
    pub name: String,
    /// Character kind; only `hero` is eligible.
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Ruleset the character was built for.
    #[serde(default = "default_ruleset")]
    pub ruleset: String,
    /// Users with ownership, in host order.
    #[serde(default)]
    pub owners: Vec<HeroOwner>,
    /// Sheet items.
    #[serde(default)]
    pub items: Vec<HeroItem>,
}

fn default_kind() -> String {
    HERO_KIND.to_string()
}

fn default_ruleset() -> String {
    HERO_RULESET.to_string()
}

impl HeroRecord {
    /// A player-less hero with no items.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ParticipantId(id.into()),
            name: name.into(),
            kind: default_kind(),
            ruleset: default_ruleset(),
            owners: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Add an owning user.
    pub fn with_owner(mut self, user: &str, privileged: bool) -> Self {
        self.owners.push(HeroOwner {
            user: UserId::from(user),
            privileged,
        });
        self
    }

    /// Add a sheet item.
    pub fn with_item(mut self, kind: &str, name: &str) -> Self {
        self.items.push(HeroItem {
            kind: kind.to_string(),
            name: name.to_string(),
            tag: None,
        });
        self
    }
}

impl HeroCandidate for HeroRecord {
    fn id(&self) -> ParticipantId {
        self.id.clone()
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_eligible_hero(&self) -> bool {
        self.kind == HERO_KIND && self.ruleset == HERO_RULESET
    }

    fn owner(&self) -> Option<UserId> {
        self.owners
            .iter()
            .find(|o| !o.privileged)
            .map(|o| o.user.clone())
    }

    fn has_determination_perk(&self) -> bool {
        let human = self
            .items
            .iter()
            .any(|i| i.kind == "ancestry" && i.name.to_lowercase().contains("human"));
        human
            && self.items.iter().any(|i| {
                i.tag.as_deref() == Some("determination")
                    || i.name.eq_ignore_ascii_case("determination")
            })
    }
}

impl<T: HeroCandidate + ?Sized> HeroCandidate for &T {
    fn id(&self) -> ParticipantId {
        (**self).id()
    }

    fn name(&self) -> String {
        (**self).name()
    }

    fn is_eligible_hero(&self) -> bool {
        (**self).is_eligible_hero()
    }

    fn owner(&self) -> Option<UserId> {
        (**self).owner()
    }

    fn has_determination_perk(&self) -> bool {
        (**self).has_determination_perk()
    }
}
