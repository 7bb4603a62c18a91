use serde::{Deserialize, Serialize};

use crate::domain::{Member, MemberId};

/// Snapshot of a household as handed over by the household service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    pub id: String,
    pub name: String,
    pub invite_code: String,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Household {
    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == id)
    }

    pub fn has_member(&self, id: &MemberId) -> bool {
        self.member(id).is_some()
    }
}
