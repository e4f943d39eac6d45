use std::collections::HashMap;

use crate::state::{StarAssignment, TeamMember};

/// Checkbox state per team member, kept in member-list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    order: Vec<String>,
    checked: HashMap<String, bool>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops any previous selection and starts every member unchecked.
    pub fn seed(&mut self, members: &[TeamMember]) {
        self.order.clear();
        self.checked.clear();
        for member in members {
            if self.checked.insert(member.id.clone(), false).is_none() {
                self.order.push(member.id.clone());
            }
        }
    }

    pub fn from_members(members: &[TeamMember]) -> Self {
        let mut state = Self::new();
        state.seed(members);
        state
    }

    /// Returns the new value, or `None` for an id we never seeded.
    pub fn toggle(&mut self, member_id: &str) -> Option<bool> {
        let flag = self.checked.get_mut(member_id)?;
        *flag = !*flag;
        Some(*flag)
    }

    pub fn is_selected(&self, member_id: &str) -> bool {
        self.checked.get(member_id).copied().unwrap_or(false)
    }

    pub fn selected_count(&self) -> usize {
        self.checked.values().filter(|v| **v).count()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.order
            .iter()
            .map(|id| (id.as_str(), self.is_selected(id)))
    }

    pub fn assignments(&self) -> Vec<StarAssignment> {
        self.iter()
            .map(|(id, selected)| StarAssignment {
                team_member_id: id.to_string(),
                selected,
            })
            .collect()
    }
}
