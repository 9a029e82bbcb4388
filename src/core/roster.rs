use std::collections::HashSet;

use thiserror::Error;

use super::engine::allocate;
use super::types::{AgentGroup, AgentRecord, DealBreakdown, DealInputs};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("the sole mandate group holds exactly one agent")]
    SoleGroupFixed,
    #[error("no agent with id {0}")]
    UnknownAgent(u32),
    #[error("agent id {0} appears more than once")]
    DuplicateId(u32),
    #[error("no agent ids left to assign")]
    IdSpaceExhausted,
}

/// Field values for a row that does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentDraft {
    pub name: String,
    pub pool_percent: f64,
    pub office_split_percent: f64,
    pub paye_percent: f64,
}

impl AgentDraft {
    pub fn new(name: impl Into<String>, pool: f64, office_split: f64, paye: f64) -> Self {
        Self {
            name: name.into(),
            pool_percent: pool,
            office_split_percent: office_split,
            paye_percent: paye,
        }
    }

    /// Defaults for a row added from the "add agent" control.
    pub fn new_row() -> Self {
        Self::new("", 0.0, 70.0, 0.0)
    }

    fn blank() -> Self {
        Self::new("", 0.0, 0.0, 0.0)
    }

    fn into_record(self, id: u32, group: AgentGroup) -> AgentRecord {
        AgentRecord {
            id,
            name: self.name,
            group,
            pool_percent: self.pool_percent,
            office_split_percent: self.office_split_percent,
            paye_percent: self.paye_percent,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentUpdate {
    pub name: Option<String>,
    pub pool_percent: Option<f64>,
    pub office_split_percent: Option<f64>,
    pub paye_percent: Option<f64>,
}

/// Owns the agent list between recomputes.
///
/// Agents are kept in canonical order (listing, sole, selling; insertion order
/// within a group) and the sole mandate group always holds exactly one row.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRoster {
    agents: Vec<AgentRecord>,
    /// `None` once `u32::MAX` has been handed out.
    next_id: Option<u32>,
}

impl Default for AgentRoster {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRoster {
    pub fn new() -> Self {
        Self {
            agents: vec![AgentDraft::blank().into_record(1, AgentGroup::Sole)],
            next_id: Some(2),
        }
    }

    pub fn with_default_agents() -> Self {
        Self {
            agents: vec![
                AgentDraft::new("Lee", 20.0, 75.0, 18.0).into_record(1, AgentGroup::Listing),
                AgentDraft::new("Desiree", 10.0, 75.0, 18.0).into_record(2, AgentGroup::Sole),
                AgentDraft::new("Sanet", 70.0, 75.0, 18.0).into_record(3, AgentGroup::Selling),
            ],
            next_id: Some(4),
        }
    }

    /// Rebuilds a roster from client-held rows, keeping their ids.
    pub fn from_records(records: Vec<AgentRecord>) -> Result<Self, RosterError> {
        let mut seen = HashSet::with_capacity(records.len());
        let mut sole_rows = 0usize;
        for record in &records {
            if !seen.insert(record.id) {
                return Err(RosterError::DuplicateId(record.id));
            }
            if record.group == AgentGroup::Sole {
                sole_rows += 1;
            }
        }
        if sole_rows > 1 {
            return Err(RosterError::SoleGroupFixed);
        }

        let next_id = match records.iter().map(|record| record.id).max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        };
        let mut roster = Self {
            agents: Vec::with_capacity(records.len() + 1),
            next_id,
        };
        for record in records {
            roster.place(record);
        }
        if sole_rows == 0 {
            roster.insert(AgentGroup::Sole, AgentDraft::blank())?;
        }
        Ok(roster)
    }

    pub fn add(&mut self, group: AgentGroup, draft: AgentDraft) -> Result<u32, RosterError> {
        if !group.is_removable() {
            return Err(RosterError::SoleGroupFixed);
        }
        self.insert(group, draft)
    }

    pub fn remove(&mut self, id: u32) -> Result<AgentRecord, RosterError> {
        let index = self.index_of(id)?;
        if !self.agents[index].group.is_removable() {
            return Err(RosterError::SoleGroupFixed);
        }
        let removed = self.agents.remove(index);
        tracing::debug!(id, group = ?removed.group, "removed agent row");
        Ok(removed)
    }

    pub fn update(&mut self, id: u32, update: AgentUpdate) -> Result<(), RosterError> {
        let index = self.index_of(id)?;
        let agent = &mut self.agents[index];
        if let Some(name) = update.name {
            agent.name = name;
        }
        if let Some(v) = update.pool_percent {
            agent.pool_percent = v;
        }
        if let Some(v) = update.office_split_percent {
            agent.office_split_percent = v;
        }
        if let Some(v) = update.paye_percent {
            agent.paye_percent = v;
        }
        Ok(())
    }

    pub fn get(&self, id: u32) -> Option<&AgentRecord> {
        self.agents.iter().find(|agent| agent.id == id)
    }

    pub fn records(&self) -> &[AgentRecord] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn recalculate(&self, inputs: &DealInputs) -> DealBreakdown {
        allocate(inputs, &self.agents)
    }

    fn insert(&mut self, group: AgentGroup, draft: AgentDraft) -> Result<u32, RosterError> {
        let id = self.next_id.ok_or(RosterError::IdSpaceExhausted)?;
        self.next_id = id.checked_add(1);
        self.place(draft.into_record(id, group));
        tracing::debug!(id, ?group, "added agent row");
        Ok(id)
    }

    fn place(&mut self, record: AgentRecord) {
        let rank = group_rank(record.group);
        let at = self
            .agents
            .iter()
            .position(|agent| group_rank(agent.group) > rank)
            .unwrap_or(self.agents.len());
        self.agents.insert(at, record);
    }

    fn index_of(&self, id: u32) -> Result<usize, RosterError> {
        self.agents
            .iter()
            .position(|agent| agent.id == id)
            .ok_or(RosterError::UnknownAgent(id))
    }
}

fn group_rank(group: AgentGroup) -> u8 {
    match group {
        AgentGroup::Listing => 0,
        AgentGroup::Sole => 1,
        AgentGroup::Selling => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(roster: &AgentRoster) -> Vec<AgentGroup> {
        roster.records().iter().map(|agent| agent.group).collect()
    }

    fn record(id: u32, group: AgentGroup) -> AgentRecord {
        AgentRecord {
            id,
            name: String::new(),
            group,
            pool_percent: 0.0,
            office_split_percent: 0.0,
            paye_percent: 0.0,
        }
    }

    #[test]
    fn new_roster_holds_a_single_blank_sole_row() {
        let roster = AgentRoster::new();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.records()[0].group, AgentGroup::Sole);
        assert_eq!(roster.records()[0].id, 1);
    }

    #[test]
    fn default_agents_match_the_starting_deal() {
        let roster = AgentRoster::with_default_agents();
        let names: Vec<&str> = roster.records().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Lee", "Desiree", "Sanet"]);
        assert_eq!(
            groups(&roster),
            [AgentGroup::Listing, AgentGroup::Sole, AgentGroup::Selling]
        );
        let pools: f64 = roster.records().iter().map(|a| a.pool_percent).sum();
        assert_eq!(pools, 100.0);
    }

    #[test]
    fn added_rows_keep_canonical_group_order_and_unique_ids() {
        let mut roster = AgentRoster::with_default_agents();
        let selling = roster.add(AgentGroup::Selling, AgentDraft::new_row()).unwrap();
        let listing = roster.add(AgentGroup::Listing, AgentDraft::new_row()).unwrap();

        assert_eq!(selling, 4);
        assert_eq!(listing, 5);
        assert_eq!(
            groups(&roster),
            [
                AgentGroup::Listing,
                AgentGroup::Listing,
                AgentGroup::Sole,
                AgentGroup::Selling,
                AgentGroup::Selling
            ]
        );
        let added = roster.get(listing).unwrap();
        assert_eq!(added.office_split_percent, 70.0);
        assert_eq!(added.pool_percent, 0.0);
    }

    #[test]
    fn sole_group_cannot_grow_or_shrink() {
        let mut roster = AgentRoster::with_default_agents();
        assert_eq!(
            roster.add(AgentGroup::Sole, AgentDraft::new_row()),
            Err(RosterError::SoleGroupFixed)
        );
        assert_eq!(roster.remove(2), Err(RosterError::SoleGroupFixed));
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut roster = AgentRoster::with_default_agents();
        let removed = roster.remove(3).unwrap();
        assert_eq!(removed.name, "Sanet");
        let id = roster.add(AgentGroup::Selling, AgentDraft::new_row()).unwrap();
        assert_eq!(id, 4);
        assert_eq!(roster.remove(99), Err(RosterError::UnknownAgent(99)));
    }

    #[test]
    fn update_patches_only_given_fields() {
        let mut roster = AgentRoster::with_default_agents();
        roster
            .update(
                1,
                AgentUpdate {
                    pool_percent: Some(25.5),
                    ..AgentUpdate::default()
                },
            )
            .unwrap();
        let lee = roster.get(1).unwrap();
        assert_eq!(lee.pool_percent, 25.5);
        assert_eq!(lee.name, "Lee");
        assert_eq!(lee.paye_percent, 18.0);
        assert_eq!(
            roster.update(42, AgentUpdate::default()),
            Err(RosterError::UnknownAgent(42))
        );
    }

    #[test]
    fn from_records_sorts_groups_and_resumes_ids() {
        let roster = AgentRoster::from_records(vec![
            record(9, AgentGroup::Selling),
            record(4, AgentGroup::Listing),
            record(2, AgentGroup::Sole),
            record(5, AgentGroup::Listing),
        ])
        .unwrap();
        let ids: Vec<u32> = roster.records().iter().map(|a| a.id).collect();
        assert_eq!(ids, [4, 5, 2, 9]);

        let mut roster = roster;
        assert_eq!(roster.add(AgentGroup::Listing, AgentDraft::new_row()), Ok(10));
    }

    #[test]
    fn from_records_adds_missing_sole_row_and_rejects_bad_input() {
        let roster = AgentRoster::from_records(vec![record(3, AgentGroup::Selling)]).unwrap();
        assert_eq!(groups(&roster), [AgentGroup::Sole, AgentGroup::Selling]);
        assert_eq!(roster.records()[0].id, 4);

        assert_eq!(
            AgentRoster::from_records(vec![
                record(1, AgentGroup::Sole),
                record(2, AgentGroup::Sole)
            ]),
            Err(RosterError::SoleGroupFixed)
        );
        assert_eq!(
            AgentRoster::from_records(vec![
                record(1, AgentGroup::Listing),
                record(1, AgentGroup::Selling)
            ]),
            Err(RosterError::DuplicateId(1))
        );
    }

    #[test]
    fn highest_possible_id_does_not_overflow_the_counter() {
        let err = AgentRoster::from_records(vec![record(u32::MAX, AgentGroup::Selling)])
            .expect_err("no id left for the blank sole row");
        assert_eq!(err, RosterError::IdSpaceExhausted);

        let mut roster = AgentRoster::from_records(vec![
            record(u32::MAX - 1, AgentGroup::Sole),
            record(3, AgentGroup::Listing),
        ])
        .unwrap();
        assert_eq!(
            roster.add(AgentGroup::Selling, AgentDraft::new_row()),
            Ok(u32::MAX)
        );
        assert_eq!(
            roster.add(AgentGroup::Selling, AgentDraft::new_row()),
            Err(RosterError::IdSpaceExhausted)
        );
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn recalculate_uses_roster_order() {
        let roster = AgentRoster::with_default_agents();
        let inputs = DealInputs {
            gross_commission_incl: 60_000.0,
            vat_rate: 0.15,
            admin_fee: 500.0,
            ..DealInputs::default()
        };
        let breakdown = roster.recalculate(&inputs);
        let names: Vec<&str> = breakdown.agents.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Lee", "Desiree", "Sanet"]);
    }
}
