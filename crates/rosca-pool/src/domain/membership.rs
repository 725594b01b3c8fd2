//! # Membership Registry
//!
//! Ordered member set, foreperson and pending join requests. Member order
//! is insertion order with the foreperson at index 0; records are never
//! removed.

use super::entities::{Member, MemberEntry};
use super::errors::RoscaError;
use super::value_objects::Address;
use std::collections::{HashMap, HashSet};

/// Member set of one pool.
#[derive(Clone, Debug)]
pub struct MembershipRegistry {
    foreperson: Address,
    order: Vec<Address>,
    records: HashMap<Address, Member>,
    pending: HashSet<Address>,
}

impl MembershipRegistry {
    /// Create the registry with the foreperson first, then `members` in order.
    pub fn new(foreperson: Address, members: &[Address]) -> Result<Self, RoscaError> {
        let mut registry = Self {
            foreperson,
            order: Vec::with_capacity(members.len() + 1),
            records: HashMap::with_capacity(members.len() + 1),
            pending: HashSet::new(),
        };
        registry.insert(foreperson);
        for member in members.iter().filter(|m| **m != foreperson) {
            if registry.is_member(member) {
                return Err(RoscaError::DuplicateMember(*member));
            }
            registry.insert(*member);
        }
        Ok(registry)
    }

    fn insert(&mut self, address: Address) {
        self.order.push(address);
        self.records.insert(address, Member::active());
    }

    /// The foreperson.
    #[must_use]
    pub fn foreperson(&self) -> Address {
        self.foreperson
    }

    /// Member count, foreperson included.
    #[must_use]
    pub fn count(&self) -> usize {
        self.order.len()
    }

    /// Addresses in member order.
    #[must_use]
    pub fn addresses(&self) -> &[Address] {
        &self.order
    }

    /// Whether `address` is an active member.
    #[must_use]
    pub fn is_member(&self, address: &Address) -> bool {
        self.records.get(address).is_some_and(|m| m.is_member)
    }

    /// Record for `address`; the default record for non-members.
    #[must_use]
    pub fn member(&self, address: &Address) -> Member {
        self.records.get(address).copied().unwrap_or_default()
    }

    /// Mutable record of an active member.
    pub fn member_mut(&mut self, address: &Address) -> Result<&mut Member, RoscaError> {
        self.records
            .get_mut(address)
            .filter(|m| m.is_member)
            .ok_or(RoscaError::NotMember(*address))
    }

    /// Fail unless `address` is an active member.
    pub fn ensure_member(&self, address: &Address) -> Result<(), RoscaError> {
        if !self.is_member(address) {
            return Err(RoscaError::NotMember(*address));
        }
        Ok(())
    }

    /// Fail unless `caller` is the foreperson.
    pub fn ensure_foreperson(&self, caller: &Address) -> Result<(), RoscaError> {
        if *caller != self.foreperson {
            return Err(RoscaError::NotForeperson(*caller));
        }
        Ok(())
    }

    /// Whether a join request from `address` is pending.
    #[must_use]
    pub fn has_pending_request(&self, address: &Address) -> bool {
        self.pending.contains(address)
    }

    /// Record a join request.
    pub fn request_join(&mut self, from: Address) -> Result<(), RoscaError> {
        if from == self.foreperson || self.is_member(&from) {
            return Err(RoscaError::AlreadyMember(from));
        }
        self.pending.insert(from);
        Ok(())
    }

    /// Foreperson accepts a pending request.
    pub fn accept_join(&mut self, caller: Address, candidate: Address) -> Result<(), RoscaError> {
        self.ensure_foreperson(&caller)?;
        if !self.pending.remove(&candidate) {
            return Err(RoscaError::NoPendingRequest(candidate));
        }
        self.insert(candidate);
        Ok(())
    }

    /// Foreperson adds a member without a request.
    pub fn add_member(&mut self, caller: Address, address: Address) -> Result<(), RoscaError> {
        self.ensure_foreperson(&caller)?;
        if self.is_member(&address) {
            return Err(RoscaError::AlreadyMember(address));
        }
        self.pending.remove(&address);
        self.insert(address);
        Ok(())
    }

    /// Iterate `(address, record)` in member order.
    pub fn iter(&self) -> impl Iterator<Item = (Address, Member)> + '_ {
        self.order
            .iter()
            .map(move |addr| (*addr, self.member(addr)))
    }

    /// Member table in member order.
    #[must_use]
    pub fn entries(&self) -> Vec<MemberEntry> {
        self.iter()
            .map(|(address, record)| MemberEntry { address, record })
            .collect()
    }
}
