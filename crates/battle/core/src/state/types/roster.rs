use crate::state::{Combatant, Slot};

/// A hero together with the creatures it exclusively owns.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hero {
    pub combatant: Combatant,
    pub creatures: Vec<Combatant>,
}

impl Hero {
    pub fn new(combatant: Combatant) -> Self {
        Self {
            combatant,
            creatures: Vec::new(),
        }
    }

    pub fn position(&self) -> Slot {
        self.combatant.position
    }
}

/// Heroes of one side, kept in slot order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SideRoster {
    heroes: Vec<Hero>,
}

impl SideRoster {
    pub fn heroes(&self) -> &[Hero] {
        &self.heroes
    }

    pub fn hero(&self, position: Slot) -> Option<&Hero> {
        self.heroes.iter().find(|h| h.position() == position)
    }

    pub fn hero_mut(&mut self, position: Slot) -> Option<&mut Hero> {
        self.heroes.iter_mut().find(|h| h.position() == position)
    }

    pub(crate) fn heroes_mut(&mut self) -> impl Iterator<Item = &mut Hero> {
        self.heroes.iter_mut()
    }

    pub(crate) fn insert(&mut self, hero: Hero) {
        self.heroes.push(hero);
        self.heroes.sort_by_key(Hero::position);
    }

    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }
}
