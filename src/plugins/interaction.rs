use crate::components::Role;
use crate::enums::{ContactEvent, ContactSide, EntityRole};
use crate::plugins::simulation::SimulationSet;
use bevy::prelude::*;
use thiserror::Error;

/// Overlap reported by the broad-phase for one pair this frame
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct ContactReport {
    pub a: Entity,
    pub b: Entity,
    /// Side of `a` that is touched; `b` is touched on the opposite side
    pub a_side: ContactSide,
}

/// What a contact callback receives: the concrete pair seen from its own side
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactPair {
    pub event: ContactEvent,
    pub this: Entity,
    pub other: Entity,
    pub this_side: ContactSide,
    pub other_side: ContactSide,
}

pub type ContactCallback = Box<dyn Fn(&mut World, &ContactPair) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteractionError {
    #[error("contact pair {a:?} / {b:?} is already registered")]
    DuplicatePair { a: EntityRole, b: EntityRole },
}

struct Registration {
    role_a: EntityRole,
    role_b: EntityRole,
    event_a: ContactEvent,
    event_b: ContactEvent,
    callback_a: ContactCallback,
    callback_b: ContactCallback,
}

/// Routes contacts between two roles to one callback per side
#[derive(Resource, Default)]
pub struct InteractionRegistry {
    registrations: Vec<Registration>,
}

impl InteractionRegistry {
    /// Registers the callbacks for contacts between `role_a` and `role_b`.
    ///
    /// `callback_a` is invoked with self = the `role_a` entity and tagged
    /// `event_a`; `callback_b` mirrors it for the `role_b` entity.
    pub fn register_pair(
        &mut self,
        role_a: EntityRole,
        role_b: EntityRole,
        event_a: ContactEvent,
        event_b: ContactEvent,
        callback_a: impl Fn(&mut World, &ContactPair) + Send + Sync + 'static,
        callback_b: impl Fn(&mut World, &ContactPair) + Send + Sync + 'static,
    ) -> Result<(), InteractionError> {
        if self.is_registered(role_a, role_b) {
            return Err(InteractionError::DuplicatePair {
                a: role_a,
                b: role_b,
            });
        }

        self.registrations.push(Registration {
            role_a,
            role_b,
            event_a,
            event_b,
            callback_a: Box::new(callback_a),
            callback_b: Box::new(callback_b),
        });
        Ok(())
    }

    /// True when the pair is registered in either orientation
    pub fn is_registered(&self, a: EntityRole, b: EntityRole) -> bool {
        self.registrations.iter().any(|reg| {
            (reg.role_a == a && reg.role_b == b) || (reg.role_a == b && reg.role_b == a)
        })
    }

    /// Role pairs in registration order, for the broad-phase
    pub fn pairs(&self) -> impl Iterator<Item = (EntityRole, EntityRole)> + '_ {
        self.registrations
            .iter()
            .map(|reg| (reg.role_a, reg.role_b))
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Invokes both callbacks for a reported contact.
    ///
    /// Returns false when either entity is gone or the roles have no
    /// registration.
    pub fn dispatch(&self, world: &mut World, report: &ContactReport) -> bool {
        let (Some(role_a), Some(role_b)) = (
            world.get::<Role>(report.a).map(|role| role.0),
            world.get::<Role>(report.b).map(|role| role.0),
        ) else {
            return false;
        };

        let b_side = report.a_side.opposite();
        let (registration, first, first_side, second, second_side) =
            match self.find(role_a, role_b) {
                Some(reg) => (reg, report.a, report.a_side, report.b, b_side),
                None => match self.find(role_b, role_a) {
                    Some(reg) => (reg, report.b, b_side, report.a, report.a_side),
                    None => {
                        debug!("Unrouted contact {:?} / {:?}", role_a, role_b);
                        return false;
                    }
                },
            };

        (registration.callback_a)(
            world,
            &ContactPair {
                event: registration.event_a,
                this: first,
                other: second,
                this_side: first_side,
                other_side: second_side,
            },
        );
        (registration.callback_b)(
            world,
            &ContactPair {
                event: registration.event_b,
                this: second,
                other: first,
                this_side: second_side,
                other_side: first_side,
            },
        );
        true
    }

    fn find(&self, a: EntityRole, b: EntityRole) -> Option<&Registration> {
        self.registrations
            .iter()
            .find(|reg| reg.role_a == a && reg.role_b == b)
    }
}

/// Callback for a side that has nothing to do on contact
pub fn ignore_contact(_world: &mut World, _pair: &ContactPair) {}

/// Plugin for contact routing
pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ContactReport>()
            .init_resource::<InteractionRegistry>()
            .add_systems(Update, dispatch_contacts.in_set(SimulationSet::Dispatch));
    }
}

/// Drains this frame's contact reports through the registry, in report order
pub fn dispatch_contacts(world: &mut World) {
    let reports: Vec<ContactReport> = world
        .resource_mut::<Events<ContactReport>>()
        .drain()
        .collect();

    if reports.is_empty() || !world.contains_resource::<InteractionRegistry>() {
        return;
    }

    world.resource_scope(|world, registry: Mut<InteractionRegistry>| {
        for report in &reports {
            if world.get_entity(report.a).is_none() || world.get_entity(report.b).is_none() {
                continue;
            }
            registry.dispatch(world, report);
        }
    });
}
