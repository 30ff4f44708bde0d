use crate::components::{Collider, Position, Role};
use crate::enums::ContactSide;
use crate::plugins::interaction::{ContactReport, InteractionRegistry};
use crate::plugins::physics::penetration;
use crate::plugins::simulation::SimulationSet;
use bevy::prelude::*;

/// AABB overlap reporter standing in for the host broad-phase.
///
/// Only role pairs present in the interaction registry are tested, once per
/// overlapping pair per frame.
pub struct BroadPhasePlugin;

impl Plugin for BroadPhasePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ContactReport>()
            .add_systems(Update, report_overlaps.in_set(SimulationSet::BroadPhase));
    }
}

/// Reports every overlapping pair of registered roles
fn report_overlaps(
    registry: Option<Res<InteractionRegistry>>,
    bodies: Query<(Entity, &Role, &Position, &Collider)>,
    mut reports: EventWriter<ContactReport>,
) {
    let Some(registry) = registry else {
        return;
    };

    let bodies: Vec<_> = bodies
        .iter()
        .map(|(entity, role, position, collider)| (entity, role.0, collider.bounds(position)))
        .collect();

    for (role_a, role_b) in registry.pairs() {
        for (a, _, a_bounds) in bodies.iter().filter(|(_, role, _)| *role == role_a) {
            for (b, _, b_bounds) in bodies.iter().filter(|(_, role, _)| *role == role_b) {
                if a == b {
                    continue;
                }
                if let Some(a_side) = touched_side(*a_bounds, *b_bounds) {
                    reports.send(ContactReport {
                        a: *a,
                        b: *b,
                        a_side,
                    });
                }
            }
        }
    }
}

/// Side of box `a` touched by box `b`, if they overlap
pub fn touched_side(a: (f32, f32, f32, f32), b: (f32, f32, f32, f32)) -> Option<ContactSide> {
    let push = penetration(a, b)?;
    let side = if push.y < 0.0 {
        ContactSide::Down
    } else if push.y > 0.0 {
        ContactSide::Up
    } else if push.x < 0.0 {
        ContactSide::Right
    } else {
        ContactSide::Left
    };
    Some(side)
}
